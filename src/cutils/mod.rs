pub fn cerr<Int: Copy + TryInto<libc::c_long>>(res: Int) -> std::io::Result<Int> {
    match res.try_into() {
        Ok(-1) => Err(std::io::Error::last_os_error()),
        _ => Ok(res),
    }
}

#[cfg(test)]
mod test {
    use super::cerr;

    #[test]
    fn maps_minus_one_to_errno() {
        assert!(cerr(unsafe { libc::close(-1) }).is_err());
        assert!(cerr(0).is_ok());
        assert!(cerr(42).is_ok());
    }
}
