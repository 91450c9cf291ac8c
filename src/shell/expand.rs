use crate::system::ProcessId;

/// Replace every occurrence of `$$` in `line` with the shell's pid.
pub(crate) fn expand_pid(line: &str, pid: ProcessId) -> String {
    let pid = pid.to_string();

    let mut expanded = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(idx) = rest.find("$$") {
        expanded.push_str(&rest[..idx]);
        expanded.push_str(&pid);
        rest = &rest[idx + 2..];
    }
    expanded.push_str(rest);
    expanded
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::expand_pid;
    use crate::system::ProcessId;

    #[test]
    fn replaces_every_occurrence() {
        let pid = ProcessId::new(123);
        assert_eq!(expand_pid("echo $$", pid), "echo 123");
        assert_eq!(expand_pid("$$ mid $$ end$$", pid), "123 mid 123 end123");
    }

    #[test]
    fn leaves_single_dollars_alone() {
        let pid = ProcessId::new(123);
        assert_eq!(expand_pid("echo $HOME $", pid), "echo $HOME $");
        assert_eq!(expand_pid("", pid), "");
    }

    #[test]
    fn dollar_runs_pair_up_left_to_right() {
        let pid = ProcessId::new(9);
        // three dollars: the first two expand, the last survives
        assert_eq!(expand_pid("$$$", pid), "9$");
    }
}
