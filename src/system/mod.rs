use core::fmt;
use std::{
    io,
    os::fd::{AsRawFd, RawFd},
};

use crate::cutils::cerr;

use self::signal::SignalNumber;

pub mod signal;

pub mod wait;

/// Identifier of an operating-system process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(libc::pid_t);

impl ProcessId {
    /// Matches any child of the calling process when passed to a wait call.
    pub const ANY_CHILD: ProcessId = ProcessId(-1);

    pub fn new(id: libc::pid_t) -> Self {
        Self(id)
    }

    pub fn get(&self) -> libc::pid_t {
        self.0
    }

    /// Return the process identifier for the current process
    pub fn current() -> ProcessId {
        // NOTE libstd casts the `i32` that `libc::getpid` returns into `u32`,
        // here we cast it back
        ProcessId(std::process::id() as libc::pid_t)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) enum ForkResult {
    // Parent process branch with the child process' PID.
    Parent(ProcessId),
    // Child process branch.
    Child,
}

/// Create a new process.
///
/// The shell is single threaded, so the child process is free to run
/// arbitrary code before calling `execve` or a similar function.
pub(crate) fn fork() -> io::Result<ForkResult> {
    // SAFETY: this function cannot trigger memory unsafety by itself; see
    // the async-signal-safety note above for what the child may do.
    let pid = cerr(unsafe { libc::fork() })?;
    if pid == 0 {
        Ok(ForkResult::Child)
    } else {
        Ok(ForkResult::Parent(ProcessId(pid)))
    }
}

/// Send a signal to a process with the specified ID.
pub fn kill(pid: ProcessId, signal: SignalNumber) -> io::Result<()> {
    // SAFETY: this function cannot cause UB even if `pid` is not a valid
    // process ID or if `signal` is not a valid signal code.
    cerr(unsafe { libc::kill(pid.0, signal) }).map(|_| ())
}

/// Terminate the calling process immediately, without unwinding or running
/// any libc exit handlers.
pub(crate) fn _exit(status: libc::c_int) -> ! {
    unsafe { libc::_exit(status) }
}

/// Duplicate the descriptor of `file` onto `target`, replacing whatever
/// `target` referred to. The original descriptor stays open; dropping `file`
/// closes it.
pub(crate) fn dup2<F: AsRawFd>(file: &F, target: RawFd) -> io::Result<()> {
    // SAFETY: dup2 only operates on the two descriptors it is given.
    cerr(unsafe { libc::dup2(file.as_raw_fd(), target) }).map(|_| ())
}
