use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::common::Error;
use crate::log::user_warn;
use crate::system::signal::{consts::*, SignalHandler, SignalHandlerBehavior, SignalSet};
use crate::system::wait::{Wait, WaitError, WaitOptions, WaitStatus};
use crate::system::{self, fork, kill, ForkResult, ProcessId};

use super::redirect::RedirectionPlan;
use super::status::{ChildOutcome, ForegroundResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunMode {
    Foreground,
    Background,
}

/// Everything the child process will do before executing the program:
/// which argv to exec, whether to detach from the terminal, and where its
/// standard streams point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChildSpec {
    pub(crate) argv: Vec<String>,
    pub(crate) mode: RunMode,
    pub(crate) redirect: RedirectionPlan,
}

/// The seam between dispatch logic and process syscalls. The shell session
/// is written against this trait so its bookkeeping can be tested without
/// creating real processes.
pub(crate) trait Launcher {
    /// Create the child process described by `spec` and return its pid.
    fn launch(&mut self, spec: ChildSpec) -> io::Result<ProcessId>;

    /// Block until the given child terminates and decode its status.
    fn wait_foreground(&mut self, pid: ProcessId) -> io::Result<ForegroundResult>;

    /// One non-blocking poll for any terminated child. `Ok(None)` means no
    /// child is ready (or there are no children at all).
    fn try_reap(&mut self) -> io::Result<Option<(ProcessId, ChildOutcome)>>;

    /// Forced termination of a background job; best-effort by the caller.
    fn terminate(&mut self, pid: ProcessId) -> io::Result<()>;
}

/// The real launcher: fork, set the child up, exec.
pub(crate) struct ExecLauncher;

impl Launcher for ExecLauncher {
    fn launch(&mut self, spec: ChildSpec) -> io::Result<ProcessId> {
        let ForkResult::Parent(pid) = fork()? else {
            child_run(&spec)
        };

        Ok(pid)
    }

    fn wait_foreground(&mut self, pid: ProcessId) -> io::Result<ForegroundResult> {
        // Shield the wait from the foreground-only toggle: a SIGTSTP
        // delivered mid-wait would run shell logic while the wait syscall is
        // outstanding. The toggle is delivered once the mask is restored.
        let blocked = SignalSet::with(SIGTSTP).and_then(|set| set.block());
        if let Err(err) = &blocked {
            user_warn!("cannot block SIGTSTP around foreground wait: {err}");
        }

        let waited = loop {
            match pid.wait(WaitOptions::new()) {
                Ok((_, status)) => break Ok(status),
                Err(WaitError::Io(err)) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(WaitError::Io(err)) => break Err(err),
                Err(WaitError::NotReady) => {
                    unreachable!("blocking wait cannot report NotReady")
                }
            }
        };

        if let Ok(original_set) = blocked {
            if let Err(err) = original_set.set_mask() {
                user_warn!("cannot unblock SIGTSTP after foreground wait: {err}");
            }
        }

        let outcome = child_outcome(waited?);

        // termination by signal is the one outcome reported eagerly, not
        // just on a later `status` query
        if let ChildOutcome::Signaled(signal) = outcome {
            println_ignore_io_error!("\nterminated by signal {signal}");
        }

        Ok(ForegroundResult { pid, outcome })
    }

    fn try_reap(&mut self) -> io::Result<Option<(ProcessId, ChildOutcome)>> {
        match ProcessId::ANY_CHILD.wait(WaitOptions::new().no_hang()) {
            Ok((pid, status)) => Ok(Some((pid, child_outcome(status)))),
            Err(WaitError::NotReady) => Ok(None),
            Err(WaitError::Io(err)) if err.raw_os_error() == Some(libc::ECHILD) => Ok(None),
            Err(WaitError::Io(err)) => Err(err),
        }
    }

    fn terminate(&mut self, pid: ProcessId) -> io::Result<()> {
        kill(pid, SIGKILL)
    }
}

fn child_outcome(status: WaitStatus) -> ChildOutcome {
    if let Some(code) = status.exit_status() {
        ChildOutcome::Exited(code)
    } else if let Some(signal) = status.term_signal() {
        ChildOutcome::Signaled(signal)
    } else {
        // cannot happen without WUNTRACED/WCONTINUED in the wait options
        ChildOutcome::Exited(1)
    }
}

/// Child-side of [`ExecLauncher::launch`]. Never returns: either the
/// program image is replaced or the child terminates with status 1.
fn child_run(spec: &ChildSpec) -> ! {
    if let Err(err) = child_setup(spec) {
        eprintln_ignore_io_error!("smallsh: {err}");
        system::_exit(1);
    }

    let mut command = Command::new(&spec.argv[0]);
    command.args(&spec.argv[1..]);

    // exec only returns on failure
    let err = command.exec();
    eprintln_ignore_io_error!("smallsh: cannot run '{}': {err}", spec.argv[0]);
    system::_exit(1);
}

fn child_setup(spec: &ChildSpec) -> Result<(), Error> {
    match spec.mode {
        RunMode::Background => {
            // detach the standard streams from the terminal; an explicit
            // redirection below overrides this
            let null_path = std::path::Path::new("/dev/null");
            let null_in = File::open(null_path)
                .map_err(|err| Error::Io(Some(null_path.to_owned()), err))?;
            system::dup2(&null_in, libc::STDIN_FILENO)
                .map_err(|err| Error::Io(Some(null_path.to_owned()), err))?;

            let null_out = OpenOptions::new()
                .write(true)
                .open(null_path)
                .map_err(|err| Error::Io(Some(null_path.to_owned()), err))?;
            system::dup2(&null_out, libc::STDOUT_FILENO)
                .map_err(|err| Error::Io(Some(null_path.to_owned()), err))?;
        }
        RunMode::Foreground => {
            // the user must be able to interrupt a foreground command even
            // though the shell itself ignores SIGINT
            SignalHandler::register(SIGINT, SignalHandlerBehavior::Default)
                .map_err(|err| Error::SignalSetup("SIGINT", err))?
                .forget();
        }
    }

    spec.redirect.apply()?;

    // no child may be suspended from the terminal; Ignore survives exec
    SignalHandler::register(SIGTSTP, SignalHandlerBehavior::Ignore)
        .map_err(|err| Error::SignalSetup("SIGTSTP", err))?
        .forget();

    Ok(())
}


#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use super::*;
    use crate::system::tests::tempfile_path;

    fn spec(argv: &[&str], mode: RunMode, redirect: RedirectionPlan) -> ChildSpec {
        ChildSpec {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            mode,
            redirect,
        }
    }

    #[test]
    fn foreground_exit_status_round_trip() {
        let mut launcher = ExecLauncher;

        let pid = launcher
            .launch(spec(
                &["sh", "-c", "exit 7"],
                RunMode::Foreground,
                RedirectionPlan::default(),
            ))
            .unwrap();

        let result = launcher.wait_foreground(pid).unwrap();
        assert_eq!(result.pid, pid);
        assert_eq!(result.outcome, ChildOutcome::Exited(7));
    }

    #[test]
    fn foreground_termination_by_signal() {
        let mut launcher = ExecLauncher;

        let pid = launcher
            .launch(spec(
                &["sleep", "5"],
                RunMode::Foreground,
                RedirectionPlan::default(),
            ))
            .unwrap();

        kill(pid, SIGKILL).unwrap();

        let result = launcher.wait_foreground(pid).unwrap();
        assert_eq!(result.outcome, ChildOutcome::Signaled(SIGKILL));
    }

    #[test]
    fn redirection_connects_both_streams() {
        let input_path = tempfile_path("exec_in");
        let output_path = tempfile_path("exec_out");
        fs::File::create(&input_path)
            .and_then(|mut f| f.write_all(b"over the wire\n"))
            .unwrap();

        let mut launcher = ExecLauncher;
        let pid = launcher
            .launch(spec(
                &["cat"],
                RunMode::Foreground,
                RedirectionPlan {
                    input: Some(input_path.clone()),
                    output: Some(output_path.clone()),
                },
            ))
            .unwrap();

        let result = launcher.wait_foreground(pid).unwrap();
        assert_eq!(result.outcome, ChildOutcome::Exited(0));
        assert_eq!(fs::read_to_string(&output_path).unwrap(), "over the wire\n");

        let _ = fs::remove_file(input_path);
        let _ = fs::remove_file(output_path);
    }

    #[test]
    fn missing_input_file_is_child_fatal() {
        let mut launcher = ExecLauncher;

        let pid = launcher
            .launch(spec(
                &["cat"],
                RunMode::Foreground,
                RedirectionPlan {
                    input: Some("/definitely/not/here.txt".into()),
                    output: None,
                },
            ))
            .unwrap();

        let result = launcher.wait_foreground(pid).unwrap();
        assert_eq!(result.outcome, ChildOutcome::Exited(1));
    }

    #[test]
    fn exec_failure_is_child_fatal() {
        let mut launcher = ExecLauncher;

        let pid = launcher
            .launch(spec(
                &["definitely-no-such-program-here"],
                RunMode::Foreground,
                RedirectionPlan::default(),
            ))
            .unwrap();

        let result = launcher.wait_foreground(pid).unwrap();
        assert_eq!(result.outcome, ChildOutcome::Exited(1));
    }

    #[test]
    fn background_child_reads_from_null_device() {
        let output_path = tempfile_path("exec_bg_out");

        let mut launcher = ExecLauncher;
        // `cat` with stdin on /dev/null terminates immediately; the explicit
        // output redirection overrides the null stdout
        let pid = launcher
            .launch(spec(
                &["cat"],
                RunMode::Background,
                RedirectionPlan {
                    input: None,
                    output: Some(output_path.clone()),
                },
            ))
            .unwrap();

        // waiting on the specific pid keeps this test from reaping children
        // spawned by other tests in this process
        let result = launcher.wait_foreground(pid).unwrap();
        assert_eq!(result.outcome, ChildOutcome::Exited(0));
        assert_eq!(fs::read_to_string(&output_path).unwrap(), "");

        let _ = fs::remove_file(output_path);
    }
}
