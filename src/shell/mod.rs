//! The interactive shell session: the read/dispatch loop, built-ins and the
//! signal policy. Process syscalls happen behind the [`exec::Launcher`]
//! seam; this module only does bookkeeping.
#![deny(unsafe_code)]

pub(crate) mod exec;
pub(crate) mod expand;
pub(crate) mod jobs;
pub(crate) mod parse;
pub(crate) mod redirect;
pub(crate) mod status;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::common::Error;
use crate::log::{user_warn, ShellLogger};
use crate::system::signal::{
    consts::*, foreground_only, SignalHandler, SignalHandlerBehavior,
};
use crate::system::ProcessId;

use self::exec::{ChildSpec, ExecLauncher, Launcher, RunMode};
use self::jobs::{JobHandle, JobRegistry};
use self::parse::CommandLine;
use self::status::ForegroundResult;

const PROMPT: &str = "user@smallsh: ";

enum Builtin {
    Exit,
    Cd,
    Status,
}

fn builtin(name: &str) -> Option<Builtin> {
    match name {
        "exit" => Some(Builtin::Exit),
        "cd" => Some(Builtin::Cd),
        "status" => Some(Builtin::Status),
        _ => None,
    }
}

/// All mutable state of one shell run: the job registry, the last
/// foreground result and the launcher the session dispatches through.
pub(crate) struct Session<L> {
    launcher: L,
    jobs: JobRegistry,
    last_foreground: Option<ForegroundResult>,
    running: bool,
    pid: ProcessId,
}

impl<L: Launcher> Session<L> {
    pub(crate) fn new(launcher: L) -> Self {
        Self {
            launcher,
            jobs: JobRegistry::new(),
            last_foreground: None,
            running: true,
            pid: ProcessId::current(),
        }
    }

    /// The interactive loop. Returns once the `exit` built-in (or EOF on
    /// stdin) has run the shutdown sequence.
    pub(crate) fn run(&mut self) -> Result<(), Error> {
        let stdin = io::stdin();
        let mut line = String::new();

        while self.running {
            // collect finished background jobs before prompting
            jobs::reap_background(&mut self.jobs, &mut self.launcher);

            print_ignore_io_error!("{PROMPT}");
            let _ = io::stdout().flush();

            line.clear();
            match stdin.lock().read_line(&mut line) {
                // EOF behaves like `exit`
                Ok(0) => self.shutdown(),
                Ok(_) => self.handle_line(line.trim_end_matches('\n')),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::Io(None, err)),
            }
        }

        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        if parse::is_comment_or_blank(line) {
            return;
        }

        let line = expand::expand_pid(line, self.pid);

        let Some(command) = parse::parse(&line) else {
            println_ignore_io_error!("Unable to parse command.");
            return;
        };

        match builtin(&command.argv[0]) {
            Some(Builtin::Exit) => self.shutdown(),
            Some(Builtin::Cd) => change_directory(&command.argv),
            Some(Builtin::Status) => {
                println_ignore_io_error!("{}", status::render(self.last_foreground.as_ref()))
            }
            None => self.dispatch(command),
        }
    }

    fn dispatch(&mut self, command: CommandLine) {
        // a trailing `&` is honored only outside foreground-only mode
        let mode = if command.background && !foreground_only() {
            RunMode::Background
        } else {
            RunMode::Foreground
        };

        let spec = ChildSpec {
            argv: command.argv,
            mode,
            redirect: command.redirect,
        };

        let pid = match self.launcher.launch(spec) {
            Ok(pid) => pid,
            Err(err) => {
                // failure of the process-creation primitive is not
                // recoverable: report and take the whole shell down
                eprintln_ignore_io_error!("smallsh: cannot create child process: {err}");
                std::process::exit(1);
            }
        };

        match mode {
            RunMode::Background => {
                self.jobs.push(JobHandle { pid });
                println_ignore_io_error!("Starting background PID {pid}.");
            }
            RunMode::Foreground => match self.launcher.wait_foreground(pid) {
                Ok(result) => self.last_foreground = Some(result),
                Err(err) => {
                    user_warn!("cannot wait for foreground child {pid}: {err}");
                }
            },
        }
    }

    /// The terminal state of the run loop: kill every background job,
    /// release the registry, stop accepting commands.
    fn shutdown(&mut self) {
        jobs::kill_all(&mut self.jobs, &mut self.launcher);
        self.running = false;
    }
}

fn change_directory(argv: &[String]) {
    let target = match argv.len() {
        1 => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home),
            None => {
                println_ignore_io_error!("cd: HOME is not set");
                return;
            }
        },
        2 => PathBuf::from(&argv[1]),
        _ => {
            println_ignore_io_error!("cd: too many arguments");
            return;
        }
    };

    if let Err(err) = std::env::set_current_dir(&target) {
        println_ignore_io_error!("cd: cannot change to '{}': {err}", target.display());
    }
}

fn install_signal_policy() -> Result<(), Error> {
    // the shell itself survives Ctrl-C; Ctrl-Z toggles foreground-only mode
    // instead of suspending. Both dispositions last for the whole run.
    SignalHandler::register(SIGTSTP, SignalHandlerBehavior::ToggleForegroundMode)
        .map_err(|err| Error::SignalSetup("SIGTSTP", err))?
        .forget();

    SignalHandler::register(SIGINT, SignalHandlerBehavior::Ignore)
        .map_err(|err| Error::SignalSetup("SIGINT", err))?
        .forget();

    Ok(())
}

fn shell_process() -> Result<(), Error> {
    ShellLogger::new("smallsh: ").into_global_logger();

    install_signal_policy()?;

    Session::new(ExecLauncher).run()
}

pub fn main() {
    match shell_process() {
        Ok(()) => (),
        Err(error) => {
            eprintln_ignore_io_error!("smallsh: {error}");
            std::process::exit(1);
        }
    }
}
