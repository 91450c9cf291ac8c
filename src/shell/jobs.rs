use crate::log::{dev_warn, user_warn};
use crate::system::ProcessId;

use super::exec::Launcher;
use super::status::ChildOutcome;

/// One live background process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JobHandle {
    pub(crate) pid: ProcessId,
}

/// The background jobs the shell still has to account for, in insertion
/// order. Every handle in here belongs to a process that is running or has
/// not yet been reaped; a handle never survives a successful reap.
#[derive(Debug, Default)]
pub(crate) struct JobRegistry {
    jobs: Vec<JobHandle>,
}

impl JobRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, job: JobHandle) {
        self.jobs.push(job);
    }

    /// Drop the handle for `pid`. Returns whether it was present.
    pub(crate) fn remove(&mut self, pid: ProcessId) -> bool {
        match self.jobs.iter().position(|job| job.pid == pid) {
            Some(idx) => {
                self.jobs.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, pid: ProcessId) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Take every handle out of the registry, leaving it empty.
    pub(crate) fn drain(&mut self) -> Vec<JobHandle> {
        std::mem::take(&mut self.jobs)
    }
}

/// Sweep for terminated background jobs without blocking.
///
/// Runs at the top of every dispatch cycle. Each terminated child gets one
/// notice and loses its registry entry; the sweep stops at the first poll
/// that finds nothing.
pub(crate) fn reap_background(registry: &mut JobRegistry, launcher: &mut impl Launcher) {
    if registry.is_empty() {
        return;
    }

    loop {
        match launcher.try_reap() {
            Ok(Some((pid, outcome))) => {
                match outcome {
                    ChildOutcome::Exited(code) => println_ignore_io_error!(
                        "Background PID {pid} terminated with exit value {code}."
                    ),
                    ChildOutcome::Signaled(signal) => println_ignore_io_error!(
                        "Background PID {pid} terminated by signal {signal}."
                    ),
                }

                if !registry.remove(pid) {
                    dev_warn!("reaped child {pid} without a registry entry");
                }
            }
            Ok(None) => break,
            Err(err) => {
                user_warn!("cannot poll for finished background jobs: {err}");
                break;
            }
        }
    }
}

/// Force-terminate every registered job and release the registry. Signaling
/// an already-dead process is not an error.
pub(crate) fn kill_all(registry: &mut JobRegistry, launcher: &mut impl Launcher) {
    for job in registry.drain() {
        if let Err(err) = launcher.terminate(job.pid) {
            dev_warn!("cannot terminate background job {}: {err}", job.pid);
        }
    }
}
