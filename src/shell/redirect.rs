use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use crate::common::Error;
use crate::system;

/// Where a command's standard streams should point, as found by the parser.
/// Built fresh per command and consumed once in the child before exec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RedirectionPlan {
    pub(crate) input: Option<PathBuf>,
    pub(crate) output: Option<PathBuf>,
}

impl RedirectionPlan {
    /// Rewire the child's standard streams to the planned targets.
    ///
    /// Runs in the child process only. Any failure here is fatal for the
    /// child; the caller reports it and terminates with status 1. The parent
    /// never sees these errors.
    pub(crate) fn apply(&self) -> Result<(), Error> {
        if let Some(path) = &self.input {
            let file =
                File::open(path).map_err(|err| Error::Io(Some(path.clone()), err))?;
            system::dup2(&file, libc::STDIN_FILENO)
                .map_err(|err| Error::Io(Some(path.clone()), err))?;
            // `file` drops here, closing the original descriptor
        }

        if let Some(path) = &self.output {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o777)
                .open(path)
                .map_err(|err| Error::Io(Some(path.clone()), err))?;
            system::dup2(&file, libc::STDOUT_FILENO)
                .map_err(|err| Error::Io(Some(path.clone()), err))?;
        }

        Ok(())
    }
}
