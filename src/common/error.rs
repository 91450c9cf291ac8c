use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    /// Installing one of the shell's signal dispositions failed at startup.
    SignalSetup(&'static str, io::Error),
    /// An IO failure, optionally tied to the path that produced it.
    Io(Option<PathBuf>, io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SignalSetup(signal, e) => {
                write!(f, "cannot set up {signal} handling: {e}")
            }
            Error::Io(location, e) => {
                if let Some(path) = location {
                    write!(f, "cannot access '{}': {e}", path.display())
                } else {
                    write!(f, "IO error: {e}")
                }
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(None, err)
    }
}
