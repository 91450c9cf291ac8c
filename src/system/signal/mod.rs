//! Utilities to handle signals.
#![warn(unused)]

mod handler;
mod mode;
mod set;

use libc::c_int;

pub(crate) use handler::{SignalHandler, SignalHandlerBehavior};
pub(crate) use mode::foreground_only;
#[cfg(test)]
pub(crate) use mode::{mode_test_guard, set_foreground_only};
pub(crate) use set::SignalSet;

pub(crate) type SignalNumber = c_int;

macro_rules! define_consts {
    ($($signal:ident,)*) => {
        pub(crate) mod consts {
            pub(crate) use libc::{$($signal,)*};
        }

        pub(crate) fn signal_name(signal: SignalNumber) -> Option<&'static str> {
            match signal {
                $(consts::$signal => Some(stringify!($signal)),)*
                _ => None,
            }
        }
    };
}

define_consts! {
    SIGINT,
    SIGTERM,
    SIGTSTP,
    SIGCHLD,
    SIGKILL,
    SIGSTOP,
}
