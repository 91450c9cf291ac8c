//! The foreground-only mode flag and the SIGTSTP action that toggles it.
//!
//! The handler runs in async-signal context: it is restricted to one atomic
//! flag flip and one raw `write(2)` of a fixed message to stdout. Everything
//! that depends on the mode reads the flag from the control thread via
//! [`foreground_only`].

use std::sync::atomic::{AtomicBool, Ordering};

use super::SignalNumber;

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_MSG: &[u8] = b"\nEntering foreground-only mode\n";
const EXIT_MSG: &[u8] = b"\nExiting foreground-only mode\n";

/// Signal-catching function installed for SIGTSTP in the shell process.
///
/// Each delivery flips the mode: repeated SIGTSTPs alternate between normal
/// and foreground-only operation.
pub(super) extern "C" fn toggle_foreground_only(_signal: SignalNumber) {
    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);

    let message: &[u8] = if was_foreground_only {
        EXIT_MSG
    } else {
        ENTER_MSG
    };

    // SAFETY: write(2) is async-signal-safe; the buffer is a static byte
    // string and outlives the call.
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            message.as_ptr().cast(),
            message.len(),
        );
    }
}

/// Whether the shell is currently in foreground-only mode.
pub(crate) fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

#[cfg(test)]
pub(crate) fn set_foreground_only(value: bool) {
    FOREGROUND_ONLY.store(value, Ordering::SeqCst);
}

/// Serializes tests that read or write the process-wide mode flag.
#[cfg(test)]
pub(crate) fn mode_test_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|err| err.into_inner())
}
