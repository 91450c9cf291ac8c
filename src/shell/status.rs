use crate::system::{signal::SignalNumber, ProcessId};

/// How a child process came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildOutcome {
    Exited(i32),
    Signaled(SignalNumber),
}

/// Status of the most recently completed foreground command. Overwritten by
/// each new foreground dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ForegroundResult {
    pub(crate) pid: ProcessId,
    pub(crate) outcome: ChildOutcome,
}

/// Render the `status` built-in's one-line report.
pub(crate) fn render(last: Option<&ForegroundResult>) -> String {
    match last {
        None => "No foreground process: exit status 0".to_string(),
        Some(result) => match result.outcome {
            ChildOutcome::Exited(code) => format!("exited with status {code}"),
            ChildOutcome::Signaled(signal) => format!("terminated by signal {signal}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn no_foreground_process_yet() {
        assert_eq!(render(None), "No foreground process: exit status 0");
    }

    #[test]
    fn renders_exit_and_signal() {
        let exited = ForegroundResult {
            pid: ProcessId::new(100),
            outcome: ChildOutcome::Exited(7),
        };
        assert_eq!(render(Some(&exited)), "exited with status 7");

        let signaled = ForegroundResult {
            pid: ProcessId::new(100),
            outcome: ChildOutcome::Signaled(9),
        };
        assert_eq!(render(Some(&signaled)), "terminated by signal 9");
    }
}
