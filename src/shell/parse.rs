use std::path::PathBuf;

use super::redirect::RedirectionPlan;

/// One parsed command line, ready for dispatch.
///
/// `background` only records that the line carried a trailing `&`; whether
/// the marker is honored is decided by the dispatch path, which consults the
/// foreground-only mode flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandLine {
    pub(crate) argv: Vec<String>,
    pub(crate) background: bool,
    pub(crate) redirect: RedirectionPlan,
}

/// Lines that produce no dispatch at all: empty ones and comments.
pub(crate) fn is_comment_or_blank(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with('#')
}

/// Split a command line into words, redirection targets and the background
/// marker. Returns `None` for lines that name no program or leave a
/// redirection operator without an operand.
pub(crate) fn parse(line: &str) -> Option<CommandLine> {
    let mut rest = line.trim();

    // the background marker is the last character of the line, not a word
    let background = match rest.strip_suffix('&') {
        Some(stripped) => {
            rest = stripped.trim_end();
            true
        }
        None => false,
    };

    let mut argv = Vec::new();
    let mut redirect = RedirectionPlan::default();

    let mut words = rest.split_whitespace();
    while let Some(word) = words.next() {
        match word {
            "<" => redirect.input = Some(PathBuf::from(words.next()?)),
            ">" => redirect.output = Some(PathBuf::from(words.next()?)),
            _ => argv.push(word.to_string()),
        }
    }

    if argv.is_empty() {
        return None;
    }

    Some(CommandLine {
        argv,
        background,
        redirect,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(argv: &[&str]) -> Vec<String> {
        argv.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plain_words() {
        let command = parse("ls -la /tmp").unwrap();
        assert_eq!(command.argv, args(&["ls", "-la", "/tmp"]));
        assert!(!command.background);
        assert_eq!(command.redirect, RedirectionPlan::default());
    }

    #[test]
    fn trailing_ampersand_is_a_marker_not_a_word() {
        let command = parse("sleep 10 &").unwrap();
        assert_eq!(command.argv, args(&["sleep", "10"]));
        assert!(command.background);

        // also without a separating space
        let command = parse("sleep 10&").unwrap();
        assert_eq!(command.argv, args(&["sleep", "10"]));
        assert!(command.background);
    }

    #[test]
    fn redirection_targets_leave_argv() {
        let command = parse("sort < in.txt > out.txt").unwrap();
        assert_eq!(command.argv, args(&["sort"]));
        assert_eq!(command.redirect.input, Some("in.txt".into()));
        assert_eq!(command.redirect.output, Some("out.txt".into()));
    }

    #[test]
    fn redirected_background_command() {
        let command = parse("wc -l < words.txt &").unwrap();
        assert_eq!(command.argv, args(&["wc", "-l"]));
        assert_eq!(command.redirect.input, Some("words.txt".into()));
        assert!(command.background);
    }

    #[test]
    fn operator_without_operand_is_unparsable() {
        assert_eq!(parse("cat <"), None);
        assert_eq!(parse("cat >"), None);
    }

    #[test]
    fn no_program_is_unparsable() {
        assert_eq!(parse("&"), None);
        assert_eq!(parse("< in.txt"), None);
    }

    #[test]
    fn comments_and_blanks() {
        assert!(is_comment_or_blank(""));
        assert!(is_comment_or_blank("   "));
        assert!(is_comment_or_blank("# this is a comment"));
        assert!(!is_comment_or_blank("echo # not a comment marker we honor"));
    }
}
