//! Parsing of the helper-written answer file.

use std::path::PathBuf;

/// Sentinel written by the helper when the user dismissed the dialog.
pub const CANCELLED_SENTINEL: &str = "-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Empty file: the helper truncated it and has not answered yet
    Pending,
    Cancelled,
    /// Trimmed, non-empty selection text
    Selection(String),
}

impl Answer {
    pub fn parse(content: &str) -> Self {
        match content.trim() {
            "" => Self::Pending,
            CANCELLED_SENTINEL => Self::Cancelled,
            selection => Self::Selection(selection.to_string()),
        }
    }
}

/// Split a multi-select answer into paths, one per line, skipping blank lines.
pub fn split_paths(selection: &str) -> Vec<PathBuf> {
    selection
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_are_pending() {
        assert_eq!(Answer::parse(""), Answer::Pending);
        assert_eq!(Answer::parse(" \n\t"), Answer::Pending);
    }

    #[test]
    fn test_cancel_sentinel() {
        assert_eq!(Answer::parse("-1\n"), Answer::Cancelled);
    }

    #[test]
    fn test_selection_is_trimmed() {
        assert_eq!(
            Answer::parse("  /tmp/x.txt\n"),
            Answer::Selection("/tmp/x.txt".to_string())
        );
    }

    #[test]
    fn test_negative_number_path_is_not_cancel() {
        assert_eq!(
            Answer::parse("-12"),
            Answer::Selection("-12".to_string())
        );
    }

    #[test]
    fn test_split_drops_blank_lines_and_keeps_order() {
        assert_eq!(
            split_paths("/a\n/b\n\n/c"),
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
    }

    #[test]
    fn test_split_handles_crlf() {
        assert_eq!(
            split_paths("/a\r\n/b"),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }
}
