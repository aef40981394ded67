//! Rendering of command results.

use std::fmt::Display;

use torrdispatch_core::DuplicateMatch;

/// Results of one group, framed by its name unless `hide_groups`.
///
/// Returns `None` when there is nothing to show for the group.
pub fn render_group<T: Display>(label: &str, lines: &[T], hide_groups: bool) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let mut out = String::new();
    if !hide_groups {
        out.push_str(&format!("### Group {}: ###\n\n", label));
    }
    for line in lines {
        out.push_str(&format!("{}\n", line));
    }
    if !hide_groups {
        out.push_str("\n######\n");
    }
    Some(out)
}

pub fn found_line(found: &DuplicateMatch) -> String {
    format!(
        "\"{}\" found in \"{}\"",
        found.candidate.display(),
        found.located_at.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_group_with_header() {
        let out = render_group("music", &["a", "b"], false).unwrap();
        assert_eq!(out, "### Group music: ###\n\na\nb\n\n######\n");
    }

    #[test]
    fn test_render_group_hidden() {
        let out = render_group("music", &["a"], true).unwrap();
        assert_eq!(out, "a\n");
    }

    #[test]
    fn test_render_group_empty() {
        assert!(render_group::<String>("music", &[], false).is_none());
    }

    #[test]
    fn test_found_line() {
        let found = DuplicateMatch {
            candidate: PathBuf::from("/hole/a.torrent"),
            located_at: PathBuf::from("/rt1/b.torrent"),
        };
        assert_eq!(found_line(&found), "\"/hole/a.torrent\" found in \"/rt1/b.torrent\"");
    }
}
