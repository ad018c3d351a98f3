//! Line classification
//!
//! Tags every line of a config file with a structural role. No line is
//! dropped here; later stages decide what to do with comments and blanks.

use crate::parser::{ClassifiedLine, LineRole, RawLine};

/// Comment markers used by Cisco IOS, AOS-CX (`!`), NX-OS style dumps (`#`)
/// and AOS-S (`;`)
const COMMENT_MARKERS: [char; 3] = ['!', '#', ';'];

/// Split decoded text into indexed raw lines
///
/// Splits on `\n` and strips a trailing `\r`. A trailing newline does not
/// produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<RawLine> {
    text.lines()
        .enumerate()
        .map(|(index, line)| RawLine {
            index,
            text: line.to_string(),
        })
        .collect()
}

/// Classify a single line in isolation
pub fn classify_line(line: RawLine) -> ClassifiedLine {
    let trimmed = line.text.trim_start();
    let indent_depth = line.text.chars().take_while(|c| c.is_whitespace()).count();

    let role = if trimmed.trim_end().is_empty() {
        LineRole::Blank
    } else if trimmed.starts_with(COMMENT_MARKERS) {
        LineRole::Comment
    } else if indent_depth == 0 {
        LineRole::TopLevel
    } else {
        LineRole::SubLevel
    };

    ClassifiedLine {
        index: line.index,
        text: line.text,
        role,
        indent_depth,
    }
}

/// Classify every line of `text`
///
/// Output length always equals the input line count. Indented lines that
/// appear before the first top-level line have nothing to belong to, so
/// they are promoted to `TopLevel`.
pub fn classify(text: &str) -> Vec<ClassifiedLine> {
    let mut seen_top_level = false;

    split_lines(text)
        .into_iter()
        .map(|raw| {
            let mut line = classify_line(raw);
            match line.role {
                LineRole::TopLevel => seen_top_level = true,
                LineRole::SubLevel if !seen_top_level => {
                    line.role = LineRole::TopLevel;
                    seen_top_level = true;
                }
                _ => {}
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(text: &str) -> Vec<LineRole> {
        classify(text).into_iter().map(|l| l.role).collect()
    }

    #[test]
    fn test_basic_roles() {
        let text = "hostname R1\ninterface Gi1/0/1\n description uplink\n!\n\n   \n# note";
        assert_eq!(
            roles(text),
            vec![
                LineRole::TopLevel,
                LineRole::TopLevel,
                LineRole::SubLevel,
                LineRole::Comment,
                LineRole::Blank,
                LineRole::Blank,
                LineRole::Comment,
            ]
        );
    }

    #[test]
    fn test_indent_depth_counts_tabs_as_one() {
        let lines = classify("router ospf 1\n\t\tnetwork 10.0.0.0 0.0.0.255 area 0\n   passive");
        assert_eq!(lines[0].indent_depth, 0);
        assert_eq!(lines[1].indent_depth, 2);
        assert_eq!(lines[2].indent_depth, 3);
    }

    #[test]
    fn test_indented_comment_is_comment() {
        let lines = classify("interface vlan1\n ! shut later\n shutdown");
        assert_eq!(lines[1].role, LineRole::Comment);
        assert_eq!(lines[1].indent_depth, 1);
    }

    #[test]
    fn test_line_count_preserved() {
        let text = "a\n\n b\n!\r\nc\n";
        let lines = classify(text);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3].text, "!");
        assert!(lines.iter().enumerate().all(|(i, l)| l.index == i));
    }

    #[test]
    fn test_orphan_indented_line_promoted() {
        let lines = classify("  version 16.9\nhostname sw1\n ip routing");
        assert_eq!(lines[0].role, LineRole::TopLevel);
        assert_eq!(lines[0].indent_depth, 2);
        assert_eq!(lines[2].role, LineRole::SubLevel);
    }

    #[test]
    fn test_empty_text() {
        assert!(classify("").is_empty());
    }
}
