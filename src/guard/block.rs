//! Marker-delimited blocks inside an access-control document.
//!
//! A block starts at a line equal to its marker comment and ends at the
//! first following [`CLOSING_LINE`]. Lines are compared after trimming so
//! indentation and `\r\n` endings do not hide a block. Rewrites keep the
//! document's own line ending.

/// Line closing every managed block
pub const CLOSING_LINE: &str = "</Files>";

/// Inclusive line range of one block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

/// Result of looking up a marker in a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockScan {
    Absent,
    Found(Vec<BlockSpan>),
    /// Marker at `line` has no closing line before the next same marker
    /// or the end of the document
    Malformed { line: usize },
}

/// Locate every block opened by `marker`
pub fn scan_blocks(document: &str, marker: &str) -> BlockScan {
    let lines: Vec<&str> = document.lines().collect();
    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        if lines[idx].trim() != marker {
            idx += 1;
            continue;
        }
        let start = idx;
        let mut end = None;
        for (offset, line) in lines[start + 1..].iter().enumerate() {
            let line = line.trim();
            if line == marker {
                break;
            }
            if line == CLOSING_LINE {
                end = Some(start + 1 + offset);
                break;
            }
        }
        let Some(end) = end else {
            return BlockScan::Malformed { line: start };
        };
        spans.push(BlockSpan { start, end });
        idx = end + 1;
    }
    if spans.is_empty() {
        BlockScan::Absent
    } else {
        BlockScan::Found(spans)
    }
}

/// Line ending used by `document`, `\r\n` when its first line ends that way
pub fn line_ending(document: &str) -> &'static str {
    match document.find('\n') {
        Some(idx) if document[..idx].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Append `block` after a blank separator line
pub fn append_block(document: &str, block: &str) -> String {
    let eol = line_ending(document);
    let mut out = String::with_capacity(document.len() + block.len() * 2 + 4);
    out.push_str(document);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    out.push_str(eol);
    for line in block.lines() {
        out.push_str(line);
        out.push_str(eol);
    }
    out
}

/// Drop the given spans and tidy up the blank lines left behind
pub fn remove_blocks(document: &str, spans: &[BlockSpan]) -> String {
    let kept = document
        .lines()
        .enumerate()
        .filter(|(idx, _)| !spans.iter().any(|s| (s.start..=s.end).contains(idx)))
        .map(|(_, line)| line);
    collapse_blank_lines(kept, line_ending(document))
}

fn collapse_blank_lines<'a>(lines: impl Iterator<Item = &'a str>, eol: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && out.last().is_none_or(|prev| prev.trim().is_empty()) {
            continue;
        }
        out.push(if blank { "" } else { line });
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    if out.is_empty() {
        return String::new();
    }
    let mut joined = out.join(eol);
    joined.push_str(eol);
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "# Protect debug.log";
    const BLOCK: &str = "# Protect debug.log\n<Files \"debug.log\">\n    Require valid-user\n</Files>\n";

    #[test]
    fn scan_empty_document() {
        assert_eq!(BlockScan::Absent, scan_blocks("", MARKER));
    }

    #[test]
    fn scan_finds_exact_span() {
        let doc = format!("RewriteEngine On\n\n{BLOCK}# after\n");
        assert_eq!(
            BlockScan::Found(vec![BlockSpan { start: 2, end: 5 }]),
            scan_blocks(&doc, MARKER)
        );
    }

    #[test]
    fn marker_in_other_text_is_ignored() {
        let doc = "# Protect debug.log files elsewhere\n</Files>\n";
        assert_eq!(BlockScan::Absent, scan_blocks(doc, MARKER));
    }

    #[test]
    fn marker_without_closing_line_is_malformed() {
        let doc = "a\n# Protect debug.log\n<Files \"debug.log\">\n";
        assert_eq!(BlockScan::Malformed { line: 1 }, scan_blocks(doc, MARKER));
    }

    #[test]
    fn repeated_marker_before_closing_is_malformed() {
        let doc = format!("# Protect debug.log\n{BLOCK}");
        assert_eq!(BlockScan::Malformed { line: 0 }, scan_blocks(&doc, MARKER));
    }

    #[test]
    fn append_separates_with_blank_line() {
        assert_eq!(format!("a\n\n{BLOCK}"), append_block("a", BLOCK));
        assert_eq!(format!("a\n\n{BLOCK}"), append_block("a\n", BLOCK));
        assert_eq!(format!("\n{BLOCK}"), append_block("", BLOCK));
    }

    #[test]
    fn remove_restores_surrounding_text() {
        let original = "# BEGIN WordPress\nRewriteEngine On\n# END WordPress\n";
        let doc = append_block(original, BLOCK);
        let BlockScan::Found(spans) = scan_blocks(&doc, MARKER) else {
            panic!("block not found");
        };
        assert_eq!(original, remove_blocks(&doc, &spans));
    }

    #[test]
    fn remove_collapses_blank_runs() {
        let doc = format!("a\n\n\n{BLOCK}\n\n\nb\n\n");
        let BlockScan::Found(spans) = scan_blocks(&doc, MARKER) else {
            panic!("block not found");
        };
        let out = remove_blocks(&doc, &spans);
        assert_eq!("a\n\nb\n", out);
        assert!(!out.contains(MARKER));
    }

    #[test]
    fn line_ending_follows_first_line() {
        assert_eq!("\n", line_ending(""));
        assert_eq!("\n", line_ending("a\nb\r\n"));
        assert_eq!("\r\n", line_ending("a\r\nb\n"));
    }

    #[test]
    fn append_uses_document_line_ending() {
        let out = append_block("a\r\n", BLOCK);
        assert_eq!(format!("a\r\n\r\n{}", BLOCK.replace('\n', "\r\n")), out);
    }

    #[test]
    fn remove_every_duplicate() {
        let doc = format!("{BLOCK}\n{BLOCK}");
        let BlockScan::Found(spans) = scan_blocks(&doc, MARKER) else {
            panic!("block not found");
        };
        assert_eq!(2, spans.len());
        assert_eq!("", remove_blocks(&doc, &spans));
    }
}
