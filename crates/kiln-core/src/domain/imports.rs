//! Grouped-import normalization for generated Go sources.
//!
//! Only the first `import ( ... )` block of a file is touched. Entries are
//! trimmed, blank lines dropped, and the rest sorted by plain byte order
//! (`"net/http"` sorts before `"os"`, aliases sort by their alias). The block
//! is rewritten with one tab of indentation; every byte before `import (`
//! and after the closing `)` is preserved.

use crate::domain::error::DomainError;

pub const OPEN_DELIMITER: &str = "import (";
pub const CLOSE_DELIMITER: char = ')';
pub const INDENT: &str = "\t";

/// Sort the first grouped-import block in `source`.
///
/// Returns `Ok(None)` when the file has no such block, `Ok(Some(text))`
/// with the rewritten file otherwise (even if the block was already sorted).
///
/// # Errors
/// - `MalformedImportBlock` when `import (` is never closed. The line number
///   is 1-based.
pub fn sort_import_block(source: &str) -> Result<Option<String>, DomainError> {
    let Some(open) = find_open(source) else {
        return Ok(None);
    };

    let body_start = open + OPEN_DELIMITER.len();
    let Some(close) = find_close(source, body_start) else {
        let line = source[..open].matches('\n').count() + 1;
        return Err(DomainError::MalformedImportBlock { line });
    };

    let mut entries: Vec<&str> = source[body_start..close]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    entries.sort_unstable();

    let mut out = String::with_capacity(source.len());
    out.push_str(&source[..open]);
    out.push_str(OPEN_DELIMITER);
    out.push('\n');
    for entry in entries {
        out.push_str(INDENT);
        out.push_str(entry);
        out.push('\n');
    }
    out.push_str(&source[close..]);

    Ok(Some(out))
}

/// Byte offset of the first `import (` that starts a line (leading
/// whitespace allowed).
fn find_open(source: &str) -> Option<usize> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        if line[indent..].starts_with(OPEN_DELIMITER) {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Byte offset of the first `)` at or after `from` that is not inside a
/// `//` comment.
fn find_close(source: &str, from: usize) -> Option<usize> {
    let mut offset = from;
    for line in source[from..].split_inclusive('\n') {
        let code = line.find("//").map_or(line, |comment| &line[..comment]);
        if let Some(pos) = code.find(CLOSE_DELIMITER) {
            return Some(offset + pos);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_sorted_and_reindented() {
        let src = "package main\n\nimport (\n    \"b\"\n\t\"a\"   \n\n  \"c\"\n)\n\nfunc main() {}\n";
        let out = sort_import_block(src).unwrap().unwrap();
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"a\"\n\t\"b\"\n\t\"c\"\n)\n\nfunc main() {}\n"
        );
    }

    #[test]
    fn file_without_block_is_untouched() {
        let src = "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println() }\n";
        assert_eq!(sort_import_block(src).unwrap(), None);
    }

    #[test]
    fn unclosed_block_reports_its_line() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n";
        assert_eq!(
            sort_import_block(src).unwrap_err(),
            DomainError::MalformedImportBlock { line: 3 }
        );
    }

    #[test]
    fn parenthesis_in_a_comment_does_not_close_the_block() {
        let src = "package main\n\nimport (\n\t\"os\" // exit codes (see docs)\n\t\"fmt\"\n)\n\nfunc main() {}\n";
        let out = sort_import_block(src).unwrap().unwrap();
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\" // exit codes (see docs)\n)\n\nfunc main() {}\n"
        );
    }

    #[test]
    fn commented_parenthesis_alone_leaves_block_unclosed() {
        let src = "package main\n\nimport (\n\t\"fmt\" // see (docs)\n";
        assert_eq!(
            sort_import_block(src).unwrap_err(),
            DomainError::MalformedImportBlock { line: 3 }
        );
    }

    #[test]
    fn only_first_block_is_processed() {
        let src = "import (\n\t\"z\"\n\t\"y\"\n)\n\nimport (\n\t\"b\"\n\t\"a\"\n)\n";
        let out = sort_import_block(src).unwrap().unwrap();
        assert_eq!(
            out,
            "import (\n\t\"y\"\n\t\"z\"\n)\n\nimport (\n\t\"b\"\n\t\"a\"\n)\n"
        );
    }

    #[test]
    fn sorting_is_byte_order_not_locale() {
        let src = "import (\n\t\"net/http\"\n\t\"Zeta\"\n\t\"alpha\"\n)\n";
        let out = sort_import_block(src).unwrap().unwrap();
        assert_eq!(out, "import (\n\t\"Zeta\"\n\t\"alpha\"\n\t\"net/http\"\n)\n");
    }

    #[test]
    fn mention_inside_a_line_is_not_a_block() {
        let src = "// call import (x) later\npackage main\n";
        assert_eq!(sort_import_block(src).unwrap(), None);
    }

    #[test]
    fn empty_block_collapses() {
        let src = "import (\n\n   \n)\n";
        assert_eq!(sort_import_block(src).unwrap().unwrap(), "import (\n)\n");
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let src = "import (\n  \"b\"\n  \"a\"\n)\n";
        let once = sort_import_block(src).unwrap().unwrap();
        let twice = sort_import_block(&once).unwrap().unwrap();
        assert_eq!(once, twice);
    }
}
