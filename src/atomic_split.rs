//! Atomic region splitters (C8): the fallback used when a tokenized image
//! or table is itself larger than `s_max` and cannot be kept as a single
//! sub-block.
//!
//! Both splitters trade strict size bounds for a different invariant —
//! never split a table row, never split an image description line — so
//! their output can itself occasionally run over `s_max` by a few
//! characters (same soft-bound contract as the boundary splitter).

const IMAGE_SEGMENT_PREFIX: &str = "【图片内容(分段):";
const IMAGE_CONTINUATION_PREFIX: &str = "【图片内容(续):";

/// Split an oversized image region, line by line, into a sequence of
/// `【图片内容(分段):...】` / `【图片内容(续):...】` fragments, each at or
/// near `limit` Unicode scalar values.
///
/// `content` is the full region including its outer `【`/`】` delimiters.
#[must_use]
pub fn split_atomic_image(content: &str, limit: usize) -> Vec<String> {
    let inner = strip_outer_brackets(content);

    let mut chunks = Vec::new();
    let mut current = IMAGE_SEGMENT_PREFIX.to_string();

    for line in inner.split('\n') {
        if current.chars().count() + line.chars().count() + 1 > limit {
            current.push('】');
            chunks.push(current);
            current = format!("{IMAGE_CONTINUATION_PREFIX}{line}");
        } else {
            current.push('\n');
            current.push_str(line);
        }
    }
    current.push('】');
    chunks.push(current);

    chunks
}

fn strip_outer_brackets(content: &str) -> &str {
    let without_open = content.strip_prefix('【').unwrap_or(content);
    without_open.strip_suffix('】').unwrap_or(without_open)
}

/// Split an oversized Markdown table, row by row, replicating the header
/// and separator row into every emitted table. Rows that individually
/// exceed `limit` are kept whole rather than split mid-row.
#[must_use]
pub fn split_atomic_table(content: &str, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = content.trim().split('\n').collect();
    if lines.len() < 2 {
        return vec![content.to_string()];
    }

    let header = lines[0];
    let separator = lines[1];
    let rows = &lines[2..];

    let base_len = header.chars().count() + separator.chars().count() + 2;

    let mut chunks = Vec::new();
    let mut current_rows: Vec<&str> = Vec::new();
    let mut current_len = base_len;

    for &row in rows {
        let row_len = row.chars().count();
        if current_len + row_len + 1 > limit && !current_rows.is_empty() {
            chunks.push(assemble_table(header, separator, &current_rows));
            current_rows = vec![row];
            current_len = base_len + row_len + 1;
        } else {
            current_rows.push(row);
            current_len += row_len + 1;
        }
    }
    if !current_rows.is_empty() {
        chunks.push(assemble_table(header, separator, &current_rows));
    }

    chunks
}

fn assemble_table(header: &str, separator: &str, rows: &[&str]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header);
    lines.push(separator);
    lines.extend_from_slice(rows);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_split_closes_every_fragment() {
        let content = format!("【图片主题：{}\n{}\n{}】", "a".repeat(20), "b".repeat(20), "c".repeat(20));
        let chunks = split_atomic_image(&content, 30);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.starts_with('【') && c.ends_with('】'));
        }
    }

    #[test]
    fn test_image_split_uses_continuation_prefix_after_first() {
        let content = "【图片主题：line one\nline two\nline three】";
        let chunks = split_atomic_image(content, 15);
        assert!(chunks[1].starts_with(IMAGE_CONTINUATION_PREFIX));
    }

    #[test]
    fn test_table_split_replicates_header_and_separator() {
        let table = "| a | b |\n| - | - |\n| 1 | 2 |\n| 3 | 4 |\n| 5 | 6 |";
        let chunks = split_atomic_table(table, 25);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.starts_with("| a | b |\n| - | - |"));
        }
    }

    #[test]
    fn test_table_with_no_rows_returns_header_only() {
        let table = "| a | b |\n| - | - |";
        let chunks = split_atomic_table(table, 100);
        assert_eq!(chunks, vec![table.to_string()]);
    }

    #[test]
    fn test_oversized_single_row_is_kept_intact() {
        let row = "x".repeat(100);
        let table = format!("| a |\n| - |\n| {row} |");
        let chunks = split_atomic_table(&table, 20);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains(&row));
    }
}
