//! HTML table converter (C2): rewrite inline `<table>` markup as Markdown.
//!
//! Runs before tokenization so that an HTML table ends up protected by the
//! same `| ... |` atomic-region pattern as a table the author wrote in
//! Markdown directly.

use std::sync::LazyLock;

use regex::Regex;

static TABLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table>").expect("static regex"));
static ROW_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("static regex"));
static CELL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<t(?:d|h)\b[^>]*>(.*?)</t(?:d|h)>").expect("static regex"));
static INNER_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

/// Convert every `<table>…</table>` in `text` into canonical Markdown-table
/// form. Tables with no recoverable rows or zero columns are left as the
/// original HTML.
#[must_use]
pub fn convert_html_tables(text: &str) -> String {
    TABLE_TAG
        .replace_all(text, |caps: &regex::Captures<'_>| {
            convert_one(&caps[0], &caps[1])
        })
        .into_owned()
}

fn convert_one(whole_match: &str, table_inner: &str) -> String {
    let rows: Vec<Vec<String>> = ROW_TAG
        .captures_iter(table_inner)
        .map(|row_caps| {
            CELL_TAG
                .captures_iter(&row_caps[1])
                .map(|cell_caps| clean_cell(&cell_caps[1]))
                .collect::<Vec<_>>()
        })
        .filter(|row: &Vec<String>| !row.is_empty())
        .collect();

    if rows.is_empty() {
        return whole_match.to_string();
    }

    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    if col_count == 0 {
        return whole_match.to_string();
    }

    let padded: Vec<Vec<String>> = rows
        .into_iter()
        .map(|mut row| {
            row.resize(col_count, String::new());
            row
        })
        .collect();

    let header = &padded[0];
    let data_rows = &padded[1..];

    let header_line = format!("| {} |", header.join(" | "));
    let sep_line = format!("| {} |", vec!["----------"; col_count].join(" | "));
    let data_lines: Vec<String> = data_rows
        .iter()
        .map(|row| format!("| {} |", row.join(" | ")))
        .collect();

    let mut md = vec![header_line, sep_line];
    md.extend(data_lines);

    format!("\n\n{}\n\n", md.join("\n"))
}

fn clean_cell(raw: &str) -> String {
    let stripped = INNER_TAG.replace_all(raw, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.trim().replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_simple_table() {
        let html = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
        let md = convert_html_tables(html);
        assert!(md.contains("| A | B |"));
        assert!(md.contains("| ---------- | ---------- |"));
        assert!(md.contains("| 1 | 2 |"));
        assert!(md.starts_with("\n\n"));
        assert!(md.ends_with("\n\n"));
    }

    #[test]
    fn test_decodes_entities_and_escapes_pipes() {
        let html = "<table><tr><td>A &amp; B | C</td></tr></table>";
        let md = convert_html_tables(html);
        assert!(md.contains("A & B \\| C"));
    }

    #[test]
    fn test_pads_ragged_rows() {
        let html = "<table><tr><td>h1</td><td>h2</td></tr><tr><td>only</td></tr></table>";
        let md = convert_html_tables(html);
        assert!(md.contains("| only |  |"));
    }

    #[test]
    fn test_leaves_rowless_table_untouched() {
        let html = "<table><caption>empty</caption></table>";
        assert_eq!(convert_html_tables(html), html);
    }

    #[test]
    fn test_untouched_text_passes_through() {
        let text = "no tables here, just prose.";
        assert_eq!(convert_html_tables(text), text);
    }
}
