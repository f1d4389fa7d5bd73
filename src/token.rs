//! Atomic tokenizer (C1): protect image and table regions from splitting.
//!
//! Two region classes get replaced by opaque `<<ATOMIC_{KIND}_{N}>>`
//! placeholders so every downstream size decision can treat them as
//! indivisible:
//!
//! - **Image region**: `【(图片主题|图片解析内容)…】`, matched non-greedily
//!   across newlines.
//! - **Table region**: one or more consecutive `| ... |` lines.
//!
//! Images are tokenized before tables (fixed recognition order), and both
//! classes draw their numeric suffix from the same monotonic counter —
//! splitting the counter by kind would change numbering without changing
//! meaning, so there is exactly one counter per call.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static IMAGE_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)【(?:图片主题|图片解析内容).*?】").expect("static regex is valid")
});

static TABLE_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^[ \t]*\|.*\|[ \t]*$\n?)+").expect("static regex is valid")
});

/// Ordered mapping from placeholder string to the original substring it
/// replaced. Append-only: built once by [`tokenize`] (or image-mode suffix
/// protection), then only ever read by the length oracle and the sub-block
/// splitter.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: HashMap<String, String>,
    next_id: usize,
}

impl TokenTable {
    /// An empty table with a fresh counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next placeholder id for `kind` (`"IMG"`, `"TAB"`, or
    /// `"PREVIEW_URL_SECTION"`) and record its replaced content.
    ///
    /// Returns the placeholder string to substitute in the document.
    pub fn insert(&mut self, kind: &str, original: impl Into<String>) -> String {
        let placeholder = format!("<<ATOMIC_{kind}_{}>>", self.next_id);
        self.next_id += 1;
        self.entries.insert(placeholder.clone(), original.into());
        placeholder
    }

    /// Look up the original content a placeholder stands for.
    #[must_use]
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.entries.get(placeholder).map(String::as_str)
    }
}

/// Matches any atomic placeholder, used by both the length oracle and the
/// sub-block splitter to find token boundaries.
pub static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<ATOMIC_\w+_\d+>>").expect("static regex is valid"));

/// Substitute every image region, then every table region, with a fresh
/// placeholder token. Recognition order is fixed: images first, then
/// tables, sharing one monotonic counter across both classes.
///
/// Tokenization is total — it never fails.
#[must_use]
pub fn tokenize(text: &str) -> (String, TokenTable) {
    let mut table = TokenTable::new();

    let after_images = replace_regions(text, &IMAGE_REGION, "IMG", &mut table);
    let after_tables = replace_regions(&after_images, &TABLE_REGION, "TAB", &mut table);

    (after_tables, table)
}

fn replace_regions(text: &str, pattern: &Regex, kind: &str, table: &mut TokenTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in pattern.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        out.push_str(&table.insert(kind, m.as_str()));
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}
