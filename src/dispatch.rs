//! Mode dispatcher (C9): the crate's public entry point.
//!
//! Parses the caller's mode string into a [`Mode`], runs the matching
//! pipeline, and repairs headings whose `#` ended up stranded against the
//! previous parent's tail by a boundary split — applied unconditionally to
//! every mode's output, matching the original service's `split()` wrapper.

use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::html_table::convert_html_tables;
use crate::partition::{coarse_partition, merge_broken_headers, refine_parent_block};
use crate::size::SizeEnvelope;
use crate::subblock::split_into_sub_blocks;
use crate::token::{tokenize, TokenTable};

const IMAGE_LINK_LABEL: &str = "\n图片连接：";

/// Which of the three pipelines a request runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain prose: heading-based coarse partition, then boundary refinement.
    Prose,
    /// Markdown table: header/separator detection and row streaming.
    Table,
    /// Image description with a mandatory, unsplittable preview-URL suffix.
    Image,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" | "pdf_text" => Ok(Mode::Prose),
            "table" | "md_table" | "markdown" => Ok(Mode::Table),
            "image" | "img" | "text_with_preview" | "preview" => Ok(Mode::Image),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

impl TryFrom<&str> for Mode {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

/// A chunking request. Defaults mirror the external interface's: a
/// 1024/512 size pair, the four-newline/three-newline separator pair, no
/// preview URL, and an accepted-but-unused overlap.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub mode: Mode,
    pub content: String,
    pub parent_block_size: usize,
    pub sub_block_size: usize,
    pub parent_separator: String,
    pub sub_separator: String,
    pub preview_url: String,
    /// Accepted for pipeline compatibility; never read by the core.
    pub overlap: usize,
}

impl ChunkRequest {
    /// Start a request with every field at its spec-defined default except
    /// `mode` and `content`, which every call must supply.
    #[must_use]
    pub fn new(mode: Mode, content: impl Into<String>) -> Self {
        Self {
            mode,
            content: content.into(),
            parent_block_size: 1024,
            sub_block_size: 512,
            parent_separator: "\n\n\n\n".to_string(),
            sub_separator: "\n\n\n".to_string(),
            preview_url: String::new(),
            overlap: 0,
        }
    }

    #[must_use]
    pub fn with_parent_block_size(mut self, size: usize) -> Self {
        self.parent_block_size = size;
        self
    }

    #[must_use]
    pub fn with_sub_block_size(mut self, size: usize) -> Self {
        self.sub_block_size = size;
        self
    }

    #[must_use]
    pub fn with_parent_separator(mut self, separator: impl Into<String>) -> Self {
        self.parent_separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_sub_separator(mut self, separator: impl Into<String>) -> Self {
        self.sub_separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_preview_url(mut self, preview_url: impl Into<String>) -> Self {
        self.preview_url = preview_url.into();
        self
    }

    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }
}

/// The result of a chunking call: the concatenation of every emitted
/// parent block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    pub result: String,
}

/// Chunk `request.content` according to `request.mode`.
///
/// # Errors
///
/// Returns [`Error::UnknownMode`] if `request.mode`'s source string failed
/// to parse (callers building `Mode` directly cannot hit this), or
/// [`Error::MissingPreviewUrl`] if image mode was requested with an empty
/// `preview_url`.
pub fn chunk(request: ChunkRequest) -> Result<ChunkOutput> {
    info!(
        mode = ?request.mode,
        content_len = request.content.chars().count(),
        "chunk() invoked"
    );

    let result = match request.mode {
        Mode::Prose => {
            let text = prose_pipeline(
                &request.content,
                request.parent_block_size,
                request.sub_block_size,
                &request.sub_separator,
            );
            join_parents(text, &request.parent_separator)
        }
        Mode::Table => table_pipeline(
            &request.content,
            request.parent_block_size,
            request.sub_block_size,
            &request.parent_separator,
            &request.sub_separator,
        )
        .unwrap_or_else(|| {
            let text = prose_pipeline(
                &request.content,
                request.parent_block_size,
                request.sub_block_size,
                &request.sub_separator,
            );
            join_parents(text, &request.parent_separator)
        }),
        Mode::Image => {
            if request.preview_url.is_empty() {
                return Err(Error::MissingPreviewUrl);
            }
            image_pipeline(
                &request.content,
                request.parent_block_size,
                request.sub_block_size,
                &request.parent_separator,
                &request.sub_separator,
                &request.preview_url,
            )
        }
    };

    // The original service's `split()` wrapper runs heading-adjacency
    // repair over its return value regardless of mode (spec's
    // `text_splitter_service.py`), so this runs unconditionally too —
    // table-mode output always ends rows in `|` and image-mode output
    // never contains a bare `parent_separator`-adjacent `#`, so the
    // rewrite is a no-op there, but running it keeps this wrapper
    // faithful to the original rather than relying on that being true.
    let result = apply_heading_adjacency_fixup(&result, &request.parent_separator);

    Ok(ChunkOutput { result })
}

/// Prose pipeline (C2→C1→C5→C6→C7): returns the already parent_separator-
/// joined text, ready for the heading-adjacency fix-up.
fn prose_pipeline(
    content: &str,
    parent_block_size: usize,
    sub_block_size: usize,
    sub_separator: &str,
) -> Vec<String> {
    let envelope = SizeEnvelope::new(parent_block_size, sub_block_size);

    let converted = convert_html_tables(content);
    let (tokenized, table) = tokenize(&converted);
    debug!(segments = "tokenized", len = tokenized.chars().count());

    let coarse = coarse_partition(&tokenized, envelope.p_target(), &table);
    debug!(coarse_segments = coarse.len());

    let mut parent_blocks = Vec::new();
    for block in coarse {
        parent_blocks.extend(refine_parent_block(
            &block,
            envelope.p_target(),
            envelope.p_max(),
            &table,
        ));
    }
    let parent_blocks = merge_broken_headers(parent_blocks);
    debug!(parent_blocks = parent_blocks.len());

    parent_blocks
        .into_iter()
        .filter_map(|p_block| {
            let joined = split_into_sub_blocks(&p_block, envelope.s_target(), envelope.s_max(), &table, sub_separator);
            (!joined.is_empty()).then_some(joined)
        })
        .collect()
}

fn join_parents(parent_blocks: Vec<String>, parent_separator: &str) -> String {
    parent_blocks.join(parent_separator)
}

/// Rewrite `#{parent_separator}<title>` to `{parent_separator}# <title>` —
/// a heading marker that drifted onto the previous block's trailing edge
/// during boundary splitting gets reattached to its own line.
///
/// Runs on the already-joined output of any mode, mirroring the original
/// service's `split()` wrapper, which applies this repair unconditionally
/// rather than only for prose.
fn apply_heading_adjacency_fixup(joined: &str, parent_separator: &str) -> String {
    if parent_separator.is_empty() {
        return joined.to_string();
    }

    let pattern = format!(r"#\s*{}\s*([^\n]+)", regex::escape(parent_separator));
    let Ok(re) = regex::Regex::new(&pattern) else {
        return joined.to_string();
    };
    re.replace_all(joined, |caps: &regex::Captures<'_>| {
        format!("{parent_separator}# {}", &caps[1])
    })
    .into_owned()
}

/// Markdown-table pipeline. Returns `None` when no Markdown header/
/// separator pair is found, signaling a prose-pipeline fallback.
fn table_pipeline(
    content: &str,
    parent_block_size: usize,
    sub_block_size: usize,
    parent_separator: &str,
    sub_separator: &str,
) -> Option<String> {
    let converted = convert_html_tables(content);
    let lines: Vec<&str> = converted.split('\n').collect();

    let (header_idx, sep_idx) = find_table_header(&lines)?;

    let prefix = lines[..header_idx].join("\n");
    let header_str = format!("{}\n{}", lines[header_idx], lines[sep_idx]);
    let header_len = header_str.chars().count();

    let data_rows: Vec<&str> = lines[sep_idx + 1..]
        .iter()
        .copied()
        .filter(|line| line.trim_start().starts_with('|'))
        .collect();

    let parent_groups = stream_rows_into_parents(
        &data_rows,
        header_len,
        parent_block_size,
        sub_block_size,
        sub_separator,
    );

    let mut blocks = Vec::with_capacity(parent_groups.len());
    for (i, subs) in parent_groups.iter().enumerate() {
        let body = subs.join(sub_separator);
        let mut block = if subs.is_empty() {
            header_str.clone()
        } else {
            format!("{header_str}\n{body}")
        };
        if i == 0 && !prefix.trim().is_empty() {
            block = format!("{prefix}\n{block}");
        }
        blocks.push(block);
    }

    Some(blocks.join(parent_separator))
}

/// Find the first `(header, separator)` line-index pair: a `|`-prefixed
/// line immediately followed by a Markdown separator row.
fn find_table_header(lines: &[&str]) -> Option<(usize, usize)> {
    for i in 0..lines.len().saturating_sub(1) {
        if lines[i].trim_start().starts_with('|') && is_separator_row(lines[i + 1]) {
            return Some((i, i + 1));
        }
    }
    None
}

/// A Markdown separator row is a `|`-starting line drawn entirely from
/// `{'|', '-', ' ', ':'}` with at least one dash — the original service's
/// character-subset check, looser than the two-dash-minimum cell pattern
/// a stricter Markdown parser would require (spec.md's literal table
/// scenario uses single-dash cells, so the looser check is authoritative).
fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed.contains('-')
        && trimmed.chars().all(|c| matches!(c, '|' | '-' | ' ' | ':'))
}

fn row_group_len(rows: &[&str]) -> usize {
    if rows.is_empty() {
        return 0;
    }
    rows.iter().map(|r| r.chars().count()).sum::<usize>() + rows.len() - 1
}

fn parent_group_len(subs: &[String], header_len: usize, sub_separator: &str) -> usize {
    if subs.is_empty() {
        return header_len;
    }
    let sep_len = sub_separator.chars().count();
    header_len + 1 + subs.iter().map(|s| s.chars().count()).sum::<usize>() + sep_len * subs.len().saturating_sub(1)
}

fn flush_sub<'a>(sub_rows: &mut Vec<&'a str>, parent_subs: &mut Vec<String>) {
    if !sub_rows.is_empty() {
        parent_subs.push(sub_rows.join("\n"));
        sub_rows.clear();
    }
}

fn flush_parent(parent_subs: &mut Vec<String>, parents: &mut Vec<Vec<String>>) {
    if !parent_subs.is_empty() {
        parents.push(std::mem::take(parent_subs));
    }
}

/// Greedily group table rows into sub-blocks, then sub-blocks into parent
/// blocks, honoring the header-space reservation on each parent's first
/// sub-block.
fn stream_rows_into_parents<'a>(
    data_rows: &[&'a str],
    header_len: usize,
    parent_block_size: usize,
    sub_block_size: usize,
    sub_separator: &str,
) -> Vec<Vec<String>> {
    let mut parents: Vec<Vec<String>> = Vec::new();
    let mut parent_subs: Vec<String> = Vec::new();
    let mut sub_rows: Vec<&str> = Vec::new();

    for &row in data_rows {
        let mut trial_rows = sub_rows.clone();
        trial_rows.push(row);
        let trial_len = row_group_len(&trial_rows);

        let is_first_sub = parent_subs.is_empty();
        let effective_limit = if is_first_sub {
            sub_block_size.saturating_sub(header_len + 1)
        } else {
            sub_block_size
        };

        if trial_len <= effective_limit {
            let mut trial_parent = parent_subs.clone();
            trial_parent.push(trial_rows.join("\n"));
            if parent_group_len(&trial_parent, header_len, sub_separator) <= parent_block_size {
                sub_rows = trial_rows;
                continue;
            }

            flush_sub(&mut sub_rows, &mut parent_subs);
            flush_parent(&mut parent_subs, &mut parents);
            sub_rows = vec![row];
        } else if sub_rows.is_empty() {
            sub_rows.push(row);
        } else {
            flush_sub(&mut sub_rows, &mut parent_subs);
            let mut trial_parent = parent_subs.clone();
            trial_parent.push(row.to_string());
            if parent_group_len(&trial_parent, header_len, sub_separator) > parent_block_size {
                flush_parent(&mut parent_subs, &mut parents);
            }
            sub_rows = vec![row];
        }
    }

    flush_sub(&mut sub_rows, &mut parent_subs);
    flush_parent(&mut parent_subs, &mut parents);

    parents
}

/// Image pipeline: truncate `content` so `content + preview suffix` fits
/// `parent_block_size`, then protect the suffix as a single atomic token
/// before running C7 on the combined text.
fn image_pipeline(
    content: &str,
    parent_block_size: usize,
    sub_block_size: usize,
    parent_separator: &str,
    sub_separator: &str,
    preview_url: &str,
) -> String {
    let url_suffix_for_calc = format!("{IMAGE_LINK_LABEL}{preview_url}");
    let current_len = content.chars().count() + url_suffix_for_calc.chars().count();

    let truncated = if current_len > parent_block_size {
        let excess = current_len - parent_block_size;
        let char_count = content.chars().count();
        if excess < char_count {
            content.chars().take(char_count - excess).collect::<String>()
        } else {
            String::new()
        }
    } else {
        content.to_string()
    };

    let protected_suffix = format!("{IMAGE_LINK_LABEL}{preview_url}{parent_separator}");

    let mut table = TokenTable::new();
    let token_key = table.insert("PREVIEW_URL_SECTION", protected_suffix);
    let text_with_token = format!("{truncated}{token_key}");

    let envelope = SizeEnvelope::new(parent_block_size, sub_block_size);
    split_into_sub_blocks(&text_with_token, envelope.s_target(), envelope.s_max(), &table, sub_separator)
}
