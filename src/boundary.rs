//! Recursive boundary splitter (C4): the one splitting algorithm behind
//! both parent refinement (C6) and sub-block splitting (C7).
//!
//! Given a ladder of separators from coarsest to finest, try the head
//! separator first: split on it, greedily re-accumulate pieces up to
//! `target`, and only recurse into the remaining ladder for pieces that
//! still exceed `max`. This is the same shape as the old `RecursiveChunker`
//! here (`split_recursive`/`force_split`), generalized two ways: length is
//! measured through the token table (a placeholder's *real* size, not its
//! four-character footprint), and accumulation now has a separate target
//! from the hard max, so a chunk can run past `target` and stop at a
//! separator instead of always hugging the limit.
//!
//! ## Ladders
//!
//! - Parent refinement: `["\n## ", "\n### ", "\n#### ", "\n\n", "\n", " "]`
//! - Sub-block splitting: `["\n\n", "\n", "。", "！", "？", "；", ";", " ", ""]`
//!
//! The trailing `""` in the sub-block ladder is not an ordinary separator —
//! see [`split`]'s handling of it.

use crate::length::real_length;
use crate::token::TokenTable;

/// Parent-refinement ladder (spec §4.4): heading levels, then paragraph,
/// line, and word boundaries.
pub const PARENT_LADDER: &[&str] = &["\n## ", "\n### ", "\n#### ", "\n\n", "\n", " "];

/// Sub-block ladder (spec §4.4): paragraph and line boundaries, then
/// Chinese and ASCII sentence punctuation, then words, then a force-cut.
pub const SUB_BLOCK_LADDER: &[&str] = &["\n\n", "\n", "。", "！", "？", "；", ";", " ", ""];

/// Split `text` into pieces whose real length is at most `max`, preferring
/// to break at the coarsest separator in `ladder` that keeps pieces close
/// to `target`.
///
/// If `real_length(text) <= max` already, returns `[text]` unchanged. If
/// the ladder is exhausted before a piece fits, that piece is returned
/// intact (soft size-bound violation, spec §7) rather than mangled.
#[must_use]
pub fn split(
    text: &str,
    target: usize,
    max: usize,
    table: &TokenTable,
    ladder: &[&str],
) -> Vec<String> {
    if real_length(text, table) <= max {
        return vec![text.to_string()];
    }

    let Some((sep, rest)) = ladder.split_first() else {
        return vec![text.to_string()];
    };

    if sep.is_empty() {
        return force_cut(text, target.max(1));
    }

    let accumulated = split_and_accumulate(text, sep, target, table);

    let mut result = Vec::with_capacity(accumulated.len());
    for piece in accumulated {
        if real_length(&piece, table) > max {
            result.extend(split(&piece, target, max, table, rest));
        } else {
            result.push(piece);
        }
    }
    result
}

/// Split `text` on `sep`, reattaching the separator to the piece that
/// precedes it (so concatenating the results reproduces `text` exactly),
/// then greedily pack pieces into buffers no longer than `target`.
fn split_and_accumulate(text: &str, sep: &str, target: usize, table: &TokenTable) -> Vec<String> {
    let segments: Vec<&str> = text.split(sep).collect();
    let last = segments.len().saturating_sub(1);

    let mut result = Vec::new();
    let mut buffer = String::new();

    for (i, segment) in segments.into_iter().enumerate() {
        let piece = if i < last {
            format!("{segment}{sep}")
        } else {
            segment.to_string()
        };
        if piece.is_empty() {
            continue;
        }

        if buffer.is_empty() {
            buffer = piece;
        } else {
            let candidate_len = real_length(&format!("{buffer}{piece}"), table);
            if candidate_len <= target {
                buffer.push_str(&piece);
            } else {
                result.push(std::mem::take(&mut buffer));
                buffer = piece;
            }
        }
    }
    if !buffer.is_empty() {
        result.push(buffer);
    }
    result
}

/// The empty-separator rung: force-cut every `target` Unicode scalar
/// values. This is the ladder's terminal entry — whatever it produces is
/// returned as-is, no further recursion.
fn force_cut(text: &str, target: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(target)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
