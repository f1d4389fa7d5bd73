//! Coarse partitioner (C5) and parent refiner (C6).
//!
//! C5 splits the document at top-level heading boundaries and greedily
//! merges the resulting segments back together up to `p_target`. C6 then
//! checks each merged segment against the hard `p_max` ceiling and, for
//! segments over it, hands off to the boundary splitter (C4) with the
//! parent ladder. A segment that was split because it held a heading whose
//! `#` got orphaned from its title gets repaired before being kept.

use std::sync::LazyLock;

use regex::Regex;

use crate::boundary::{self, PARENT_LADDER};
use crate::length::real_length;
use crate::token::TokenTable;

static TOP_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# ").expect("static regex"));

/// Split `text` at every top-level heading boundary (`^# ` or `\n# `),
/// keeping the heading with the block that follows it, then greedily
/// concatenate adjacent segments while the running real length stays at or
/// under `merge_limit`.
///
/// Content with no `# ` heading at all produces a single segment equal to
/// the whole input (spec §9 Open Questions).
#[must_use]
pub fn coarse_partition(text: &str, merge_limit: usize, table: &TokenTable) -> Vec<String> {
    let boundaries = heading_boundaries(text);

    let mut merged = Vec::new();
    let mut current = String::new();

    for window in boundaries.windows(2) {
        let part = &text[window[0]..window[1]];
        if part.is_empty() {
            continue;
        }

        let candidate_len = real_length(&format!("{current}{part}"), table);
        if candidate_len <= merge_limit {
            current.push_str(part);
        } else {
            if !current.is_empty() {
                merged.push(std::mem::take(&mut current));
            }
            current = part.to_string();
        }
    }
    if !current.is_empty() {
        merged.push(current);
    }

    merged
}

/// Byte offsets bounding each coarse segment, including the document's
/// start and end. A heading match at byte `pos` (the position of `#`) puts
/// its boundary at `pos`, or at the preceding newline when the heading is
/// not the very first line — the newline travels with the heading into the
/// following segment, matching the lookahead-split behavior this mirrors.
fn heading_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries = vec![0usize];
    for m in TOP_HEADING.find_iter(text) {
        let pos = m.start();
        boundaries.push(if pos == 0 { 0 } else { pos - 1 });
    }
    boundaries.push(text.len());
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries
}

/// Refine one coarse segment: leave it untouched if it already fits
/// `p_max`, otherwise split it with the parent ladder.
///
/// Broken-header repair (spec §4.6) is *not* applied here — a stray `#`
/// orphaned at the tail of this segment's last refined piece may need to
/// merge into the next coarse segment's first piece, which this function
/// can't see. Callers must run [`merge_broken_headers`] once over the full,
/// concatenated sequence of parent blocks after every coarse segment has
/// been refined.
#[must_use]
pub fn refine_parent_block(
    block: &str,
    p_target: usize,
    p_max: usize,
    table: &TokenTable,
) -> Vec<String> {
    if real_length(block, table) <= p_max {
        return vec![block.to_string()];
    }

    boundary::split(block, p_target, p_max, table, PARENT_LADDER)
}

/// If a fragment's last non-empty line is nothing but `#` characters — a
/// heading marker that got separated from its title by a boundary split —
/// merge it into the following fragment instead of emitting it bare.
///
/// Runs once over the complete sequence of refined parent blocks, across
/// coarse-segment boundaries, since the orphaned marker and its title can
/// land in different coarse segments.
#[must_use]
pub fn merge_broken_headers(blocks: Vec<String>) -> Vec<String> {
    let mut fixed = Vec::with_capacity(blocks.len());
    let mut blocks = blocks;
    let mut idx = 0;

    while idx < blocks.len() {
        if idx + 1 < blocks.len() && is_bare_heading_marker(&blocks[idx]) {
            let merged = blocks[idx].clone() + &blocks[idx + 1];
            blocks[idx + 1] = merged;
            idx += 1;
            continue;
        }
        fixed.push(blocks[idx].clone());
        idx += 1;
    }

    fixed
}

fn is_bare_heading_marker(block: &str) -> bool {
    match block.trim_end_matches(['\r', '\n']).lines().next_back() {
        Some(last_line) => {
            let trimmed = last_line.trim();
            !trimmed.is_empty() && trimmed.chars().all(|c| c == '#')
        }
        None => false,
    }
}
