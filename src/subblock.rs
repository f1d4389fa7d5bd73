//! Sub-block splitter (C7): the final pass turning one refined parent block
//! into its sub-blocks.
//!
//! The parent block is first split on placeholder boundaries. A token
//! fragment is emitted verbatim if its resolved content already fits
//! `s_max`; otherwise it is hashed out to the atomic splitter (C8) for its
//! kind. A plain fragment goes through the boundary splitter (C4) with the
//! sub-block ladder. Every piece, from whichever path, is then joined with
//! `sub_separator` — empty pieces (possible after trimming) are dropped.

use crate::atomic_split::{split_atomic_image, split_atomic_table};
use crate::boundary::{self, SUB_BLOCK_LADDER};
use crate::length::real_length;
use crate::token::{TokenTable, PLACEHOLDER};

/// Split `parent` into sub-blocks, each at or near `s_target` and bounded
/// (outside of atomic-region soft violations) by `s_max`, joined on emission
/// with `sub_separator`.
#[must_use]
pub fn split_into_sub_blocks(
    parent: &str,
    s_target: usize,
    s_max: usize,
    table: &TokenTable,
    sub_separator: &str,
) -> String {
    let mut pieces: Vec<String> = Vec::new();
    let mut last = 0;

    for m in PLACEHOLDER.find_iter(parent) {
        if m.start() > last {
            pieces.extend(split_plain_fragment(
                &parent[last..m.start()],
                s_target,
                s_max,
                table,
            ));
        }
        pieces.extend(split_token_fragment(m.as_str(), s_max, table));
        last = m.end();
    }
    if last < parent.len() {
        pieces.extend(split_plain_fragment(&parent[last..], s_target, s_max, table));
    }

    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sub_separator)
}

fn split_plain_fragment(
    fragment: &str,
    s_target: usize,
    s_max: usize,
    table: &TokenTable,
) -> Vec<String> {
    if fragment.is_empty() {
        return Vec::new();
    }
    boundary::split(fragment, s_target, s_max, table, SUB_BLOCK_LADDER)
}

fn split_token_fragment(placeholder: &str, s_max: usize, table: &TokenTable) -> Vec<String> {
    let Some(original) = table.get(placeholder) else {
        return vec![placeholder.to_string()];
    };

    if real_length(original, table) <= s_max {
        return vec![original.to_string()];
    }

    match placeholder_kind(placeholder) {
        Some("IMG") => split_atomic_image(original, s_max),
        Some("TAB") => split_atomic_table(original, s_max),
        _ => vec![original.to_string()],
    }
}

fn placeholder_kind(placeholder: &str) -> Option<&str> {
    placeholder
        .strip_prefix("<<ATOMIC_")?
        .rsplit_once('_')
        .map(|(kind, _id)| kind)
}
