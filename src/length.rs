//! Length oracle (C3): the one function every size-bounded decision calls.
//!
//! A tokenized string's `.chars().count()` understates its real size,
//! since a 4-character placeholder can stand in for a kilobyte table. Every
//! module that compares a span against a target or a max goes through
//! [`real_length`] instead, which resolves each placeholder against the
//! token table before counting.
//!
//! Length is measured in Unicode scalar values, not bytes — matching the
//! data model's "Document is a sequence of Unicode scalar values".

use crate::token::{TokenTable, PLACEHOLDER};

/// The real length of `text`: the sum of each non-token run's character
/// count plus, for each placeholder found, the character count of its
/// resolved content (or the placeholder's own length, if the table has no
/// entry for it — this should not happen for a table built by
/// [`crate::token::tokenize`], but a caller-constructed table could be
/// incomplete).
#[must_use]
pub fn real_length(text: &str, table: &TokenTable) -> usize {
    let mut length = 0;
    let mut last = 0;

    for m in PLACEHOLDER.find_iter(text) {
        length += text[last..m.start()].chars().count();
        length += match table.get(m.as_str()) {
            Some(original) => original.chars().count(),
            None => m.as_str().chars().count(),
        };
        last = m.end();
    }
    length += text[last..].chars().count();
    length
}
