//! Property-based tests for the hierarchical chunker (spec §8 "Universal
//! invariants"), driven through the public `chunk()` entry point.

use proptest::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use hchunk::{chunk, ChunkRequest, Mode};

/// Install a tracing subscriber once, controlled by `RUST_LOG`, so the
/// `debug!`/`info!` calls inside `chunk()` are visible when these tests run
/// with `RUST_LOG=hchunk=debug cargo test`. `try_init` makes repeated calls
/// across test functions harmless.
fn setup_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn arbitrary_prose() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 .,\n#]{0,300}").unwrap()
}

fn arbitrary_size() -> impl Strategy<Value = usize> {
    20usize..400
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Determinism: chunking the same input twice produces bit-identical
    /// output (spec §8).
    #[test]
    fn test_deterministic(text in arbitrary_prose(), p in arbitrary_size(), s in arbitrary_size()) {
        let request = || ChunkRequest::new(Mode::Prose, text.clone())
            .with_parent_block_size(p)
            .with_sub_block_size(s);
        let a = chunk(request()).unwrap();
        let b = chunk(request()).unwrap();
        prop_assert_eq!(a.result, b.result);
    }

    /// Token integrity: no placeholder ever leaks into the final output,
    /// regardless of mode or size envelope.
    #[test]
    fn test_no_placeholder_leaks_prose(text in arbitrary_prose(), p in arbitrary_size(), s in arbitrary_size()) {
        let request = ChunkRequest::new(Mode::Prose, text)
            .with_parent_block_size(p)
            .with_sub_block_size(s);
        let output = chunk(request).unwrap();
        prop_assert!(!output.result.contains("<<ATOMIC_"));
    }

    /// Content conservation (approximate): every alphanumeric run in the
    /// input survives somewhere in the output, since prose mode never
    /// drops words (only whitespace/separators are normalized).
    #[test]
    fn test_words_are_conserved(p in arbitrary_size(), s in arbitrary_size()) {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let request = ChunkRequest::new(Mode::Prose, text)
            .with_parent_block_size(p)
            .with_sub_block_size(s);
        let output = chunk(request).unwrap();
        for word in text.split_whitespace() {
            prop_assert!(output.result.contains(word), "missing word {word:?}");
        }
    }

    /// Image-mode overflow: the truncated content length matches the spec's
    /// overflow formula exactly, and the protected suffix is never split.
    #[test]
    fn test_image_overflow_matches_formula(len in 1usize..200, parent_size in 1usize..100) {
        let content = "A".repeat(len);
        let preview_url = "http://x";
        let request = ChunkRequest::new(Mode::Image, content.clone())
            .with_parent_block_size(parent_size)
            .with_preview_url(preview_url);
        let output = chunk(request).unwrap();

        let suffix_len = "\n图片连接：".chars().count() + preview_url.chars().count();
        let current_len = len + suffix_len;
        let kept_a_count = if current_len > parent_size {
            let excess = current_len - parent_size;
            len.saturating_sub(excess)
        } else {
            len
        };

        prop_assert!(output.result.contains(&"A".repeat(kept_a_count)));
        if kept_a_count < len {
            prop_assert!(!output.result.contains(&"A".repeat(kept_a_count + 1)));
        }
        prop_assert!(output.result.contains(&format!("图片连接：{preview_url}")));
    }
}

#[test]
fn test_heading_adjacency_fixup_reattaches_stray_hash() {
    setup_tracing();
    // A parent block ending in a bare "#" right before the separator, with
    // the next parent's title following it, must not leave "#<sep>Title"
    // stuck together — the "#" belongs on its own heading line.
    let content = "some content ending in #\n\n\n\nRest of Title\nmore body here";
    let request = ChunkRequest::new(Mode::Prose, content)
        .with_parent_block_size(1024)
        .with_sub_block_size(512)
        .with_parent_separator("\n\n\n\n");
    let output = chunk(request).unwrap();
    assert!(!output.result.contains("#\n\n\n\nRest"));
}

#[test]
fn test_table_header_replicates_into_every_parent() {
    setup_tracing();
    let mut content = String::from("| a | b |\n| - | - |\n");
    for i in 0..30 {
        content.push_str(&format!("| row{i} | value{i} |\n"));
    }
    let request = ChunkRequest::new(Mode::Table, content)
        .with_parent_block_size(60)
        .with_sub_block_size(60);
    let output = chunk(request).unwrap();

    let parents: Vec<&str> = output.result.split("\n\n\n\n").collect();
    assert!(parents.len() >= 2);
    for parent in &parents {
        assert!(parent.contains("| a | b |"));
        assert!(parent.contains("| - | - |"));
    }
}

#[test]
fn test_atomic_image_region_within_sub_max_is_not_split() {
    setup_tracing();
    let text = "before\n\n【图片主题：一只猫在睡觉】\n\nafter some more words here";
    let request = ChunkRequest::new(Mode::Prose, text)
        .with_parent_block_size(1024)
        .with_sub_block_size(512);
    let output = chunk(request).unwrap();
    assert!(output.result.contains("【图片主题：一只猫在睡觉】"));
}

#[test]
fn test_html_table_is_converted_and_protected_as_atomic_region() {
    setup_tracing();
    let text =
        "intro\n\n<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>\n\nend";
    let request = ChunkRequest::new(Mode::Prose, text)
        .with_parent_block_size(1024)
        .with_sub_block_size(512);
    let output = chunk(request).unwrap();
    assert!(output.result.contains("| A | B |"));
    assert!(!output.result.contains("<table>"));
}
