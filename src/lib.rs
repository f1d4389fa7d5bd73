//! # hchunk
//!
//! Hierarchical, size-bounded text chunking for retrieval-augmented
//! generation (RAG) ingestion pipelines.
//!
//! ## The problem
//!
//! Language models have context windows. Documents don't fit. This crate
//! turns a mixed-content document — prose, Markdown tables, HTML tables,
//! embedded image-description blocks — into a two-level hierarchy of
//! *parent blocks* and *sub-blocks* sized for downstream embedding and
//! retrieval, without splitting a table row or an image description block
//! in half.
//!
//! Three modes share one segmentation core but enforce different
//! structural invariants:
//!
//! - **Prose** (`pdf` / `pdf_text`): heading-based coarse partition, then
//!   recursive boundary refinement down to sub-blocks.
//! - **Table** (`table` / `md_table` / `markdown`): locates the document's
//!   Markdown table and replicates its header row into every parent block
//!   the table's rows get split across.
//! - **Image** (`image` / `img` / `text_with_preview` / `preview`): appends
//!   a mandatory, unsplittable preview-URL suffix, truncating the
//!   description text from the tail if the combination would overflow the
//!   parent budget.
//!
//! ## Quick start
//!
//! ```rust
//! use hchunk::{chunk, ChunkRequest, Mode};
//!
//! let request = ChunkRequest::new(Mode::Prose, "Hello world.");
//! let output = chunk(request).unwrap();
//! assert_eq!(output.result, "Hello world.");
//! ```
//!
//! ## Size envelope
//!
//! Every chunking call derives four numbers from the caller's
//! `parent_block_size`/`sub_block_size` — a target to aim for and a hard
//! max, at each of the two tiers — rather than a single size that forces a
//! choice between stopping early or splitting mid-sentence. See
//! [`SizeEnvelope`].
//!
//! ## What this crate does not do
//!
//! No streaming input, no language detection, no embedding-based semantic
//! chunking, and no reversible round-trip — HTML→Markdown table rewriting,
//! header replication, and image-suffix injection make the output
//! transformed, not a lossless re-slice of the input.

mod atomic_split;
mod boundary;
mod dispatch;
mod error;
mod html_table;
mod length;
mod partition;
mod size;
mod subblock;
mod token;

pub use dispatch::{chunk, ChunkOutput, ChunkRequest, Mode};
pub use error::{Error, Result};
pub use size::SizeEnvelope;
