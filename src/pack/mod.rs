//! Resource pack input and output
//!
//! - `archive`: zip reading, model discovery and the parallel pack run
//! - `rewrite`: turning optimized quads back into model JSON

pub mod archive;
pub mod rewrite;

pub use archive::{PackEntry, PackReport, is_model_path, optimize_pack, optimize_pack_bytes, read_entries, write_entries};
pub use rewrite::{ModelOutput, apply_optimized, element_from_quad, optimize_model_json};
