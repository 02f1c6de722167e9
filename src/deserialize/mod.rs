//! Null reconstruction: expanding a page's dense, non-null value stream into the sparse,
//! nullable stream the page logically represents, driven by its definition levels.
//!
//! This sits below the typed column-reader APIs in [`crate::read`]: it decodes only the
//! validity/repetition structure common to every physical type, leaving per-type value decoding
//! (PLAIN/dictionary/delta) to the caller.
mod hybrid_rle;
mod utils;

pub use hybrid_rle::{HybridDecoderBitmapIter, HybridEncoded};
pub use utils::{dict_indices_decoder, DefLevelsDecoder, FilteredHybridEncoded, OptionalPageValidity};
