//! Validity (definition-level) reconstruction: turns a page's raw def-level bitstream into runs
//! of present/absent values, the shape every per-type value decoder interleaves against to
//! rebuild the sparse, nullable stream a page represents.
use crate::encoding::hybrid_rle::HybridRleDecoder;
use crate::error::Error;
use crate::page::{split_buffer, DataPage};
use crate::read::levels::{get_bit_width, RLEDecoder};

use super::hybrid_rle::{HybridDecoderBitmapIter, HybridEncoded};

/// A validity run, already resolved against a page's declared length - never reads past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteredHybridEncoded<'a> {
    /// A run backed by a bitmap: `length` bits starting at `offset` within `values`.
    Bitmap { values: &'a [u8], offset: usize, length: usize },
    /// `length` repetitions of a single set/unset decision.
    Repeated { is_set: bool, length: usize },
    /// `length` items skipped by a page-index selection (not produced by [`OptionalPageValidity`]
    /// itself - kept so callers that also drive filtered, page-index-selective reads share a
    /// single run type).
    Skipped(usize),
}

/// Iterates the validity runs of an optional page whose maximum definition level is 1, i.e. a
/// plain leaf with no repeated ancestors - the common case for top-level optional columns.
#[derive(Debug)]
pub struct OptionalPageValidity<'a> {
    iter: HybridDecoderBitmapIter<'a>,
}

impl<'a> OptionalPageValidity<'a> {
    pub fn try_new(page: &'a DataPage) -> Result<Self, Error> {
        if page.descriptor().max_def_level() != 1 {
            return Err(Error::OutOfSpec(
                "OptionalPageValidity can only be initialized from pages with a maximum definition level of 1".to_string(),
            ));
        }
        let (_, def_levels, _) = split_buffer(page);
        let iter = HybridDecoderBitmapIter::new(def_levels, page.num_values());
        Ok(Self { iter })
    }

    pub fn len(&self) -> usize {
        self.iter.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the next validity run, each one holding at most `limit` items.
    pub fn next_limited(&mut self, limit: usize) -> Option<FilteredHybridEncoded<'a>> {
        self.iter.limited_next(Some(limit)).map(|run| match run {
            HybridEncoded::Bitmap(values, offset, length) => {
                FilteredHybridEncoded::Bitmap { values, offset, length }
            }
            HybridEncoded::Repeated(is_set, length) => {
                FilteredHybridEncoded::Repeated { is_set, length }
            }
        })
    }
}

/// Decodes a page's definition levels: either a plain validity bitmap (`max_def_level == 1`,
/// no repeated ancestors) or the general run of level integers (nested/repeated columns), paired
/// with the page's maximum definition level so the caller can tell "present" from "null".
pub enum DefLevelsDecoder<'a> {
    Bitmap(HybridDecoderBitmapIter<'a>),
    Levels(RleLevelsIter<'a>, u32),
}

impl<'a> DefLevelsDecoder<'a> {
    pub fn try_new(page: &'a DataPage) -> Result<Self, Error> {
        let (_, def_levels, _) = split_buffer(page);
        let max_def_level = page.descriptor().max_def_level();
        if max_def_level == 1 {
            let iter = HybridDecoderBitmapIter::new(def_levels, page.num_values());
            Ok(Self::Bitmap(iter))
        } else {
            let num_bits = get_bit_width(max_def_level);
            let iter = RLEDecoder::new(def_levels, num_bits, page.num_values() as u32);
            Ok(Self::Levels(RleLevelsIter { iter }, max_def_level as u32))
        }
    }
}

/// An `Iterator<Item = Result<u32, Error>>` over raw RLE-decoded level integers.
pub struct RleLevelsIter<'a> {
    iter: RLEDecoder<'a>,
}

impl<'a> Iterator for RleLevelsIter<'a> {
    type Item = Result<u32, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Decodes the dictionary-index stream of a dictionary-encoded data page.
pub fn dict_indices_decoder(page: &DataPage) -> HybridRleDecoder<'_> {
    let (_, _, indices_buffer) = split_buffer(page);
    let bit_width = indices_buffer[0];
    let indices_buffer = &indices_buffer[1..];
    HybridRleDecoder::new(indices_buffer, bit_width as u32, page.num_values())
}
