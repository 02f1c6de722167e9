//! Turns the raw hybrid RLE/bit-packed run stream (`crate::encoding::hybrid_rle::Decoder`) into
//! runs a consumer can act on directly, tracking how many logical items remain in the page so a
//! final, partially-consumed run is truncated correctly rather than over-read.
use crate::encoding::hybrid_rle;

/// The decoding state of the hybrid-RLE decoder with a maximum definition level of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A bitpacked run: the raw pack, a starting bit offset into it, and how many items to take.
    Bitmap(&'a [u8], usize, usize),
    /// A repeated value (set/unset) and how many times it repeats.
    Repeated(bool, usize),
}

/// An iterator of [`HybridEncoded`] over a page's validity (definition-level) bitstream.
#[derive(Debug)]
pub struct HybridRleIter<'a> {
    iter: hybrid_rle::Decoder<'a>,
    current: Option<hybrid_rle::HybridEncoded<'a>>,
    run_offset: usize,
    consumed: usize,
    length: usize,
}

impl<'a> HybridRleIter<'a> {
    pub fn new(values: &'a [u8], length: usize) -> Self {
        let mut iter = hybrid_rle::Decoder::new(values, 1);
        let current = iter.next();
        Self { iter, current, run_offset: 0, consumed: 0, length }
    }

    /// The number of items not yet consumed. Not the number of runs.
    #[inline]
    pub fn len(&self) -> usize {
        self.length - self.consumed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetches the next run, optionally capped to `limit` items.
    pub fn limited_next(&mut self, limit: Option<usize>) -> Option<HybridEncoded<'a>> {
        if self.consumed == self.length {
            return None;
        }
        let run = self.current.as_ref()?;
        let result = match run {
            hybrid_rle::HybridEncoded::Bitpacked(pack) => {
                let pack_size = pack.len() * 8 - self.run_offset;
                let remaining = self.len();
                let length = pack_size.min(remaining);
                let additional = limit.map_or(length, |limit| length.min(limit));

                let result = HybridEncoded::Bitmap(pack, self.run_offset, additional);
                if additional == length {
                    self.run_offset = 0;
                    self.current = self.iter.next();
                } else {
                    self.run_offset += additional;
                }
                self.consumed += additional;
                result
            }
            hybrid_rle::HybridEncoded::Rle(value, run_length) => {
                let is_set = value[0] == 1;
                let length = run_length - self.run_offset;
                let additional = limit.map_or(length, |limit| length.min(limit));

                let result = HybridEncoded::Repeated(is_set, additional);
                if additional == length {
                    self.run_offset = 0;
                    self.current = self.iter.next();
                } else {
                    self.run_offset += additional;
                }
                self.consumed += additional;
                result
            }
        };
        Some(result)
    }
}

impl<'a> Iterator for HybridRleIter<'a> {
    type Item = HybridEncoded<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.limited_next(None)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

/// A [`HybridRleIter`] reading definition levels directly out of a page's validity bitstream.
pub type HybridDecoderBitmapIter<'a> = HybridRleIter<'a>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_next_caps_run_length() {
        // a single RLE run of 5 "set" values, bit width 1
        let values = [5 << 1, 1];
        let mut iter = HybridRleIter::new(&values, 5);
        assert_eq!(iter.len(), 5);
        match iter.limited_next(Some(3)) {
            Some(HybridEncoded::Repeated(true, 3)) => {}
            other => panic!("unexpected run: {other:?}"),
        }
        assert_eq!(iter.len(), 2);
        match iter.limited_next(Some(10)) {
            Some(HybridEncoded::Repeated(true, 2)) => {}
            other => panic!("unexpected run: {other:?}"),
        }
        assert!(iter.limited_next(None).is_none());
    }
}
