use fallible_streaming_iterator::FallibleStreamingIterator;

use crate::compression::create_codec;
use crate::error::{Error, Result};
use crate::page::{CompressedDataPage, DataPage};

use super::page::PageIterator;

/// Decompresses a [`CompressedDataPage`] into a [`DataPage`], writing the decompressed bytes
/// into `buffer`. If the page is uncompressed, `buffer` is swapped into the page's own buffer
/// so that no copy is made.
pub fn decompress(page: CompressedDataPage, buffer: &mut Vec<u8>) -> Result<DataPage> {
    let uncompressed_size = page.uncompressed_size();
    let (header, compressed, compression, dictionary_page, descriptor) = page.into_read_parts();

    if let Some(mut codec) = create_codec(&compression)? {
        buffer.clear();
        buffer.try_reserve(uncompressed_size)?;
        codec.decompress(&compressed, buffer)?;
        Ok(DataPage::new(
            header,
            std::mem::take(buffer),
            dictionary_page,
            descriptor,
        ))
    } else {
        Ok(DataPage::new(header, compressed, dictionary_page, descriptor))
    }
}

/// A [`FallibleStreamingIterator`] that decompresses [`CompressedDataPage`]s into [`DataPage`]s
/// as they are consumed, re-using a single internal buffer across pages.
pub struct BasicDecompressor<I: Iterator<Item = Result<CompressedDataPage>>> {
    iter: I,
    current: Option<DataPage>,
    buffer: Vec<u8>,
}

impl<I: Iterator<Item = Result<CompressedDataPage>>> BasicDecompressor<I> {
    /// Returns a new [`BasicDecompressor`].
    pub fn new(iter: I, buffer: Vec<u8>) -> Self {
        Self {
            iter,
            current: None,
            buffer,
        }
    }

    /// Consumes this decompressor, returning its internal buffer.
    pub fn into_inner(mut self) -> Vec<u8> {
        if let Some(page) = self.current.take() {
            self.buffer = page.into_buffer();
        }
        self.buffer
    }
}

impl<I: Iterator<Item = Result<CompressedDataPage>>> FallibleStreamingIterator
    for BasicDecompressor<I>
{
    type Item = DataPage;
    type Error = Error;

    fn advance(&mut self) -> Result<()> {
        let mut buffer = if let Some(page) = self.current.take() {
            page.into_buffer()
        } else {
            std::mem::take(&mut self.buffer)
        };

        self.current = match self.iter.next().transpose()? {
            Some(page) => Some(decompress(page, &mut buffer)?),
            None => {
                self.buffer = buffer;
                None
            }
        };
        Ok(())
    }

    fn get(&self) -> Option<&Self::Item> {
        self.current.as_ref()
    }
}

/// Like [`BasicDecompressor`], but for a [`PageIterator`] whose unread buffer can be swapped
/// back to the source between pages, so both the compressed and decompressed allocations are
/// reused across the whole column chunk.
pub struct Decompressor<I: PageIterator> {
    iter: I,
    current: Option<DataPage>,
    buffer: Vec<u8>,
}

impl<I: PageIterator> Decompressor<I> {
    /// Returns a new [`Decompressor`].
    pub fn new(iter: I, buffer: Vec<u8>) -> Self {
        Self {
            iter,
            current: None,
            buffer,
        }
    }

    /// Consumes this decompressor, returning the reader's scratch buffer and the decompressed
    /// buffer.
    pub fn into_buffers(mut self) -> (Vec<u8>, Vec<u8>) {
        if let Some(page) = self.current.take() {
            self.buffer = page.into_buffer();
        }
        let mut reader_buffer = vec![];
        self.iter.swap_buffer(&mut reader_buffer);
        (reader_buffer, self.buffer)
    }
}

impl<I: PageIterator> FallibleStreamingIterator for Decompressor<I> {
    type Item = DataPage;
    type Error = Error;

    fn advance(&mut self) -> Result<()> {
        let mut buffer = if let Some(page) = self.current.take() {
            page.into_buffer()
        } else {
            std::mem::take(&mut self.buffer)
        };

        self.current = match self.iter.next().transpose()? {
            Some(page) => Some(decompress(page, &mut buffer)?),
            None => {
                self.buffer = buffer;
                None
            }
        };
        Ok(())
    }

    fn get(&self) -> Option<&Self::Item> {
        self.current.as_ref()
    }
}
