use crate::compression::{create_codec, Codec};
use crate::error::{ParquetError, Result};
use crate::page::{
    CompressedDataPage, CompressedDictPage, CompressedPage, DataPage, DataPageHeader, EncodedPage,
};
use crate::{compression::Compression, page::EncodedDictPage, FallibleStreamingIterator};

use super::DynIter;

/// The gzip compression level, restricted to the range accepted by `flate2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipLevel(u8);

impl GzipLevel {
    /// Returns a new [`GzipLevel`], if `level` is in the accepted range `0..=9`.
    pub fn try_new(level: u8) -> Result<Self> {
        if level > 9 {
            Err(ParquetError::OutOfSpec(
                "Valid gzip compression levels are 0..=9".to_string(),
            ))
        } else {
            Ok(Self(level))
        }
    }

    pub fn compression_level(&self) -> u8 {
        self.0
    }
}

/// The brotli compression level, restricted to the range accepted by `brotli`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrotliLevel(u32);

impl BrotliLevel {
    /// Returns a new [`BrotliLevel`], if `level` is in the accepted range `0..=11`.
    pub fn try_new(level: u32) -> Result<Self> {
        if level > 11 {
            Err(ParquetError::OutOfSpec(
                "Valid brotli compression levels are 0..=11".to_string(),
            ))
        } else {
            Ok(Self(level))
        }
    }

    pub fn compression_level(&self) -> u32 {
        self.0
    }
}

/// The zstd compression level, restricted to the range accepted by `zstd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdLevel(i32);

impl ZstdLevel {
    /// Returns a new [`ZstdLevel`], if `level` is in the accepted range `1..=22`.
    pub fn try_new(level: i32) -> Result<Self> {
        if !(1..=22).contains(&level) {
            Err(ParquetError::OutOfSpec(
                "Valid zstd compression levels are 1..=22".to_string(),
            ))
        } else {
            Ok(Self(level))
        }
    }

    pub fn compression_level(&self) -> i32 {
        self.0
    }
}

/// The compression a column chunk is written with, together with the codec-specific
/// tuning parameter where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOptions {
    Uncompressed,
    Snappy,
    Gzip(Option<GzipLevel>),
    Lzo,
    Brotli(Option<BrotliLevel>),
    Lz4Raw,
    Zstd(Option<ZstdLevel>),
}

impl From<Compression> for CompressionOptions {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Uncompressed => CompressionOptions::Uncompressed,
            Compression::Snappy => CompressionOptions::Snappy,
            Compression::Gzip => CompressionOptions::Gzip(None),
            Compression::Lzo => CompressionOptions::Lzo,
            Compression::Brotli => CompressionOptions::Brotli(None),
            Compression::Lz4Raw => CompressionOptions::Lz4Raw,
            Compression::Zstd => CompressionOptions::Zstd(None),
            _ => CompressionOptions::Uncompressed,
        }
    }
}

impl From<CompressionOptions> for Compression {
    fn from(options: CompressionOptions) -> Self {
        match options {
            CompressionOptions::Uncompressed => Compression::Uncompressed,
            CompressionOptions::Snappy => Compression::Snappy,
            CompressionOptions::Gzip(_) => Compression::Gzip,
            CompressionOptions::Lzo => Compression::Lzo,
            CompressionOptions::Brotli(_) => Compression::Brotli,
            CompressionOptions::Lz4Raw => Compression::Lz4Raw,
            CompressionOptions::Zstd(_) => Compression::Zstd,
        }
    }
}

fn compress_(codec: &mut dyn Codec, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    codec.compress(input, output)
}

fn dyn_codec(options: CompressionOptions) -> Result<Option<Box<dyn Codec>>> {
    create_codec(&options.into())
}

fn compress_data_page(
    page: DataPage,
    mut buffer: Vec<u8>,
    options: CompressionOptions,
) -> Result<CompressedDataPage> {
    let (header, uncompressed, dictionary_page, descriptor) = page.into_parts();
    let uncompressed_page_size = uncompressed.len();

    // DataPageV2 only compresses the values, leaving the repetition/definition level
    // bytes untouched: [<rep> <def> <values>] -> [<rep> <def> <compressed values>].
    let prefix = match &header {
        DataPageHeader::V1(_) => 0,
        DataPageHeader::V2(h) => {
            (h.repetition_levels_byte_length + h.definition_levels_byte_length) as usize
        }
    };

    let codec = dyn_codec(options)?;
    buffer.clear();
    buffer.extend_from_slice(&uncompressed[..prefix]);

    if let Some(mut codec) = codec {
        compress_(codec.as_mut(), &uncompressed[prefix..], &mut buffer)?;
    } else {
        buffer.extend_from_slice(&uncompressed[prefix..]);
    }

    Ok(CompressedDataPage::new(
        header,
        buffer,
        options.into(),
        uncompressed_page_size,
        dictionary_page,
        descriptor,
    ))
}

fn compress_dict_page(
    page: EncodedDictPage,
    mut buffer: Vec<u8>,
    options: CompressionOptions,
) -> Result<CompressedDictPage> {
    let uncompressed_page_size = page.buffer.len();
    buffer.clear();

    let codec = dyn_codec(options)?;
    if let Some(mut codec) = codec {
        compress_(codec.as_mut(), &page.buffer, &mut buffer)?;
    } else {
        buffer.extend_from_slice(&page.buffer);
    }
    Ok(CompressedDictPage::new(
        buffer,
        uncompressed_page_size,
        page.num_values,
    ))
}

/// A [`FallibleStreamingIterator`] that consumes [`EncodedPage`]s and yields
/// [`CompressedPage`]s, compressing the values of each page (and, for `DataPageV2`,
/// only the values: repetition/definition level bytes are always left uncompressed).
///
/// Reuses a single scratch buffer across pages to avoid repeated allocation.
pub struct Compressor<'a, E>
where
    ParquetError: From<E>,
{
    iter: DynIter<'a, std::result::Result<EncodedPage, E>>,
    options: CompressionOptions,
    buffer: Vec<u8>,
    current: Option<CompressedPage>,
}

impl<'a, E> Compressor<'a, E>
where
    ParquetError: From<E>,
{
    /// Creates a new [`Compressor`] out of an iterator of encoded pages, re-using `buffer`
    /// as the scratch space for compressed output.
    pub fn new(
        iter: DynIter<'a, std::result::Result<EncodedPage, E>>,
        options: CompressionOptions,
        buffer: Vec<u8>,
    ) -> Self {
        Self {
            iter,
            options,
            buffer,
            current: None,
        }
    }

    /// Alias of [`Compressor::new`] kept for call sites that build the iterator from a
    /// freshly allocated `Vec`.
    pub fn new_from_vec(
        iter: DynIter<'a, std::result::Result<EncodedPage, E>>,
        options: CompressionOptions,
        buffer: Vec<u8>,
    ) -> Self {
        Self::new(iter, options, buffer)
    }

    /// Consumes this [`Compressor`] and returns the scratch buffer it was using.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl<'a, E> FallibleStreamingIterator for Compressor<'a, E>
where
    ParquetError: From<E>,
{
    type Item = CompressedPage;
    type Error = ParquetError;

    fn advance(&mut self) -> Result<()> {
        let buffer = self
            .current
            .take()
            .map(|page| page.into_buffer())
            .unwrap_or_else(std::mem::take);

        self.current = match self.iter.next() {
            Some(Ok(EncodedPage::Data(page))) => {
                Some(CompressedPage::Data(compress_data_page(page, buffer, self.options)?))
            }
            Some(Ok(EncodedPage::Dict(page))) => {
                Some(CompressedPage::Dict(compress_dict_page(page, buffer, self.options)?))
            }
            Some(Err(e)) => return Err(ParquetError::from(e)),
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
