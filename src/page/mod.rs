mod page_dict;
pub use page_dict::*;

use std::convert::TryInto;
use std::sync::Arc;

pub use parquet_format_safe::{
    DataPageHeader as DataPageHeaderV1, DataPageHeaderV2, PageHeader as ParquetPageHeader,
};

pub use crate::parquet_bridge::{DataPageHeaderExt, PageType};

use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::Result;
use crate::indexes::Interval;
use crate::metadata::ColumnDescriptor;

use crate::statistics::{deserialize_statistics, Statistics};

/// A [`CompressedDataPage`] is compressed, encoded representation of a Parquet data page.
/// It holds actual data and thus cloning it is expensive.
#[derive(Debug)]
pub struct CompressedDataPage {
    pub(crate) header: DataPageHeader,
    pub(crate) buffer: Vec<u8>,
    compression: Compression,
    uncompressed_page_size: usize,
    pub(crate) dictionary_page: Option<Arc<dyn DictPage>>,
    pub(crate) descriptor: ColumnDescriptor,
    selected_rows: Option<Vec<Interval>>,
}

impl CompressedDataPage {
    pub fn new(
        header: DataPageHeader,
        buffer: Vec<u8>,
        compression: Compression,
        uncompressed_page_size: usize,
        dictionary_page: Option<Arc<dyn DictPage>>,
        descriptor: ColumnDescriptor,
    ) -> Self {
        Self {
            header,
            buffer,
            compression,
            uncompressed_page_size,
            dictionary_page,
            descriptor,
            selected_rows: None,
        }
    }

    /// Returns a new [`CompressedDataPage`] read off a page index, with the rows it was
    /// filtered down to.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_read(
        header: DataPageHeader,
        buffer: Vec<u8>,
        compression: Compression,
        uncompressed_page_size: usize,
        dictionary_page: Option<Arc<dyn DictPage>>,
        descriptor: ColumnDescriptor,
        selected_rows: Option<Vec<Interval>>,
    ) -> Self {
        Self {
            header,
            buffer,
            compression,
            uncompressed_page_size,
            dictionary_page,
            descriptor,
            selected_rows,
        }
    }

    pub fn header(&self) -> &DataPageHeader {
        &self.header
    }

    /// The set of rows that this page has been filtered down to, via a page index. [`None`]
    /// when the page was read without index-driven filtering (the whole page is in scope).
    pub fn rows(&self) -> Option<&[Interval]> {
        self.selected_rows.as_deref()
    }

    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_page_size
    }

    pub fn compressed_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn num_values(&self) -> usize {
        match &self.header {
            DataPageHeader::V1(d) => d.num_values as usize,
            DataPageHeader::V2(d) => d.num_values as usize,
        }
    }

    /// Decodes the raw statistics into a statistics
    pub fn statistics(&self) -> Option<Result<Arc<dyn Statistics>>> {
        match &self.header {
            DataPageHeader::V1(d) => d
                .statistics
                .as_ref()
                .map(|x| deserialize_statistics(x, self.descriptor().clone())),
            DataPageHeader::V2(d) => d
                .statistics
                .as_ref()
                .map(|x| deserialize_statistics(x, self.descriptor().clone())),
        }
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Consumes this page, returning its parts for decompression.
    pub(crate) fn into_read_parts(
        self,
    ) -> (
        DataPageHeader,
        Vec<u8>,
        Compression,
        Option<Arc<dyn DictPage>>,
        ColumnDescriptor,
    ) {
        (
            self.header,
            self.buffer,
            self.compression,
            self.dictionary_page,
            self.descriptor,
        )
    }
}

#[derive(Debug, Clone)]
pub enum DataPageHeader {
    V1(DataPageHeaderV1),
    V2(DataPageHeaderV2),
}

impl DataPageHeader {
    pub fn num_values(&self) -> usize {
        match self {
            Self::V1(d) => d.num_values as usize,
            Self::V2(d) => d.num_values as usize,
        }
    }
}

/// A [`DataPage`] is an uncompressed, encoded representation of a Parquet data page. It holds actual data
/// and thus cloning it is expensive.
#[derive(Debug, Clone)]
pub struct DataPage {
    header: DataPageHeader,
    pub(super) buffer: Vec<u8>,
    dictionary_page: Option<Arc<dyn DictPage>>,
    descriptor: ColumnDescriptor,
}

impl DataPage {
    pub fn new(
        header: DataPageHeader,
        buffer: Vec<u8>,
        dictionary_page: Option<Arc<dyn DictPage>>,
        descriptor: ColumnDescriptor,
    ) -> Self {
        Self {
            header,
            buffer,
            dictionary_page,
            descriptor,
        }
    }

    pub fn header(&self) -> &DataPageHeader {
        &self.header
    }

    pub fn dictionary_page(&self) -> Option<&Arc<dyn DictPage>> {
        self.dictionary_page.as_ref()
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn num_values(&self) -> usize {
        match &self.header {
            DataPageHeader::V1(d) => d.num_values as usize,
            DataPageHeader::V2(d) => d.num_values as usize,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match &self.header {
            DataPageHeader::V1(d) => d.encoding.try_into().unwrap(),
            DataPageHeader::V2(d) => d.encoding.try_into().unwrap(),
        }
    }

    /// Decodes the raw statistics into a statistics
    pub fn statistics(&self) -> Option<Result<Arc<dyn Statistics>>> {
        match &self.header {
            DataPageHeader::V1(d) => d
                .statistics
                .as_ref()
                .map(|x| deserialize_statistics(x, self.descriptor().clone())),
            DataPageHeader::V2(d) => d
                .statistics
                .as_ref()
                .map(|x| deserialize_statistics(x, self.descriptor().clone())),
        }
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Consumes this page, returning its owned parts. Used by the [`crate::write::Compressor`]
    /// to reuse the page's buffer allocation as compression scratch space.
    pub fn into_parts(
        self,
    ) -> (
        DataPageHeader,
        Vec<u8>,
        Option<Arc<dyn DictPage>>,
        ColumnDescriptor,
    ) {
        (self.header, self.buffer, self.dictionary_page, self.descriptor)
    }

    /// Consumes this page, returning only its buffer allocation for reuse.
    pub(crate) fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// Splits a data page's buffer into its (repetition levels, definition levels, values) slices.
pub fn split_buffer(page: &DataPage) -> (&[u8], &[u8], &[u8]) {
    let has_rep = page.descriptor().max_rep_level() > 0;
    let has_def = page.descriptor().max_def_level() > 0;
    match page.header() {
        DataPageHeader::V1(_) => crate::read::levels::split_buffer_v1(page.buffer(), has_rep, has_def),
        DataPageHeader::V2(header) => crate::read::levels::split_buffer_v2(
            page.buffer(),
            header.repetition_levels_byte_length as usize,
            header.definition_levels_byte_length as usize,
        ),
    }
}

/// A [`Page`] is an uncompressed, encoded representation of a Parquet page. It may hold actual data
/// and thus cloning it may be expensive.
#[derive(Debug)]
pub enum Page {
    Data(DataPage),
    Dict(Arc<dyn DictPage>),
}

/// A [`CompressedPage`] is a compressed, encoded representation of a Parquet page. It holds actual data
/// and thus cloning it is expensive.
#[derive(Debug)]
pub enum CompressedPage {
    Data(CompressedDataPage),
    Dict(CompressedDictPage),
}

impl CompressedPage {
    /// Returns the buffer backing this page, so callers (namely [`crate::write::Compressor`])
    /// can reuse its allocation for the next page instead of allocating anew.
    pub(crate) fn into_buffer(self) -> Vec<u8> {
        match self {
            CompressedPage::Data(page) => page.buffer,
            CompressedPage::Dict(page) => page.buffer,
        }
    }
}

/// An [`EncodedPage`] is an uncompressed, encoded representation of a Parquet page ready to
/// be compressed by a [`crate::write::Compressor`]. Unlike [`Page`], which is produced by
/// reading and decoding an existing file, this is the write-side counterpart produced by an
/// encoder right before compression.
#[derive(Debug)]
pub enum EncodedPage {
    Data(DataPage),
    Dict(EncodedDictPage),
}

// read: CompressedPage -> Page
// write: EncodedPage -> CompressedPage
