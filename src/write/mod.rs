mod column_chunk;
mod compression;
pub mod dictionary;
mod dyn_iter;
mod file;
pub mod indexes;
mod page;
mod row_group;
pub mod sorting;
mod statistics;
mod stream;

use crate::error::Result;
use crate::page::CompressedPage;
use crate::FallibleStreamingIterator;

pub use column_chunk::{write_column_chunk, write_column_chunk_async};
pub use compression::{BrotliLevel, CompressionOptions, Compressor, GzipLevel, ZstdLevel};
pub use dictionary::{DictionaryKey, DictionaryTable, HashedBytes};
pub use dyn_iter::{DynIter, DynStreamingIterator};
pub use file::FileWriter;
pub use page::{write_page, write_page_async, PageWriteSpec};
pub use row_group::{write_row_group, write_row_group_async};
pub use sorting::SortingColumn;
pub use stream::FileStreamer;

/// An iterator of column chunks, each an independent streaming iterator of
/// already-compressed pages. This is the shape a [`FileWriter`]/[`FileStreamer`]
/// expects one row group's worth of columns in.
pub type RowGroupIter<'a, E> =
    DynIter<'a, std::result::Result<DynStreamingIterator<'a, CompressedPage, E>, E>>;

/// The Parquet version to target. Only affects the thrift `version` field written to
/// the footer; page-level V1/V2 encoding is chosen independently per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V1,
    V2,
}

impl From<Version> for i32 {
    fn from(version: Version) -> Self {
        match version {
            Version::V1 => 1,
            Version::V2 => 2,
        }
    }
}

/// Default target for the max uncompressed size of a single data page, in bytes.
pub const DEFAULT_PAGE_BUFFER_SIZE: usize = 1024 * 1024;

/// Default max size, in bytes, a column's dictionary may reach before the writer falls
/// back to PLAIN encoding for the remainder of the chunk.
pub const DEFAULT_DICTIONARY_PAGE_SIZE_LIMIT: usize = 1024 * 1024;

/// Options that control how a row group is written, shared by every column chunk and
/// page within a single [`FileWriter`]/[`FileStreamer`].
///
/// Not `Copy`: `sorting` owns a `Vec`, unlike the teacher's original all-`Copy` options
/// struct. Every other field stays the same shape so existing call sites that build this
/// with a struct literal keep compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Whether to compute and write column/page statistics.
    pub write_statistics: bool,
    /// The Parquet format version to declare in the footer.
    pub version: Version,
    /// Target max uncompressed size of a single data page. Encoders should split a page
    /// once its accumulated uncompressed size would exceed this, at a record boundary.
    pub page_buffer_size: usize,
    /// Max dictionary size, in bytes, before a column's dictionary encoder falls back to
    /// PLAIN for the rest of the chunk.
    pub dictionary_page_size_limit: usize,
    /// Sort columns for the sorting writer (`write::sorting`). `None` disables sorting.
    pub sorting: Option<Vec<SortingColumn>>,
    /// In-memory row threshold at which the sorting writer spills and sorts a chunk.
    /// Only meaningful alongside `sorting`.
    pub sort_row_count: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            write_statistics: true,
            version: Version::V1,
            page_buffer_size: DEFAULT_PAGE_BUFFER_SIZE,
            dictionary_page_size_limit: DEFAULT_DICTIONARY_PAGE_SIZE_LIMIT,
            sorting: None,
            sort_row_count: None,
        }
    }
}

/// Returns the size, in bytes, that writing `iterator` to `writer` would take, without
/// retaining the pages: used by encoders that need to report a page's on-disk size
/// before the row group containing it has itself been flushed.
pub fn total_len<E>(
    mut iterator: impl FallibleStreamingIterator<Item = CompressedPage, Error = E>,
) -> std::result::Result<usize, E> {
    let mut len = 0;
    while let Some(page) = iterator.next()? {
        len += match page {
            CompressedPage::Data(page) => page.compressed_size(),
            CompressedPage::Dict(page) => page.buffer.len(),
        };
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    use crate::{
        error::Result,
        metadata::SchemaDescriptor,
        page::{DataPage, DataPageHeader, EncodedPage},
        read::read_metadata,
        schema::io_message::from_message,
    };
    use parquet_format_safe::DataPageHeader as DataPageHeaderV1;

    #[test]
    fn basic() -> Result<()> {
        let array = [0, 1, 2, 3, 4, 5, 6];

        let schema = SchemaDescriptor::new(from_message(
            "message schema { OPTIONAL INT32 col; }",
        )?);

        let buffer = array.iter().flat_map(|x: &i32| x.to_le_bytes()).collect();
        let page = DataPage::new(
            DataPageHeader::V1(DataPageHeaderV1 {
                num_values: array.len() as i32,
                encoding: crate::encoding::Encoding::Plain.into(),
                definition_level_encoding: crate::encoding::Encoding::Rle.into(),
                repetition_level_encoding: crate::encoding::Encoding::Rle.into(),
                statistics: None,
            }),
            buffer,
            None,
            schema.columns()[0].clone(),
        );

        let pages = std::iter::once(Ok(EncodedPage::Data(page)));
        let pages = DynStreamingIterator::new(Compressor::new_from_vec(
            DynIter::new(pages),
            CompressionOptions::Uncompressed,
            vec![],
        ));
        let columns = std::iter::once(Ok(pages));

        let options = WriteOptions {
            write_statistics: false,
            version: Version::V1,
            ..Default::default()
        };

        let mut writer = FileWriter::new(Cursor::new(vec![]), schema, options, None);
        writer.start()?;
        writer.write(DynIter::new(columns))?;
        let (_, writer) = writer.end(None)?;

        let data = writer.into_inner();
        let mut reader = Cursor::new(data);
        let metadata = read_metadata(&mut reader)?;

        assert_eq!(metadata.row_groups[0].columns()[0].uncompressed_size(), 51);

        Ok(())
    }
}
