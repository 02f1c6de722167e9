use std::collections::HashSet;
use std::io::Write;

use futures::AsyncWrite;
use parquet_format_safe::{ColumnMetaData, RowGroup, SortingColumn};

use crate::{
    bloom_filter::BloomFilter,
    error::{ParquetError, Result},
    metadata::ColumnDescriptor,
    page::CompressedPage,
};

use super::{
    column_chunk::{write_column_chunk, write_column_chunk_async},
    DynIter, DynStreamingIterator,
};

fn calc_column_file_offset(metadata: &ColumnMetaData) -> i64 {
    metadata
        .dictionary_page_offset
        .filter(|x| x > &0_i64)
        .unwrap_or_else(|| metadata.data_page_offset)
}

/// Every column chunk in a row group must agree on the number of rows it
/// contains. Returns that count, or an error naming the mismatching values.
fn check_num_rows(columns: &[ColumnMetaData]) -> Result<i64> {
    let num_rows = columns.iter().map(|c| c.num_values).collect::<Vec<_>>();
    let distinct = num_rows.iter().collect::<HashSet<_>>();
    if distinct.len() > 1 {
        return Err(general_err!(
            "Every column chunk in a row group MUST have the same number of rows. The columns have rows: {:?}",
            num_rows
        ));
    }
    Ok(num_rows.first().copied().unwrap_or(0))
}

#[allow(clippy::too_many_arguments)]
pub fn write_row_group<
    'a,
    W,
    E, // external error any of the iterators may emit
>(
    writer: &mut W,
    mut offset: u64,
    descriptors: &[ColumnDescriptor],
    columns: DynIter<'a, std::result::Result<DynStreamingIterator<'a, CompressedPage, E>, E>>,
    sorting_columns: Option<Vec<SortingColumn>>,
    ordinal: Option<i32>,
    bloom_filters: Option<Vec<Option<BloomFilter>>>,
) -> Result<(RowGroup, u64)>
where
    W: Write,
    ParquetError: From<E>,
    E: std::error::Error,
{
    let bloom_filters =
        bloom_filters.unwrap_or_else(|| (0..descriptors.len()).map(|_| None).collect());
    let column_iter = descriptors.iter().zip(columns).zip(bloom_filters);

    let initial = offset;
    let columns = column_iter
        .map(|((descriptor, page_iter), bloom_filter)| {
            let (column, size) = write_column_chunk(
                writer,
                offset,
                descriptor,
                page_iter?,
                bloom_filter.as_ref(),
            )?;
            offset += size;
            Ok(column)
        })
        .collect::<Result<Vec<_>>>()?;
    let bytes_written = offset - initial;

    let metadatas = columns
        .iter()
        .map(|c| c.meta_data.as_ref().unwrap().clone())
        .collect::<Vec<_>>();
    let num_rows = check_num_rows(&metadatas)?;

    // compute row group stats
    let file_offest: Option<i64> = match num_rows {
        0 => None,
        _ => Some(calc_column_file_offset(&metadatas[0])),
    };

    let total_byte_size = columns
        .iter()
        .map(|c| c.meta_data.as_ref().unwrap().total_compressed_size)
        .sum();

    Ok((
        RowGroup {
            columns,
            total_byte_size,
            num_rows,
            sorting_columns,
            file_offset: file_offest,
            total_compressed_size: None,
            ordinal,
        },
        bytes_written,
    ))
}

#[allow(clippy::too_many_arguments)]
pub async fn write_row_group_async<
    'a,
    W,
    E, // external error any of the iterators may emit
>(
    writer: &mut W,
    mut offset: u64,
    descriptors: &[ColumnDescriptor],
    columns: DynIter<'a, std::result::Result<DynStreamingIterator<'a, CompressedPage, E>, E>>,
    sorting_columns: Option<Vec<SortingColumn>>,
    ordinal: Option<i32>,
    bloom_filters: Option<Vec<Option<BloomFilter>>>,
) -> Result<(RowGroup, u64)>
where
    W: AsyncWrite + Unpin + Send,
    ParquetError: From<E>,
    E: std::error::Error,
{
    let bloom_filters =
        bloom_filters.unwrap_or_else(|| (0..descriptors.len()).map(|_| None).collect());
    let column_iter = descriptors.iter().zip(columns).zip(bloom_filters);

    let initial = offset;
    let mut columns = vec![];
    for ((descriptor, page_iter), bloom_filter) in column_iter {
        let (spec, size) = write_column_chunk_async(
            writer,
            offset,
            descriptor,
            page_iter?,
            bloom_filter.as_ref(),
        )
        .await?;
        offset += size as u64;
        columns.push(spec);
    }
    let bytes_written = offset - initial;

    let metadatas = columns
        .iter()
        .map(|c| c.meta_data.as_ref().unwrap().clone())
        .collect::<Vec<_>>();
    let num_rows = check_num_rows(&metadatas)?;

    // compute row group stats, consistent with the sync path above
    let file_offest: Option<i64> = match num_rows {
        0 => None,
        _ => Some(calc_column_file_offset(&metadatas[0])),
    };

    let total_byte_size = columns
        .iter()
        .map(|c| c.meta_data.as_ref().unwrap().total_compressed_size)
        .sum();

    Ok((
        RowGroup {
            columns,
            total_byte_size,
            num_rows,
            sorting_columns,
            file_offset: file_offest,
            total_compressed_size: None,
            ordinal,
        },
        bytes_written,
    ))
}
