use futures::stream::Stream;
use futures::AsyncWrite;
use futures::TryStreamExt;

use std::error::Error;

use parquet_format_safe::{FileMetaData, RowGroup};

pub use crate::metadata::KeyValue;
use crate::{
    error::{ParquetError, Result},
    metadata::SchemaDescriptor,
};

use super::file::{end_file_async, start_file_async};
use super::row_group::write_row_group_async;
use super::{RowGroupIter, WriteOptions};

pub async fn write_stream<'a, W, S, E>(
    writer: &mut W,
    row_groups: S,
    schema: SchemaDescriptor,
    options: WriteOptions,
    created_by: Option<String>,
    key_value_metadata: Option<Vec<KeyValue>>,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
    S: Stream<Item = std::result::Result<RowGroupIter<'a, E>, E>>,
    E: Error + Send + Sync + 'static,
{
    let mut offset = start_file_async(writer).await?;

    futures::pin_mut!(row_groups);
    let mut stored = Vec::<RowGroup>::new();
    while let Some(row_group) = row_groups.try_next().await.map_err(ParquetError::from_external_error)? {
        let (group, size) = write_row_group_async(
            writer,
            offset,
            schema.columns(),
            row_group,
            options.sorting.clone(),
            Some(stored.len() as i32),
            None,
        )
        .await?;
        offset += size;
        stored.push(group);
    }

    // compute file stats
    let num_rows = stored.iter().map(|group| group.num_rows).sum();

    let metadata = FileMetaData::new(
        options.version.into(),
        schema.into_thrift()?,
        num_rows,
        stored,
        key_value_metadata,
        created_by,
        None,
        None,
        None,
    );

    end_file_async(writer, metadata).await?;
    Ok(())
}

/// An interface to write a parquet file asynchronously, mirroring [`super::FileWriter`]'s
/// start/write/end shape but over an [`AsyncWrite`] sink.
pub struct FileStreamer<W: AsyncWrite + Unpin + Send> {
    writer: W,
    schema: SchemaDescriptor,
    options: WriteOptions,
    created_by: Option<String>,

    offset: u64,
    row_groups: Vec<RowGroup>,
}

impl<W: AsyncWrite + Unpin + Send> FileStreamer<W> {
    /// Returns a new [`FileStreamer`].
    pub fn new(
        writer: W,
        schema: SchemaDescriptor,
        options: WriteOptions,
        created_by: Option<String>,
    ) -> Self {
        Self {
            writer,
            schema,
            options,
            created_by,
            offset: 0,
            row_groups: vec![],
        }
    }

    /// The options assigned to the file
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// The [`SchemaDescriptor`] assigned to this file
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Writes the header of the file.
    pub async fn start(&mut self) -> Result<()> {
        self.offset = start_file_async(&mut self.writer).await?;
        Ok(())
    }

    /// Writes a row group to the file.
    pub async fn write<'a, E>(&mut self, row_group: RowGroupIter<'a, E>) -> Result<()>
    where
        ParquetError: From<E>,
        E: std::error::Error,
    {
        if self.offset == 0 {
            return Err(ParquetError::General(
                "You must call `start` before writing the first row group".to_string(),
            ));
        }
        let (group, size) = write_row_group_async(
            &mut self.writer,
            self.offset,
            self.schema.columns(),
            row_group,
            self.options.sorting.clone(),
            Some(self.row_groups.len() as i32),
            None,
        )
        .await?;
        self.offset += size;
        self.row_groups.push(group);
        Ok(())
    }

    /// Writes the footer of the parquet file. Returns the total size of the file and the
    /// underlying writer.
    pub async fn end(mut self, key_value_metadata: Option<Vec<KeyValue>>) -> Result<(u64, W)> {
        let num_rows = self.row_groups.iter().map(|group| group.num_rows).sum();

        let metadata = FileMetaData::new(
            self.options.version.into(),
            self.schema.into_thrift()?,
            num_rows,
            self.row_groups,
            key_value_metadata,
            self.created_by,
            None,
            None,
            None,
        );

        let len = end_file_async(&mut self.writer, metadata).await?;
        Ok((self.offset + len, self.writer))
    }
}
