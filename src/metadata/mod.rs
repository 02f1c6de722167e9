mod column_chunk_metadata;
mod column_descriptor;
mod column_order;
mod column_path;
mod file_metadata;
mod parquet_metadata;
mod row_metadata;
mod schema_descriptor;
mod sort;

pub use column_chunk_metadata::ColumnChunkMetaData;
pub use column_descriptor::{ColumnDescriptor, Descriptor};
pub use column_order::ColumnOrder;
pub use column_path::ColumnPath;
pub use file_metadata::FileMetaData;
pub use parquet_metadata::ParquetMetaData;
pub use row_metadata::RowGroupMetaData;
pub use schema_descriptor::SchemaDescriptor;
pub use sort::*;
