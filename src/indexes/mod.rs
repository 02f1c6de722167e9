pub mod deserialize;
mod index;
mod intervals;
mod read;

pub use self::index::{ByteIndex, FixedLenByteIndex, Index, NativeIndex, PageIndex};
pub use intervals::{compute_rows, select_pages, FilteredPage, Interval};
pub use read::*;

pub use crate::parquet_bridge::BoundaryOrder;
pub use parquet_format_safe::PageLocation;
