use std::io::Cursor;

use parquet_format_safe::{thrift::protocol::TCompactInputProtocol, ColumnIndex};

use crate::error::ParquetError;
use crate::schema::types::PhysicalType;

use super::{ByteIndex, FixedLenByteIndex, Index, NativeIndex};

/// Deserializes a single column's raw `ColumnIndex` thrift bytes into an [`Index`].
///
/// Returns `None` for `Boolean` columns, which carry no column index.
pub fn deserialize(
    data: &[u8],
    physical_type: PhysicalType,
) -> Result<Option<Box<dyn Index>>, ParquetError> {
    let mut d = Cursor::new(data);
    let mut prot = TCompactInputProtocol::new(&mut d);

    let index = ColumnIndex::read_from_in_protocol(&mut prot)?;

    let index = match physical_type {
        PhysicalType::Boolean => return Ok(None),
        PhysicalType::Int32 => Box::new(NativeIndex::<i32>::try_from(index)?) as Box<dyn Index>,
        PhysicalType::Int64 => Box::new(NativeIndex::<i64>::try_from(index)?) as _,
        PhysicalType::Int96 => Box::new(NativeIndex::<[u32; 3]>::try_from(index)?) as _,
        PhysicalType::Float => Box::new(NativeIndex::<f32>::try_from(index)?),
        PhysicalType::Double => Box::new(NativeIndex::<f64>::try_from(index)?),
        PhysicalType::ByteArray => Box::new(ByteIndex::try_from(index)?),
        PhysicalType::FixedLenByteArray(size) => {
            Box::new(FixedLenByteIndex::try_from((index, size))?)
        }
    };

    Ok(Some(index))
}
