//! Column chunk statistics: per-physical-type min/max/null-count/distinct-count structs,
//! and their conversion to/from the Thrift [`ParquetStatistics`] wire representation.
use std::any::Any;
use std::sync::Arc;

use parquet_format_safe::Statistics as ParquetStatistics;

use crate::error::Result;
use crate::metadata::ColumnDescriptor;
use crate::schema::types::{ParquetType, PhysicalType};

mod binary;
mod boolean;
mod fixed_len_binary;
mod primitive;

pub use binary::BinaryStatistics;
pub use boolean::BooleanStatistics;
pub use fixed_len_binary::FixedLenStatistics;
pub use primitive::PrimitiveStatistics;

/// Per-physical-type column chunk statistics. Match [`Statistics::physical_type`] and
/// downcast via [`Statistics::as_any`] to recover the concrete struct.
pub trait Statistics: Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn physical_type(&self) -> &PhysicalType;

    fn null_count(&self) -> Option<i64> {
        None
    }
}

/// Deserializes a Thrift [`ParquetStatistics`] into the [`Statistics`] matching `descriptor`'s
/// physical type.
pub fn deserialize_statistics(
    statistics: &ParquetStatistics,
    descriptor: ColumnDescriptor,
) -> Result<Arc<dyn Statistics>> {
    let physical_type = match descriptor.type_() {
        ParquetType::PrimitiveType { physical_type, .. } => *physical_type,
        ParquetType::GroupType { .. } => unreachable!("only primitive columns carry statistics"),
    };
    match physical_type {
        PhysicalType::Boolean => boolean::read(statistics),
        PhysicalType::Int32 => primitive::read::<i32>(statistics),
        PhysicalType::Int64 => primitive::read::<i64>(statistics),
        PhysicalType::Int96 => primitive::read::<[u32; 3]>(statistics),
        PhysicalType::Float => primitive::read::<f32>(statistics),
        PhysicalType::Double => primitive::read::<f64>(statistics),
        PhysicalType::ByteArray => binary::read(statistics, descriptor),
        PhysicalType::FixedLenByteArray(size) => fixed_len_binary::read(statistics, size),
    }
}

/// Serializes a [`Statistics`] back into the Thrift [`ParquetStatistics`] wire representation.
pub fn serialize_statistics(statistics: &dyn Statistics) -> ParquetStatistics {
    match statistics.physical_type() {
        PhysicalType::Boolean => boolean::write(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::Int32 => {
            primitive::write::<i32>(statistics.as_any().downcast_ref().unwrap())
        }
        PhysicalType::Int64 => {
            primitive::write::<i64>(statistics.as_any().downcast_ref().unwrap())
        }
        PhysicalType::Int96 => {
            primitive::write::<[u32; 3]>(statistics.as_any().downcast_ref().unwrap())
        }
        PhysicalType::Float => {
            primitive::write::<f32>(statistics.as_any().downcast_ref().unwrap())
        }
        PhysicalType::Double => {
            primitive::write::<f64>(statistics.as_any().downcast_ref().unwrap())
        }
        PhysicalType::ByteArray => binary::write(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::FixedLenByteArray(_) => {
            fixed_len_binary::write(statistics.as_any().downcast_ref().unwrap())
        }
    }
}
