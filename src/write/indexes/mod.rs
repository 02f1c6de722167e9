mod serialize;
mod write;

pub use serialize::{serialize_column_index, serialize_offset_index};
pub use write::{write_column_index, write_offset_index};
pub use write::{write_column_index_async, write_offset_index_async};
