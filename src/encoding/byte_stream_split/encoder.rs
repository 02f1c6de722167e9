use crate::types::NativeType;

/// Encodes `data` according to [Byte Stream Split](https://github.com/apache/parquet-format/blob/master/Encodings.md#byte-stream-split-byte_stream_split--9).
/// Each of the `size_of::<T>()` byte lanes is written as a contiguous stream, so that
/// columns of floats compress better: neighbouring values tend to share high-order bytes.
pub fn encode<T: NativeType>(data: &[T], buffer: &mut Vec<u8>) {
    let element_size = std::mem::size_of::<T>();
    let num_elements = data.len();
    let total_length = element_size * num_elements;
    buffer.clear();
    buffer.resize(total_length, 0);

    for (i, v) in data.iter().enumerate() {
        let value_bytes = v.to_le_bytes();
        let value_bytes_ref = value_bytes.as_ref();
        for (n, byte) in value_bytes_ref.iter().enumerate() {
            buffer[(num_elements * n) + i] = *byte;
        }
    }
}
