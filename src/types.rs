use crate::schema::types::PhysicalType;

/// A physical native representation of a Parquet fixed-sized type.
pub trait NativeType: Sized + Copy + std::fmt::Debug {
    type Bytes: AsRef<[u8]> + for<'a> std::convert::TryFrom<&'a [u8]>;

    /// The physical type this Rust type represents on the wire.
    const TYPE: PhysicalType;

    fn to_le_bytes(&self) -> Self::Bytes;

    fn to_be_bytes(&self) -> Self::Bytes;

    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! native {
    ($type:ty, $physical_type:expr) => {
        impl NativeType for $type {
            type Bytes = [u8; std::mem::size_of::<Self>()];

            const TYPE: PhysicalType = $physical_type;

            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            #[inline]
            fn to_be_bytes(&self) -> Self::Bytes {
                Self::to_be_bytes(*self)
            }

            #[inline]
            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                Self::from_le_bytes(bytes)
            }

            #[inline]
            fn from_be_bytes(bytes: Self::Bytes) -> Self {
                Self::from_be_bytes(bytes)
            }
        }
    };
}

native!(i32, PhysicalType::Int32);
native!(i64, PhysicalType::Int64);
native!(f32, PhysicalType::Float);
native!(f64, PhysicalType::Double);

impl NativeType for [u32; 3] {
    type Bytes = [u8; 12];

    const TYPE: PhysicalType = PhysicalType::Int96;

    #[inline]
    fn to_le_bytes(&self) -> Self::Bytes {
        let mut bytes = [0u8; 12];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    #[inline]
    fn to_be_bytes(&self) -> Self::Bytes {
        let mut bytes = [0u8; 12];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    #[inline]
    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        let mut words = [0u32; 3];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        words
    }

    #[inline]
    fn from_be_bytes(bytes: Self::Bytes) -> Self {
        let mut words = [0u32; 3];
        for (word, chunk) in words.iter_mut().rev().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes(chunk.try_into().unwrap());
        }
        words
    }
}

const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
const NANOSECONDS_PER_DAY: i64 = 86_400_000_000_000;

/// Converts an INT96 timestamp (12 bytes: 8-byte nanoseconds-of-day, 4-byte Julian day) into
/// nanoseconds since the Unix epoch.
pub fn int96_to_i64_ns(value: [u32; 3]) -> i64 {
    let nanoseconds = (value[1] as i64) << 32 | value[0] as i64;
    let julian_day = value[2] as i64;
    (julian_day - JULIAN_DAY_OF_EPOCH) * NANOSECONDS_PER_DAY + nanoseconds
}

/// Decodes a PLAIN-encoded, little-endian value of `T` from the start of `chunk`.
///
/// # Panics
/// Panics if `chunk` is shorter than `size_of::<T>()`.
pub fn decode<T: NativeType>(chunk: &[u8]) -> T {
    let bytes = chunk[..std::mem::size_of::<T>()]
        .try_into()
        .unwrap_or_else(|_| unreachable!());
    T::from_le_bytes(bytes)
}
