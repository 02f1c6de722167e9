use crate::error::Result;

/// A converted type that annotates a group (nested) schema node.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupConvertedType {
    /// a map is converted as an optional field containing a repeated key/value pair
    Map,
    /// a key/value pair is converted into a group of two fields
    MapKeyValue,
    /// a list is converted into an optional field containing a repeated field for its
    /// values
    List,
}

/// A converted type that annotates a primitive schema node.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveConvertedType {
    Utf8,
    /// an enum is converted into a binary field
    Enum,
    /// A decimal value.
    ///
    /// This may be used to annotate binary or fixed primitive types. The
    /// underlying byte array stores the unscaled value encoded as two's
    /// complement using big-endian byte order (the most significant byte is the
    /// zeroth element). The value of the decimal is the value * 10^{-scale}.
    ///
    /// This must be accompanied by a (maximum) precision and a scale in the
    /// SchemaElement. The precision specifies the number of digits in the decimal
    /// and the scale stores the location of the decimal point. For example 1.23
    /// would have precision 3 (3 total digits) and scale 2 (the decimal point is
    /// 2 digits over).
    // (precision, scale)
    Decimal(i32, i32),
    /// A Date
    ///
    /// Stored as days since Unix epoch, encoded as the INT32 physical type.
    ///
    Date,
    /// A time
    ///
    /// The total number of milliseconds since midnight.  The value is stored
    /// as an INT32 physical type.
    TimeMillis,
    /// A time.
    ///
    /// The total number of microseconds since midnight.  The value is stored as
    /// an INT64 physical type.
    TimeMicros,
    /// A date/time combination
    ///
    /// Date and time recorded as milliseconds since the Unix epoch.  Recorded as
    /// a physical type of INT64.
    TimestampMillis,
    /// A date/time combination
    ///
    /// Date and time recorded as microseconds since the Unix epoch.  The value is
    /// stored as an INT64 physical type.
    TimestampMicros,
    /// An unsigned integer value.
    ///
    /// The number describes the maximum number of meainful data bits in
    /// the stored value. 8, 16 and 32 bit values are stored using the
    /// INT32 physical type.  64 bit values are stored using the INT64
    /// physical type.
    ///
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    /// A signed integer value.
    ///
    /// The number describes the maximum number of meainful data bits in
    /// the stored value. 8, 16 and 32 bit values are stored using the
    /// INT32 physical type.  64 bit values are stored using the INT64
    /// physical type.
    ///
    Int8,
    Int16,
    Int32,
    Int64,
    /// An embedded JSON document
    ///
    /// A JSON document embedded within a single UTF8 column.
    Json,
    /// An embedded BSON document
    ///
    /// A BSON document embedded within a single BINARY column.
    Bson,
    /// An interval of time
    ///
    /// This type annotates data stored as a FIXED_LEN_BYTE_ARRAY of length 12
    /// This data is composed of three separate little endian unsigned
    /// integers.  Each stores a component of a duration of time.  The first
    /// integer identifies the number of months associated with the duration,
    /// the second identifies the number of days associated with the duration
    /// and the third identifies the number of milliseconds associated with
    /// the provided duration.  This duration of time is independent of any
    /// particular timezone or date.
    Interval,
}

pub fn converted_to_group_converted(
    ty: &parquet_format_safe::ConvertedType,
) -> Result<GroupConvertedType> {
    use parquet_format_safe::ConvertedType::*;
    Ok(match ty {
        Map => GroupConvertedType::Map,
        MapKeyValue => GroupConvertedType::MapKeyValue,
        List => GroupConvertedType::List,
        other => {
            return Err(general_err!(
                "{:?} is not a valid converted type for a group node",
                other
            ))
        }
    })
}

pub fn converted_to_primitive_converted(
    ty: &parquet_format_safe::ConvertedType,
    maybe_decimal: Option<(i32, i32)>,
) -> Result<PrimitiveConvertedType> {
    use parquet_format_safe::ConvertedType::*;
    Ok(match ty {
        Utf8 => PrimitiveConvertedType::Utf8,
        Enum => PrimitiveConvertedType::Enum,
        Decimal => {
            let (precision, scale) = maybe_decimal.ok_or_else(|| {
                general_err!("DECIMAL converted type requires a precision and scale")
            })?;
            PrimitiveConvertedType::Decimal(precision, scale)
        }
        Date => PrimitiveConvertedType::Date,
        TimeMillis => PrimitiveConvertedType::TimeMillis,
        TimeMicros => PrimitiveConvertedType::TimeMicros,
        TimestampMillis => PrimitiveConvertedType::TimestampMillis,
        TimestampMicros => PrimitiveConvertedType::TimestampMicros,
        Uint8 => PrimitiveConvertedType::Uint8,
        Uint16 => PrimitiveConvertedType::Uint16,
        Uint32 => PrimitiveConvertedType::Uint32,
        Uint64 => PrimitiveConvertedType::Uint64,
        Int8 => PrimitiveConvertedType::Int8,
        Int16 => PrimitiveConvertedType::Int16,
        Int32 => PrimitiveConvertedType::Int32,
        Int64 => PrimitiveConvertedType::Int64,
        Json => PrimitiveConvertedType::Json,
        Bson => PrimitiveConvertedType::Bson,
        Interval => PrimitiveConvertedType::Interval,
        other => {
            return Err(general_err!(
                "{:?} is not a valid converted type for a primitive node",
                other
            ))
        }
    })
}

pub fn group_converted_converted_to(ty: &GroupConvertedType) -> parquet_format_safe::ConvertedType {
    match ty {
        GroupConvertedType::Map => parquet_format_safe::ConvertedType::Map,
        GroupConvertedType::MapKeyValue => parquet_format_safe::ConvertedType::MapKeyValue,
        GroupConvertedType::List => parquet_format_safe::ConvertedType::List,
    }
}

pub fn primitive_converted_to_converted(
    ty: &PrimitiveConvertedType,
) -> (parquet_format_safe::ConvertedType, Option<(i32, i32)>) {
    use parquet_format_safe::ConvertedType;
    match ty {
        PrimitiveConvertedType::Utf8 => (ConvertedType::Utf8, None),
        PrimitiveConvertedType::Enum => (ConvertedType::Enum, None),
        PrimitiveConvertedType::Decimal(precision, scale) => {
            (ConvertedType::Decimal, Some((*precision, *scale)))
        }
        PrimitiveConvertedType::Date => (ConvertedType::Date, None),
        PrimitiveConvertedType::TimeMillis => (ConvertedType::TimeMillis, None),
        PrimitiveConvertedType::TimeMicros => (ConvertedType::TimeMicros, None),
        PrimitiveConvertedType::TimestampMillis => (ConvertedType::TimestampMillis, None),
        PrimitiveConvertedType::TimestampMicros => (ConvertedType::TimestampMicros, None),
        PrimitiveConvertedType::Uint8 => (ConvertedType::Uint8, None),
        PrimitiveConvertedType::Uint16 => (ConvertedType::Uint16, None),
        PrimitiveConvertedType::Uint32 => (ConvertedType::Uint32, None),
        PrimitiveConvertedType::Uint64 => (ConvertedType::Uint64, None),
        PrimitiveConvertedType::Int8 => (ConvertedType::Int8, None),
        PrimitiveConvertedType::Int16 => (ConvertedType::Int16, None),
        PrimitiveConvertedType::Int32 => (ConvertedType::Int32, None),
        PrimitiveConvertedType::Int64 => (ConvertedType::Int64, None),
        PrimitiveConvertedType::Json => (ConvertedType::Json, None),
        PrimitiveConvertedType::Bson => (ConvertedType::Bson, None),
        PrimitiveConvertedType::Interval => (ConvertedType::Interval, None),
    }
}
