use colparq::encoding::hybrid_rle::encode_bool;
use colparq::error::{Error, Result};
use colparq::metadata::ColumnDescriptor;
use colparq::page::{DataPage, DataPageHeader, DataPageHeaderV1, EncodedPage};
use colparq::statistics::{serialize_statistics, PrimitiveStatistics};
use colparq::types::NativeType;
use colparq::write::WriteOptions;

/// Encodes an array of nullable native values into a V1 data page: PLAIN values, preceded
/// by a bitpacked validity bitmap when the column is optional.
pub fn array_to_page_v1<T: NativeType + PartialOrd>(
    array: &[Option<T>],
    options: &WriteOptions,
    descriptor: &ColumnDescriptor,
) -> Result<EncodedPage> {
    let is_optional = descriptor.max_def_level() > 0;

    let mut buffer = vec![];
    if is_optional {
        encode_bool(&mut buffer, array.iter().map(|x| x.is_some()))
            .map_err(|e| Error::General(e.to_string()))?;
    }
    for value in array.iter().flatten() {
        buffer.extend_from_slice(value.to_le_bytes().as_ref());
    }

    let statistics = if options.write_statistics {
        let null_count = array.iter().filter(|x| x.is_none()).count() as i64;
        let min_value = array
            .iter()
            .flatten()
            .fold(None, |acc: Option<T>, &x| match acc {
                Some(acc) if acc < x => Some(acc),
                _ => Some(x),
            });
        let max_value = array
            .iter()
            .flatten()
            .fold(None, |acc: Option<T>, &x| match acc {
                Some(acc) if acc > x => Some(acc),
                _ => Some(x),
            });
        Some(serialize_statistics(&PrimitiveStatistics::<T> {
            null_count: Some(null_count),
            distinct_count: None,
            min_value,
            max_value,
        }))
    } else {
        None
    };

    let page = DataPage::new(
        DataPageHeader::V1(DataPageHeaderV1 {
            num_values: array.len() as i32,
            encoding: colparq::encoding::Encoding::Plain.into(),
            definition_level_encoding: colparq::encoding::Encoding::Rle.into(),
            repetition_level_encoding: colparq::encoding::Encoding::Rle.into(),
            statistics,
        }),
        buffer,
        None,
        descriptor.clone(),
    );

    Ok(EncodedPage::Data(page))
}
