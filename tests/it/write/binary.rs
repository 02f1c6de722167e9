use colparq::encoding::hybrid_rle::encode_bool;
use colparq::error::{Error, Result};
use colparq::metadata::ColumnDescriptor;
use colparq::page::{DataPage, DataPageHeader, DataPageHeaderV1, EncodedPage};
use colparq::statistics::{serialize_statistics, BinaryStatistics};
use colparq::write::WriteOptions;

/// Encodes an array of nullable byte arrays into a V1 data page: PLAIN-encoded (4-byte
/// little-endian length prefix, then the bytes), preceded by a validity bitmap when optional.
pub fn array_to_page_v1(
    array: &[Option<Vec<u8>>],
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
        buffer.extend_from_slice(&(value.len() as i32).to_le_bytes());
        buffer.extend_from_slice(value);
    }

    let statistics = if options.write_statistics {
        let null_count = array.iter().filter(|x| x.is_none()).count() as i64;
        let min_value = array
            .iter()
            .flatten()
            .fold(None, |acc: Option<Vec<u8>>, x| match acc {
                Some(acc) if acc <= *x => Some(acc),
                _ => Some(x.clone()),
            });
        let max_value = array
            .iter()
            .flatten()
            .fold(None, |acc: Option<Vec<u8>>, x| match acc {
                Some(acc) if acc >= *x => Some(acc),
                _ => Some(x.clone()),
            });
        Some(serialize_statistics(&BinaryStatistics {
            descriptor: descriptor.clone(),
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
