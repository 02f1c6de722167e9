use colparq::deserialize::{dict_indices_decoder, DefLevelsDecoder};
use colparq::encoding::Encoding;
use colparq::error::Error;
use colparq::page::{split_buffer, DataPage, FixedLenByteArrayPageDict};
use colparq::schema::types::PhysicalType;

use super::utils::deserialize_optional;

pub fn page_to_vec(page: &DataPage) -> Result<Vec<Option<Vec<u8>>>, Error> {
    assert_eq!(page.descriptor().max_rep_level(), 0);

    let size = match page.descriptor().type_().physical_type() {
        PhysicalType::FixedLenByteArray(size) => size as usize,
        _ => panic!("fixed_binary::page_to_vec called on a non fixed-length column"),
    };

    let is_optional = page.descriptor().max_def_level() > 0;
    let is_dictionary =
        matches!(page.encoding(), Encoding::PlainDictionary | Encoding::RleDictionary);

    if is_dictionary {
        let dict = page
            .dictionary_page()
            .and_then(|d| d.as_any().downcast_ref::<FixedLenByteArrayPageDict>())
            .expect("dictionary-encoded page without a dictionary");
        let indexes = dict_indices_decoder(page)
            .map(|x| Ok(dict.values()[x as usize * size..(x as usize + 1) * size].to_vec()));
        if is_optional {
            let validity = DefLevelsDecoder::try_new(page)?;
            deserialize_optional(validity, indexes)
        } else {
            indexes.collect()
        }
    } else {
        let (_, _, values) = split_buffer(page);
        let values = values.chunks_exact(size);
        if is_optional {
            let validity = DefLevelsDecoder::try_new(page)?;
            deserialize_optional(validity, values.map(|x| Ok(x.to_vec())))
        } else {
            Ok(values.map(|x| Some(x.to_vec())).collect())
        }
    }
}
