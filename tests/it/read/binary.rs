use colparq::deserialize::{dict_indices_decoder, DefLevelsDecoder};
use colparq::encoding::{get_length, Encoding};
use colparq::error::Error;
use colparq::page::{split_buffer, BinaryPageDict, DataPage};

use super::utils::deserialize_optional;

/// An iterator over PLAIN-encoded byte arrays: each value is a 4-byte little-endian length
/// prefix followed by that many bytes.
struct BinaryIter<'a> {
    values: &'a [u8],
}

impl<'a> Iterator for BinaryIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() {
            return None;
        }
        let length = get_length(self.values) as usize;
        self.values = &self.values[4..];
        let (value, remaining) = self.values.split_at(length);
        self.values = remaining;
        Some(value)
    }
}

pub fn page_to_vec(page: &DataPage) -> Result<Vec<Option<Vec<u8>>>, Error> {
    assert_eq!(page.descriptor().max_rep_level(), 0);

    let is_optional = page.descriptor().max_def_level() > 0;
    let is_dictionary =
        matches!(page.encoding(), Encoding::PlainDictionary | Encoding::RleDictionary);

    if is_dictionary {
        let dict = page
            .dictionary_page()
            .and_then(|d| d.as_any().downcast_ref::<BinaryPageDict>())
            .expect("dictionary-encoded page without a dictionary");
        let indexes =
            dict_indices_decoder(page).map(|x| dict.value(x as usize).map(|v| v.to_vec()));
        if is_optional {
            let validity = DefLevelsDecoder::try_new(page)?;
            deserialize_optional(validity, indexes)
        } else {
            indexes.collect()
        }
    } else {
        let (_, _, values) = split_buffer(page);
        let values = BinaryIter { values };
        if is_optional {
            let validity = DefLevelsDecoder::try_new(page)?;
            deserialize_optional(validity, values.map(|x| Ok(x.to_vec())))
        } else {
            Ok(values.map(|x| Some(x.to_vec())).collect())
        }
    }
}
