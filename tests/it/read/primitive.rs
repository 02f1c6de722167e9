use colparq::{
    deserialize::{dict_indices_decoder, DefLevelsDecoder},
    encoding::Encoding,
    error::Error,
    page::{split_buffer, DataPage, PrimitivePageDict},
    types::{self, NativeType},
};

use super::utils::deserialize_optional;

fn native_values_iter<T: NativeType>(page: &DataPage) -> impl Iterator<Item = T> + '_ {
    let (_, _, values) = split_buffer(page);
    values
        .chunks_exact(std::mem::size_of::<T>())
        .map(types::decode::<T>)
}

pub fn page_to_vec<T: NativeType>(
    page: &DataPage,
    dict: Option<&Vec<T>>,
) -> Result<Vec<Option<T>>, Error> {
    assert_eq!(page.descriptor().max_rep_level(), 0);

    let is_optional = page.descriptor().max_def_level() > 0;
    let is_dictionary = matches!(page.encoding(), Encoding::PlainDictionary | Encoding::RleDictionary);

    if is_dictionary {
        let dict = dict
            .map(|d| d.as_slice())
            .or_else(|| {
                page.dictionary_page()
                    .and_then(|d| d.as_any().downcast_ref::<PrimitivePageDict<T>>())
                    .map(|d| d.values())
            })
            .expect("dictionary-encoded page without a dictionary");
        let indexes = dict_indices_decoder(page).map(|x| Ok(dict[x as usize]));
        if is_optional {
            let validity = DefLevelsDecoder::try_new(page)?;
            deserialize_optional(validity, indexes)
        } else {
            indexes.collect()
        }
    } else {
        let values = native_values_iter::<T>(page);
        if is_optional {
            let validity = DefLevelsDecoder::try_new(page)?;
            deserialize_optional(validity, values.map(Ok))
        } else {
            Ok(values.map(Some).collect())
        }
    }
}
