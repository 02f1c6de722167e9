use colparq::deserialize::DefLevelsDecoder;
use colparq::encoding::hybrid_rle::BitmapIter;
use colparq::error::Result;
use colparq::page::{split_buffer, DataPage};

use crate::read::utils::{deserialize_levels, deserialize_optional};

pub fn page_to_vec(page: &DataPage) -> Result<Vec<Option<bool>>> {
    assert_eq!(page.descriptor().max_rep_level(), 0);

    let (_, _, values_buffer) = split_buffer(page);
    let values = BitmapIter::new(values_buffer, 0, page.num_values());

    if page.descriptor().max_def_level() == 0 {
        return Ok(values.into_iter().map(Some).collect());
    }

    match DefLevelsDecoder::try_new(page)? {
        bitmap @ DefLevelsDecoder::Bitmap(_) => deserialize_optional(bitmap, values.map(Ok)),
        DefLevelsDecoder::Levels(levels, max) => {
            let levels = levels.map(|def| Ok(def? == max));
            deserialize_levels(levels, values.map(Ok))
        }
    }
}
