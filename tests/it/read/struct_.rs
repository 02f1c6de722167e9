use colparq::encoding::hybrid_rle::HybridRleDecoder;
use colparq::page::{split_buffer, DataPage};
use colparq::read::levels::get_bit_width;

pub fn extend_validity(val: &mut Vec<bool>, page: &DataPage) {
    let (_, def_levels, _) = split_buffer(page);
    let length = page.num_values();

    if page.descriptor().max_def_level() == 0 {
        return;
    }

    let def_levels =
        HybridRleDecoder::new(def_levels, get_bit_width(page.descriptor().max_def_level()), length);

    val.extend(def_levels.map(|x| x != 0));
}
