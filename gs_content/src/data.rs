mod char_data;
mod fields;
mod spell_data;

pub use char_data::*;
pub use fields::MAX_LEVELS;
pub use spell_data::*;
