pub mod normalize;
pub mod parser;
pub mod timecalc;

pub use normalize::clean_course_name;
pub use parser::{Layout, classify, parse_raw_text, parse_raw_text_with};
pub use timecalc::{PeriodTime, period_time};
