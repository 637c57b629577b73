pub mod course;
pub mod settings;
pub mod share;
pub mod term;

pub use course::{Assignment, AttendanceRecord, AttendanceStatus, Course, Weekday};
pub use settings::{DurationOverrides, TimetableSettings};
pub use share::{
    CompactCourse, SharePayload, SharePayloadV2, courses_from_payload, decode_share, encode_share,
};
pub use term::{Term, sort_terms_for_display};
