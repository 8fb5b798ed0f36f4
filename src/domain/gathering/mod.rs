//! Answer normalization for the information-gathering interview.

mod answers;

pub use answers::{is_gender_key, match_short_form, normalize_gender};
