//! Document type detection.

pub mod classifier;
pub mod keywords;

pub use classifier::{Classification, DocumentClassifier, UnknownReason, DEFAULT_MIN_TEXT_LENGTH};
pub use keywords::KeywordProfile;
