//! Audio data types, format conversion and silence detection

pub mod buffer;
pub mod reformat;
pub mod silence;
pub mod types;

pub use buffer::AudioBuffer;
pub use reformat::reformat;
pub use types::StreamFormat;
