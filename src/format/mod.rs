//! Record formatting: inner serializer, key extraction and patterns

pub mod extract;
pub mod placeholder;
pub mod serializer;
pub mod timestamp;

pub use extract::{json_key_value, text_key_value};
pub use placeholder::{
    build_output, pattern_for_level, placeholder_values, placeholders, remove_placeholder_chars,
    PlaceholderValues, ValueDelimiters, DEFAULT_DEBUG_FORMAT, DEFAULT_ERROR_FORMAT, DEFAULT_FORMAT,
    DEFAULT_PERF_FORMAT, PERF_PLACEHOLDER,
};
pub use serializer::{Encoding, Serializer};
pub use timestamp::TimestampFormat;
