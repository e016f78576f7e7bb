pub mod filename;

pub use filename::{sanitize_filename, DEFAULT_MAX_LENGTH, PLACEHOLDER_NAME};
