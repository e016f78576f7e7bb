pub mod dictionary;
pub mod session;
pub mod shared;
pub mod tts;
