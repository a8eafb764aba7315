//! Voice message support: audio data-URL parsing and the speech-to-text port.

pub mod audio;
pub mod transcriber;
