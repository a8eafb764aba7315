//! Parsing of `data:audio/<type>;base64,<payload>` URLs sent by the client.
//!
//! The decoded bytes are kept in memory and handed straight to the
//! transcriber; nothing is written to disk.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Recordings smaller than this carry no usable speech.
pub const MIN_AUDIO_BYTES: usize = 1024;

/// Largest recording accepted, after base64 decoding.
pub const MAX_AUDIO_BYTES: usize = 5 * 1024 * 1024;

const DATA_URL_PREFIX: &str = "data:audio/";

/// Container format inferred from the data URL's MIME subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    M4a,
    Webm,
}

impl AudioFormat {
    /// Browsers report many variants (`x-wav`, `mpeg`, `webm;codecs=opus`),
    /// so match on substrings and fall back to webm.
    pub fn from_subtype(subtype: &str) -> Self {
        let subtype = subtype.to_ascii_lowercase();
        if subtype.contains("wav") {
            AudioFormat::Wav
        } else if subtype.contains("mp3") || subtype.contains("mpeg") {
            AudioFormat::Mp3
        } else if subtype.contains("ogg") {
            AudioFormat::Ogg
        } else if subtype.contains("m4a") {
            AudioFormat::M4a
        } else {
            AudioFormat::Webm
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::M4a => "m4a",
            AudioFormat::Webm => "webm",
        }
    }
}

/// A decoded recording ready for transcription.
#[derive(Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    /// Full MIME type as sent, e.g. `audio/webm`.
    pub mime: String,
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("len", &self.bytes.len())
            .field("format", &self.format)
            .field("mime", &self.mime)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("Audio data is required")]
    Missing,

    #[error("Invalid audio format. Expected base64 audio data.")]
    NotAudioDataUrl,

    #[error("Audio data is not valid base64.")]
    InvalidBase64,

    #[error("Audio file is too small. Please speak longer (at least 2-3 seconds).")]
    TooSmall,

    #[error("Audio file is too large. Maximum size is 5MB.")]
    TooLarge,
}

/// Decode and validate an audio data URL.
pub fn parse_audio_data_url(url: &str) -> Result<AudioClip, AudioError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AudioError::Missing);
    }
    if !url.starts_with(DATA_URL_PREFIX) {
        return Err(AudioError::NotAudioDataUrl);
    }

    let (header, payload) = url.split_once(',').ok_or(AudioError::NotAudioDataUrl)?;
    let mut params = header["data:".len()..].split(';');
    let mime = params.next().unwrap_or_default().to_string();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(AudioError::NotAudioDataUrl);
    }

    let format = AudioFormat::from_subtype(mime.strip_prefix("audio/").unwrap_or_default());

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AudioError::InvalidBase64)?;

    if bytes.len() < MIN_AUDIO_BYTES {
        return Err(AudioError::TooSmall);
    }
    if bytes.len() > MAX_AUDIO_BYTES {
        return Err(AudioError::TooLarge);
    }

    Ok(AudioClip {
        bytes,
        format,
        mime,
    })
}

#[cfg(test)]
pub(crate) fn data_url(subtype: &str, len: usize) -> String {
    format!("data:audio/{subtype};base64,{}", STANDARD.encode(vec![7u8; len]))
}
