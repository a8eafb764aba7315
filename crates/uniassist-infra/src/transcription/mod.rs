//! Speech-to-text adapters.

pub mod assemblyai;
