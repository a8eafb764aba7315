//! Infrastructure layer for UniAssist.
//!
//! Contains implementations of the ports defined in `uniassist-core`:
//! SQLite storage, password hashing and JWT issuing, and the HTTP/SMTP
//! adapters for Groq, AssemblyAI, Stripe, the knowledge base, and mail.

pub mod config;
pub mod crypto;
pub mod knowledge;
pub mod llm;
pub mod mail;
pub mod payment;
pub mod sqlite;
pub mod transcription;
