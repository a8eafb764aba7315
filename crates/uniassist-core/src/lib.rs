//! Business logic and port definitions for UniAssist.
//!
//! This crate defines the "ports" (repository and external-service traits)
//! that the infrastructure layer implements, plus the services built on top
//! of them. It depends only on `uniassist-types` -- never on
//! `uniassist-infra` or any database/IO crate.

pub mod guest;
pub mod llm;
pub mod mail;
pub mod payment;
pub mod repository;
pub mod service;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;
