//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, external-service ports, and
//! business rules. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod auth;
pub mod chat;
pub mod credit;
pub mod hash;
pub mod message;
pub mod otp;
pub mod rate_limit;
pub mod token;
pub mod validation;
