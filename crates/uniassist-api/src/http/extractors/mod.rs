//! Request extractors: bearer-token auth, JSON bodies with envelope
//! rejections, and the client key used by the rate limiter.

pub mod auth;
pub mod client;
pub mod json;
