//! Fleek API Implementation
//!
//! GraphQL client for the deploy-status port.

mod client;

pub use client::{FleekClient, FleekClientConfig, DEFAULT_API_URL};
