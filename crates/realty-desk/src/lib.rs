//! Moderation and map viewport workflows for a real-estate marketplace, plus the REST client
//! used to talk to the listings backend.

pub mod backend;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
