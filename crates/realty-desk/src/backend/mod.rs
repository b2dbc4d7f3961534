//! HTTP access to the listings backend.

mod client;
mod error;
mod views;

pub use client::BackendClient;
pub use error::TransportError;
pub use views::ViewPing;
