//! DataForSEO on-page API adapter for the analysis client port.

mod client;
mod wire;

pub use client::{API_BASE_URL, DataForSeoClient};
