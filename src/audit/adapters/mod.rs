//! Adapter implementations of the audit ports.

pub mod dataforseo;
pub mod feed;
pub mod memory;
pub mod postgres;

pub use feed::TaskChangeHub;
