//! HTTP transport for the REST surface

mod client;

pub use client::{extract_error_message, NumberPlayClient};
