//! Endpoint module - configured remote hosts

mod registry;
mod types;

pub use registry::{parse_enabled, EndpointRegistry};
pub use types::{Endpoint, EndpointParseError, DEFAULT_SSH_PORT, ENDPOINT_PREFIX};
