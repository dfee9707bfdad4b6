//! Usage: Login flows (endpoints, request building, response classification, orchestration).

pub mod client;
pub mod endpoints;
pub mod platform;
mod protocol;
pub mod redirect;
pub mod request;
pub mod response;
pub mod transport;
