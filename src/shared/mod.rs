//! Usage: Cross-cutting helpers shared by the login flows and infra layers.

pub mod error;
pub mod json_fields;
pub(crate) mod mutex_ext;
pub(crate) mod security;
