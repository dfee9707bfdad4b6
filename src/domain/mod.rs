//! Usage: Domain modules (session data model and token inspection).

pub mod login_record;
pub mod token_claims;
