//! Usage: Infrastructure adapters (settings file, login record persistence, launcher args).

pub(crate) mod atomic_file;
pub mod launcher;
pub mod login_store;
pub mod settings;
