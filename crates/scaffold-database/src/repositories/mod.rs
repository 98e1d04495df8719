//! Repositories that operate on the current scoped session.

pub mod credential;

pub use credential::CredentialRepository;
