#[allow(clippy::module_inception)]
pub mod auth;
pub mod capability;
pub mod jwt;
