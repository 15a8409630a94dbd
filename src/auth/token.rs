//! Access tokens, their secrets, and the credentials they expose.

pub mod access;
pub mod credentials;
pub mod secret;
