//! Flow orchestrators built on the request pipeline.
//!
//! - [`auth_code`]: Authorization Code exchange with CSRF state validation.
//! - [`refresh`]: refresh-token grant on an existing [`AccessToken`](crate::auth::AccessToken).
//! - [`callback`]: host-side glue that turns a gateway callback into a canonical identity.

pub mod auth_code;
pub mod callback;
pub mod refresh;

mod common;

pub use auth_code::*;
pub use callback::*;
