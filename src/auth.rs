//! Auth-domain identifiers, pending authorization state, and token models.

pub mod id;
pub mod state;
pub mod token;

pub use id::*;
pub use state::*;
pub use token::{access::*, credentials::*, secret::*};
