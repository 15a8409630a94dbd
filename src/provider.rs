//! Provider normalizers: per-provider mapping from raw profile payloads to canonical identities.
//!
//! `normalizer` defines [`ProviderNormalizer`], the capability set every variant implements.
//! `passthrough` is the reference variant for gateways that relay the upstream profile
//! untouched, `mapped` covers providers whose fields only need renaming, and `registry` resolves
//! a normalizer by [`ProviderId`](crate::auth::ProviderId) at identity-building time.

pub mod mapped;
pub mod normalizer;
pub mod passthrough;
pub mod registry;

pub use mapped::*;
pub use normalizer::*;
pub use passthrough::*;
pub use registry::*;
