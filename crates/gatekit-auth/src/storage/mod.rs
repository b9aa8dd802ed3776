//! Storage traits for session-related data.
//!
//! The decision engine never talks to a concrete database or cache; it is
//! handed `Arc<dyn IdentityStore>` and `Arc<dyn RevocationStore>` handles at
//! startup. In-memory implementations live in [`memory`]; the production
//! revocation registry is provided by the `gatekit-auth-redis` crate.

pub mod identity;
pub mod memory;
pub mod revocation;

pub use identity::{Identity, IdentityBuilder, IdentityStore};
pub use memory::{MemoryIdentityStore, MemoryRevocationStore};
pub use revocation::RevocationStore;
