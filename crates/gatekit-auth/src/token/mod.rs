//! Token signing and verification.
//!
//! Both credential kinds are HMAC-signed JWTs over a single process-wide
//! secret: a short-lived, self-contained access token carrying identity
//! claims, and a long-lived refresh token carrying only the subject id.

pub mod codec;

pub use codec::{AccessClaims, RefreshClaims, TokenCodec, VerifyError};
