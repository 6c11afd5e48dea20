//! Core deterministic primitives.
//!
//! Everything here must be bit-for-bit reproducible across server, client
//! and auditor builds; the commit-reveal protocol is only as strong as
//! these primitives are stable.

pub mod crypto;
pub mod geom;
pub mod rng;

// Re-export core types
pub use crypto::{bytes_to_double, hmac_sha256, hmac_sha256_hex, sha256, sha256_hex};
pub use geom::{clamp, dist, fp_round};
pub use rng::GameRng;
