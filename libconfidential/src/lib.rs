//! Cryptographic core of a confidential transaction scheme: Pedersen amount
//! commitments with Bulletproof range proofs, dual-key stealth addressing, authenticated
//! note encryption, and a transaction builder/verifier, all reachable through a
//! byte-oriented boundary.

pub mod boundary;
pub mod crypto;
pub mod error;
pub mod hashes;
pub mod helpers;
pub mod note;
pub mod transaction;
