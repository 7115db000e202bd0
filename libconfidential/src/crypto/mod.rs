//! Cryptographic primitives
//!
//! Low-level building blocks of the confidential-transaction core: key material,
//! Diffie-Hellman shared secrets, Pedersen commitments, Bulletproofs range proofs,
//! one-time output keys and the note payload cipher. The types here are ignorant of the
//! transaction object model built on top of them.

pub mod commitment;
pub mod ecdh;
pub mod keys;
pub mod note_cipher;
pub mod range_proof;
pub mod schnorr;
pub mod stealth;
