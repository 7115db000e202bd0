//! One-time output keys (stealth addressing).
//!
//! ## Protocol
//!
//! Recipient publishes a dual-key address `(view_public, spend_public)`.
//!
//! Sender, per output note:
//! 1. Generates an ephemeral key pair `(r, R)` and publishes `R` in the note.
//! 2. Computes the shared secret `ss` from `(r, view_public)`.
//! 3. Derives one-time keys based on the recipient's spend public:
//!    `sign_pk = spend_public + H("sign" || ss) * G` and
//!    `spend_pk = spend_public + H("spend" || ss) * G`.
//!
//! Recipient scanning, per candidate note:
//! 1. Recomputes `ss` from `(view_secret, R)`.
//! 2. Re-derives both expected one-time keys and compares against the note's fields.
//!
//! The one-time secrets are `spend_secret + H(domain || ss)`, so only the spend-key holder
//! can ever authorize a spend; the view key alone can merely recognize and decrypt.

use crate::crypto::ecdh::{derive_shared_secret, SharedSecret};
use crate::crypto::keys::{RistrettoPublic, RistrettoSecret, ViewKey};
use crate::hashes::hash_to_scalar;
use curve25519_dalek_ng::constants::RISTRETTO_BASEPOINT_TABLE;
use subtle::ConstantTimeEq;

/// Domain separator for the one-time signing authorization key.
pub const SIGN_KEY_DOMAIN: &[u8] = b"ConfidentialTx/OneTimeSignKey";
/// Domain separator for the one-time spend destination key.
pub const SPEND_KEY_DOMAIN: &[u8] = b"ConfidentialTx/OneTimeSpendKey";

/// Derive a per-note public key from a shared secret and a base public key:
/// `base + H(domain || ss) * G`. Unlinkable across notes because `ss` is unique per
/// ephemeral key.
pub fn derive_one_time_key(shared_secret: &SharedSecret, domain: &[u8], base: &RistrettoPublic) -> RistrettoPublic {
    let tweak = hash_to_scalar(domain, shared_secret.to_bytes());
    let point = base.as_point() + &tweak * &RISTRETTO_BASEPOINT_TABLE;
    point.into()
}

/// The secret matching [`derive_one_time_key`] for the same domain and shared secret:
/// `base_secret + H(domain || ss)`. Used by the recipient to sign when spending.
pub fn derive_one_time_secret(
    shared_secret: &SharedSecret,
    domain: &[u8],
    base_secret: &RistrettoSecret,
) -> RistrettoSecret {
    let tweak = hash_to_scalar(domain, shared_secret.to_bytes());
    RistrettoSecret::from(base_secret.as_scalar() + tweak)
}

/// Membership test over a note's public fields: recompute the shared secret from the view
/// secret and the note's ephemeral key, re-derive both expected one-time keys, and compare.
///
/// Pure read path, no mutation. The comparison covers both keys in constant time so the
/// result's timing does not reveal where a mismatch occurred.
pub fn is_note_owner(
    ephemeral_pk: &RistrettoPublic,
    sign_pk: &RistrettoPublic,
    spend_pk: &RistrettoPublic,
    view_key: &ViewKey,
) -> bool {
    let shared_secret = derive_shared_secret(&view_key.view_secret, ephemeral_pk);
    let expected_sign = derive_one_time_key(&shared_secret, SIGN_KEY_DOMAIN, &view_key.spend_public);
    let expected_spend = derive_one_time_key(&shared_secret, SPEND_KEY_DOMAIN, &view_key.spend_public);
    let sign_match = expected_sign.as_bytes().ct_eq(sign_pk.as_bytes());
    let spend_match = expected_spend.as_bytes().ct_eq(spend_pk.as_bytes());
    bool::from(sign_match & spend_match)
}
