//! Authenticated encryption of a note's hidden amount and blinding factor.
//!
//! The keystream is deterministic in the shared secret: both plaintext scalars are masked
//! by adding domain-separated hash-derived scalars, the same construction the sender and
//! recipient can each compute from their side of the Diffie-Hellman exchange. A 16-byte
//! tag over the ciphertext makes a wrong-key decrypt distinguishable from a successful
//! decrypt of garbage.

use crate::crypto::ecdh::SharedSecret;
use crate::hashes::{hash_to_scalar, keyed_tag};
use curve25519_dalek_ng::scalar::Scalar;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

const AMOUNT_MASK_DOMAIN: &[u8] = b"ConfidentialTx/AmountMask";
const BLINDING_MASK_DOMAIN: &[u8] = b"ConfidentialTx/BlindingMask";
const TAG_DOMAIN: &[u8] = b"ConfidentialTx/PayloadTag";

/// Serialized payload length: two masked scalars plus the tag.
pub const PAYLOAD_LEN: usize = 80;

/// Fixed-width ciphertext of `(amount, blinding_factor)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedPayload {
    amount_ct: [u8; 32],
    blinding_ct: [u8; 32],
    tag: [u8; 16],
}

impl EncryptedPayload {
    pub fn to_bytes(&self) -> [u8; PAYLOAD_LEN] {
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[..32].copy_from_slice(&self.amount_ct);
        bytes[32..64].copy_from_slice(&self.blinding_ct);
        bytes[64..].copy_from_slice(&self.tag);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() != PAYLOAD_LEN {
            return Err(CipherError::InvalidLength);
        }
        let mut amount_ct = [0u8; 32];
        amount_ct.copy_from_slice(&bytes[..32]);
        let mut blinding_ct = [0u8; 32];
        blinding_ct.copy_from_slice(&bytes[32..64]);
        let mut tag = [0u8; 16];
        tag.copy_from_slice(&bytes[64..]);
        Ok(Self { amount_ct, blinding_ct, tag })
    }
}

/// Encrypt an amount and its blinding factor under the shared secret.
pub fn encrypt_note(amount: u64, blinding: &Scalar, shared_secret: &SharedSecret) -> EncryptedPayload {
    let mut amount_mask = hash_to_scalar(AMOUNT_MASK_DOMAIN, shared_secret.to_bytes());
    let mut blinding_mask = hash_to_scalar(BLINDING_MASK_DOMAIN, shared_secret.to_bytes());
    let amount_ct = (Scalar::from(amount) + amount_mask).to_bytes();
    let blinding_ct = (blinding + blinding_mask).to_bytes();
    amount_mask.zeroize();
    blinding_mask.zeroize();
    let tag = keyed_tag(TAG_DOMAIN, &[&shared_secret.to_bytes(), &amount_ct, &blinding_ct]);
    EncryptedPayload { amount_ct, blinding_ct, tag }
}

/// Decrypt a payload with the shared secret, recovering `(amount, blinding_factor)`.
///
/// Fails when the authentication tag mismatches (checked in constant time, before any
/// unmasking) or when the decoded amount falls outside the valid range. Error messages
/// never carry the plaintext.
pub fn decrypt_note(payload: &EncryptedPayload, shared_secret: &SharedSecret) -> Result<(u64, Scalar), CipherError> {
    let expected_tag =
        keyed_tag(TAG_DOMAIN, &[&shared_secret.to_bytes(), &payload.amount_ct, &payload.blinding_ct]);
    if !bool::from(expected_tag.ct_eq(&payload.tag)) {
        return Err(CipherError::DecryptionFailed);
    }
    let amount_ct = Scalar::from_canonical_bytes(payload.amount_ct).ok_or(CipherError::DecryptionFailed)?;
    let blinding_ct = Scalar::from_canonical_bytes(payload.blinding_ct).ok_or(CipherError::DecryptionFailed)?;

    let mut amount_mask = hash_to_scalar(AMOUNT_MASK_DOMAIN, shared_secret.to_bytes());
    let mut blinding_mask = hash_to_scalar(BLINDING_MASK_DOMAIN, shared_secret.to_bytes());
    let amount_scalar = amount_ct - amount_mask;
    let blinding = blinding_ct - blinding_mask;
    amount_mask.zeroize();
    blinding_mask.zeroize();

    let amount_bytes = amount_scalar.to_bytes();
    if amount_bytes[8..].iter().any(|&b| b != 0) {
        return Err(CipherError::DecryptionFailed);
    }
    let mut le = [0u8; 8];
    le.copy_from_slice(&amount_bytes[..8]);
    Ok((u64::from_le_bytes(le), blinding))
}

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("An encrypted payload must be exactly {PAYLOAD_LEN} bytes")]
    InvalidLength,
    #[error("Note decryption failed")]
    DecryptionFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ecdh::derive_shared_secret;
    use crate::crypto::keys::{KeyOrigin, KeyPair, RistrettoSecret};

    fn shared_secret() -> SharedSecret {
        let mut rng = rand_core::OsRng;
        let recipient = KeyPair::generate(KeyOrigin::Random, &mut rng).unwrap();
        let ephemeral = RistrettoSecret::random(&mut rng);
        derive_shared_secret(&ephemeral, &recipient.view_public)
    }

    #[test]
    fn round_trip() {
        let ss = shared_secret();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        let payload = encrypt_note(123_456_789, &blinding, &ss);
        let (amount, recovered_blinding) = decrypt_note(&payload, &ss).unwrap();
        assert_eq!(amount, 123_456_789);
        assert_eq!(recovered_blinding, blinding);
    }

    #[test]
    fn round_trip_extremes() {
        let ss = shared_secret();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        for amount in [0u64, 1, u64::MAX] {
            let payload = encrypt_note(amount, &blinding, &ss);
            assert_eq!(decrypt_note(&payload, &ss).unwrap().0, amount);
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let ss = shared_secret();
        let other = shared_secret();
        let payload = encrypt_note(42, &Scalar::random(&mut rand_core::OsRng), &ss);
        assert!(matches!(decrypt_note(&payload, &other), Err(CipherError::DecryptionFailed)));
    }

    #[test]
    fn tampered_tag_fails() {
        let ss = shared_secret();
        let payload = encrypt_note(42, &Scalar::random(&mut rand_core::OsRng), &ss);
        let mut bytes = payload.to_bytes();
        bytes[70] ^= 0x01;
        let tampered = EncryptedPayload::from_bytes(&bytes).unwrap();
        assert!(matches!(decrypt_note(&tampered, &ss), Err(CipherError::DecryptionFailed)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let ss = shared_secret();
        let payload = encrypt_note(42, &Scalar::random(&mut rand_core::OsRng), &ss);
        let mut bytes = payload.to_bytes();
        bytes[0] ^= 0x01;
        let tampered = EncryptedPayload::from_bytes(&bytes).unwrap();
        assert!(matches!(decrypt_note(&tampered, &ss), Err(CipherError::DecryptionFailed)));
    }

    #[test]
    fn payload_length_is_fixed() {
        let ss = shared_secret();
        let payload = encrypt_note(7, &Scalar::random(&mut rand_core::OsRng), &ss);
        assert_eq!(payload.to_bytes().len(), PAYLOAD_LEN);
        assert!(matches!(EncryptedPayload::from_bytes(&[0u8; 10]), Err(CipherError::InvalidLength)));
    }
}
