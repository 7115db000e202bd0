use crate::crypto::keys::{RistrettoPublic, RistrettoSecret};
use crate::hashes::hash_to_scalar;
use curve25519_dalek_ng::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek_ng::ristretto::CompressedRistretto;
use curve25519_dalek_ng::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use thiserror::Error;
use zeroize::Zeroize;

const CHALLENGE_DOMAIN: &[u8] = b"ConfidentialTx/SchnorrChallenge";

/// A Schnorr signature over a message, used to authorize spending an input with its
/// one-time sign key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub_nonce: CompressedRistretto,
    s: Scalar,
}

impl Signature {
    fn challenge(pub_nonce: &CompressedRistretto, public_key: &RistrettoPublic, message: &[u8]) -> Scalar {
        let msg = [pub_nonce.as_bytes().as_ref(), public_key.as_bytes().as_ref(), message].concat();
        hash_to_scalar(CHALLENGE_DOMAIN, msg)
    }

    pub fn sign<R: RngCore + CryptoRng>(rng: &mut R, secret: &RistrettoSecret, message: &[u8]) -> Self {
        let mut nonce = Scalar::random(rng);
        let pub_nonce = (&nonce * &RISTRETTO_BASEPOINT_TABLE).compress();
        let public_key = RistrettoPublic::from_secret(secret);
        let s = nonce + secret.as_scalar() * Self::challenge(&pub_nonce, &public_key, message);
        nonce.zeroize();
        Self { pub_nonce, s }
    }

    pub fn verify(&self, public_key: &RistrettoPublic, message: &[u8]) -> bool {
        let pub_nonce = match self.pub_nonce.decompress() {
            Some(point) => point,
            None => return false,
        };
        let e = Self::challenge(&self.pub_nonce, public_key, message);
        let lhs = &self.s * &RISTRETTO_BASEPOINT_TABLE;
        let rhs = pub_nonce + public_key.as_point() * e;
        lhs == rhs
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.pub_nonce.as_bytes());
        bytes[32..].copy_from_slice(&self.s.to_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != 64 {
            return Err(SignatureError::InvalidLength);
        }
        let mut nonce_bytes = [0u8; 32];
        nonce_bytes.copy_from_slice(&bytes[..32]);
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&bytes[32..]);
        let s = Scalar::from_canonical_bytes(s_bytes).ok_or(SignatureError::NonCanonicalScalar)?;
        Ok(Self { pub_nonce: CompressedRistretto(nonce_bytes), s })
    }
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("A signature must be exactly 64 bytes")]
    InvalidLength,
    #[error("Signature scalar is not canonical")]
    NonCanonicalScalar,
}
