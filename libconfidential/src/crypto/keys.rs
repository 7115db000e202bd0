use crate::hashes::hash_to_scalar;
use curve25519_dalek_ng::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek_ng::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek_ng::scalar::Scalar;
use hex::FromHexError;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use zeroize::Zeroizing;

/// Domain separator for deriving the view secret from the spend secret.
const VIEW_KEY_DOMAIN: &[u8] = b"ConfidentialTx/ViewKeyFromSpend";

/// A secret scalar. The backing memory is overwritten when the value is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct RistrettoSecret(Zeroizing<Scalar>);

impl RistrettoSecret {
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut scalar_bytes = [0u8; 64];
        rng.fill_bytes(&mut scalar_bytes);
        let s = Zeroizing::new(Scalar::from_bytes_mod_order_wide(&scalar_bytes));
        Self(s)
    }

    /// Interpret 32 bytes as a canonical scalar.
    pub fn from_canonical_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        match Scalar::from_canonical_bytes(bytes) {
            None => Err(KeyError::NonCanonicalScalar),
            Some(scalar) => Ok(Self::from(scalar)),
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        if hex.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut canonical = [0u8; 32];
        hex::decode_to_slice(hex.as_bytes(), &mut canonical)?;
        Self::from_canonical_bytes(canonical)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl Debug for RistrettoSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RistrettoSecret")
    }
}

impl From<Scalar> for RistrettoSecret {
    fn from(value: Scalar) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl Serialize for RistrettoSecret {
    /// Serializes the secret key as a hex-encoded string.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for RistrettoSecret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        RistrettoSecret::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// A public key, stored in both compressed and decompressed form so that
/// callers never pay for decompression twice.
#[derive(Clone, PartialEq, Eq)]
pub struct RistrettoPublic {
    compressed: CompressedRistretto,
    point: RistrettoPoint,
}

impl RistrettoPublic {
    pub fn from_secret(secret_key: &RistrettoSecret) -> Self {
        let point = secret_key.as_scalar() * &RISTRETTO_BASEPOINT_TABLE;
        point.into()
    }

    pub fn as_compressed(&self) -> &CompressedRistretto {
        &self.compressed
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.point
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.compressed.as_bytes()
    }

    /// Tries to deserialize 32 bytes into a `RistrettoPublic`. The bytes must be a valid
    /// compressed point on the curve.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        let compressed = CompressedRistretto(bytes);
        let point = compressed.decompress().ok_or(KeyError::InvalidPoint)?;
        Ok(Self { compressed, point })
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        if hex.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex.as_bytes(), &mut bytes)?;
        Self::from_bytes(bytes)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.compressed.to_bytes())
    }
}

impl From<RistrettoPoint> for RistrettoPublic {
    fn from(value: RistrettoPoint) -> Self {
        let compressed = value.compress();
        Self { compressed, point: value }
    }
}

impl TryFrom<CompressedRistretto> for RistrettoPublic {
    type Error = KeyError;
    fn try_from(value: CompressedRistretto) -> Result<Self, Self::Error> {
        let point = value.decompress().ok_or(KeyError::InvalidPoint)?;
        Ok(Self { compressed: value, point })
    }
}

impl Debug for RistrettoPublic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for RistrettoPublic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for RistrettoPublic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        RistrettoPublic::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// How the spend secret of a key pair is obtained.
///
/// A seed is an explicit construction mode rather than an optional argument, so that
/// deterministic and random generation never get conflated by a missing-null check.
pub enum KeyOrigin<'a> {
    /// Draw the spend secret from a cryptographically secure random source.
    Random,
    /// Derive the spend secret from the supplied seed. The same seed always yields the
    /// same key pair, enabling recovery. Accepts 32 raw bytes or 64 hex characters that
    /// must decode to a canonical scalar.
    FromSeed(&'a [u8]),
}

/// A dual key pair: the spend key authorizes spending received notes, the view key
/// authorizes recognizing and decrypting them.
///
/// Invariant: `public == secret * G` for both components. The view secret is derived
/// from the spend secret by hashing, so a seed recovers the entire key pair.
pub struct KeyPair {
    pub spend_secret: RistrettoSecret,
    pub spend_public: RistrettoPublic,
    pub view_secret: RistrettoSecret,
    pub view_public: RistrettoPublic,
}

impl KeyPair {
    pub fn generate<R: CryptoRng + RngCore>(origin: KeyOrigin<'_>, rng: &mut R) -> Result<Self, KeyError> {
        let spend_secret = match origin {
            KeyOrigin::Random => RistrettoSecret::random(rng),
            KeyOrigin::FromSeed(seed) => Self::secret_from_seed(seed)?,
        };
        Ok(Self::from_spend_secret(spend_secret))
    }

    fn secret_from_seed(seed: &[u8]) -> Result<RistrettoSecret, KeyError> {
        match seed.len() {
            32 => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(seed);
                RistrettoSecret::from_canonical_bytes(bytes)
            }
            64 => {
                let hex_str = std::str::from_utf8(seed).map_err(|_| KeyError::InvalidStringLength)?;
                RistrettoSecret::from_hex(hex_str)
            }
            _ => Err(KeyError::InvalidStringLength),
        }
    }

    fn from_spend_secret(spend_secret: RistrettoSecret) -> Self {
        let view_secret = RistrettoSecret::from(hash_to_scalar(VIEW_KEY_DOMAIN, spend_secret.to_bytes()));
        let spend_public = RistrettoPublic::from_secret(&spend_secret);
        let view_public = RistrettoPublic::from_secret(&view_secret);
        Self { spend_secret, spend_public, view_secret, view_public }
    }

    pub fn view_key(&self) -> ViewKey {
        ViewKey { view_secret: self.view_secret.clone(), spend_public: self.spend_public.clone() }
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("spend_public", &self.spend_public)
            .field("view_public", &self.view_public)
            .finish()
    }
}

/// The material needed to scan for and decrypt incoming notes, but not to spend them:
/// the view secret plus the spend *public* key the one-time keys are based on.
///
/// Compact encoding: 64 bytes, view scalar followed by the compressed spend public.
#[derive(Clone)]
pub struct ViewKey {
    pub view_secret: RistrettoSecret,
    pub spend_public: RistrettoPublic,
}

impl ViewKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&bytes[..32]);
        let view_secret = RistrettoSecret::from_canonical_bytes(scalar_bytes)?;
        let mut point_bytes = [0u8; 32];
        point_bytes.copy_from_slice(&bytes[32..]);
        let spend_public = RistrettoPublic::from_bytes(point_bytes)?;
        Ok(Self { view_secret, spend_public })
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.view_secret.to_bytes());
        bytes[32..].copy_from_slice(self.spend_public.as_bytes());
        bytes
    }
}

impl Debug for ViewKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewKey").field("spend_public", &self.spend_public).finish()
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid point on curve")]
    InvalidPoint,
    #[error("Could not deserialize from hex: {0}")]
    HexDeserializationError(#[from] FromHexError),
    #[error("Invalid string length")]
    InvalidStringLength,
    #[error("Not a valid secret key")]
    NonCanonicalScalar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_matches_secret_for_both_components() {
        let pair = KeyPair::generate(KeyOrigin::Random, &mut rand_core::OsRng).unwrap();
        assert_eq!(pair.spend_public, RistrettoPublic::from_secret(&pair.spend_secret));
        assert_eq!(pair.view_public, RistrettoPublic::from_secret(&pair.view_secret));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let seed = b"4dd896d542721742aff8671ba42aff0c4c846bea79065cf39a191bbeb11ea604";
        let a = KeyPair::generate(KeyOrigin::FromSeed(seed), &mut rand_core::OsRng).unwrap();
        let b = KeyPair::generate(KeyOrigin::FromSeed(seed), &mut rand_core::OsRng).unwrap();
        assert_eq!(a.spend_public, b.spend_public);
        assert_eq!(a.view_public, b.view_public);
        assert_eq!(a.spend_secret, b.spend_secret);
    }

    #[test]
    fn non_canonical_seed_is_rejected() {
        let seed = [0xffu8; 32];
        let result = KeyPair::generate(KeyOrigin::FromSeed(&seed), &mut rand_core::OsRng);
        assert!(matches!(result, Err(KeyError::NonCanonicalScalar)));
    }

    #[test]
    fn bad_seed_length_is_rejected() {
        let result = KeyPair::generate(KeyOrigin::FromSeed(b"short"), &mut rand_core::OsRng);
        assert!(matches!(result, Err(KeyError::InvalidStringLength)));
    }

    #[test]
    fn view_key_round_trip() {
        let pair = KeyPair::generate(KeyOrigin::Random, &mut rand_core::OsRng).unwrap();
        let view_key = pair.view_key();
        let recovered = ViewKey::from_bytes(&view_key.to_bytes()).unwrap();
        assert_eq!(recovered.view_secret, view_key.view_secret);
        assert_eq!(recovered.spend_public, view_key.spend_public);
    }

    #[test]
    fn public_key_hex_round_trip() {
        let pair = KeyPair::generate(KeyOrigin::Random, &mut rand_core::OsRng).unwrap();
        let hex_p = pair.spend_public.as_hex();
        let recovered = RistrettoPublic::from_hex(&hex_p).unwrap();
        assert_eq!(recovered, pair.spend_public);
    }
}
