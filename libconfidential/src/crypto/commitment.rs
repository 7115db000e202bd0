//! Pedersen commitments to amounts.
//!
//! A commitment binds an amount under a blinding factor: `C = amount * B + blinding * B~`.
//! Commitments are additively homomorphic, which is what lets a verifier check the balance
//! equation over a transaction without decommitting any individual value.

use bulletproofs::PedersenGens;
use curve25519_dalek_ng::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek_ng::scalar::Scalar;
use curve25519_dalek_ng::traits::Identity;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Sub};
use thiserror::Error;

/// A Pedersen commitment to an amount.
#[derive(Clone, PartialEq, Eq)]
pub struct Commitment {
    compressed: CompressedRistretto,
    point: RistrettoPoint,
}

impl Commitment {
    /// Commit to `amount` under `blinding`. Deterministic, binding and hiding.
    pub fn commit(amount: u64, blinding: &Scalar) -> Self {
        let gens = PedersenGens::default();
        gens.commit(Scalar::from(amount), *blinding).into()
    }

    /// The commitment used for the explicit plaintext fee: zero blinding.
    pub fn fee_commitment(fee: u64) -> Self {
        Self::commit(fee, &Scalar::zero())
    }

    /// True iff the commitment opens to amount 0 with blinding 0, i.e. it is the identity
    /// point. Summing commitments with signed blinding and checking the result against
    /// zero is the homomorphic balance check.
    pub fn is_zero(&self) -> bool {
        self.point == RistrettoPoint::identity()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.compressed.as_bytes()
    }

    pub fn as_compressed(&self) -> &CompressedRistretto {
        &self.compressed
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CommitmentError> {
        let compressed = CompressedRistretto(bytes);
        let point = compressed.decompress().ok_or(CommitmentError::InvalidPoint)?;
        Ok(Self { compressed, point })
    }
}

impl From<RistrettoPoint> for Commitment {
    fn from(point: RistrettoPoint) -> Self {
        Self { compressed: point.compress(), point }
    }
}

impl Add<&Commitment> for &Commitment {
    type Output = Commitment;

    fn add(self, rhs: &Commitment) -> Commitment {
        (self.point + rhs.point).into()
    }
}

impl Sub<&Commitment> for &Commitment {
    type Output = Commitment;

    fn sub(self, rhs: &Commitment) -> Commitment {
        (self.point - rhs.point).into()
    }
}

impl Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.compressed.to_bytes()))
    }
}

impl Serialize for Commitment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.compressed.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&hex_str, &mut bytes).map_err(serde::de::Error::custom)?;
        Commitment::from_bytes(bytes).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error)]
pub enum CommitmentError {
    #[error("Invalid point on curve")]
    InvalidPoint,
}
