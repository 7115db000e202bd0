//! Zero-knowledge range proofs over committed amounts.
//!
//! Bulletproofs give logarithmic-size proofs that a committed amount lies in
//! `[0, 2^bit_width)`. Proving runs once per output and verification once per output per
//! verifying node, so this is the dominant cost center of the whole core.

use crate::crypto::commitment::Commitment;
use bulletproofs::{BulletproofGens, PedersenGens, RangeProof};
use curve25519_dalek_ng::scalar::Scalar;
use log::*;
use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use thiserror::Error;

/// Transcript label binding proofs to this protocol.
const RANGE_PROOF_DOMAIN: &[u8] = b"ConfidentialTx/RangeProof";

/// Bit widths the proof system supports.
pub const SUPPORTED_BIT_WIDTHS: [u8; 4] = [8, 16, 32, 64];

/// Generator context for proving and verifying. Construction is the expensive part;
/// the context is immutable afterwards and safe to share across verifier threads.
pub struct RangeProofContext {
    bp_gens: BulletproofGens,
    pc_gens: PedersenGens,
}

impl RangeProofContext {
    pub fn new(max_bit_width: u8) -> Result<Self, RangeProofError> {
        if !SUPPORTED_BIT_WIDTHS.contains(&max_bit_width) {
            return Err(RangeProofError::InvalidBitWidth(max_bit_width));
        }
        Ok(Self { bp_gens: BulletproofGens::new(max_bit_width as usize, 1), pc_gens: PedersenGens::default() })
    }

    /// Prove that `amount` lies in `[0, 2^bit_width)` under `blinding`. Also returns the
    /// commitment the proof is bound to, which equals `Commitment::commit(amount, blinding)`.
    ///
    /// Proof nonces come from the caller's `rng`, so proving is deterministic for a
    /// deterministic RNG.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        amount: u64,
        blinding: &Scalar,
        bit_width: u8,
        rng: &mut R,
    ) -> Result<(AmountRangeProof, Commitment), RangeProofError> {
        if !SUPPORTED_BIT_WIDTHS.contains(&bit_width) {
            return Err(RangeProofError::InvalidBitWidth(bit_width));
        }
        if bit_width < 64 && amount >> bit_width != 0 {
            return Err(RangeProofError::InvalidAmount);
        }
        let mut transcript = Transcript::new(RANGE_PROOF_DOMAIN);
        let (proof, committed) = RangeProof::prove_single_with_rng(
            &self.bp_gens,
            &self.pc_gens,
            &mut transcript,
            amount,
            blinding,
            bit_width as usize,
            rng,
        )
        .map_err(|_| RangeProofError::ProofConstruction)?;
        let commitment = Commitment::from_bytes(committed.to_bytes()).map_err(|_| RangeProofError::ProofConstruction)?;
        Ok((AmountRangeProof(proof), commitment))
    }

    /// Verify `proof` against `commitment`. Returns false on any structural or
    /// mathematical mismatch; never errors and never learns the amount.
    pub fn verify(&self, commitment: &Commitment, proof: &AmountRangeProof, bit_width: u8) -> bool {
        if !SUPPORTED_BIT_WIDTHS.contains(&bit_width) {
            warn!("range proof verification with unsupported bit width {bit_width}");
            return false;
        }
        let mut transcript = Transcript::new(RANGE_PROOF_DOMAIN);
        proof
            .0
            .verify_single(&self.bp_gens, &self.pc_gens, &mut transcript, commitment.as_compressed(), bit_width as usize)
            .is_ok()
    }
}

impl Default for RangeProofContext {
    /// Full-capacity context covering every supported bit width.
    fn default() -> Self {
        Self { bp_gens: BulletproofGens::new(64, 1), pc_gens: PedersenGens::default() }
    }
}

/// A serialized-size-stable wrapper around a Bulletproof.
#[derive(Clone)]
pub struct AmountRangeProof(RangeProof);

impl AmountRangeProof {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RangeProofError> {
        let proof = RangeProof::from_bytes(bytes).map_err(|_| RangeProofError::MalformedProof)?;
        Ok(Self(proof))
    }
}

impl std::fmt::Debug for AmountRangeProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AmountRangeProof({} bytes)", self.to_bytes().len())
    }
}

#[derive(Debug, Error)]
pub enum RangeProofError {
    #[error("Amount exceeds the provable range")]
    InvalidAmount,
    #[error("Unsupported range proof bit width: {0}")]
    InvalidBitWidth(u8),
    #[error("Could not construct the range proof")]
    ProofConstruction,
    #[error("Malformed range proof encoding")]
    MalformedProof,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn proving_is_deterministic_under_the_same_entropy() {
        let ctx = RangeProofContext::new(64).unwrap();
        let blinding = Scalar::from(42u64);
        let (proof_a, commit_a) = ctx.prove(7, &blinding, 64, &mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        let (proof_b, commit_b) = ctx.prove(7, &blinding, 64, &mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        assert_eq!(commit_a, commit_b);
        assert_eq!(proof_a.to_bytes(), proof_b.to_bytes());
    }

    #[test]
    fn proof_round_trip_64_bits() {
        let ctx = RangeProofContext::new(64).unwrap();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        let (proof, commitment) = ctx.prove(u64::MAX, &blinding, 64, &mut rand_core::OsRng).unwrap();
        assert!(ctx.verify(&commitment, &proof, 64));
        assert_eq!(commitment, Commitment::commit(u64::MAX, &blinding));
    }

    #[test]
    fn out_of_range_amount_is_rejected() {
        let ctx = RangeProofContext::new(64).unwrap();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        let result = ctx.prove(1 << 32, &blinding, 32, &mut rand_core::OsRng);
        assert!(matches!(result, Err(RangeProofError::InvalidAmount)));
    }

    #[test]
    fn unsupported_bit_width_is_rejected() {
        let ctx = RangeProofContext::new(64).unwrap();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        assert!(matches!(ctx.prove(1, &blinding, 13, &mut rand_core::OsRng), Err(RangeProofError::InvalidBitWidth(13))));
        assert!(matches!(RangeProofContext::new(0), Err(RangeProofError::InvalidBitWidth(0))));
    }

    #[test]
    fn verification_fails_for_wrong_commitment() {
        let ctx = RangeProofContext::new(64).unwrap();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        let (proof, _) = ctx.prove(100, &blinding, 64, &mut rand_core::OsRng).unwrap();
        let other = Commitment::commit(100, &Scalar::random(&mut rand_core::OsRng));
        assert!(!ctx.verify(&other, &proof, 64));
    }

    #[test]
    fn serialized_proof_round_trip() {
        let ctx = RangeProofContext::new(32).unwrap();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        let (proof, commitment) = ctx.prove(12345, &blinding, 32, &mut rand_core::OsRng).unwrap();
        let bytes = proof.to_bytes();
        let recovered = AmountRangeProof::from_bytes(&bytes).unwrap();
        assert!(ctx.verify(&commitment, &recovered, 32));
    }

    #[test]
    fn tampered_proof_fails_verification() {
        let ctx = RangeProofContext::new(64).unwrap();
        let blinding = Scalar::random(&mut rand_core::OsRng);
        let (proof, commitment) = ctx.prove(7, &blinding, 64, &mut rand_core::OsRng).unwrap();
        let mut bytes = proof.to_bytes();
        bytes[10] ^= 0x01;
        match AmountRangeProof::from_bytes(&bytes) {
            Ok(tampered) => assert!(!ctx.verify(&commitment, &tampered, 64)),
            Err(RangeProofError::MalformedProof) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
