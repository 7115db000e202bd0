//! Crate-level error type for the byte-oriented boundary.
//!
//! Internal modules carry their own precise error enums; everything funnels into
//! [`CoreError`] at the boundary, where each variant has a stable numeric code so
//! embedders without rich error types can still branch on the failure class.

use crate::crypto::keys::KeyError;
use crate::crypto::note_cipher::CipherError;
use crate::crypto::range_proof::RangeProofError;
use crate::transaction::builder::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Not a canonical scalar")]
    InvalidScalar,
    #[error("Amount exceeds the provable range")]
    InvalidAmount,
    #[error("Transaction does not balance")]
    UnbalancedTransaction,
    #[error("Range proof construction or verification failed")]
    ProofFailure,
    #[error("Signature verification failed")]
    SignatureFailure,
    #[error("Commitments do not sum to the zero commitment")]
    BalanceFailure,
    #[error("Note decryption failed")]
    DecryptionFailed,
    #[error("The note does not belong to this view key")]
    NotOwner,
    #[error("Unsupported range proof bit width: {0}")]
    InvalidBitWidth(u8),
}

impl CoreError {
    /// Stable code for each failure class. Codes are part of the boundary contract and
    /// never reused.
    pub fn code(&self) -> i32 {
        match self {
            CoreError::MalformedInput(_) => 1,
            CoreError::InvalidScalar => 2,
            CoreError::InvalidAmount => 3,
            CoreError::UnbalancedTransaction => 4,
            CoreError::ProofFailure => 5,
            CoreError::SignatureFailure => 6,
            CoreError::BalanceFailure => 7,
            CoreError::DecryptionFailed => 8,
            CoreError::NotOwner => 9,
            CoreError::InvalidBitWidth(_) => 10,
        }
    }
}

impl From<KeyError> for CoreError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::NonCanonicalScalar => CoreError::InvalidScalar,
            other => CoreError::MalformedInput(other.to_string()),
        }
    }
}

impl From<CipherError> for CoreError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidLength => CoreError::MalformedInput(err.to_string()),
            CipherError::DecryptionFailed => CoreError::DecryptionFailed,
        }
    }
}

impl From<RangeProofError> for CoreError {
    fn from(err: RangeProofError) -> Self {
        match err {
            RangeProofError::InvalidAmount => CoreError::InvalidAmount,
            RangeProofError::InvalidBitWidth(bits) => CoreError::InvalidBitWidth(bits),
            RangeProofError::ProofConstruction => CoreError::ProofFailure,
            RangeProofError::MalformedProof => CoreError::MalformedInput(err.to_string()),
        }
    }
}

impl From<BuildError> for CoreError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::NoInputs | BuildError::NoOutputs => CoreError::MalformedInput(err.to_string()),
            BuildError::AmountOverflow => CoreError::InvalidAmount,
            BuildError::Unbalanced { .. } => CoreError::UnbalancedTransaction,
            BuildError::RangeProof(inner) => inner.into(),
            BuildError::Key(inner) => inner.into(),
        }
    }
}

impl From<rlp::DecoderError> for CoreError {
    fn from(err: rlp::DecoderError) -> Self {
        CoreError::MalformedInput(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            CoreError::MalformedInput("x".into()),
            CoreError::InvalidScalar,
            CoreError::InvalidAmount,
            CoreError::UnbalancedTransaction,
            CoreError::ProofFailure,
            CoreError::SignatureFailure,
            CoreError::BalanceFailure,
            CoreError::DecryptionFailed,
            CoreError::NotOwner,
            CoreError::InvalidBitWidth(7),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn builder_errors_map_to_the_right_class() {
        assert_eq!(CoreError::from(BuildError::AmountOverflow).code(), 3);
        assert_eq!(CoreError::from(BuildError::Unbalanced { inputs: 1, outputs: 2, fee: 0 }).code(), 4);
        assert_eq!(CoreError::from(BuildError::NoInputs).code(), 1);
    }
}
