//! The confidential transaction object model.
//!
//! A transaction moves through Drafting -> Balanced -> Signed while being built (see
//! [`builder`]); once signed it is an immutable value object with a canonical byte
//! encoding. Verification ([`verify`]) never mutates a transaction; it re-derives and
//! compares, producing a [`VerificationLog`].

pub mod builder;
pub mod encoding;
pub mod verify;

use crate::crypto::commitment::Commitment;
use crate::crypto::keys::RistrettoPublic;
use crate::crypto::schnorr::Signature;
use crate::note::Note;
use rlp::DecoderError;
use serde::Serialize;
use std::fmt::Display;

/// Version byte carried in every canonical encoding.
pub const TX_VERSION: u8 = 1;

/// A spent-note reference with its authorization signature.
#[derive(Clone, Debug)]
pub struct TxInput {
    /// Identifier of the note being spent (its ledger hash); opaque to this core.
    pub note_ref: [u8; 32],
    /// The spent note's amount commitment, re-stated so verifiers can run the balance check.
    pub commitment: Commitment,
    /// The spent note's one-time sign key.
    pub sign_pk: RistrettoPublic,
    /// Schnorr signature by `sign_pk` over the committed transaction body.
    pub signature: Signature,
}

/// A signed confidential transaction.
///
/// Balance invariant: the input commitments minus the output commitments minus the fee
/// commitment sum to the zero commitment.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub version: u8,
    /// Range-proof bit width for every output; explicit and versioned rather than a
    /// hidden constant.
    pub bit_width: u8,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<Note>,
    /// Explicit plaintext fee. Its commitment in the balance equation is `fee * B`.
    pub fee: u64,
}

impl Transaction {
    /// Canonical serialized form (RLP). Identical logical content encodes to identical
    /// bytes regardless of which entry point constructed the transaction.
    pub fn to_bytes(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecoderError> {
        rlp::decode(bytes)
    }

    /// The byte string input signatures commit to: the transaction body without the
    /// signatures themselves and without the range proofs (proofs are verified against
    /// the commitments independently).
    pub fn signing_bytes(&self) -> Vec<u8> {
        let inputs: Vec<encoding::InputBodyRef<'_>> = self
            .inputs
            .iter()
            .map(|i| encoding::InputBodyRef { note_ref: &i.note_ref, commitment: &i.commitment, sign_pk: &i.sign_pk })
            .collect();
        encoding::signing_bytes(self.version, self.bit_width, &inputs, &self.outputs, self.fee)
    }
}

/// Which verification check an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Decode,
    Signatures,
    RangeProofs,
    Balance,
}

impl Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CheckKind::Decode => "decode",
            CheckKind::Signatures => "signatures",
            CheckKind::RangeProofs => "range_proofs",
            CheckKind::Balance => "balance",
        };
        write!(f, "{name}")
    }
}

/// One per-check entry of the verification log. `detail` is diagnostic text and never
/// contains a plaintext amount or blinding factor.
#[derive(Clone, Debug, Serialize)]
pub struct CheckResult {
    pub check: CheckKind,
    pub passed: bool,
    pub detail: String,
}

/// Ordered per-check results of verifying one transaction. Purely derived; not persisted.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerificationLog {
    pub checks: Vec<CheckResult>,
}

impl VerificationLog {
    pub(crate) fn record(&mut self, check: CheckKind, passed: bool, detail: impl Into<String>) {
        self.checks.push(CheckResult { check, passed, detail: detail.into() });
    }

    /// Overall verification succeeds iff every check passed.
    pub fn passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    /// The first failing check category, for diagnostics.
    pub fn first_failure(&self) -> Option<&CheckResult> {
        self.checks.iter().find(|c| !c.passed)
    }

    pub fn to_json(&self) -> Vec<u8> {
        // Serialization of plain structs with string fields cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}
