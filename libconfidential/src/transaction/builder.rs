//! Transaction construction.
//!
//! Only the builder sees plaintext amounts and blinding factors, so only the builder can
//! establish the balance equation; everyone else checks the homomorphic form. The
//! lifecycle is encoded in types: a [`TxBuilder`] (drafting) becomes a [`BalancedTx`]
//! once the plaintext sums check out, and sealing a balanced transaction signs every
//! input, after which the [`Transaction`] is immutable.

use crate::crypto::commitment::Commitment;
use crate::crypto::ecdh::derive_shared_secret;
use crate::crypto::keys::{KeyError, RistrettoPublic, RistrettoSecret};
use crate::crypto::note_cipher::encrypt_note;
use crate::crypto::range_proof::{RangeProofContext, RangeProofError};
use crate::crypto::schnorr::Signature;
use crate::crypto::stealth::{derive_one_time_key, SIGN_KEY_DOMAIN, SPEND_KEY_DOMAIN};
use crate::helpers;
use crate::note::Note;
use crate::transaction::{encoding, Transaction, TxInput, TX_VERSION};
use curve25519_dalek_ng::scalar::Scalar;
use log::*;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

/// A note the transaction spends, as known to its owner: the plaintext opening of the
/// note's commitment plus the one-time secret that authorizes the spend.
#[derive(Clone, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(serialize_with = "helpers::to_hex", deserialize_with = "helpers::array_from_hex")]
    pub note_ref: [u8; 32],
    pub amount: u64,
    pub blinding: RistrettoSecret,
    pub sign_secret: RistrettoSecret,
}

/// A payment the transaction makes: an amount and the recipient's dual-key address.
#[derive(Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub amount: u64,
    pub view_public: RistrettoPublic,
    pub spend_public: RistrettoPublic,
}

/// The logical content of a transaction, independent of whether it arrived as JSON or
/// RLP. Identical requests produce byte-identical transactions under the same entropy.
#[derive(Clone, Serialize, Deserialize)]
pub struct TxRequest {
    pub bit_width: u8,
    pub fee: u64,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
}

/// Drafting state: inputs and outputs are being accumulated.
pub struct TxBuilder {
    bit_width: u8,
    fee: u64,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
}

impl TxBuilder {
    pub fn new(bit_width: u8) -> Self {
        Self { bit_width, fee: 0, inputs: Vec::new(), outputs: Vec::new() }
    }

    pub fn add_input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn add_output(mut self, output: OutputSpec) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Confirm the plaintext balance equation: `sum(inputs) == sum(outputs) + fee`.
    pub fn balance(self) -> Result<BalancedTx, BuildError> {
        if self.inputs.is_empty() {
            return Err(BuildError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(BuildError::NoOutputs);
        }
        let input_sum = checked_sum(self.inputs.iter().map(|i| i.amount))?;
        let output_sum = checked_sum(self.outputs.iter().map(|o| o.amount))?;
        let spent = output_sum.checked_add(self.fee).ok_or(BuildError::AmountOverflow)?;
        if input_sum != spent {
            return Err(BuildError::Unbalanced { inputs: input_sum, outputs: output_sum, fee: self.fee });
        }
        Ok(BalancedTx { bit_width: self.bit_width, fee: self.fee, inputs: self.inputs, outputs: self.outputs })
    }
}

fn checked_sum(amounts: impl Iterator<Item = u64>) -> Result<u64, BuildError> {
    let mut total: u64 = 0;
    for amount in amounts {
        total = total.checked_add(amount).ok_or(BuildError::AmountOverflow)?;
    }
    Ok(total)
}

/// Balanced state: plaintext sums are known to match. Sealing produces the signed,
/// immutable transaction.
pub struct BalancedTx {
    bit_width: u8,
    fee: u64,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
}

impl BalancedTx {
    /// Derive per-output keys, ciphertexts, commitments and range proofs, then sign every
    /// input's one-time key over the committed body.
    ///
    /// Output blinding factors are chosen so the blinding sums cancel: all but the last
    /// are random, the last is `sum(input blindings) - sum(other output blindings)`. The
    /// fee carries zero blinding. Together with the plaintext balance this makes the
    /// homomorphic sum the zero commitment.
    pub fn seal<R: RngCore + CryptoRng>(
        self,
        ctx: &RangeProofContext,
        rng: &mut R,
    ) -> Result<Transaction, BuildError> {
        // Blinding factors are secrets; every intermediate is erased on drop, including
        // the early return when a note fails to build.
        let input_blinding_sum: Zeroizing<Scalar> =
            Zeroizing::new(self.inputs.iter().map(|i| i.blinding.as_scalar()).sum());

        let mut outputs = Vec::with_capacity(self.outputs.len());
        let mut used_blinding = Zeroizing::new(Scalar::zero());
        let last = self.outputs.len() - 1;
        for (index, spec) in self.outputs.iter().enumerate() {
            let blinding = Zeroizing::new(if index == last {
                *input_blinding_sum - *used_blinding
            } else {
                Scalar::random(rng)
            });
            *used_blinding += *blinding;
            outputs.push(build_note(ctx, spec, &blinding, self.bit_width, rng)?);
        }

        let bodies: Vec<(InputSpec, Commitment, RistrettoPublic)> = self
            .inputs
            .into_iter()
            .map(|spec| {
                let commitment = Commitment::commit(spec.amount, spec.blinding.as_scalar());
                let sign_pk = RistrettoPublic::from_secret(&spec.sign_secret);
                (spec, commitment, sign_pk)
            })
            .collect();

        let body_refs: Vec<encoding::InputBodyRef<'_>> = bodies
            .iter()
            .map(|(spec, commitment, sign_pk)| encoding::InputBodyRef {
                note_ref: &spec.note_ref,
                commitment,
                sign_pk,
            })
            .collect();
        let message = encoding::signing_bytes(TX_VERSION, self.bit_width, &body_refs, &outputs, self.fee);

        let inputs: Vec<TxInput> = bodies
            .into_iter()
            .map(|(spec, commitment, sign_pk)| {
                let signature = Signature::sign(rng, &spec.sign_secret, &message);
                TxInput { note_ref: spec.note_ref, commitment, sign_pk, signature }
            })
            .collect();

        debug!("sealed transaction with {} inputs, {} outputs", inputs.len(), outputs.len());
        Ok(Transaction { version: TX_VERSION, bit_width: self.bit_width, inputs, outputs, fee: self.fee })
    }
}

fn build_note<R: RngCore + CryptoRng>(
    ctx: &RangeProofContext,
    spec: &OutputSpec,
    blinding: &Scalar,
    bit_width: u8,
    rng: &mut R,
) -> Result<Note, BuildError> {
    // Single-use key; the secret does not outlive this function.
    let ephemeral_secret = RistrettoSecret::random(rng);
    let ephemeral_pk = RistrettoPublic::from_secret(&ephemeral_secret);
    let shared_secret = derive_shared_secret(&ephemeral_secret, &spec.view_public);
    drop(ephemeral_secret);

    let sign_pk = derive_one_time_key(&shared_secret, SIGN_KEY_DOMAIN, &spec.spend_public);
    let spend_pk = derive_one_time_key(&shared_secret, SPEND_KEY_DOMAIN, &spec.spend_public);
    let payload = encrypt_note(spec.amount, blinding, &shared_secret);
    let (range_proof, commitment) = ctx.prove(spec.amount, blinding, bit_width, rng)?;
    Ok(Note { ephemeral_pk, sign_pk, spend_pk, commitment, range_proof, payload })
}

/// Convenience entry point running the full Drafting -> Balanced -> Signed lifecycle.
pub fn build_transaction<R: RngCore + CryptoRng>(
    ctx: &RangeProofContext,
    request: TxRequest,
    rng: &mut R,
) -> Result<Transaction, BuildError> {
    let mut builder = TxBuilder::new(request.bit_width).with_fee(request.fee);
    for input in request.inputs {
        builder = builder.add_input(input);
    }
    for output in request.outputs {
        builder = builder.add_output(output);
    }
    builder.balance()?.seal(ctx, rng)
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("A transaction must spend at least one input")]
    NoInputs,
    #[error("A transaction must create at least one output")]
    NoOutputs,
    #[error("Amount sum overflows")]
    AmountOverflow,
    #[error("Unbalanced transaction: inputs {inputs}, outputs {outputs}, fee {fee}")]
    Unbalanced { inputs: u64, outputs: u64, fee: u64 },
    #[error(transparent)]
    RangeProof(#[from] RangeProofError),
    #[error(transparent)]
    Key(#[from] KeyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{KeyOrigin, KeyPair};
    use crate::transaction::verify::verify_transaction;

    fn recipient_output(amount: u64) -> OutputSpec {
        let pair = KeyPair::generate(KeyOrigin::Random, &mut rand_core::OsRng).unwrap();
        OutputSpec { amount, view_public: pair.view_public, spend_public: pair.spend_public }
    }

    fn input(amount: u64) -> InputSpec {
        let mut rng = rand_core::OsRng;
        InputSpec {
            note_ref: [1u8; 32],
            amount,
            blinding: RistrettoSecret::random(&mut rng),
            sign_secret: RistrettoSecret::random(&mut rng),
        }
    }

    #[test]
    fn balanced_transaction_verifies() {
        let ctx = RangeProofContext::new(64).unwrap();
        let tx = TxBuilder::new(64)
            .add_input(input(100))
            .add_output(recipient_output(60))
            .add_output(recipient_output(30))
            .with_fee(10)
            .balance()
            .unwrap()
            .seal(&ctx, &mut rand_core::OsRng)
            .unwrap();
        let log = verify_transaction(&ctx, &tx.to_bytes());
        assert!(log.passed(), "log: {log:?}");
    }

    #[test]
    fn unbalanced_build_is_rejected() {
        let result = TxBuilder::new(64)
            .add_input(input(100))
            .add_output(recipient_output(60))
            .with_fee(10)
            .balance();
        assert!(matches!(result, Err(BuildError::Unbalanced { inputs: 100, outputs: 60, fee: 10 })));
    }

    #[test]
    fn empty_sides_are_rejected() {
        assert!(matches!(TxBuilder::new(64).add_output(recipient_output(1)).balance(), Err(BuildError::NoInputs)));
        assert!(matches!(TxBuilder::new(64).add_input(input(1)).balance(), Err(BuildError::NoOutputs)));
    }

    #[test]
    fn overflow_is_rejected() {
        let result = TxBuilder::new(64)
            .add_input(input(u64::MAX))
            .add_input(input(1))
            .add_output(recipient_output(1))
            .balance();
        assert!(matches!(result, Err(BuildError::AmountOverflow)));
    }

    #[test]
    fn output_amount_must_fit_bit_width() {
        let ctx = RangeProofContext::new(64).unwrap();
        let result = TxBuilder::new(8)
            .add_input(input(300))
            .add_output(recipient_output(300))
            .balance()
            .unwrap()
            .seal(&ctx, &mut rand_core::OsRng);
        assert!(matches!(result, Err(BuildError::RangeProof(RangeProofError::InvalidAmount))));
    }

    #[test]
    fn recipient_can_recognize_and_decrypt_own_output() {
        use crate::crypto::ecdh::derive_shared_secret;
        use crate::crypto::note_cipher::decrypt_note;
        use crate::crypto::stealth::is_note_owner;

        let ctx = RangeProofContext::new(64).unwrap();
        let recipient = KeyPair::generate(KeyOrigin::Random, &mut rand_core::OsRng).unwrap();
        let tx = TxBuilder::new(64)
            .add_input(input(50))
            .add_output(OutputSpec {
                amount: 50,
                view_public: recipient.view_public.clone(),
                spend_public: recipient.spend_public.clone(),
            })
            .balance()
            .unwrap()
            .seal(&ctx, &mut rand_core::OsRng)
            .unwrap();

        let note = &tx.outputs[0];
        assert!(is_note_owner(&note.ephemeral_pk, &note.sign_pk, &note.spend_pk, &recipient.view_key()));

        let ss = derive_shared_secret(&recipient.view_secret, &note.ephemeral_pk);
        let (amount, blinding) = decrypt_note(&note.payload, &ss).unwrap();
        assert_eq!(amount, 50);
        assert_eq!(note.commitment, Commitment::commit(amount, &blinding));
    }
}
