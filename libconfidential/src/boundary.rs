//! Byte-oriented entry points.
//!
//! Every operation here takes and returns plain byte buffers so the crate can sit behind
//! an FFI shim or a message queue without exposing curve types. Failures collapse into
//! [`CoreError`], whose [`CoreError::code`] gives embedders a stable numeric class.

use crate::crypto::ecdh::derive_shared_secret;
use crate::crypto::keys::{KeyOrigin, KeyPair, RistrettoPublic, RistrettoSecret, ViewKey};
use crate::crypto::note_cipher::{self, EncryptedPayload, PAYLOAD_LEN};
use crate::crypto::range_proof::RangeProofContext;
use crate::crypto::stealth;
use crate::error::CoreError;
use crate::transaction::builder::build_transaction;
use crate::transaction::encoding::{request_from_json, request_from_rlp};
use crate::transaction::{verify, CheckKind};
use log::*;
use rand_core::OsRng;
use rlp::RlpStream;
use std::sync::OnceLock;

/// Generator setup is expensive; one full-capacity context serves every call.
fn range_proof_context() -> &'static RangeProofContext {
    static CTX: OnceLock<RangeProofContext> = OnceLock::new();
    CTX.get_or_init(RangeProofContext::default)
}

/// Length of the ciphertext blob handed to [`decrypt_note`]: the sender's ephemeral
/// public key followed by the encrypted payload.
pub const NOTE_CIPHER_LEN: usize = 32 + PAYLOAD_LEN;

/// Build a signed transaction from a JSON-encoded request. Returns the canonical RLP
/// encoding of the sealed transaction.
pub fn create_transaction_from_json(request_bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let request = request_from_json(request_bytes)?;
    create_transaction(request)
}

/// Build a signed transaction from an RLP-encoded request. Semantically identical to
/// [`create_transaction_from_json`]; the same request yields the same transaction under
/// the same entropy.
pub fn create_transaction_from_rlp(request_bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let request = request_from_rlp(request_bytes)?;
    create_transaction(request)
}

fn create_transaction(request: crate::transaction::builder::TxRequest) -> Result<Vec<u8>, CoreError> {
    let tx = build_transaction(range_proof_context(), request, &mut OsRng)?;
    Ok(tx.to_bytes())
}

/// Re-verify a serialized transaction, returning the JSON verification log. A failing
/// check is reported inside the log, not as an error; only bytes that do not decode as a
/// transaction at all are rejected outright.
pub fn verify_transaction(tx_bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let log = verify::verify_transaction(range_proof_context(), tx_bytes);
    if let Some(failure) = log.first_failure() {
        if failure.check == CheckKind::Decode {
            return Err(CoreError::MalformedInput(failure.detail.clone()));
        }
    }
    Ok(log.to_json())
}

/// Generate a dual-key pair, optionally deterministically from `seed`. Returns the RLP
/// list `[spend_secret, spend_public, view_secret, view_public]`.
pub fn create_keypair(seed: Option<&[u8]>) -> Result<Vec<u8>, CoreError> {
    let origin = match seed {
        Some(bytes) if !bytes.is_empty() => KeyOrigin::FromSeed(bytes),
        _ => KeyOrigin::Random,
    };
    let pair = KeyPair::generate(origin, &mut OsRng)?;
    debug!("generated keypair with spend key {:?}", pair.spend_public);
    let mut stream = RlpStream::new_list(4);
    stream.append(&pair.spend_secret.to_bytes().to_vec());
    stream.append(&pair.spend_public.as_bytes().to_vec());
    stream.append(&pair.view_secret.to_bytes().to_vec());
    stream.append(&pair.view_public.as_bytes().to_vec());
    Ok(stream.out().to_vec())
}

/// Test whether a note addressed with (`ephemeral_pk`, `sign_pk`, `spend_pk`) belongs to
/// the holder of `view_key_bytes` (a 64-byte view key blob). Returns `Err(NotOwner)` for
/// a well-formed note that belongs to someone else.
pub fn is_note_owner(
    ephemeral_pk: &[u8],
    sign_pk: &[u8],
    spend_pk: &[u8],
    view_key_bytes: &[u8],
) -> Result<(), CoreError> {
    let ephemeral = public_from_slice(ephemeral_pk)?;
    let sign = public_from_slice(sign_pk)?;
    let spend = public_from_slice(spend_pk)?;
    let view_key = ViewKey::from_bytes(view_key_bytes)?;
    if stealth::is_note_owner(&ephemeral, &sign, &spend, &view_key) {
        Ok(())
    } else {
        Err(CoreError::NotOwner)
    }
}

/// Decrypt a note ciphertext blob (`ephemeral_pk || payload`, [`NOTE_CIPHER_LEN`] bytes)
/// with the recipient's view secret. Returns the RLP list `[amount, blinding]`.
pub fn decrypt_note(cipher_blob: &[u8], view_secret_bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    if cipher_blob.len() != NOTE_CIPHER_LEN {
        return Err(CoreError::MalformedInput(format!(
            "note ciphertext must be {NOTE_CIPHER_LEN} bytes, got {}",
            cipher_blob.len()
        )));
    }
    let ephemeral = public_from_slice(&cipher_blob[..32])?;
    let payload = EncryptedPayload::from_bytes(&cipher_blob[32..])?;
    let view_secret = secret_from_slice(view_secret_bytes)?;
    let shared_secret = derive_shared_secret(&view_secret, &ephemeral);
    let (amount, blinding) = note_cipher::decrypt_note(&payload, &shared_secret)?;
    let mut stream = RlpStream::new_list(2);
    stream.append(&amount);
    stream.append(&blinding.to_bytes().to_vec());
    Ok(stream.out().to_vec())
}

fn public_from_slice(bytes: &[u8]) -> Result<RistrettoPublic, CoreError> {
    let array: [u8; 32] =
        bytes.try_into().map_err(|_| CoreError::MalformedInput("public key must be 32 bytes".into()))?;
    Ok(RistrettoPublic::from_bytes(array)?)
}

fn secret_from_slice(bytes: &[u8]) -> Result<RistrettoSecret, CoreError> {
    let array: [u8; 32] =
        bytes.try_into().map_err(|_| CoreError::MalformedInput("secret key must be 32 bytes".into()))?;
    Ok(RistrettoSecret::from_canonical_bytes(array)?)
}
