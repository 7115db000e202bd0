//! Wire encodings.
//!
//! Three encodings live here: the canonical RLP form of a signed [`Transaction`] (the
//! bytes that cross the boundary and that signatures are anchored to), and the two
//! logical-request decoders — structured JSON for debuggability and compact RLP — which
//! both produce the same [`TxRequest`] and therefore the same canonical bytes.

use crate::crypto::commitment::Commitment;
use crate::crypto::keys::{RistrettoPublic, RistrettoSecret};
use crate::crypto::note_cipher::EncryptedPayload;
use crate::crypto::range_proof::AmountRangeProof;
use crate::crypto::schnorr::Signature;
use crate::note::Note;
use crate::transaction::builder::{InputSpec, OutputSpec, TxRequest};
use crate::transaction::{Transaction, TxInput, TX_VERSION};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

fn bytes32(rlp: &Rlp, index: usize) -> Result<[u8; 32], DecoderError> {
    let data: Vec<u8> = rlp.val_at(index)?;
    if data.len() != 32 {
        return Err(DecoderError::Custom("expected a 32-byte field"));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&data);
    Ok(out)
}

fn public_key(rlp: &Rlp, index: usize) -> Result<RistrettoPublic, DecoderError> {
    RistrettoPublic::from_bytes(bytes32(rlp, index)?).map_err(|_| DecoderError::Custom("invalid public key point"))
}

fn secret_scalar(rlp: &Rlp, index: usize) -> Result<RistrettoSecret, DecoderError> {
    RistrettoSecret::from_canonical_bytes(bytes32(rlp, index)?)
        .map_err(|_| DecoderError::Custom("non-canonical secret scalar"))
}

impl Encodable for TxInput {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.note_ref.to_vec());
        s.append(&self.commitment.as_bytes().to_vec());
        s.append(&self.sign_pk.as_bytes().to_vec());
        s.append(&self.signature.to_bytes().to_vec());
    }
}

impl Decodable for TxInput {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() || rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let note_ref = bytes32(rlp, 0)?;
        let commitment = Commitment::from_bytes(bytes32(rlp, 1)?)
            .map_err(|_| DecoderError::Custom("invalid commitment point"))?;
        let sign_pk = public_key(rlp, 2)?;
        let sig_bytes: Vec<u8> = rlp.val_at(3)?;
        let signature = Signature::from_bytes(&sig_bytes).map_err(|_| DecoderError::Custom("invalid signature"))?;
        Ok(TxInput { note_ref, commitment, sign_pk, signature })
    }
}

impl Encodable for Note {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        s.append(&self.ephemeral_pk.as_bytes().to_vec());
        s.append(&self.sign_pk.as_bytes().to_vec());
        s.append(&self.spend_pk.as_bytes().to_vec());
        s.append(&self.commitment.as_bytes().to_vec());
        s.append(&self.range_proof.to_bytes());
        s.append(&self.payload.to_bytes().to_vec());
    }
}

impl Decodable for Note {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() || rlp.item_count()? != 6 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let ephemeral_pk = public_key(rlp, 0)?;
        let sign_pk = public_key(rlp, 1)?;
        let spend_pk = public_key(rlp, 2)?;
        let commitment = Commitment::from_bytes(bytes32(rlp, 3)?)
            .map_err(|_| DecoderError::Custom("invalid commitment point"))?;
        let proof_bytes: Vec<u8> = rlp.val_at(4)?;
        let range_proof =
            AmountRangeProof::from_bytes(&proof_bytes).map_err(|_| DecoderError::Custom("invalid range proof"))?;
        let payload_bytes: Vec<u8> = rlp.val_at(5)?;
        let payload = EncryptedPayload::from_bytes(&payload_bytes)
            .map_err(|_| DecoderError::Custom("invalid encrypted payload"))?;
        Ok(Note { ephemeral_pk, sign_pk, spend_pk, commitment, range_proof, payload })
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.version);
        s.append(&self.bit_width);
        s.append_list(&self.inputs);
        s.append_list(&self.outputs);
        s.append(&self.fee);
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() || rlp.item_count()? != 5 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let version: u8 = rlp.val_at(0)?;
        if version != TX_VERSION {
            return Err(DecoderError::Custom("unsupported transaction version"));
        }
        Ok(Transaction {
            version,
            bit_width: rlp.val_at(1)?,
            inputs: rlp.list_at(2)?,
            outputs: rlp.list_at(3)?,
            fee: rlp.val_at(4)?,
        })
    }
}

/// The signature-relevant fields of an input, borrowed so the builder can compute the
/// signing bytes before any signature exists.
pub(crate) struct InputBodyRef<'a> {
    pub note_ref: &'a [u8; 32],
    pub commitment: &'a Commitment,
    pub sign_pk: &'a RistrettoPublic,
}

/// The committed transaction body: everything except input signatures and range proofs.
/// Both the builder (to sign) and the verifier (to check) derive this from the same code
/// path so the two can never drift apart.
pub(crate) fn signing_bytes(
    version: u8,
    bit_width: u8,
    inputs: &[InputBodyRef<'_>],
    outputs: &[Note],
    fee: u64,
) -> Vec<u8> {
    let mut s = RlpStream::new_list(5);
    s.append(&version);
    s.append(&bit_width);
    s.begin_list(inputs.len());
    for input in inputs {
        s.begin_list(3);
        s.append(&input.note_ref.to_vec());
        s.append(&input.commitment.as_bytes().to_vec());
        s.append(&input.sign_pk.as_bytes().to_vec());
    }
    s.begin_list(outputs.len());
    for note in outputs {
        s.begin_list(5);
        s.append(&note.ephemeral_pk.as_bytes().to_vec());
        s.append(&note.sign_pk.as_bytes().to_vec());
        s.append(&note.spend_pk.as_bytes().to_vec());
        s.append(&note.commitment.as_bytes().to_vec());
        s.append(&note.payload.to_bytes().to_vec());
    }
    s.append(&fee);
    s.out().to_vec()
}

impl Encodable for InputSpec {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.note_ref.to_vec());
        s.append(&self.amount);
        s.append(&self.blinding.to_bytes().to_vec());
        s.append(&self.sign_secret.to_bytes().to_vec());
    }
}

impl Decodable for InputSpec {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() || rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(InputSpec {
            note_ref: bytes32(rlp, 0)?,
            amount: rlp.val_at(1)?,
            blinding: secret_scalar(rlp, 2)?,
            sign_secret: secret_scalar(rlp, 3)?,
        })
    }
}

impl Encodable for OutputSpec {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.amount);
        s.append(&self.view_public.as_bytes().to_vec());
        s.append(&self.spend_public.as_bytes().to_vec());
    }
}

impl Decodable for OutputSpec {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() || rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(OutputSpec { amount: rlp.val_at(0)?, view_public: public_key(rlp, 1)?, spend_public: public_key(rlp, 2)? })
    }
}

impl Encodable for TxRequest {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.bit_width);
        s.append(&self.fee);
        s.append_list(&self.inputs);
        s.append_list(&self.outputs);
    }
}

impl Decodable for TxRequest {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() || rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(TxRequest {
            bit_width: rlp.val_at(0)?,
            fee: rlp.val_at(1)?,
            inputs: rlp.list_at(2)?,
            outputs: rlp.list_at(3)?,
        })
    }
}

/// Decode a structured (JSON) transaction request.
pub fn request_from_json(bytes: &[u8]) -> Result<TxRequest, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Decode a compact (RLP) transaction request carrying the same logical content as the
/// JSON form.
pub fn request_from_rlp(bytes: &[u8]) -> Result<TxRequest, DecoderError> {
    rlp::decode(bytes)
}
