use crate::crypto::commitment::Commitment;
use crate::crypto::keys::RistrettoPublic;
use crate::crypto::note_cipher::EncryptedPayload;
use crate::crypto::range_proof::AmountRangeProof;

/// One transaction output. Immutable once built.
///
/// Invariant: `commitment` opens to the amount recoverable from `payload` under the
/// recipient's view key, and `range_proof` validates against `commitment`.
#[derive(Clone, Debug)]
pub struct Note {
    /// The sender's single-use public key; lets the recipient re-derive the shared secret.
    pub ephemeral_pk: RistrettoPublic,
    /// One-time key authorizing a later spend of this note.
    pub sign_pk: RistrettoPublic,
    /// One-time destination key.
    pub spend_pk: RistrettoPublic,
    /// Pedersen commitment to the hidden amount.
    pub commitment: Commitment,
    /// Proof that the committed amount lies in the transaction's declared range.
    pub range_proof: AmountRangeProof,
    /// Ciphertext of the amount and blinding factor.
    pub payload: EncryptedPayload,
}
