//! Diffie-Hellman shared secret derivation.
//!
//! The sender computes the shared secret from its ephemeral secret and the recipient's
//! view public key; the recipient computes the same secret from its view secret and the
//! note's ephemeral public key. This symmetry is what lets the sender encrypt a note
//! payload the recipient can decrypt without any direct key exchange.

use crate::crypto::keys::{RistrettoPublic, RistrettoSecret};
use crate::hashes::hash_to_scalar;
use curve25519_dalek_ng::scalar::Scalar;
use std::fmt::Debug;
use zeroize::Zeroizing;

/// Domain separator for shared secret derivation.
pub const SHARED_SECRET_DOMAIN: &[u8] = b"ConfidentialTx/SharedSecret";

/// A scalar shared secret. Securely erased from memory when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Zeroizing<Scalar>);

impl SharedSecret {
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret")
    }
}

/// Derive a shared secret scalar from a secret key and a peer's public key.
///
/// Computes `H(domain || secret * peer)`, hashing the DH point to a field element so
/// that the raw curve point never leaves this function.
pub fn derive_shared_secret(secret: &RistrettoSecret, peer: &RistrettoPublic) -> SharedSecret {
    let shared_point = secret.as_scalar() * peer.as_point();
    let compressed = shared_point.compress();
    let scalar = hash_to_scalar(SHARED_SECRET_DOMAIN, compressed.as_bytes());
    SharedSecret(Zeroizing::new(scalar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{KeyOrigin, KeyPair};

    #[test]
    fn shared_secret_is_symmetric() {
        let mut rng = rand_core::OsRng;
        let recipient = KeyPair::generate(KeyOrigin::Random, &mut rng).unwrap();
        let ephemeral_secret = RistrettoSecret::random(&mut rng);
        let ephemeral_public = RistrettoPublic::from_secret(&ephemeral_secret);

        // Sender side: ephemeral secret with recipient's view public.
        let sender_side = derive_shared_secret(&ephemeral_secret, &recipient.view_public);
        // Recipient side: view secret with the published ephemeral public.
        let recipient_side = derive_shared_secret(&recipient.view_secret, &ephemeral_public);

        assert_eq!(sender_side, recipient_side);
    }

    #[test]
    fn different_peers_produce_different_secrets() {
        let mut rng = rand_core::OsRng;
        let ephemeral_secret = RistrettoSecret::random(&mut rng);
        let bob = KeyPair::generate(KeyOrigin::Random, &mut rng).unwrap();
        let charlie = KeyPair::generate(KeyOrigin::Random, &mut rng).unwrap();

        let with_bob = derive_shared_secret(&ephemeral_secret, &bob.view_public);
        let with_charlie = derive_shared_secret(&ephemeral_secret, &charlie.view_public);
        assert_ne!(with_bob, with_charlie);
    }
}
