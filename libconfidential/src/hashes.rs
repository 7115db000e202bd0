use blake2::{Blake2b512, Digest};
use curve25519_dalek_ng::scalar::Scalar;

/// Hash arbitrary input to a canonical scalar under a domain separator.
///
/// Uses a 64-byte Blake2b digest with wide reduction, so the result is always
/// a canonical scalar regardless of input.
pub fn hash_to_scalar<B: AsRef<[u8]>>(domain: &[u8], input: B) -> Scalar {
    let mut hasher = Blake2b512::new();
    hasher.update(domain);
    hasher.update(input.as_ref());
    let result: [u8; 64] = hasher.finalize().into();
    Scalar::from_bytes_mod_order_wide(&result)
}

/// Domain-separated 16-byte authentication tag over the given parts.
pub fn keyed_tag(domain: &[u8], parts: &[&[u8]]) -> [u8; 16] {
    let mut hasher = Blake2b512::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }
    let result: [u8; 64] = hasher.finalize().into();
    let mut tag = [0u8; 16];
    tag.copy_from_slice(&result[..16]);
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_separate() {
        let a = hash_to_scalar(b"domain_a", b"input");
        let b = hash_to_scalar(b"domain_b", b"input");
        assert_ne!(a, b);
    }

    #[test]
    fn deterministic() {
        let a = hash_to_scalar(b"domain", b"input");
        let b = hash_to_scalar(b"domain", b"input");
        assert_eq!(a, b);
    }
}
