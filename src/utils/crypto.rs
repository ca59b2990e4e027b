//! Crypto Utilities
//!
//! Keccak-256 helpers shared by the resolver, the codec and the domain hasher.

use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Keccak256 over several slices, as if they were concatenated
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    keccak256_iter(parts.iter().copied())
}

/// Keccak256 over a stream of slices, without buffering them
pub fn keccak256_iter<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"hello");
        assert_eq!(
            hex::encode(hash),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_concat_matches_single_pass() {
        assert_eq!(keccak256_concat(&[&b"hel"[..], &b""[..], &b"lo"[..]]), keccak256(b"hello"));
    }

    #[test]
    fn test_keccak256_iter_repeated_part() {
        let word = [7u8; 32];
        let streamed = keccak256_iter(std::iter::repeat(&word[..]).take(5));
        assert_eq!(streamed, keccak256(&word.repeat(5)));
    }
}
