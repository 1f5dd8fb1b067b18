/// Class B packet obfuscation keystream
///
/// The keystream is a chain of SHA256 digests seeded by the sender's address string:
///
/// ```text
/// hash[1]   = SHA256(seed)
/// hash[n+1] = SHA256(UPPERCASE_HEX(hash[n]))
/// ```
///
/// Packet `n` (1-based) is XORed with the leading bytes of `hash[n]`. Because XOR is
/// symmetric the same operation obfuscates and deobfuscates.
///
/// # Usage
///
/// ```rust
/// use omni_codec::crypto::{apply_keystream, ObfuscationHashes};
///
/// let hashes = ObfuscationHashes::new("1EXoDusjGwvnjZUyKkxZ4UHEf77z6A5S4P", 2);
/// let mut packet = [0x01u8; 31];
/// apply_keystream(&mut packet, hashes.get(1).unwrap());
/// apply_keystream(&mut packet, hashes.get(1).unwrap());
/// assert_eq!(packet, [0x01u8; 31]);
/// ```
use sha2::{Digest, Sha256};

/// Precomputed keystream hashes for one seed
#[derive(Debug, Clone)]
pub struct ObfuscationHashes {
    hashes: Vec<[u8; 32]>,
}

impl ObfuscationHashes {
    /// Derive the first `count` hashes of the chain for `seed`
    pub fn new(seed: &str, count: usize) -> Self {
        let mut hashes = Vec::with_capacity(count);
        let mut hash_input = seed.as_bytes().to_vec();
        for _ in 0..count {
            let digest: [u8; 32] = Sha256::digest(&hash_input).into();
            hash_input = hex::encode_upper(digest).into_bytes();
            hashes.push(digest);
        }
        Self { hashes }
    }

    /// Hash for packet `sequence` (1-based)
    pub fn get(&self, sequence: usize) -> Option<&[u8; 32]> {
        sequence.checked_sub(1).and_then(|index| self.hashes.get(index))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// XOR `data` in place with the leading bytes of `hash`
///
/// Packets are never longer than a digest; bytes past 32 are left untouched.
pub fn apply_keystream(data: &mut [u8], hash: &[u8; 32]) {
    for (byte, key) in data.iter_mut().zip(hash.iter()) {
        *byte ^= key;
    }
}
