//! Single-byte-keyed payload obfuscation
//!
//! Every payload byte is XORed with a keystream byte derived from the seed
//! and the byte's position, so the same operation both encrypts and
//! decrypts. For any fixed position, distinct seeds give distinct keystream
//! bytes: decrypting with the wrong seed changes every byte of the payload.

use crate::error::{Error, Result};

/// Seed value reserved as "no cipher"; valid seeds are 0..=254.
pub const RESERVED_SEED: u8 = 255;

/// Keystream blocks are this many bytes long.
const BLOCK_SHIFT: u32 = 8;

const SBOX: [u8; 256] = build_sbox();

// Odd multiplier, rotation and xor are all bijections on u8
const fn build_sbox() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let x = (i as u8).wrapping_mul(167).wrapping_add(91);
        table[i] = x.rotate_left(3) ^ 0xA5;
        i += 1;
    }
    table
}

/// Self-inverse payload transform keyed by one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCipher {
    seed: u8,
}

impl SeedCipher {
    /// # Errors
    ///
    /// Returns [`Error::SeedOutOfRange`] for the reserved seed 255.
    pub fn new(seed: u8) -> Result<Self> {
        if seed == RESERVED_SEED {
            return Err(Error::SeedOutOfRange(seed));
        }
        Ok(Self { seed })
    }

    pub fn seed(&self) -> u8 {
        self.seed
    }

    /// Keystream byte for payload offset `position`.
    fn key(&self, position: usize) -> u8 {
        let block = (position >> BLOCK_SHIFT) as u32;
        let block_mix = (block as u8).wrapping_mul(29) ^ (block >> 8) as u8;
        SBOX[usize::from(self.seed.wrapping_add(SBOX[position & 0xFF]))] ^ block_mix
    }

    /// Transform `payload` in place. Applying it twice restores the input.
    pub fn apply(&self, payload: &mut [u8]) {
        for (position, byte) in payload.iter_mut().enumerate() {
            *byte ^= self.key(position);
        }
    }

    pub fn decrypt(&self, payload: &[u8]) -> Vec<u8> {
        let mut out = payload.to_vec();
        self.apply(&mut out);
        out
    }

    pub fn encrypt(&self, payload: &[u8]) -> Vec<u8> {
        self.decrypt(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbox_is_a_permutation() {
        let mut seen = [false; 256];
        for &b in &SBOX {
            assert!(!seen[usize::from(b)]);
            seen[usize::from(b)] = true;
        }
    }

    #[test]
    fn test_self_inverse() {
        let plain: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();
        for seed in [0u8, 1, 153, 254] {
            let cipher = SeedCipher::new(seed).unwrap();
            let encrypted = cipher.encrypt(&plain);
            assert_ne!(encrypted, plain);
            assert_eq!(cipher.decrypt(&encrypted), plain);
        }
    }

    #[test]
    fn test_wrong_seed_changes_every_byte() {
        let plain = vec![0u8; 600];
        let encrypted = SeedCipher::new(153).unwrap().encrypt(&plain);
        for wrong in (0..=254u8).filter(|&s| s != 153) {
            let decrypted = SeedCipher::new(wrong).unwrap().decrypt(&encrypted);
            assert!(decrypted.iter().all(|&b| b != 0), "seed {wrong} left a byte unchanged");
        }
    }

    #[test]
    fn test_reserved_seed_rejected() {
        assert!(matches!(SeedCipher::new(255), Err(Error::SeedOutOfRange(255))));
    }
}
