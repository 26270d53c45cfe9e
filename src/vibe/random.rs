use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Number of pre-generated bytes in the ring.
pub const RING_LEN: usize = 7777;

/// Ring of pre-generated random bytes.
///
/// The model draws one or two bytes per pixel per frame; pulling them from a
/// fixed ring keeps that off the PRNG entirely.
pub struct RandomSource {
    ring: Box<[u8]>,
    cursor: usize,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ring = vec![0u8; RING_LEN].into_boxed_slice();
        rng.fill_bytes(&mut ring);

        Self { ring, cursor: 0 }
    }

    /// Seed from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn next_byte(&mut self) -> u8 {
        let byte = self.ring[self.cursor];
        self.cursor += 1;
        if self.cursor == self.ring.len() {
            self.cursor = 0;
        }
        byte
    }

    /// `next_byte() % n`.
    ///
    /// Biased towards small residues when `n` does not divide 256; for `n > 256`
    /// only residues below 256 are ever returned.
    pub fn next_mod(&mut self, n: u32) -> u32 {
        debug_assert!(n > 0, "next_mod called with n == 0");
        self.next_byte() as u32 % n
    }
}
