//! Key material for segment encryption

use rand::RngCore;
use rand::rngs::ThreadRng;

use crate::constants::AES_BLOCK_SIZE;

/// Anything that can hand out fresh 128-bit keys
pub trait KeySource {
    fn next_key(&mut self) -> [u8; AES_BLOCK_SIZE];
}

/// Keys drawn from a random number generator, the thread RNG by default
#[derive(Debug)]
pub struct RandomKeys<R: RngCore = ThreadRng> {
    rng: R,
}

impl RandomKeys<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomKeys<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> RandomKeys<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> KeySource for RandomKeys<R> {
    fn next_key(&mut self) -> [u8; AES_BLOCK_SIZE] {
        let mut key = [0u8; AES_BLOCK_SIZE];
        self.rng.fill_bytes(&mut key);
        key
    }
}
