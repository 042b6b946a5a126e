//! Seedable randomness, split into named per-consumer streams.
//!
//! Every consumer of randomness (spawn defaults, zombie steering, fire
//! spread) draws from its own ChaCha8 stream derived from the master seed,
//! so a whole game run replays identically from one scenario seed no
//! matter how the individual consumers interleave their draws.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    /// Stream for a named consumer, created on first use with a seed drawn
    /// from the master generator.
    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let master = &mut self.master;
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(master.next_u64()));
        SystemRng { inner: entry }
    }
}

/// Borrowed handle onto one named stream.
pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl RngCore for SystemRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn equal_seeds_replay_identically() {
        let mut a = RngManager::new(7);
        let mut b = RngManager::new(7);
        let first: u64 = a.stream("fire").gen();
        let second: u64 = b.stream("fire").gen();
        assert_eq!(first, second);
    }

    #[test]
    fn streams_are_independent() {
        let mut manager = RngManager::new(7);
        let fire: u64 = manager.stream("fire").gen();
        let zombies: u64 = manager.stream("zombies").gen();
        assert_ne!(fire, zombies);
    }

    #[test]
    fn a_stream_continues_where_it_left_off() {
        let mut manager = RngManager::new(7);
        let first: u64 = manager.stream("fire").gen();
        let second: u64 = manager.stream("fire").gen();
        assert_ne!(first, second);

        let mut replay = RngManager::new(7);
        let replay_first: u64 = replay.stream("fire").gen();
        let replay_second: u64 = replay.stream("fire").gen();
        assert_eq!(first, replay_first);
        assert_eq!(second, replay_second);
    }
}
