//! Deterministic RNG streams segregated by simulation domain.
//!
//! Each draw reseeds a small generator from the user seed, the stream tag and
//! a per-stream counter. The counters live in the game state, so a saved
//! snapshot reproduces every future roll exactly.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    /// Job epic-moment rolls.
    Epic,
    /// Hike finds.
    Discovery,
    /// Breakdowns on the road.
    Travel,
    /// Rangers and night scenes.
    Camp,
    /// Pet names and pet searches.
    Pet,
}

impl Stream {
    #[must_use]
    pub const fn tag(self) -> &'static [u8] {
        match self {
            Self::Epic => b"epic",
            Self::Discovery => b"discovery",
            Self::Travel => b"travel",
            Self::Camp => b"camp",
            Self::Pet => b"pet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RngStreams {
    seed: u64,
    #[serde(default)]
    draws: BTreeMap<Stream, u64>,
}

impl RngStreams {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            draws: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of generators handed out on `stream` so far.
    #[must_use]
    pub fn draws(&self, stream: Stream) -> u64 {
        self.draws.get(&stream).copied().unwrap_or(0)
    }

    /// Fresh generator for the next draw on `stream`.
    pub fn next(&mut self, stream: Stream) -> SmallRng {
        let counter = self.draws.entry(stream).or_insert(0);
        let seed = derive_stream_seed(self.seed, stream.tag(), *counter);
        *counter = counter.saturating_add(1);
        SmallRng::seed_from_u64(seed)
    }

    /// Uniform roll in `[0, 1)` on `stream`.
    pub fn roll(&mut self, stream: Stream) -> f32 {
        use rand::Rng;
        self.next(stream).r#gen::<f32>()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8], counter: u64) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed ^ counter;
    };
    mac.update(domain_tag);
    mac.update(&counter.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
