//! Pluggable flavor content for WATCH.
//!
//! Providers own their own randomness so the core's epic and discovery
//! rolls stay reproducible no matter what a provider does.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorPayload {
    pub channel: String,
    pub title: String,
    /// Extra morale on top of the base WATCH reward.
    #[serde(default)]
    pub morale_bonus: f32,
}

/// What the provider knows about the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchContext<'a> {
    pub location_id: &'a str,
    pub day: u32,
    pub morale: f32,
}

pub trait ContentProvider {
    /// Produce something to watch. Returning `None` means the feed is empty.
    fn watch(&mut self, ctx: &WatchContext<'_>) -> Option<FlavorPayload>;
}

/// Always-empty provider; WATCH still grants its base reward.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl ContentProvider for NoContent {
    fn watch(&mut self, _ctx: &WatchContext<'_>) -> Option<FlavorPayload> {
        None
    }
}

const CHANNELS: [&str; 3] = ["streaming", "video", "podcast"];

const TITLES: [&str; 8] = [
    "Desert Wiring 101: Fuses Before Feelings",
    "Van Build Regrets, Ranked",
    "Sourdough at Altitude",
    "Why Your Inverter Is Screaming",
    "Ranger Knocks: An Oral History",
    "Skoolie Roof Decks Gone Wrong",
    "Night Sky Timelapse, Moab",
    "Tire Plug Speedrun",
];

/// Default provider drawing from a fixed catalog with its own seeded stream.
#[derive(Debug, Clone)]
pub struct SeededContent {
    rng: ChaCha20Rng,
}

impl SeededContent {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl ContentProvider for SeededContent {
    fn watch(&mut self, ctx: &WatchContext<'_>) -> Option<FlavorPayload> {
        let channel = CHANNELS[self.rng.gen_range(0..CHANNELS.len())];
        let title = TITLES[self.rng.gen_range(0..TITLES.len())];
        // Low spirits get a bigger lift from a good episode.
        let morale_bonus = if ctx.morale < 30.0 { 2.0 } else { 0.0 };
        Some(FlavorPayload {
            channel: channel.to_string(),
            title: title.to_string(),
            morale_bonus,
        })
    }
}
