//! Nomads Game Engine
//!
//! Platform-agnostic simulation core for the Nomads van-life game: stats,
//! consumables, the off-grid electrical system and the action resolver.
//! Rendering, maps and input loops live elsewhere.

pub mod actions;
pub mod camp;
pub mod clock;
pub mod constants;
pub mod content;
pub mod electrical;
pub mod environment;
pub mod error;
pub mod inventory;
pub mod jobs;
pub mod numbers;
pub mod outcome;
pub mod pet;
pub mod quests;
pub mod resolver;
pub mod resources;
pub mod rng;
pub mod seed;
pub mod session;
pub mod state;
pub mod stats;
pub mod store;
pub mod vehicle;

// Re-export commonly used types
pub use actions::{Action, BuyItem, CampStyle, ChargeMethod, PetVerb};
pub use clock::Clock;
pub use content::{ContentProvider, FlavorPayload, NoContent, SeededContent, WatchContext};
pub use electrical::{ElectricalSystem, PowerSource, PowerState, PowerTransition};
pub use environment::{EnvironmentSnapshot, Facilities, HeatBand, SolarSite, Weather, WindBand};
pub use error::{CatalogError, Generator, Rejection};
pub use inventory::{Device, Devices, Inventory};
pub use jobs::{Job, JobKind, JobPerks, JobTable, QuestItem, QuestSpec, QuestVerb};
pub use outcome::ActionOutcome;
pub use pet::Pet;
pub use quests::{Progress, QuestStatus};
pub use resolver::{hike_energy_cost, resolve, resolve_with};
pub use resources::{Consumable, ResourceDelta, ResourceLedger, Stock};
pub use rng::{RngStreams, Stream};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy, parse_seed_input};
pub use session::Session;
pub use state::{GamePhase, GameState, NewGame};
pub use stats::{Stat, StatBlock, StatDelta};
pub use vehicle::{Drivetrain, Vehicle, VehicleCatalog, VehicleKind, VehicleSpec};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the vehicle catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_vehicles(&self) -> Result<VehicleCatalog, Self::Error>;

    /// Load the job perk table
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or fails validation.
    fn load_jobs(&self) -> Result<JobTable, Self::Error>;
}

/// Loader backed by the catalogs compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl DataLoader for EmbeddedLoader {
    type Error = CatalogError;

    fn load_vehicles(&self) -> Result<VehicleCatalog, Self::Error> {
        Ok(VehicleCatalog::embedded().clone())
    }

    fn load_jobs(&self) -> Result<JobTable, Self::Error> {
        Ok(JobTable::embedded().clone())
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main game engine for managing game instances
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Create a new game from character-creation choices
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded or lack the chosen
    /// vehicle or job.
    pub fn create_game(&self, cfg: &NewGame) -> Result<GameState, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let vehicles = self.data_loader.load_vehicles().map_err(Into::into)?;
        let jobs = self.data_loader.load_jobs().map_err(Into::into)?;
        Ok(GameState::from_catalogs(cfg, &vehicles, &jobs)?)
    }

    /// Start a session around a fresh game.
    ///
    /// # Errors
    ///
    /// See [`GameEngine::create_game`].
    pub fn create_session(&self, cfg: &NewGame) -> Result<Session, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        self.create_game(cfg).map(Session::new)
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameState>, S::Error> {
        Ok(self.storage.load_game(save_name)?.map(|mut game_state| {
            // Snapshots may come from older builds or hand edits
            game_state.normalize();
            game_state
        }))
    }

    /// Delete a saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}
