//! Owning wrapper that applies one action at a time.
use crate::actions::Action;
use crate::content::{ContentProvider, SeededContent};
use crate::environment::EnvironmentSnapshot;
use crate::outcome::ActionOutcome;
use crate::resolver::resolve_with;
use crate::state::GameState;

/// A running journey. Taking `&mut self` for every action keeps resolution
/// strictly sequential.
pub struct Session {
    state: GameState,
    content: Box<dyn ContentProvider>,
}

impl Session {
    /// Session with the default WATCH catalog, seeded from the game seed.
    #[must_use]
    pub fn new(state: GameState) -> Self {
        let seed = state.rng.seed();
        Self::with_content(state, Box::new(SeededContent::new(seed)))
    }

    #[must_use]
    pub fn with_content(state: GameState, content: Box<dyn ContentProvider>) -> Self {
        Self { state, content }
    }

    pub fn apply(&mut self, action: Action, env: &EnvironmentSnapshot) -> ActionOutcome {
        let (next, outcome) = resolve_with(&self.state, action, env, self.content.as_mut());
        self.state = next;
        outcome
    }

    /// Parse a dispatcher's `(verb, argument)` pair and apply it. Parse
    /// failures come back as rejected outcomes.
    pub fn apply_command(
        &mut self,
        verb: &str,
        arg: &str,
        env: &EnvironmentSnapshot,
    ) -> ActionOutcome {
        match Action::parse(verb, arg) {
            Ok(action) => self.apply(action, env),
            Err(rejection) => ActionOutcome::rejected(verb.trim(), rejection),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Complete copy suitable for saving.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn restore(&mut self, mut state: GameState) {
        state.normalize();
        self.state = state;
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.is_over()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
