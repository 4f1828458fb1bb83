//! Engine struct acts as a simplified API for the various parts of the Tempo engine.

use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::coretypes::{PlyKind, Position, WireMove};
use crate::error::{self, ErrorKind};
use crate::game::{Game, GameStatus, Outcome};
use crate::moves::Move;
use crate::movelist::MoveList;
use crate::search::{self, Difficulty, MiniMaxAi, SearchResult};

/// EngineBuilder allows for parameters of an Engine to be set and built once.
///
/// Default values:
///
/// * `game`: Starting chess position
/// * `difficulty`: Medium
/// * `depth`: None, so the difficulty decides
/// * `threads`: None, so the machine's parallelism decides
/// * `seed`: None, so the player is seeded from entropy
/// * `debug`: false
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EngineBuilder {
    game: Game,
    difficulty: Difficulty,
    depth: Option<PlyKind>,
    threads: Option<usize>,
    seed: Option<u64>,
    debug: bool,
}

impl EngineBuilder {
    /// Create a new default EngineBuilder.
    pub fn new() -> Self {
        Self {
            game: Game::new(),
            difficulty: Difficulty::default(),
            depth: None,
            threads: None,
            seed: None,
            debug: false,
        }
    }

    /// Create and return a new Engine.
    pub fn build(&self) -> Engine {
        let mut ai = match self.seed {
            Some(seed) => MiniMaxAi::with_seed(self.difficulty, seed),
            None => MiniMaxAi::new(self.difficulty),
        };
        if let Some(depth) = self.depth {
            ai = ai.depth(depth);
        }
        if let Some(threads) = self.threads {
            ai = ai.threads(threads);
        }

        Engine {
            game: self.game.clone(),
            ai,
            debug: self.debug,
            search_handle: None,
        }
    }

    /// Set the Engine's initial game state.
    pub fn game<T: Into<Game>>(mut self, game: T) -> Self {
        self.game = game.into();
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Search a fixed depth instead of the difficulty's depth.
    pub fn depth(mut self, depth: PlyKind) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set the number of threads root moves are searched on.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Seed the engine's player so its mistakes are reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set whether the engine begins in debug mode.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine owns a game and the computer player searching it.
/// Moves from either side are performed through the engine, so the game stays
/// the single source of truth for both the player and whoever drives the engine.
///
/// Only one search runs at a time, each on a snapshot of the game.
pub struct Engine {
    game: Game,
    ai: MiniMaxAi,
    debug: bool,

    search_handle: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    /// Returns reference to current game of engine.
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn difficulty(&self) -> Difficulty {
        self.ai.difficulty()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Set the game to search from.
    pub fn set_game<T: Into<Game>>(&mut self, game: T) {
        self.game = game.into();
    }

    pub fn set_debug(&mut self, new_debug: bool) {
        self.debug = new_debug;
    }

    /// Replace the game with the standard start position.
    pub fn new_game(&mut self) {
        self.game = Game::new();
    }

    /// Resolve and perform a move by coordinates. Same contract as `Game::perform_move`.
    pub fn perform_move(&mut self, from: Position, to: Position) -> MoveList {
        self.game.perform_move(from, to)
    }

    /// Perform an exact move returned by a search or by `perform_move`.
    pub fn perform(&mut self, move_: Move) {
        self.game.perform(move_)
    }

    /// Perform a move received in coordinate form.
    /// Returns None and leaves the game untouched if it is not legal for the player to move.
    pub fn perform_wire(&mut self, wire: &WireMove) -> Option<Move> {
        self.game.perform_wire(wire)
    }

    pub fn undo_move(&mut self) -> Option<Move> {
        self.game.undo_move()
    }

    pub fn status(&mut self) -> GameStatus {
        self.game.status()
    }

    /// Final result of the current game, or None while it is in progress.
    pub fn outcome(&mut self) -> Option<Outcome> {
        self.game.outcome()
    }

    /// Run a blocking search and return its result.
    pub fn search_sync(&mut self) -> error::Result<SearchResult> {
        self.wait()?;

        let (sender, receiver) = mpsc::channel();
        self.search(sender)?;
        self.wait()?;
        receiver
            .recv()
            .map_err(|err| error::Error::new(ErrorKind::EngineSearchFailed, err))
    }

    /// Run a non-blocking search on a snapshot of the current game.
    /// The engine only runs one search at a time, so if it is not ready, it fails to begin.
    pub fn search<T>(&mut self, sender: Sender<T>) -> error::Result<()>
    where
        T: From<SearchResult> + Send + 'static,
    {
        if self.search_handle.is_none() {
            if self.debug {
                debug!(game = %self.game, "starting search");
            }
            let handle = search::search_nonblocking(self.game.clone(), self.ai.fork(), sender);
            self.search_handle = Some(handle);

            Ok(())
        } else {
            Err((ErrorKind::EngineAlreadySearching, "failed to begin search").into())
        }
    }

    /// Engine blocks thread until search is completed.
    pub fn wait(&mut self) -> error::Result<()> {
        match self.search_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| (ErrorKind::EngineSearchFailed, "search thread panicked").into()),
            None => Ok(()),
        }
    }

    /// Returns true if the engine is ready to start a search.
    /// Only one search may run at a time, so if a search is in progress, engine is not ready.
    pub fn ready(&self) -> bool {
        self.search_handle.is_none()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(err) = self.wait() {
            warn!(%err, "search ended abnormally");
        }
    }
}
