//! Search functions.

mod minimax;

pub use minimax::*;

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::coretypes::{Color, Cp, PlyKind};
use crate::error::{self, ErrorKind};
use crate::game::Game;
use crate::moves::Move;

/// Score of delivering checkmate with one ply of depth remaining.
/// Deeper remaining depth means a faster mate, so mate scores are scaled by it.
pub const MATE_SCORE: Cp = Cp(100_000);

/// How strong the minimax player is.
///
/// | Difficulty   | Depth | Mistakes | Widens in endgame |
/// |--------------|-------|----------|-------------------|
/// | Easy         | 3     | 20%      | no                |
/// | Medium       | 4     | 10%      | no                |
/// | Hard         | 4     | 0%       | yes               |
/// | ShortSighted | 3     | 0%       | yes               |
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    ShortSighted,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::ShortSighted,
    ];

    /// Search depth with a full board.
    pub const fn base_depth(&self) -> PlyKind {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 4,
            Difficulty::ShortSighted => 3,
        }
    }

    /// Chance that any single reply is left out of consideration during search.
    pub const fn mistake_probability(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.2,
            Difficulty::Medium => 0.1,
            Difficulty::Hard => 0.0,
            Difficulty::ShortSighted => 0.0,
        }
    }

    /// Returns true if the search deepens as pieces come off the board.
    pub const fn widens(&self) -> bool {
        matches!(self, Difficulty::Hard | Difficulty::ShortSighted)
    }

    /// Search depth for a board holding `piece_count` pieces.
    /// Each threshold crossed adds to the depth: +1 below 15, +1 below 10,
    /// +1 below 7 and +3 below 5.
    pub const fn depth_for(&self, piece_count: usize) -> PlyKind {
        let mut depth = self.base_depth();
        if self.widens() {
            if piece_count < 15 {
                depth += 1;
            }
            if piece_count < 10 {
                depth += 1;
            }
            if piece_count < 7 {
                depth += 1;
            }
            if piece_count < 5 {
                depth += 3;
            }
        }
        depth
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::ShortSighted => "shortsighted",
        }
    }
}

impl FromStr for Difficulty {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "shortsighted" | "short-sighted" => Ok(Difficulty::ShortSighted),
            _ => Err((ErrorKind::ParseDifficultyMalformed, s).into()),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The results found from running a search on some root position.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The best move to make, or None if the player to move has no legal move.
    pub best_move: Option<Move>,
    /// Score of the best move, relative to `player`.
    pub score: Cp,
    /// The player to move for the root position that was searched.
    pub player: Color,
    /// Difficulty the search ran with.
    pub difficulty: Difficulty,
    /// Depth in plies that was searched.
    pub depth: PlyKind,
    /// Total number of nodes visited in a search.
    pub nodes: u64,
    /// Total time elapsed from the start to the end of a search.
    pub elapsed: Duration,
}

impl SearchResult {
    /// Get average nodes per second of search.
    pub fn nps(&self) -> f64 {
        (self.nodes as f64 / self.elapsed.as_secs_f64()).round()
    }

    /// Returns true if the best move leads to a forced checkmate for `player`.
    pub fn is_mate(&self) -> bool {
        self.score >= MATE_SCORE
    }
}

impl Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let best_move = match &self.best_move {
            Some(move_) => move_.to_string(),
            None => "(none)".to_string(),
        };

        let mut displayed = String::new();
        displayed.push_str("SearchResult {\n");
        displayed.push_str(&format!("    best_move : {}\n", best_move));
        displayed.push_str(&format!("    score     : {}\n", self.score));
        displayed.push_str(&format!("    player    : {}\n", self.player));
        displayed.push_str(&format!("    difficulty: {}\n", self.difficulty));
        displayed.push_str(&format!("    depth     : {}\n", self.depth));
        displayed.push_str(&format!("    nodes     : {}\n", self.nodes));
        displayed.push_str(&format!("    nps       : {}\n", self.nps()));
        displayed.push_str(&format!(
            "    elapsed   : {}.{:03}s\n",
            self.elapsed.as_secs(),
            self.elapsed.subsec_millis()
        ));
        displayed.push_str("}\n");

        write!(f, "{displayed}")
    }
}

/// Tempo Engine non-blocking search function. This runs the search on a separate thread.
/// When the search has been completed, it returns the value by sending it over the given Sender.
///
/// # Arguments
///
/// * `game`: State of the current active game, searched from the player to move
/// * `ai`: Player that runs the search, owned by the search thread
/// * `sender`: Channel to send search result over
pub fn search_nonblocking<P, T>(
    game: P,
    mut ai: MiniMaxAi,
    sender: mpsc::Sender<T>,
) -> thread::JoinHandle<()>
where
    T: 'static + Send + From<SearchResult>,
    P: Into<Game>,
{
    let game: Game = game.into();

    thread::spawn(move || {
        let search_result = ai.choose_move(&game);
        if sender.send(search_result.into()).is_err() {
            debug!("search result receiver hung up");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_depths() {
        assert_eq!(Difficulty::Easy.depth_for(32), 3);
        assert_eq!(Difficulty::Medium.depth_for(32), 4);
        assert_eq!(Difficulty::Hard.depth_for(32), 4);
        assert_eq!(Difficulty::ShortSighted.depth_for(32), 3);

        // Only Hard and ShortSighted widen.
        assert_eq!(Difficulty::Easy.depth_for(3), 3);
        assert_eq!(Difficulty::Medium.depth_for(3), 4);
        assert_eq!(Difficulty::Hard.depth_for(14), 5);
        assert_eq!(Difficulty::Hard.depth_for(9), 6);
        assert_eq!(Difficulty::Hard.depth_for(6), 7);
        assert_eq!(Difficulty::Hard.depth_for(4), 10);
        assert_eq!(Difficulty::ShortSighted.depth_for(4), 9);
    }

    #[test]
    fn difficulty_mistakes() {
        assert_eq!(Difficulty::Easy.mistake_probability(), 0.2);
        assert_eq!(Difficulty::Medium.mistake_probability(), 0.1);
        assert_eq!(Difficulty::Hard.mistake_probability(), 0.0);
        assert_eq!(Difficulty::ShortSighted.mistake_probability(), 0.0);
    }

    #[test]
    fn default_difficulty_is_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(Difficulty::default().to_string().parse::<Difficulty>().unwrap(), Difficulty::Medium);
    }

    #[test]
    fn parse_difficulty() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.to_string().parse::<Difficulty>().unwrap(), difficulty);
        }
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(
            "impossible".parse::<Difficulty>().unwrap_err().kind(),
            ErrorKind::ParseDifficultyMalformed
        );
    }
}
