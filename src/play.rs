//! Interactive game loops for the terminal.

use std::io::{self, Write};
use std::time::Duration;

use tracing::{info, warn};

use tempo_engine::error;
use tempo_engine::net::{Connection, Message};
use tempo_engine::{Color, Engine, Game, MiniMaxAi, Outcome, PlayerResult, WireMove};

/// How long the peer loop blocks on the socket before checking the connection again.
const PEER_POLL: Duration = Duration::from_millis(250);

enum InputKind {
    Exit,
    Newgame,
    Help,
    Undo,
    Error,
    GameMove(WireMove),
}

impl From<&str> for InputKind {
    fn from(s: &str) -> Self {
        let maybe_move: Result<WireMove, _> = s.trim().parse();
        if let Ok(move_) = maybe_move {
            Self::GameMove(move_)
        } else {
            match s {
                "exit" | "quit" => Self::Exit,
                "newgame" | "ng" => Self::Newgame,
                "help" => Self::Help,
                "undo" => Self::Undo,
                _ => Self::Error,
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("newgame | ng => Begin a new game.");
    println!("undo => Undo the position to return to your last move.");
    println!("help => Print this help text.");
    println!("exit => end CLI.");
    println!("\nTo make a move, enter a move in coordinate form.");
    println!("Examples: d2d4 -> Move piece on D2 to D4. e7e8q -> Promote to a queen.");
}

/// Read one trimmed line from stdin, or None at end of input.
fn prompt() -> error::Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    match io::stdin().read_line(&mut input)? {
        0 => Ok(None),
        _ => Ok(Some(input.trim().to_string())),
    }
}

fn announce(outcome: Outcome, perspective: Color) {
    match outcome.result_for(perspective) {
        PlayerResult::Win => println!("Congrats!! You won by CHECKMATE. ({outcome})"),
        PlayerResult::Loss => println!("Oh no!! You lost by CHECKMATE. ({outcome})"),
        PlayerResult::Draw => println!("The game is DRAWN via STALEMATE. ({outcome})"),
    }
}

/// Resolve a typed move for the player to move and perform it.
/// Returns false and explains why if nothing was performed.
fn perform_typed(game_move: &WireMove, perform: impl FnOnce(&WireMove) -> usize) -> bool {
    match perform(game_move) {
        1 => true,
        0 => {
            println!("That move was illegal! No action taken.");
            false
        }
        _ => {
            println!("Which piece? Add q, r, b or n to the move, for example {game_move}q.");
            false
        }
    }
}

/// Human against the engine, until the human exits.
pub fn versus_engine(mut engine: Engine, human: Color) -> error::Result<()> {
    print_help();

    loop {
        if let Some(outcome) = engine.outcome() {
            println!("{}", engine.game());
            announce(outcome, human);
            println!("Press Enter to start a new game.");
            if prompt()?.is_none() {
                break;
            }
            engine.new_game();
            continue;
        }

        if engine.game().next_player_color() != human {
            // Have computer play its response.
            println!("{}\nthinking...", engine.game());
            let result = engine.search_sync()?;
            if let Some(best_move) = result.best_move.clone() {
                println!("Tempo played move {best_move}.");
                println!("{result}");
                engine.perform(best_move);
            }
            continue;
        }

        println!("{}", engine.game());
        println!("Current Static cp  : {}", engine.game().evaluate_score(human));
        let input = match prompt()? {
            Some(input) => input,
            None => break,
        };

        match InputKind::from(input.as_str()) {
            InputKind::Exit => break,
            InputKind::Newgame => {
                engine.new_game();
                println!("Starting new game...");
            }
            InputKind::Help => print_help(),
            InputKind::Undo => {
                // Undo both computer's move and player's last move.
                for _ in 0..2 {
                    if let Some(undone) = engine.undo_move() {
                        println!("Undo move {undone}.");
                    }
                }
            }
            InputKind::Error => println!("Invalid command: {input}"),
            InputKind::GameMove(game_move) => {
                perform_typed(&game_move, |wire| match wire.promotion {
                    Some(_) => engine.perform_wire(wire).map_or(0, |_| 1),
                    None => engine.perform_move(wire.from, wire.to).len(),
                });
            }
        }
    }
    Ok(())
}

/// Two computer players against each other. Returns the outcome, or None if
/// the game ran out of plies first.
pub fn watch(mut white: MiniMaxAi, mut black: MiniMaxAi, max_plies: usize) -> Option<Outcome> {
    let mut game = Game::new();

    for ply in 0..max_plies {
        if let Some(outcome) = game.outcome() {
            println!("{game}");
            println!("Game over: {outcome}");
            if let Some(report) = game.report(white.difficulty().as_str(), black.difficulty().as_str()) {
                info!(white = %report.white, black = %report.black, outcome = %report.outcome, "game report");
            }
            return Some(outcome);
        }

        let player = match game.next_player_color() {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        let result = player.choose_move(&game);
        let best_move = result.best_move?;
        println!("{ply:>3}. {} {best_move} (score {}, {} nodes)", result.player, result.score, result.nodes);
        game.perform(best_move);
        println!("{}", game.board());
    }

    println!("No result after {max_plies} plies.");
    None
}

/// This side against a remote peer. The computer plays our side if `ai` is given.
pub fn versus_peer(mut connection: Connection, mut ai: Option<MiniMaxAi>) -> error::Result<()> {
    let us = connection.color();
    let mut game = Game::new();
    println!("Connected. You play {us}.");

    loop {
        if let Some(outcome) = game.outcome() {
            println!("{game}");
            announce(outcome, us);
            // The peer sees the same result and may already be gone.
            if let Err(err) = connection.send_bye() {
                info!(%err, "peer closed first");
            }
            return Ok(());
        }

        if game.next_player_color() == us {
            println!("{game}");
            let move_ = match ai.as_mut() {
                Some(ai) => ai.get_move(&game),
                None => match read_peer_move(&mut game)? {
                    Some(move_) => Some(move_),
                    None => {
                        connection.send_bye()?;
                        println!("You left the game.");
                        return Ok(());
                    }
                },
            };
            let move_ = match move_ {
                Some(move_) => move_,
                None => continue,
            };
            let wire = move_.wire();
            if ai.is_some() {
                game.perform(move_);
            }
            connection.send_move(&wire)?;
            println!("You played {wire}.");
            continue;
        }

        match connection.receive(PEER_POLL)? {
            Some(Message::Move(wire)) => match game.perform_wire(&wire) {
                Some(move_) => println!("Peer played {move_}."),
                None => {
                    warn!(%wire, "peer sent an illegal move");
                    println!("Peer sent illegal move {wire}, leaving.");
                    connection.send_bye()?;
                    return Ok(());
                }
            },
            Some(Message::Bye) => {
                println!("Peer left the game.");
                connection.disconnect();
                return Ok(());
            }
            Some(Message::Unknown(_)) => (),
            None if !connection.is_connected() => {
                println!("Connection to peer lost.");
                return Ok(());
            }
            None => (),
        }
    }
}

/// Read moves from the terminal until one is performed on `game`.
/// Returns None if the player exits.
fn read_peer_move(game: &mut Game) -> error::Result<Option<tempo_engine::Move>> {
    loop {
        let input = match prompt()? {
            Some(input) => input,
            None => return Ok(None),
        };
        match InputKind::from(input.as_str()) {
            InputKind::Exit => return Ok(None),
            InputKind::Help => print_help(),
            InputKind::GameMove(game_move) => {
                let performed: Vec<_> = match game_move.promotion {
                    Some(_) => game.perform_wire(&game_move).into_iter().collect(),
                    None => game.perform_move(game_move.from, game_move.to),
                };
                if perform_typed(&game_move, |_| performed.len()) {
                    return Ok(performed.into_iter().next());
                }
            }
            InputKind::Newgame | InputKind::Undo | InputKind::Error => {
                println!("Not available in a network game: {input}");
            }
        }
    }
}
