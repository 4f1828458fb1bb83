//! Main CLI interface to Tempo engine.

mod play;

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tempo_engine::error;
use tempo_engine::net::{Connection, DEFAULT_PORT};
use tempo_engine::{Color, Difficulty, EngineBuilder, MiniMaxAi};

/// Play chess against the Tempo minimax player, watch it play itself,
/// or play a peer over the network.
#[derive(Parser, Debug)]
#[command(name = "tempo", version, about)]
struct Cli {
    /// Log more. Repeat for more detail. RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play against the computer. This is the default.
    Play(PlayArgs),
    /// Watch the computer play itself.
    Watch {
        /// Difficulty of the White player
        #[arg(long, default_value = "hard")]
        white: Difficulty,
        /// Difficulty of the Black player
        #[arg(long, default_value = "hard")]
        black: Difficulty,
        /// Stop after this many plies without a result
        #[arg(long, default_value = "200")]
        max_plies: usize,
        #[command(flatten)]
        ai: AiArgs,
    },
    /// Wait for a peer to connect, then play White against them.
    Host {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[command(flatten)]
        peer: PeerArgs,
    },
    /// Connect to a hosting peer and play Black against them.
    Join {
        /// Address of the host, for example 192.168.0.7:41000
        addr: SocketAddr,
        #[command(flatten)]
        peer: PeerArgs,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
struct PlayArgs {
    /// The color you play
    #[arg(short, long, value_enum, default_value_t)]
    color: ArgColor,
    #[command(flatten)]
    ai: AiArgs,
}

/// Settings of a computer player.
#[derive(Args, Debug, Clone, Default, PartialEq)]
struct AiArgs {
    /// Strength of the computer player
    #[arg(short, long, default_value_t)]
    difficulty: Difficulty,
    /// Search exactly this many plies instead of the difficulty's depth
    #[arg(long)]
    depth: Option<u8>,
    /// Seed for reproducible mistakes
    #[arg(long)]
    seed: Option<u64>,
    /// Threads used to search root moves
    #[arg(short, long)]
    threads: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct PeerArgs {
    /// Let the computer play your side
    #[arg(long)]
    auto: bool,
    #[command(flatten)]
    ai: AiArgs,
}

#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq)]
enum ArgColor {
    #[default]
    White,
    Black,
}

impl ArgColor {
    fn to_color(self) -> Color {
        match self {
            ArgColor::White => Color::White,
            ArgColor::Black => Color::Black,
        }
    }
}

impl AiArgs {
    fn player(&self, difficulty: Difficulty) -> MiniMaxAi {
        let mut ai = match self.seed {
            Some(seed) => MiniMaxAi::with_seed(difficulty, seed),
            None => MiniMaxAi::new(difficulty),
        };
        if let Some(depth) = self.depth {
            ai = ai.depth(depth);
        }
        if let Some(threads) = self.threads {
            ai = ai.threads(threads);
        }
        ai
    }

    fn engine(&self) -> EngineBuilder {
        let mut builder = EngineBuilder::new().difficulty(self.difficulty).debug(true);
        if let Some(depth) = self.depth {
            builder = builder.depth(depth);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(threads) = self.threads {
            builder = builder.threads(threads);
        }
        builder
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    println!("Tempo {} by Paulo L\n", env!("CARGO_PKG_VERSION"));

    let command = cli.command.unwrap_or_else(|| Command::Play(PlayArgs::default()));

    match command {
        Command::Play(PlayArgs { color, ai }) => {
            play::versus_engine(ai.engine().build(), color.to_color())
        }
        Command::Watch {
            white,
            black,
            max_plies,
            ai,
        } => {
            let outcome = play::watch(ai.player(white), ai.player(black), max_plies);
            info!(?outcome, "watched game finished");
            Ok(())
        }
        Command::Host { port, peer } => {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
            println!("Waiting for a peer on port {port}...");
            let connection = Connection::host(addr)?;
            play::versus_peer(connection, peer.auto.then(|| peer.ai.player(peer.ai.difficulty)))
        }
        Command::Join { addr, peer } => {
            let connection = Connection::connect(addr)?;
            play::versus_peer(connection, peer.auto.then(|| peer.ai.player(peer.ai.difficulty)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_play_uses_default_args() {
        let cli = Cli::try_parse_from(["tempo", "play"]).unwrap();
        match cli.command {
            Some(Command::Play(args)) => assert_eq!(args, PlayArgs::default()),
            other => panic!("expected play, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["tempo"]).unwrap().command.is_none());
    }
}
