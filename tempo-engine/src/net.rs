//! Peer move exchange over TCP.
//!
//! Each message is one ASCII line terminated by `\n`. A line is either `BYE`,
//! announcing a voluntary disconnect, or a move in coordinate notation such as
//! `e2e4` or `e7e8q`. The Host listens and plays White, the Client connects and
//! plays Black.

use std::fmt::{self, Display};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::coretypes::{Color, WireMove};
use crate::error::{self, ErrorKind};

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 41_000;
/// Line announcing a voluntary disconnect.
pub const BYE: &str = "BYE";

/// Shortest wait for a line. Sockets reject a zero read timeout.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);
const READ_CHUNK: usize = 512;
/// Longest line accepted from the peer, terminator excluded. Moves take at most five bytes.
pub const MAX_LINE: usize = 64;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Role {
    /// Listens for and accepts one peer.
    Host,
    /// Connects to a listening host.
    Client,
}

impl Role {
    /// Color this side plays.
    pub const fn color(&self) -> Color {
        match self {
            Role::Host => Color::White,
            Role::Client => Color::Black,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// One line received from the peer.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Message {
    Move(WireMove),
    Bye,
    /// A line that is neither a move nor `BYE`.
    Unknown(String),
}

impl Message {
    /// Interpret a single line, without its terminator.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line == BYE {
            return Message::Bye;
        }
        match line.parse::<WireMove>() {
            Ok(wire) => Message::Move(wire),
            Err(err) => {
                warn!(line, %err, "unrecognized line from peer");
                Message::Unknown(line.to_string())
            }
        }
    }
}

/// Displays the message as it is sent, without the line terminator.
impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Message::Move(wire) => write!(f, "{wire}"),
            Message::Bye => f.write_str(BYE),
            Message::Unknown(line) => f.write_str(line),
        }
    }
}

/// Connection with one peer.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    role: Role,
    state: ConnectionState,
    /// Received bytes not yet terminated by a newline.
    pending: Vec<u8>,
    /// Dropping the rest of a line longer than `MAX_LINE`.
    discarding: bool,
}

impl Connection {
    /// Listen on `addr` and wait for one peer to connect.
    pub fn host<A: ToSocketAddrs>(addr: A) -> error::Result<Self> {
        let listener = TcpListener::bind(addr)
            .map_err(|err| error::Error::new(ErrorKind::NetConnect, err))?;
        info!(addr = ?listener.local_addr().ok(), "waiting for peer");
        Self::accept(&listener)
    }

    /// Wait for one peer on an already bound listener.
    pub fn accept(listener: &TcpListener) -> error::Result<Self> {
        let (stream, peer) = listener
            .accept()
            .map_err(|err| error::Error::new(ErrorKind::NetConnect, err))?;
        info!(%peer, "peer connected");
        Self::from_stream(stream, Role::Host)
    }

    /// Connect to a host listening on `addr`.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> error::Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|err| error::Error::new(ErrorKind::NetConnect, err))?;
        info!(peer = ?stream.peer_addr().ok(), "connected to host");
        Self::from_stream(stream, Role::Client)
    }

    fn from_stream(stream: TcpStream, role: Role) -> error::Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            role,
            state: ConnectionState::Connected,
            pending: Vec::new(),
            discarding: false,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Color played by this side of the connection.
    pub fn color(&self) -> Color {
        self.role.color()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn peer_addr(&self) -> error::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    pub fn send_move(&mut self, wire: &WireMove) -> error::Result<()> {
        self.send(&Message::Move(*wire))
    }

    /// Tell the peer we are leaving, then close the connection.
    pub fn send_bye(&mut self) -> error::Result<()> {
        self.send(&Message::Bye)?;
        self.disconnect();
        Ok(())
    }

    /// Send one message as a line.
    pub fn send(&mut self, message: &Message) -> error::Result<()> {
        if !self.is_connected() {
            return Err((ErrorKind::NetDisconnected, "cannot send to closed peer").into());
        }
        debug!(%message, "sending");

        let line = format!("{message}\n");
        match self.stream.write_all(line.as_bytes()).and_then(|_| self.stream.flush()) {
            Ok(()) => Ok(()),
            Err(err) if is_disconnect(&err) => {
                self.mark_disconnected();
                Err(error::Error::new(ErrorKind::NetDisconnected, err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Wait up to `timeout` for the next line from the peer.
    ///
    /// Returns `Ok(None)` if no full line arrived in time, or if the peer is gone.
    /// In the latter case the state becomes `Disconnected`. Bytes of a partial
    /// line are kept for the next call. A line longer than `MAX_LINE` is returned
    /// cut to `MAX_LINE` bytes as `Message::Unknown` and the rest of it is dropped.
    pub fn receive(&mut self, timeout: Duration) -> error::Result<Option<Message>> {
        let deadline = Instant::now() + timeout.max(MIN_READ_TIMEOUT);
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = self.take_line() {
                let message = Message::parse(&line);
                debug!(%message, "received");
                return Ok(Some(message));
            }
            if let Some(line) = self.take_overlong() {
                warn!(len = line.len(), "peer line too long, dropping the rest");
                return Ok(Some(Message::Unknown(line)));
            }
            if !self.is_connected() {
                return Ok(None);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.stream.set_read_timeout(Some(remaining))?;

            match self.stream.read(&mut chunk) {
                Ok(0) => self.mark_disconnected(),
                Ok(read) => self.buffer(&chunk[..read]),
                Err(err) if is_timeout(&err) => return Ok(None),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => (),
                Err(err) if is_disconnect(&err) => self.mark_disconnected(),
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Close the connection without announcing it.
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Err(err) = self.stream.shutdown(Shutdown::Both) {
                debug!(%err, "shutdown of closed stream");
            }
            self.mark_disconnected();
        }
    }

    fn mark_disconnected(&mut self) {
        if self.is_connected() {
            info!(role = ?self.role, "peer disconnected");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Remove and return the first complete line from the pending bytes.
    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim_end().to_string())
    }

    /// Cut off an unterminated line once it outgrows `MAX_LINE`.
    /// Only called when `pending` holds no newline.
    fn take_overlong(&mut self) -> Option<String> {
        if self.pending.len() <= MAX_LINE {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending[..MAX_LINE]).to_string();
        self.pending.clear();
        self.discarding = true;
        Some(line)
    }

    fn buffer(&mut self, mut bytes: &[u8]) {
        if self.discarding {
            match bytes.iter().position(|byte| *byte == b'\n') {
                Some(end) => {
                    self.discarding = false;
                    bytes = &bytes[end + 1..];
                }
                None => return,
            }
        }
        self.pending.extend_from_slice(bytes);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::PieceKind;

    #[test]
    fn parse_lines() {
        assert_eq!(Message::parse("BYE"), Message::Bye);
        assert_eq!(Message::parse("BYE\r"), Message::Bye);

        let promotion = Message::parse("e7e8q");
        match &promotion {
            Message::Move(wire) => assert_eq!(wire.promotion, Some(PieceKind::Queen)),
            other => panic!("expected move, got {other:?}"),
        }
        assert_eq!(promotion.to_string(), "e7e8q");

        assert_eq!(Message::parse("hello"), Message::Unknown("hello".to_string()));
        assert_eq!(Message::parse("e7e8k"), Message::Unknown("e7e8k".to_string()));
        assert_eq!(Message::parse("bye"), Message::Unknown("bye".to_string()));
    }

    #[test]
    fn roles_pick_colors() {
        assert_eq!(Role::Host.color(), Color::White);
        assert_eq!(Role::Client.color(), Color::Black);
    }
}
