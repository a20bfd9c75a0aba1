//! Command protocol: tokenizer, dispatcher and reply rendering.
//!
//! One command per stream read, datagram or console line:
//!
//! ```text
//! ADD <ATOM> <amount>          stream transports only, no reply
//! DELIVER <MOLECULE> [count]   datagram transports only, replies OK n / FAILED / Invalid command
//! GEN <DRINK>                  console only, replies with the drink capacity
//! ```

mod dispatch;
mod parser;
mod reply;

pub use dispatch::{dispatch, execute, Applied, Outcome};
pub use parser::parse;

use crate::chemistry::{AtomKind, DrinkKind, MoleculeKind};

/// Where a command arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// TCP or Unix stream connection.
    Stream,
    /// UDP or Unix datagram endpoint.
    Datagram,
    /// Local stdin.
    Console,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stream => "stream",
            Channel::Datagram => "datagram",
            Channel::Console => "console",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed command with every name resolved against the fixed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add { atom: AtomKind, amount: u64 },
    Deliver { molecule: MoleculeKind, count: u64 },
    Gen { drink: DrinkKind },
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Add { .. } => "ADD",
            Command::Deliver { .. } => "DELIVER",
            Command::Gen { .. } => "GEN",
        }
    }

    /// The only channel this command is accepted from.
    pub fn channel(&self) -> Channel {
        match self {
            Command::Add { .. } => Channel::Stream,
            Command::Deliver { .. } => Channel::Datagram,
            Command::Gen { .. } => Channel::Console,
        }
    }
}
