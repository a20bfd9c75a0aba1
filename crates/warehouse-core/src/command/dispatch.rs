//! Dispatcher applying parsed commands to the inventory.

use super::{parse, Channel, Command};
use crate::chemistry::{AtomKind, DrinkKind, MoleculeKind};
use crate::inventory::Inventory;
use crate::recipe;
use tracing::debug;

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Added {
        atom: AtomKind,
        amount: u64,
        total: u64,
    },
    Delivered {
        molecule: MoleculeKind,
        count: u64,
    },
    Capacity {
        drink: DrinkKind,
        count: u64,
    },
}

/// Result of dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The text was not a well-formed command for this channel.
    ParseError { reason: String },
    /// A name did not match any atom, molecule or product.
    UnknownKind { name: String },
    /// The command was fully applied.
    Applied(Applied),
    /// Fewer units than requested were delivered (possibly none).
    InsufficientResources {
        molecule: MoleculeKind,
        delivered: u64,
        requested: u64,
    },
}

impl Outcome {
    /// Units handed out by a `DELIVER`, whether complete or partial.
    pub fn delivered(&self) -> Option<u64> {
        match self {
            Outcome::Applied(Applied::Delivered { count, .. }) => Some(*count),
            Outcome::InsufficientResources { delivered, .. } => Some(*delivered),
            _ => None,
        }
    }

    /// True if the inventory may have changed.
    pub fn mutated(&self) -> bool {
        match self {
            Outcome::Applied(Applied::Added { amount, .. }) => *amount > 0,
            Outcome::Applied(Applied::Delivered { count, .. }) => *count > 0,
            Outcome::InsufficientResources { delivered, .. } => *delivered > 0,
            _ => false,
        }
    }
}

/// Parse `line` and apply it to `inventory` if it is allowed on `channel`.
///
/// Never fails: every problem is reported as an [`Outcome`] and leaves the
/// inventory untouched.
pub fn dispatch(inventory: &mut Inventory, channel: Channel, line: &str) -> Outcome {
    let command = match parse(line) {
        Ok(command) => command,
        Err(err) => {
            debug!("Rejected {} message {:?}: {}", channel, line.trim(), err);
            return match err.unknown_name() {
                Some(name) => Outcome::UnknownKind {
                    name: name.to_string(),
                },
                None => Outcome::ParseError {
                    reason: err.to_string(),
                },
            };
        }
    };

    if command.channel() != channel {
        return Outcome::ParseError {
            reason: format!(
                "{} is only accepted on the {} channel",
                command.keyword(),
                command.channel()
            ),
        };
    }

    execute(inventory, command)
}

/// Apply an already-parsed command, ignoring channel admission.
pub fn execute(inventory: &mut Inventory, command: Command) -> Outcome {
    match command {
        Command::Add { atom, amount } => {
            let total = inventory.credit(atom, amount);
            Outcome::Applied(Applied::Added {
                atom,
                amount,
                total,
            })
        }
        Command::Deliver { molecule, count } => {
            let production = recipe::produce(inventory, molecule, count);
            if production.is_complete() {
                Outcome::Applied(Applied::Delivered {
                    molecule,
                    count: production.produced,
                })
            } else {
                Outcome::InsufficientResources {
                    molecule,
                    delivered: production.produced,
                    requested: production.requested,
                }
            }
        }
        Command::Gen { drink } => {
            let count = recipe::max_producible(inventory.molecules(), drink.ingredients());
            Outcome::Applied(Applied::Capacity { drink, count })
        }
    }
}
