//! Warehouse Core - Headless inventory and command layer for the molecule warehouse.
//!
//! This crate owns everything that does not touch a socket: the fixed
//! chemistry tables, the atom stock and molecule ledger, the recipe engine,
//! the text command protocol and snapshot persistence. The server crate
//! drives it from a single event loop.
//!
//! # Example
//!
//! ```rust
//! use warehouse_core::command::{dispatch, Channel};
//! use warehouse_core::Inventory;
//!
//! let mut inventory = Inventory::new();
//! dispatch(&mut inventory, Channel::Stream, "ADD HYDROGEN 4");
//! dispatch(&mut inventory, Channel::Stream, "ADD OXYGEN 2");
//!
//! let outcome = dispatch(&mut inventory, Channel::Datagram, "DELIVER WATER 2");
//! assert_eq!(outcome.reply(Channel::Datagram).as_deref(), Some("OK 2"));
//! assert_eq!(inventory.molecules().water, 2);
//! ```

pub mod chemistry;
pub mod command;
pub mod config;
pub mod error;
pub mod inventory;
pub mod persistence;
pub mod recipe;

// Re-export commonly used types
pub use chemistry::{AtomCounts, AtomKind, DrinkKind, MoleculeCounts, MoleculeKind};
pub use command::{Applied, Channel, Command, Outcome};
pub use error::{Result, WarehouseError};
pub use inventory::{Inventory, InventorySnapshot};
pub use persistence::{load_snapshot, save_snapshot};
pub use recipe::Production;
