//! Off-chain ranking mirror for the agent-market program.
//!
//! Events are decoded from the program's `Program data:` log lines in
//! successful transactions, applied once each in arrival order to a
//! [`RankingMirror`] that keeps its own counters, and persisted as a JSON
//! snapshot after every batch. Leaderboard and ownership queries are then
//! served from the mirror instead of the ledger.

pub mod config;
pub mod consumer;
pub mod decode;
pub mod error;
pub mod mirror;
pub mod snapshot;

pub use consumer::{Consumer, ConsumerConfig, Envelope};
pub use decode::{EventPosition, LogParser, LoggedEvent, MarketEvent};
pub use error::{IndexerError, Result};
pub use mirror::{Cursor, MirroredAgent, RankingMirror, SortKey};
