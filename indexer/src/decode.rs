//! Program log decoding.
//!
//! `emit!` writes each event as `Program data: <base64>`, where the payload is
//! the event's 8-byte discriminator followed by its Borsh body. [`LogParser`]
//! reads `solana logs` output, keeps only the data written by the market
//! program in successful transactions and tags each event with its
//! [`EventPosition`].

use agent_market::events::{
    AgentLoved, AgentStaked, AuthorizedUsage, Cloned, Minted, Transferred, UsageRevoked,
};
use anchor_lang::{AnchorDeserialize, Discriminator};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IndexerError, Result};

pub const PROGRAM_DATA_PREFIX: &str = "Program data: ";

const TRANSACTION_PREFIX: &str = "Transaction executed in slot ";
const SIGNATURE_PREFIX: &str = "Signature: ";
const STATUS_PREFIX: &str = "Status: ";

const DISCRIMINATOR_LEN: usize = 8;

/// Events that move mirror state
#[derive(Clone, Debug, PartialEq)]
pub enum MarketEvent {
    Minted(Minted),
    Transferred(Transferred),
    Cloned(Cloned),
    AuthorizedUsage(AuthorizedUsage),
    UsageRevoked(UsageRevoked),
    AgentStaked(AgentStaked),
    AgentLoved(AgentLoved),
}

impl MarketEvent {
    pub fn agent_id(&self) -> u64 {
        match self {
            Self::Minted(e) => e.agent_id,
            Self::Transferred(e) => e.agent_id,
            Self::Cloned(e) => e.new_id,
            Self::AuthorizedUsage(e) => e.agent_id,
            Self::UsageRevoked(e) => e.agent_id,
            Self::AgentStaked(e) => e.agent_id,
            Self::AgentLoved(e) => e.agent_id,
        }
    }
}

/// Decode one log line.
///
/// Lines that are not program data, and events the mirror does not track,
/// yield `Ok(None)`.
pub fn decode_line(line: &str) -> Result<Option<MarketEvent>> {
    let Some(encoded) = line.trim().strip_prefix(PROGRAM_DATA_PREFIX) else {
        return Ok(None);
    };
    let payload = STANDARD
        .decode(encoded.trim())
        .map_err(|e| IndexerError::Decode(e.to_string()))?;
    decode_payload(&payload)
}

pub fn decode_payload(payload: &[u8]) -> Result<Option<MarketEvent>> {
    if payload.len() < DISCRIMINATOR_LEN {
        return Err(IndexerError::Decode(format!(
            "payload of {} bytes has no discriminator",
            payload.len()
        )));
    }
    let (discriminator, body) = payload.split_at(DISCRIMINATOR_LEN);

    let event = if discriminator == Minted::DISCRIMINATOR {
        MarketEvent::Minted(body_of(body)?)
    } else if discriminator == Transferred::DISCRIMINATOR {
        MarketEvent::Transferred(body_of(body)?)
    } else if discriminator == Cloned::DISCRIMINATOR {
        MarketEvent::Cloned(body_of(body)?)
    } else if discriminator == AuthorizedUsage::DISCRIMINATOR {
        MarketEvent::AuthorizedUsage(body_of(body)?)
    } else if discriminator == UsageRevoked::DISCRIMINATOR {
        MarketEvent::UsageRevoked(body_of(body)?)
    } else if discriminator == AgentStaked::DISCRIMINATOR {
        MarketEvent::AgentStaked(body_of(body)?)
    } else if discriminator == AgentLoved::DISCRIMINATOR {
        MarketEvent::AgentLoved(body_of(body)?)
    } else {
        return Ok(None);
    };
    Ok(Some(event))
}

fn body_of<T: AnchorDeserialize>(body: &[u8]) -> Result<T> {
    T::try_from_slice(body).map_err(|e| IndexerError::Decode(e.to_string()))
}

/// Ledger position of an event: slot, transaction, and order among the
/// tracked events of that transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPosition {
    pub slot: u64,
    pub signature: String,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggedEvent {
    pub position: EventPosition,
    pub event: MarketEvent,
}

#[derive(Debug, Default)]
struct PendingTransaction {
    slot: u64,
    signature: Option<String>,
    failed: bool,
    invocations: Vec<String>,
    events: Vec<MarketEvent>,
}

/// Line-by-line reader of `solana logs` output.
///
/// Events are buffered per transaction and released once the transaction's
/// block ends, which is the next `Transaction executed in slot` header or
/// [`LogParser::finish`]. Data lines are only accepted while the market
/// program is the innermost running invocation, and transactions that failed
/// or carry no signature are dropped whole.
#[derive(Debug)]
pub struct LogParser {
    program_id: String,
    current: Option<PendingTransaction>,
}

impl LogParser {
    pub fn new(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            current: None,
        }
    }

    /// Consume one line; returns the events of a transaction it completed.
    pub fn push_line(&mut self, line: &str) -> Vec<LoggedEvent> {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix(TRANSACTION_PREFIX) {
            let completed = self.finish();
            match rest.trim_end_matches(':').trim().parse() {
                Ok(slot) => {
                    self.current = Some(PendingTransaction {
                        slot,
                        ..PendingTransaction::default()
                    })
                }
                Err(_) => warn!(line, "Unreadable transaction header"),
            }
            return completed;
        }

        let Some(tx) = self.current.as_mut() else {
            return Vec::new();
        };
        if let Some(signature) = line.strip_prefix(SIGNATURE_PREFIX) {
            tx.signature = Some(signature.trim().to_string());
        } else if let Some(status) = line.strip_prefix(STATUS_PREFIX) {
            if status.trim() != "Ok" {
                tx.failed = true;
            }
        } else if line.starts_with(PROGRAM_DATA_PREFIX) {
            if tx.invocations.last() != Some(&self.program_id) {
                return Vec::new();
            }
            match decode_line(line) {
                Ok(Some(event)) => tx.events.push(event),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Undecodable program data"),
            }
        } else if let Some(rest) = line.strip_prefix("Program ") {
            let mut words = rest.split_whitespace();
            match (words.next(), words.next()) {
                (Some(program), Some("invoke")) => tx.invocations.push(program.to_string()),
                (Some(_), Some("success")) => {
                    tx.invocations.pop();
                }
                (Some(_), Some("failed:")) => {
                    tx.invocations.pop();
                    tx.failed = true;
                }
                _ => {}
            }
        }
        Vec::new()
    }

    /// Close the transaction in progress and release its events.
    pub fn finish(&mut self) -> Vec<LoggedEvent> {
        let Some(tx) = self.current.take() else {
            return Vec::new();
        };
        let signature = match tx.signature {
            Some(signature) if !tx.failed => signature,
            signature => {
                if !tx.events.is_empty() {
                    debug!(
                        slot = tx.slot,
                        signature = signature.as_deref().unwrap_or("-"),
                        dropped = tx.events.len(),
                        "Dropping events of failed or unsigned transaction"
                    );
                }
                return Vec::new();
            }
        };
        tx.events
            .into_iter()
            .zip(0u32..)
            .map(|(event, index)| LoggedEvent {
                position: EventPosition {
                    slot: tx.slot,
                    signature: signature.clone(),
                    index,
                },
                event,
            })
            .collect()
    }
}
