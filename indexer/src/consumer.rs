//! Subscribe / apply / persist loop.
//!
//! A reader task parses log lines and pushes [`Envelope`]s into a bounded
//! channel. The [`Consumer`] drains it in batches, applies events in arrival
//! order, skips events the mirror's cursor already covers and writes a
//! snapshot after every batch.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::decode::{EventPosition, LogParser, LoggedEvent, MarketEvent};
use crate::error::Result;
use crate::mirror::RankingMirror;
use crate::snapshot;

/// A decoded event, its ledger position and the moment it was observed
#[derive(Clone, Debug)]
pub struct Envelope {
    pub event: MarketEvent,
    pub position: EventPosition,
    pub observed_at: Instant,
}

impl Envelope {
    pub fn now(logged: LoggedEvent) -> Self {
        Self {
            event: logged.event,
            position: logged.position,
            observed_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Maximum events applied between two snapshot writes
    pub batch_size: usize,
    /// Lag above which a propagation warning is logged
    pub max_propagation: Duration,
    /// Snapshot destination; `None` keeps the mirror in memory only
    pub state_path: Option<PathBuf>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            max_propagation: Duration::from_secs(30),
            state_path: None,
        }
    }
}

/// Bounded channel between a log reader and a [`Consumer`].
pub fn channel(capacity: usize) -> (mpsc::Sender<Envelope>, mpsc::Receiver<Envelope>) {
    mpsc::channel(capacity)
}

/// Totals reported when a consumer finishes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub applied: u64,
    pub skipped: u64,
    /// Events at or before the cursor, already reflected in the mirror
    pub duplicates: u64,
    pub lagging: u64,
    pub batches: u64,
}

pub struct Consumer {
    mirror: RankingMirror,
    config: ConsumerConfig,
    stats: ConsumerStats,
}

impl Consumer {
    pub fn new(mirror: RankingMirror, config: ConsumerConfig) -> Self {
        Self {
            mirror,
            config,
            stats: ConsumerStats::default(),
        }
    }

    pub fn mirror(&self) -> &RankingMirror {
        &self.mirror
    }

    /// Drain `rx` until every sender is dropped, then hand back the mirror.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<Envelope>,
    ) -> Result<(RankingMirror, ConsumerStats)> {
        let mut batch = Vec::with_capacity(self.config.batch_size);
        loop {
            let received = rx.recv_many(&mut batch, self.config.batch_size).await;
            if received == 0 {
                break;
            }
            self.apply_batch(&batch)?;
            batch.clear();
        }
        info!(
            applied = self.stats.applied,
            skipped = self.stats.skipped,
            duplicates = self.stats.duplicates,
            lagging = self.stats.lagging,
            batches = self.stats.batches,
            "Event stream closed"
        );
        Ok((self.mirror, self.stats))
    }

    /// Apply a batch in order and persist the result.
    ///
    /// Events the mirror cannot apply are logged and skipped; only snapshot
    /// failures abort the consumer. Either way the cursor moves past them.
    pub fn apply_batch(&mut self, batch: &[Envelope]) -> Result<()> {
        for envelope in batch {
            if self.mirror.has_seen(&envelope.position) {
                self.stats.duplicates += 1;
                debug!(
                    slot = envelope.position.slot,
                    signature = %envelope.position.signature,
                    index = envelope.position.index,
                    "Event already mirrored"
                );
                continue;
            }
            let lag = envelope.observed_at.elapsed();
            if lag > self.config.max_propagation {
                self.stats.lagging += 1;
                warn!(
                    agent_id = envelope.event.agent_id(),
                    lag_ms = lag.as_millis() as u64,
                    bound_ms = self.config.max_propagation.as_millis() as u64,
                    "Mirror propagation exceeds bound"
                );
            }
            match self.mirror.apply(&envelope.event) {
                Ok(()) => self.stats.applied += 1,
                Err(e) => {
                    self.stats.skipped += 1;
                    warn!(agent_id = envelope.event.agent_id(), error = %e, "Skipping event");
                }
            }
            self.mirror.mark_seen(&envelope.position);
        }
        self.stats.batches += 1;

        if let Some(path) = &self.config.state_path {
            snapshot::save(path, &self.mirror)?;
        }
        debug!(size = batch.len(), agents = self.mirror.len(), "Batch applied");
        Ok(())
    }
}

/// Parse every line of `reader` and forward the events of `program_id`'s
/// successful transactions to `tx`.
///
/// Returns the number of events forwarded. Malformed program data is logged
/// and skipped; the reader stops early if the consumer has gone away.
pub async fn feed_lines<R>(reader: R, program_id: &str, tx: mpsc::Sender<Envelope>) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = LogParser::new(program_id);
    let mut lines = reader.lines();
    let mut forwarded = 0;
    while let Some(line) = lines.next_line().await? {
        for logged in parser.push_line(&line) {
            if tx.send(Envelope::now(logged)).await.is_err() {
                warn!("Consumer stopped, dropping remaining input");
                return Ok(forwarded);
            }
            forwarded += 1;
        }
    }
    for logged in parser.finish() {
        if tx.send(Envelope::now(logged)).await.is_err() {
            warn!("Consumer stopped, dropping remaining input");
            break;
        }
        forwarded += 1;
    }
    Ok(forwarded)
}
