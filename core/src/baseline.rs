//! Per-sender running baselines.
//!
//! RULE: the tracker only ever sees legitimate traffic. `finalize`
//! consumes the tracker, so no phase-2 state is reachable once fraud
//! injection starts — the snapshot handed to the injector is frozen
//! by construction.

use crate::error::GenResult;
use crate::population::UserPopulation;
use crate::record::{round3, TransactionRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;

/// Minimum legitimate transactions before a sender can anchor a
/// fraud pattern.
pub const MIN_ACTIVE_TXNS: u64 = 3;

/// Coarse location bucket: lat/lon in integer millidegrees, so the
/// frequency counter gets exact Eq/Hash instead of float keys.
type CoarseLoc = (i64, i64);

fn coarse_key(lat: f64, lon: f64) -> CoarseLoc {
    ((lat * 1e3).round() as i64, (lon * 1e3).round() as i64)
}

#[derive(Default)]
struct SenderStats {
    count: u64,
    amount_sum: f64,
    locations: HashMap<CoarseLoc, u64>,
    payees: BTreeSet<String>,
}

/// Accumulates per-sender statistics while the legitimate stream is
/// being emitted. One `observe` per emitted non-fraud record.
#[derive(Default)]
pub struct RunningBaselineTracker {
    stats: HashMap<String, SenderStats>,
}

impl RunningBaselineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one non-fraud record into its sender's running stats.
    /// All updates are commutative, so only the set of observed
    /// records matters, not their order.
    pub fn observe(&mut self, record: &TransactionRecord) {
        let stats = self.stats.entry(record.sender_vpa.clone()).or_default();
        stats.count += 1;
        stats.amount_sum += record.amount;
        *stats
            .locations
            .entry(coarse_key(record.sender_lat, record.sender_lon))
            .or_insert(0) += 1;
        stats.payees.insert(record.receiver_vpa.clone());
    }

    /// Freeze the tracker into a read-only snapshot covering every
    /// account in the population. Consumes self: there is no way to
    /// feed more records in afterwards.
    pub fn finalize(mut self, population: &UserPopulation) -> BaselineSnapshot {
        let mut by_sender = HashMap::with_capacity(population.len());
        let mut order = Vec::with_capacity(population.len());

        for account in population.accounts() {
            let stats = self.stats.remove(&account.vpa).unwrap_or_default();
            let avg_amount = if stats.count > 0 {
                stats.amount_sum / stats.count as f64
            } else {
                account.typical_amount
            };
            let (home_lat, home_lon) = match most_frequent(&stats.locations) {
                Some((lat_milli, lon_milli)) => (lat_milli as f64 / 1e3, lon_milli as f64 / 1e3),
                None => (round3(account.home_lat), round3(account.home_lon)),
            };

            order.push(account.vpa.clone());
            by_sender.insert(
                account.vpa.clone(),
                SenderBaseline {
                    avg_amount,
                    home_lat,
                    home_lon,
                    known_payees: stats.payees,
                    txn_count: stats.count,
                },
            );
        }

        BaselineSnapshot { order, by_sender }
    }
}

/// Highest count wins; ties break toward the smaller bucket key so
/// the result never depends on hash iteration order.
fn most_frequent(locations: &HashMap<CoarseLoc, u64>) -> Option<CoarseLoc> {
    locations
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(&key, _)| key)
}

/// Derived per-account summary of legitimate behavior.
#[derive(Debug, Clone, Serialize)]
pub struct SenderBaseline {
    pub avg_amount: f64,
    pub home_lat: f64,
    pub home_lon: f64,
    pub known_payees: BTreeSet<String>,
    pub txn_count: u64,
}

/// Frozen output of `RunningBaselineTracker::finalize`. Read-only.
pub struct BaselineSnapshot {
    order: Vec<String>,
    by_sender: HashMap<String, SenderBaseline>,
}

impl BaselineSnapshot {
    pub fn get(&self, vpa: &str) -> Option<&SenderBaseline> {
        self.by_sender.get(vpa)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Handles in population order.
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Senders with at least `min_txns` legitimate transactions, in
    /// population order. Falls back to the full population when no
    /// account qualifies, so a sparse run still has fraud anchors.
    pub fn active_senders(&self, min_txns: u64) -> Vec<&str> {
        let active: Vec<&str> = self
            .order
            .iter()
            .filter(|vpa| self.by_sender[*vpa].txn_count >= min_txns)
            .map(|s| s.as_str())
            .collect();
        if active.is_empty() {
            self.handles().collect()
        } else {
            active
        }
    }

    /// Export the snapshot as JSON keyed by VPA, the shape the
    /// feature-engineering and serving stages consume. BTreeMap keys
    /// give a deterministic field order.
    pub fn write_json<W: Write>(&self, writer: W) -> GenResult<()> {
        let map: BTreeMap<&str, &SenderBaseline> = self
            .by_sender
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        serde_json::to_writer(writer, &map)?;
        Ok(())
    }
}
