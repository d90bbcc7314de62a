//! Legitimate transaction stream (phase 2).
//!
//! ORDERING INVARIANT: every emitted record is written to the sink
//! and observed by the tracker before the next record is drawn, and
//! the whole stream completes (tracker finalized) before any fraud
//! injection starts. The injector must see a population-wide
//! legitimate baseline, never a partial one.

use crate::baseline::RunningBaselineTracker;
use crate::error::GenResult;
use crate::geo;
use crate::population::UserPopulation;
use crate::record::{round2, round6, TransactionRecord, P2P_SHARE, TXN_P2M, TXN_P2P};
use crate::rng::PhaseRng;
use crate::window::HistoryWindow;
use crate::writer::OutputWriter;
use std::io::Write;

/// Log-space sigma for legitimate amounts.
pub const AMOUNT_SIGMA: f64 = 0.8;

/// Legitimate amounts are clipped to this range.
pub const AMOUNT_MIN: f64 = 1.0;
pub const AMOUNT_MAX: f64 = 200_000.0;

/// How far a sender roams from home for ordinary payments, km.
pub const HOME_RADIUS_KM: f64 = 50.0;

const PROGRESS_EVERY: u64 = 100_000;

pub struct TransactionStream<'a> {
    population: &'a UserPopulation,
    window: HistoryWindow,
}

impl<'a> TransactionStream<'a> {
    pub fn new(population: &'a UserPopulation, window: HistoryWindow) -> Self {
        Self { population, window }
    }

    /// Emit exactly `target_count` non-fraud records.
    pub fn run<W: Write>(
        &self,
        target_count: u64,
        writer: &mut OutputWriter<W>,
        tracker: &mut RunningBaselineTracker,
        rng: &mut PhaseRng,
    ) -> GenResult<u64> {
        for i in 0..target_count {
            let record = self.generate_one(rng);
            writer.append(&record)?;
            tracker.observe(&record);

            if (i + 1) % PROGRESS_EVERY == 0 {
                log::info!("generated {} / {} non-fraud txns", i + 1, target_count);
            }
        }
        Ok(target_count)
    }

    fn generate_one(&self, rng: &mut PhaseRng) -> TransactionRecord {
        let sender = self.population.sample(rng);
        let receiver = self.population.sample_receiver(rng, &sender.vpa);

        let amount = round2(
            rng.lognormal(sender.typical_amount.ln(), AMOUNT_SIGMA)
                .clamp(AMOUNT_MIN, AMOUNT_MAX),
        );
        let timestamp = self.window.sample(rng);
        let (lat, lon) = geo::displace(rng, sender.home_lat, sender.home_lon, HOME_RADIUS_KM);
        let transaction_type = if rng.chance(P2P_SHARE) { TXN_P2P } else { TXN_P2M };

        TransactionRecord {
            transaction_id: rng.uuid().to_string(),
            timestamp,
            sender_vpa: sender.vpa.clone(),
            receiver_vpa: receiver.vpa.clone(),
            amount,
            sender_bank: sender.bank.to_string(),
            receiver_bank: receiver.bank.to_string(),
            sender_lat: round6(lat),
            sender_lon: round6(lon),
            transaction_type,
            device_id: rng.uuid().to_string(),
            is_fraud: 0,
        }
    }
}
