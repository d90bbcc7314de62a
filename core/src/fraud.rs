//! Fraud injection (phase 3).
//!
//! Five patterns behind one `FraudPattern` trait, driven by a single
//! loop that tracks per-pattern counts. Adding a pattern means one
//! new impl and one new entry in the driver table.
//!
//! RULE: patterns read only the frozen `BaselineSnapshot`. Nothing
//! here touches the tracker — fraud never feeds back into baselines.

use crate::baseline::{BaselineSnapshot, SenderBaseline, MIN_ACTIVE_TXNS};
use crate::error::GenResult;
use crate::geo;
use crate::handles::HandleGenerator;
use crate::population::{Account, UserPopulation, BANKS};
use crate::record::{round2, round6, TransactionRecord, TXN_P2P};
use crate::rng::PhaseRng;
use crate::window::HistoryWindow;
use crate::writer::OutputWriter;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::io::Write;

/// Burst sizes for the velocity pattern.
pub const BURST_SIZES: &[u32] = &[5, 10, 20, 30];

/// A burst's transactions all land within this many seconds of its start.
pub const BURST_WINDOW_SECS: u64 = 3600;

/// Velocity bursts start within the trailing week.
pub const BURST_RECENCY_DAYS: i64 = 7;

/// Hard cap on anomalous-amount frauds.
pub const ANOMALOUS_AMOUNT_CAP: f64 = 500_000.0;

/// Fixed budget split across the five patterns, in percent. The
/// new-payee pattern absorbs the integer-division remainder.
pub const PATTERN_SHARES: [u64; 4] = [25, 25, 20, 20];

/// Split a fraud budget across the five patterns.
pub fn allocate(budget: u64) -> [u64; 5] {
    let velocity = budget * PATTERN_SHARES[0] / 100;
    let anomalous = budget * PATTERN_SHARES[1] / 100;
    let odd_hour = budget * PATTERN_SHARES[2] / 100;
    let location = budget * PATTERN_SHARES[3] / 100;
    let new_payee = budget - velocity - anomalous - odd_hour - location;
    [velocity, anomalous, odd_hour, location, new_payee]
}

/// Everything a pattern may read: the immutable population, the
/// frozen baselines, the pre-resolved active-sender list, and the
/// history window.
pub struct InjectionContext<'a> {
    population: &'a UserPopulation,
    baselines: &'a BaselineSnapshot,
    active: Vec<&'a Account>,
    pub window: HistoryWindow,
}

impl<'a> InjectionContext<'a> {
    pub fn new(
        population: &'a UserPopulation,
        baselines: &'a BaselineSnapshot,
        window: HistoryWindow,
    ) -> Self {
        let active = baselines
            .active_senders(MIN_ACTIVE_TXNS)
            .into_iter()
            .map(|vpa| population.get(vpa).expect("snapshot covers the population"))
            .collect();
        Self {
            population,
            baselines,
            active,
            window,
        }
    }

    pub fn active_sender_count(&self) -> usize {
        self.active.len()
    }

    /// Uniformly pick an active sender and its frozen baseline.
    fn pick_sender(&self, rng: &mut PhaseRng) -> (&'a Account, &'a SenderBaseline) {
        let account = *rng.pick(&self.active);
        let baseline = self
            .baselines
            .get(&account.vpa)
            .expect("snapshot covers the population");
        (account, baseline)
    }

    fn pick_receiver(&self, rng: &mut PhaseRng, sender_vpa: &str) -> &'a Account {
        self.population.sample_receiver(rng, sender_vpa)
    }
}

/// One fraud strategy. `generate_one` produces the next flagged
/// record; stateful patterns (velocity) carry their burst across
/// calls.
pub trait FraudPattern {
    fn name(&self) -> &'static str;

    fn generate_one(
        &mut self,
        ctx: &InjectionContext<'_>,
        rng: &mut PhaseRng,
    ) -> TransactionRecord;
}

/// Assemble a flagged record. IDs are drawn last so every pattern
/// consumes the stream in the same field order.
#[allow(clippy::too_many_arguments)]
fn fraud_record(
    rng: &mut PhaseRng,
    timestamp: NaiveDateTime,
    sender: &Account,
    receiver_vpa: String,
    receiver_bank: &str,
    amount: f64,
    lat: f64,
    lon: f64,
) -> TransactionRecord {
    TransactionRecord {
        transaction_id: rng.uuid().to_string(),
        timestamp,
        sender_vpa: sender.vpa.clone(),
        receiver_vpa,
        amount,
        sender_bank: sender.bank.to_string(),
        receiver_bank: receiver_bank.to_string(),
        sender_lat: round6(lat),
        sender_lon: round6(lon),
        transaction_type: TXN_P2P,
        device_id: rng.uuid().to_string(),
        is_fraud: 1,
    }
}

// ── Velocity burst ─────────────────────────────────────────────────

struct BurstState {
    sender_vpa: String,
    receiver_vpa: String,
    receiver_bank: &'static str,
    home: (f64, f64),
    amount_mu: f64,
    start: NaiveDateTime,
    remaining: u32,
}

/// Many small payments to one receiver inside a one-hour window.
#[derive(Default)]
pub struct VelocityBurst {
    state: Option<BurstState>,
}

impl VelocityBurst {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_burst(&mut self, ctx: &InjectionContext<'_>, rng: &mut PhaseRng) {
        let (sender, baseline) = ctx.pick_sender(rng);
        let receiver = ctx.pick_receiver(rng, &sender.vpa);
        let size = *rng.pick(BURST_SIZES);
        let start = ctx.window.sample_recent(rng, BURST_RECENCY_DAYS);
        // Small amounts, centered near 5% of the sender's average.
        let amount_mu = (baseline.avg_amount * 0.05).max(5.0).ln();
        self.state = Some(BurstState {
            sender_vpa: sender.vpa.clone(),
            receiver_vpa: receiver.vpa.clone(),
            receiver_bank: receiver.bank,
            home: (baseline.home_lat, baseline.home_lon),
            amount_mu,
            start,
            remaining: size,
        });
    }
}

impl FraudPattern for VelocityBurst {
    fn name(&self) -> &'static str {
        "velocity_burst"
    }

    fn generate_one(
        &mut self,
        ctx: &InjectionContext<'_>,
        rng: &mut PhaseRng,
    ) -> TransactionRecord {
        if self.state.as_ref().map_or(true, |b| b.remaining == 0) {
            self.start_burst(ctx, rng);
        }
        let burst = self.state.as_mut().expect("burst just started");
        burst.remaining -= 1;

        let timestamp =
            burst.start + Duration::seconds(rng.next_u64_below(BURST_WINDOW_SECS + 1) as i64);
        let amount = round2(rng.lognormal(burst.amount_mu, 0.5).max(1.0));
        let (lat, lon) = geo::displace(rng, burst.home.0, burst.home.1, 20.0);

        let sender = ctx
            .population
            .get(&burst.sender_vpa)
            .expect("burst sender is in the population");
        fraud_record(
            rng,
            timestamp,
            sender,
            burst.receiver_vpa.clone(),
            burst.receiver_bank,
            amount,
            lat,
            lon,
        )
    }
}

// ── Anomalous amount ───────────────────────────────────────────────

/// A single transfer far above the sender's average.
pub struct AnomalousAmount;

impl FraudPattern for AnomalousAmount {
    fn name(&self) -> &'static str {
        "anomalous_amount"
    }

    fn generate_one(
        &mut self,
        ctx: &InjectionContext<'_>,
        rng: &mut PhaseRng,
    ) -> TransactionRecord {
        let (sender, baseline) = ctx.pick_sender(rng);
        let receiver = ctx.pick_receiver(rng, &sender.vpa);
        let factor = rng.uniform(20.0, 200.0);
        let amount = round2((baseline.avg_amount * factor).min(ANOMALOUS_AMOUNT_CAP));
        let timestamp = ctx.window.sample(rng);
        let (lat, lon) = geo::displace(rng, baseline.home_lat, baseline.home_lon, 50.0);
        fraud_record(
            rng,
            timestamp,
            sender,
            receiver.vpa.clone(),
            receiver.bank,
            amount,
            lat,
            lon,
        )
    }
}

// ── Odd hour ───────────────────────────────────────────────────────

/// A large transfer in the small hours (00:00-04:59).
pub struct OddHour;

impl FraudPattern for OddHour {
    fn name(&self) -> &'static str {
        "odd_hour"
    }

    fn generate_one(
        &mut self,
        ctx: &InjectionContext<'_>,
        rng: &mut PhaseRng,
    ) -> TransactionRecord {
        let (sender, baseline) = ctx.pick_sender(rng);
        let receiver = ctx.pick_receiver(rng, &sender.vpa);
        let amount = round2((baseline.avg_amount * rng.uniform(5.0, 100.0)).max(1000.0));
        let timestamp = ctx.window.odd_hour(rng);
        let (lat, lon) = geo::displace(rng, baseline.home_lat, baseline.home_lon, 100.0);
        fraud_record(
            rng,
            timestamp,
            sender,
            receiver.vpa.clone(),
            receiver.bank,
            amount,
            lat,
            lon,
        )
    }
}

// ── Location anomaly ───────────────────────────────────────────────

/// A transfer placed 500-2500 km from the sender's baseline home,
/// via the flat-plane displacement.
pub struct LocationAnomaly;

impl FraudPattern for LocationAnomaly {
    fn name(&self) -> &'static str {
        "location_anomaly"
    }

    fn generate_one(
        &mut self,
        ctx: &InjectionContext<'_>,
        rng: &mut PhaseRng,
    ) -> TransactionRecord {
        let (sender, baseline) = ctx.pick_sender(rng);
        let receiver = ctx.pick_receiver(rng, &sender.vpa);
        let amount = round2((baseline.avg_amount * rng.uniform(2.0, 50.0)).max(500.0));
        let timestamp = ctx.window.sample(rng);
        let (lat, lon) =
            geo::displace_planar(rng, baseline.home_lat, baseline.home_lon, 500.0, 2500.0);
        fraud_record(
            rng,
            timestamp,
            sender,
            receiver.vpa.clone(),
            receiver.bank,
            amount,
            lat,
            lon,
        )
    }
}

// ── New payee ──────────────────────────────────────────────────────

/// A large first payment to a freshly minted handle that exists
/// nowhere in the population.
pub struct NewPayee;

impl FraudPattern for NewPayee {
    fn name(&self) -> &'static str {
        "new_payee"
    }

    fn generate_one(
        &mut self,
        ctx: &InjectionContext<'_>,
        rng: &mut PhaseRng,
    ) -> TransactionRecord {
        let (sender, baseline) = ctx.pick_sender(rng);
        let receiver_vpa = HandleGenerator::fresh_vpa(rng);
        let receiver_bank = *rng.pick(BANKS);
        let amount = round2((baseline.avg_amount * rng.uniform(10.0, 200.0)).max(1000.0));
        let timestamp = ctx.window.sample(rng);
        let (lat, lon) = geo::displace(rng, baseline.home_lat, baseline.home_lon, 100.0);
        fraud_record(
            rng,
            timestamp,
            sender,
            receiver_vpa,
            receiver_bank,
            amount,
            lat,
            lon,
        )
    }
}

// ── Driver ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PatternCount {
    pub name: &'static str,
    pub count: u64,
}

/// Run all five patterns against their allocated targets, writing
/// every record to the sink. Returns per-pattern counts.
pub fn inject<W: Write>(
    budget: u64,
    ctx: &InjectionContext<'_>,
    writer: &mut OutputWriter<W>,
    rng: &mut PhaseRng,
) -> GenResult<Vec<PatternCount>> {
    let targets = allocate(budget);
    let mut patterns: Vec<Box<dyn FraudPattern>> = vec![
        Box::new(VelocityBurst::new()),
        Box::new(AnomalousAmount),
        Box::new(OddHour),
        Box::new(LocationAnomaly),
        Box::new(NewPayee),
    ];

    let mut counts = Vec::with_capacity(patterns.len());
    for (pattern, &target) in patterns.iter_mut().zip(targets.iter()) {
        log::info!("injecting {} {} frauds", target, pattern.name());
        let mut created = 0u64;
        while created < target {
            let record = pattern.generate_one(ctx, rng);
            debug_assert_ne!(record.sender_vpa, record.receiver_vpa);
            writer.append(&record)?;
            created += 1;
        }
        counts.push(PatternCount {
            name: pattern.name(),
            count: created,
        });
    }
    Ok(counts)
}
