//! Synthetic account population.
//!
//! Accounts are generated once, up front, and never mutated. Every
//! later phase (legitimate stream, fraud injection) samples from this
//! fixed set.

use crate::handles::HandleGenerator;
use crate::rng::PhaseRng;
use std::collections::HashMap;

/// Issuing banks in the synthetic universe.
pub const BANKS: &[&str] = &["HDFC", "SBI", "ICICI", "AXIS", "PAYTM", "YESBANK", "KOTAK"];

/// Rough lat/lon bounding box for India.
pub const LAT_RANGE: (f64, f64) = (8.0, 37.0);
pub const LON_RANGE: (f64, f64) = (68.0, 97.0);

/// Typical-amount scale is log-uniform over this range, so the
/// population spans micro-payments to large transfers.
pub const TYPICAL_AMOUNT_RANGE: (f64, f64) = (20.0, 2000.0);

/// One synthetic payer/payee identity. Immutable after generation.
#[derive(Debug, Clone)]
pub struct Account {
    pub vpa: String,
    pub bank: &'static str,
    pub home_lat: f64,
    pub home_lon: f64,
    /// Log-scale center for this account's legitimate amounts.
    pub typical_amount: f64,
    /// Six draws (with replacement) from 0-23. Part of the identity
    /// profile consumed by downstream feature engineering.
    pub preferred_hours: [u8; 6],
}

pub struct UserPopulation {
    accounts: Vec<Account>,
    by_vpa: HashMap<String, usize>,
}

impl UserPopulation {
    /// Generate `count` accounts deterministically from the given RNG
    /// stream. Handle collisions are resolved by re-drawing, so every
    /// handle is unique by construction.
    pub fn generate(count: usize, rng: &mut PhaseRng) -> Self {
        let mut accounts = Vec::with_capacity(count);
        let mut by_vpa = HashMap::with_capacity(count);

        while accounts.len() < count {
            let vpa = HandleGenerator::vpa(rng);
            if by_vpa.contains_key(&vpa) {
                continue;
            }
            let bank = *rng.pick(BANKS);
            let home_lat = rng.uniform(LAT_RANGE.0, LAT_RANGE.1);
            let home_lon = rng.uniform(LON_RANGE.0, LON_RANGE.1);
            let typical_amount = 10f64.powf(rng.uniform(
                TYPICAL_AMOUNT_RANGE.0.log10(),
                TYPICAL_AMOUNT_RANGE.1.log10(),
            ));
            let mut preferred_hours = [0u8; 6];
            for slot in &mut preferred_hours {
                *slot = rng.next_u64_below(24) as u8;
            }

            by_vpa.insert(vpa.clone(), accounts.len());
            accounts.push(Account {
                vpa,
                bank,
                home_lat,
                home_lon,
                typical_amount,
                preferred_hours,
            });
        }

        log::debug!("generated {} accounts", accounts.len());
        Self { accounts, by_vpa }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts in generation order. This order is the canonical
    /// deterministic iteration order for everything downstream.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, vpa: &str) -> Option<&Account> {
        self.by_vpa.get(vpa).map(|&i| &self.accounts[i])
    }

    pub fn contains(&self, vpa: &str) -> bool {
        self.by_vpa.contains_key(vpa)
    }

    /// Uniformly sample one account.
    pub fn sample(&self, rng: &mut PhaseRng) -> &Account {
        let index = rng.next_u64_below(self.accounts.len() as u64) as usize;
        &self.accounts[index]
    }

    /// Uniformly sample an account other than `sender_vpa`.
    /// Resamples on self-pay; requires at least two accounts.
    pub fn sample_receiver(&self, rng: &mut PhaseRng, sender_vpa: &str) -> &Account {
        assert!(self.accounts.len() >= 2, "need >= 2 accounts for a receiver");
        loop {
            let candidate = self.sample(rng);
            if candidate.vpa != sender_vpa {
                return candidate;
            }
        }
    }
}
