//! The emitted row model.
//!
//! RULE: a record is created, written once, never mutated. The output
//! channel is append-only, so there is no update path anywhere.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Stable output column order. The writer emits exactly this header;
/// the struct fields below must stay in the same order.
pub const CSV_HEADER: &[&str] = &[
    "transaction_id",
    "timestamp",
    "sender_vpa",
    "receiver_vpa",
    "amount",
    "sender_bank",
    "receiver_bank",
    "sender_lat",
    "sender_lon",
    "transaction_type",
    "device_id",
    "is_fraud",
];

pub const TXN_P2P: &str = "P2P";
pub const TXN_P2M: &str = "P2M";

/// Share of legitimate traffic that is person-to-person.
pub const P2P_SHARE: f64 = 0.85;

/// One emitted row. Timestamps are UTC at second precision;
/// amounts carry 2 decimals, coordinates 6.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub timestamp: NaiveDateTime,
    pub sender_vpa: String,
    pub receiver_vpa: String,
    pub amount: f64,
    pub sender_bank: String,
    pub receiver_bank: String,
    pub sender_lat: f64,
    pub sender_lon: f64,
    pub transaction_type: &'static str,
    pub device_id: String,
    pub is_fraud: u8,
}

impl TransactionRecord {
    pub fn is_fraud(&self) -> bool {
        self.is_fraud == 1
    }
}

/// Round to 2 decimals (amounts).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Round to 6 decimals (emitted coordinates).
pub fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// Round to 3 decimals (coarse location buckets).
pub fn round3(x: f64) -> f64 {
    (x * 1e3).round() / 1e3
}
