//! Pure alcohol intake against a recommended daily limit.

use serde::{Deserialize, Serialize};

/// Default recommended pure alcohol per day, in cc
pub const DEFAULT_DAILY_LIMIT_CC: f64 = 100.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntakeSummary {
    pub total_pure_cc: f64,
    pub limit_cc: f64,
    /// Share of the limit consumed, capped at 1.0 for progress displays
    pub fraction: f64,
    pub over_limit: bool,
}

impl IntakeSummary {
    pub fn new(total_pure_cc: f64, limit_cc: f64) -> Self {
        let total_pure_cc = total_pure_cc.max(0.0);
        let fraction = if limit_cc > 0.0 {
            (total_pure_cc / limit_cc).min(1.0)
        } else {
            1.0
        };
        Self {
            total_pure_cc,
            limit_cc,
            fraction,
            over_limit: total_pure_cc > limit_cc,
        }
    }
}
