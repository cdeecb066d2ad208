//! Lease lifecycle status
//!
//! Status is a pure projection of `(contract, reference date)`. It is never
//! stored, so a stale label in the container record can never leak into
//! billing decisions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::contract::LeaseContract;
use crate::error::LeaseError;

/// Where a container sits in its contractual lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaseStatus {
    /// No active contract, or the contract has ended
    Available,
    /// Inside `[start_date, start_date + free_days)`
    FreePeriod,
    /// On or after `start_date + free_days` and not ended
    Overage,
}

impl LeaseStatus {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseStatus::Available => "AVAILABLE",
            LeaseStatus::FreePeriod => "FREE_PERIOD",
            LeaseStatus::Overage => "OVERAGE",
        }
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaseStatus {
    type Err = LeaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(LeaseStatus::Available),
            "FREE_PERIOD" => Ok(LeaseStatus::FreePeriod),
            "OVERAGE" => Ok(LeaseStatus::Overage),
            other => Err(LeaseError::validation(format!("unknown lease status: {}", other))),
        }
    }
}

/// Derives the lifecycle status of `contract` as of `reference_date`
///
/// Comparisons are on calendar dates only.
pub fn lease_status(contract: Option<&LeaseContract>, reference_date: NaiveDate) -> LeaseStatus {
    let Some(contract) = contract else {
        return LeaseStatus::Available;
    };

    if let Some(end) = contract.end_date {
        if reference_date > end {
            return LeaseStatus::Available;
        }
    }

    if reference_date < contract.free_period_end() {
        LeaseStatus::FreePeriod
    } else {
        LeaseStatus::Overage
    }
}
