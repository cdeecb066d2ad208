//! Lease contracts
//!
//! A contract is read-only to the billing engine. Construction goes through
//! [`LeaseContract::new`] or [`ContractRecord`], both of which reject
//! negative free days and negative rates before any calculator sees them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{add_days, ContractId, Currency, Money};
use crate::container::Container;
use crate::error::LeaseError;
use crate::status::{lease_status, LeaseStatus};

/// A signed lease for a single container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseContract {
    /// Unique identifier
    pub id: ContractId,
    /// Leased container
    pub container: Container,
    /// Lease commencement
    pub start_date: NaiveDate,
    /// Lease termination, if known
    pub end_date: Option<NaiveDate>,
    /// Days after commencement with no overage charge
    pub free_days: u32,
    /// Amount charged per day of overage; its currency is the settlement currency
    pub per_diem_rate: Money,
    /// Whether overage triggers an automatic payment-capture attempt
    pub auto_billing: bool,
    /// Customer-facing reference (PO number, booking ref)
    pub customer_reference: Option<String>,
}

impl LeaseContract {
    /// Creates a validated contract with no end date and auto-billing off
    ///
    /// # Errors
    ///
    /// Returns `LeaseError::Validation` if the per-diem rate is negative
    pub fn new(
        container: Container,
        start_date: NaiveDate,
        free_days: u32,
        per_diem_rate: Money,
    ) -> Result<Self, LeaseError> {
        let contract = Self {
            id: ContractId::new_v7(),
            container,
            start_date,
            end_date: None,
            free_days,
            per_diem_rate,
            auto_billing: false,
            customer_reference: None,
        };
        contract.validate()?;
        Ok(contract)
    }

    /// Sets the lease termination date
    ///
    /// # Errors
    ///
    /// Returns `LeaseError::Validation` if `end_date` precedes the start date
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Result<Self, LeaseError> {
        self.end_date = Some(end_date);
        self.validate()?;
        Ok(self)
    }

    /// Checks the contract invariants
    pub fn validate(&self) -> Result<(), LeaseError> {
        if self.per_diem_rate.is_negative() {
            return Err(LeaseError::validation(format!(
                "per-diem rate must not be negative, got {}",
                self.per_diem_rate
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(LeaseError::validation(format!(
                    "end date {} precedes start date {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }

    /// First day on which overage is charged (`start_date + free_days`)
    pub fn free_period_end(&self) -> NaiveDate {
        add_days(self.start_date, u64::from(self.free_days))
    }

    /// Settlement currency, taken from the per-diem rate
    pub fn currency(&self) -> Currency {
        self.per_diem_rate.currency()
    }

    /// Lifecycle status as of `reference_date`
    pub fn status(&self, reference_date: NaiveDate) -> LeaseStatus {
        lease_status(Some(self), reference_date)
    }
}

/// Untrusted contract terms as received from a store export or an API body
///
/// Numeric fields are signed so that a negative value reaches validation
/// instead of failing deep inside deserialization with an opaque message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    #[serde(default)]
    pub id: Option<ContractId>,
    pub container: Container,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub free_days: i64,
    pub per_diem_rate: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub auto_billing: bool,
    #[serde(default)]
    pub customer_reference: Option<String>,
}

impl TryFrom<ContractRecord> for LeaseContract {
    type Error = LeaseError;

    fn try_from(record: ContractRecord) -> Result<Self, Self::Error> {
        let free_days = u32::try_from(record.free_days).map_err(|_| {
            LeaseError::validation(format!(
                "free days must be between 0 and {}, got {}",
                u32::MAX,
                record.free_days
            ))
        })?;

        let contract = LeaseContract {
            id: record.id.unwrap_or_else(ContractId::new_v7),
            container: record.container,
            start_date: record.start_date,
            end_date: record.end_date,
            free_days,
            per_diem_rate: Money::new(record.per_diem_rate, record.currency),
            auto_billing: record.auto_billing,
            customer_reference: record.customer_reference,
        };
        contract.validate()?;
        Ok(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn container() -> Container {
        Container::new("MSKU1234565", "Shanghai", "Rotterdam", "40ft HC")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_free_period_end() {
        let contract = LeaseContract::new(
            container(),
            day(1),
            10,
            Money::new(dec!(50), Currency::USD),
        ).unwrap();
        assert_eq!(contract.free_period_end(), day(11));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result = LeaseContract::new(
            container(),
            day(1),
            10,
            Money::new(dec!(-1), Currency::USD),
        );
        assert!(matches!(result, Err(LeaseError::Validation(_))));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let contract = LeaseContract::new(
            container(),
            day(10),
            5,
            Money::new(dec!(20), Currency::USD),
        ).unwrap();
        assert!(contract.with_end_date(day(9)).is_err());
    }

    #[test]
    fn test_record_with_negative_free_days_rejected() {
        let record = ContractRecord {
            id: None,
            container: container(),
            start_date: day(1),
            end_date: None,
            free_days: -3,
            per_diem_rate: dec!(45),
            currency: Currency::USD,
            auto_billing: false,
            customer_reference: None,
        };
        let result = LeaseContract::try_from(record);
        assert!(matches!(result, Err(LeaseError::Validation(msg)) if msg.contains("-3")));
    }
}
