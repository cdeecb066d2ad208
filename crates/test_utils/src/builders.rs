//! Test Data Builders
//!
//! Builders let a test name only the fields it cares about. Defaults are a
//! USD 50.00/day lease with 10 free days starting on
//! [`DateFixtures::lease_start`].

use chrono::NaiveDate;

use core_kernel::{ContractId, Money};
use domain_lease::{Container, LeaseContract};

use crate::fixtures::{ContainerFixtures, DateFixtures, MoneyFixtures};

/// Builder for lease contracts
///
/// Bypasses validation so tests can also construct contracts a store might
/// hand over with bad data.
pub struct LeaseContractBuilder {
    id: ContractId,
    container: Container,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    free_days: u32,
    per_diem_rate: Money,
    auto_billing: bool,
}

impl Default for LeaseContractBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaseContractBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: ContractId::new_v7(),
            container: ContainerFixtures::shanghai_rotterdam(),
            start_date: DateFixtures::lease_start(),
            end_date: None,
            free_days: 10,
            per_diem_rate: MoneyFixtures::usd_per_diem(),
            auto_billing: false,
        }
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_free_days(mut self, days: u32) -> Self {
        self.free_days = days;
        self
    }

    pub fn with_rate(mut self, rate: Money) -> Self {
        self.per_diem_rate = rate;
        self
    }

    /// Turns on automatic payment capture
    pub fn auto_billing(mut self) -> Self {
        self.auto_billing = true;
        self
    }

    /// Builds the contract
    pub fn build(self) -> LeaseContract {
        LeaseContract {
            id: self.id,
            container: self.container,
            start_date: self.start_date,
            end_date: self.end_date,
            free_days: self.free_days,
            per_diem_rate: self.per_diem_rate,
            auto_billing: self.auto_billing,
            customer_reference: None,
        }
    }
}
