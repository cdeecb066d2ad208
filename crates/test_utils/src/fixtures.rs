//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for the lease and billing suites. All dates
//! hang off a single lease start so scenarios read as "day N".

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{add_days, Currency, Money};
use domain_lease::Container;

/// Fixture for lease dates
pub struct DateFixtures;

impl DateFixtures {
    /// Standard lease start (Mar 1, 2024)
    pub fn lease_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// `n` days after the standard lease start
    pub fn day(n: u64) -> NaiveDate {
        add_days(Self::lease_start(), n)
    }
}

/// Fixture for per-diem rates
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard per-diem rate, USD 50.00
    pub fn usd_per_diem() -> Money {
        Money::new(dec!(50.00), Currency::USD)
    }

    /// Rate that lands on a rounding midpoint for one day, EUR 12.345
    pub fn eur_midpoint_rate() -> Money {
        Money::new(dec!(12.345), Currency::EUR)
    }
}

/// Fixture for container summaries
pub struct ContainerFixtures;

impl ContainerFixtures {
    /// 40ft dry box, Shanghai to Rotterdam
    pub fn shanghai_rotterdam() -> Container {
        Container::new("MSKU1234565", "Shanghai", "Rotterdam", "40ft")
    }

    /// 20ft reefer, Qingdao to Felixstowe
    pub fn qingdao_felixstowe_reefer() -> Container {
        Container {
            container_type: "reefer".to_string(),
            ..Container::new("CXRU1130040", "Qingdao", "Felixstowe", "20ft")
        }
    }

    /// Container with a numbered serial, for bulk scenarios
    pub fn numbered(n: u32) -> Container {
        Container::new(format!("TGHU{:07}", n), "Singapore", "Hamburg", "40ft")
    }
}
