//! Property-Based Test Generators
//!
//! Proptest strategies that only produce contracts satisfying the lease
//! invariants (non-negative rate and free days, end not before start).

use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{add_days, Currency, Money};
use domain_lease::LeaseContract;

use crate::builders::LeaseContractBuilder;
use crate::fixtures::{ContainerFixtures, DateFixtures};

/// Strategy for settlement currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::CNY),
        Just(Currency::SGD),
        Just(Currency::AED),
        Just(Currency::JPY),
    ]
}

/// Strategy for non-negative per-diem rates in minor units
pub fn per_diem_rate_strategy() -> impl Strategy<Value = Money> {
    (0i64..5_000_000i64, currency_strategy())
        .prop_map(|(minor, currency)| Money::from_minor(minor, currency))
}

/// Strategy for a date within roughly a year of the standard lease start
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..400).prop_map(DateFixtures::day)
}

/// Strategy for valid lease contracts
pub fn lease_contract_strategy() -> impl Strategy<Value = LeaseContract> {
    (
        0u32..1_000_000,
        date_strategy(),
        0u32..90,
        per_diem_rate_strategy(),
        proptest::option::of(0u64..365),
        any::<bool>(),
    )
        .prop_map(|(serial, start, free_days, rate, end_offset, auto)| {
            let mut builder = LeaseContractBuilder::new()
                .with_container(ContainerFixtures::numbered(serial))
                .with_start_date(start)
                .with_free_days(free_days)
                .with_rate(rate);
            if let Some(offset) = end_offset {
                builder = builder.with_end_date(add_days(start, offset));
            }
            if auto {
                builder = builder.auto_billing();
            }
            builder.build()
        })
}
