//! Per-diem accrual

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{days_between, Money};
use crate::contract::LeaseContract;

/// Whole days elapsed since the free period ended, zero on or before the boundary
pub fn overage_days(contract: &LeaseContract, reference_date: NaiveDate) -> u32 {
    let elapsed = days_between(contract.free_period_end(), reference_date);
    u32::try_from(elapsed.max(0)).unwrap_or(u32::MAX)
}

/// `rate * days`, rounded half-up to the currency's precision
pub fn overage_amount(rate: Money, days: u32) -> Money {
    rate.times(Decimal::from(days))
}

/// Overage owed from the end of the free period up to `reference_date`
pub fn accrued_total(contract: &LeaseContract, reference_date: NaiveDate) -> Money {
    overage_amount(contract.per_diem_rate, overage_days(contract, reference_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use core_kernel::{add_days, Currency};
    use rust_decimal_macros::dec;

    fn day(n: u64) -> NaiveDate {
        add_days(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), n)
    }

    fn contract() -> LeaseContract {
        LeaseContract::new(
            Container::new("CAIU7000001", "Busan", "Long Beach", "40ft"),
            day(0),
            10,
            Money::new(dec!(50.00), Currency::USD),
        ).unwrap()
    }

    #[test]
    fn test_zero_before_and_on_boundary() {
        let c = contract();
        assert_eq!(overage_days(&c, day(3)), 0);
        assert_eq!(overage_days(&c, day(10)), 0);
        assert_eq!(overage_days(&c, day(12)), 2);
    }

    #[test]
    fn test_amount_rounds_half_up() {
        let rate = Money::new(dec!(12.345), Currency::USD);
        assert_eq!(overage_amount(rate, 1).amount(), dec!(12.35));
    }

    #[test]
    fn test_accrued_total() {
        assert_eq!(accrued_total(&contract(), day(13)).amount(), dec!(150.00));
    }
}
