//! Integration tests for core_kernel public API

use chrono::NaiveDate;
use core_kernel::{add_days, days_between, ContractId, Currency, DateSpan, Money, MoneyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod money {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_handles_jpy_no_decimals() {
        let m = Money::from_minor(10000, Currency::JPY);
        assert_eq!(m.amount(), dec!(10000));
    }

    #[test]
    fn test_jpy_rounds_to_whole_units() {
        let m = Money::new(dec!(1500.5), Currency::JPY);
        assert_eq!(m.round_to_currency().amount(), dec!(1501));
    }

    #[test]
    fn test_display_uses_currency_precision() {
        let m = Money::new(dec!(50), Currency::USD);
        assert_eq!(m.to_string(), "USD 50.00");
    }

    #[test]
    fn test_serde_uses_uppercase_currency() {
        let m = Money::new(dec!(12.5), Currency::EUR);
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["currency"], "EUR");
    }

    #[test]
    fn test_checked_add_mismatch() {
        let a = Money::new(Decimal::ONE, Currency::USD);
        let b = Money::new(Decimal::ONE, Currency::GBP);
        assert_eq!(
            a.checked_add(&b),
            Err(MoneyError::CurrencyMismatch("USD".to_string(), "GBP".to_string()))
        );
    }
}

mod calendar_days {
    use super::*;

    #[test]
    fn test_free_period_end_arithmetic() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let free_end = add_days(start, 10);
        assert_eq!(free_end, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
        assert_eq!(days_between(start, free_end), 10);
    }

    #[test]
    fn test_date_span_covers_week() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let span = DateSpan::new(start, add_days(start, 7)).unwrap();
        assert_eq!(days_between(span.start, span.end), 7);
    }
}

mod identifiers {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ContractId::new(), ContractId::new());
    }

    #[test]
    fn test_id_serializes_as_bare_uuid() {
        let id = ContractId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
