//! Tests for domain_lease

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{add_days, ContractId, Currency, DateSpan, Money};

use domain_lease::{
    accrued_total, lease_status, overage_amount, overage_days, project_events, CalendarFilters,
    Container, ContractPort, InMemoryContractStore, LeaseContract, LeaseError, LeaseStatus,
};

fn day(n: u64) -> NaiveDate {
    add_days(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), n)
}

fn contract(free_days: u32, rate: Decimal) -> LeaseContract {
    LeaseContract::new(
        Container::new("MSCU4410012", "Shanghai", "Rotterdam", "40ft"),
        day(0),
        free_days,
        Money::new(rate, Currency::USD),
    )
    .unwrap()
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_day_twelve_of_ten_free_days_is_two_days_overage() {
        let c = contract(10, dec!(50.00));

        assert_eq!(lease_status(Some(&c), day(12)), LeaseStatus::Overage);
        assert_eq!(overage_days(&c, day(12)), 2);
        assert_eq!(overage_amount(c.per_diem_rate, 2).amount(), dec!(100.00));
    }

    #[test]
    fn test_ended_contract_is_available() {
        let c = contract(2, dec!(50.00)).with_end_date(day(5)).unwrap();
        assert_eq!(c.status(day(20)), LeaseStatus::Available);
    }

    #[test]
    fn test_before_start_is_free_period() {
        let c = contract(10, dec!(50.00));
        assert_eq!(c.status(NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()), LeaseStatus::FreePeriod);
        assert_eq!(overage_days(&c, NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()), 0);
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&LeaseStatus::FreePeriod).unwrap();
        assert_eq!(json, "\"FREE_PERIOD\"");
    }

    #[test]
    fn test_jpy_amount_has_no_minor_units() {
        let rate = Money::new(dec!(1250.5), Currency::JPY);
        assert_eq!(overage_amount(rate, 1).amount(), dec!(1251));
    }
}

// ============================================================================
// Accrual Properties
// ============================================================================

mod accrual_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn overage_days_is_monotonic(free in 0u32..120, a in 0u64..400, b in 0u64..400) {
            let c = contract(free, dec!(10.00));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(overage_days(&c, day(lo)) <= overage_days(&c, day(hi)));
        }

        #[test]
        fn overage_days_is_zero_up_to_free_period_end(free in 0u32..120, offset in 0u64..120) {
            let c = contract(free, dec!(10.00));
            let date = day(offset.min(u64::from(free)));
            prop_assert_eq!(overage_days(&c, date), 0);
        }

        #[test]
        fn overage_amount_is_linear_in_days(cents in 0i64..1_000_000, a in 0u32..1_000, b in 0u32..1_000) {
            let rate = Money::from_minor(cents, Currency::USD);
            let sum = overage_amount(rate, a).checked_add(&overage_amount(rate, b)).unwrap();
            prop_assert_eq!(overage_amount(rate, a + b).amount(), sum.amount());
        }

        #[test]
        fn overage_amount_has_two_decimal_places(units in 0i64..100_000_000, days in 0u32..3_650) {
            let rate = Money::new(Decimal::new(units, 4), Currency::USD);
            let amount = overage_amount(rate, days).amount();
            prop_assert!(amount.scale() <= 2);
            prop_assert_eq!(amount, amount.round_dp(2));
        }
    }

    #[test]
    fn test_accrued_total_matches_days_times_rate() {
        let c = contract(7, dec!(12.50));
        let total = accrued_total(&c, day(10));
        assert_eq!(total.amount(), dec!(37.50));
    }
}

// ============================================================================
// Calendar Tests
// ============================================================================

mod calendar_tests {
    use super::*;

    fn window() -> DateSpan {
        DateSpan::new(day(0), day(60)).unwrap()
    }

    #[test]
    fn test_every_matching_contract_projects_at_least_one_event() {
        let contracts = vec![
            contract(10, dec!(50.00)),
            contract(30, dec!(25.00)),
            contract(0, dec!(40.00)).with_end_date(day(3)).unwrap(),
        ];

        let events = project_events(&contracts, &CalendarFilters::default(), window(), day(12));

        for c in &contracts {
            assert!(events.iter().any(|e| e.contract_id == c.id));
        }
        // overage (2) + free period (1) + available (1)
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_filters_are_exact_match() {
        let qingdao = LeaseContract::new(
            Container::new("TCLU1000001", "Qingdao", "Antwerp", "20ft"),
            day(0),
            5,
            Money::new(dec!(30.00), Currency::EUR),
        )
        .unwrap();
        let shanghai = contract(5, dec!(30.00));

        let filters = CalendarFilters {
            origin: Some("Qingdao".to_string()),
            ..Default::default()
        };
        let events = project_events(&[qingdao.clone(), shanghai], &filters, window(), day(1));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].contract_id, qingdao.id);

        let lowercase = CalendarFilters {
            origin: Some("qingdao".to_string()),
            ..Default::default()
        };
        assert!(project_events(&[qingdao], &lowercase, window(), day(1)).is_empty());
    }

    #[test]
    fn test_status_filter_uses_today() {
        let c = contract(10, dec!(50.00));
        let filters = CalendarFilters {
            status: Some(LeaseStatus::Overage),
            ..Default::default()
        };

        assert!(project_events(&[c.clone()], &filters, window(), day(5)).is_empty());
        assert_eq!(project_events(&[c], &filters, window(), day(15)).len(), 2);
    }

    #[test]
    fn test_overage_span_is_not_clipped_to_window_start() {
        let c = contract(10, dec!(50.00));
        let late_window = DateSpan::new(day(20), day(40)).unwrap();
        let events = project_events(&[c], &CalendarFilters::default(), late_window, day(25));

        let free = &events[0];
        assert_eq!(free.classification, LeaseStatus::FreePeriod);
        assert_eq!(free.span.start, day(0));
        assert_eq!(events[1].span.end, day(40));
    }
}

// ============================================================================
// Contract Store Tests
// ============================================================================

mod store_tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_get_contract_not_found() {
        let store = InMemoryContractStore::new();
        let result = store.get_contract(ContractId::new()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_seed_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{
                    "container": {{
                        "id": "0190a6f0-0000-7000-8000-000000000001",
                        "container_number": "CMAU3000001",
                        "origin": "Singapore",
                        "destination": "Jebel Ali",
                        "size": "40ft HC",
                        "container_type": "reefer"
                    }},
                    "start_date": "2024-01-01",
                    "free_days": 10,
                    "per_diem_rate": "45.00",
                    "currency": "SGD",
                    "auto_billing": true
                }}
            ]"#
        )
        .unwrap();

        let store = InMemoryContractStore::from_json_file(file.path()).unwrap();
        let contracts = store.list_contracts().await.unwrap();

        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].currency(), Currency::SGD);
        assert!(contracts[0].auto_billing);
        assert_eq!(contracts[0].status(day(12)), LeaseStatus::Overage);
    }

    #[test]
    fn test_seed_rejects_negative_rate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "container": {{
                    "id": "0190a6f0-0000-7000-8000-000000000002",
                    "container_number": "CMAU3000002",
                    "origin": "Singapore",
                    "destination": "Jebel Ali",
                    "size": "20ft",
                    "container_type": "dry"
                }},
                "start_date": "2024-01-01",
                "free_days": 10,
                "per_diem_rate": "-5.00",
                "currency": "USD"
            }}]"#
        )
        .unwrap();

        let result = InMemoryContractStore::from_json_file(file.path());
        assert!(matches!(result, Err(LeaseError::Validation(_))));
    }

    #[test]
    fn test_seed_missing_file() {
        let result = InMemoryContractStore::from_json_file("/nonexistent/contracts.json");
        assert!(matches!(result, Err(LeaseError::Seed(_))));
    }
}
