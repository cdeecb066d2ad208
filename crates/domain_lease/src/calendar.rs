//! Calendar projection
//!
//! Renders contract lifecycles as time-ranged display events. Nothing here is
//! persisted; every query recomputes status from the contracts it is given.
//!
//! | Status        | Events emitted                                              |
//! |---------------|-------------------------------------------------------------|
//! | `OVERAGE`     | `FREE_PERIOD [start, free_end)` + `OVERAGE [free_end, window_end)` |
//! | `FREE_PERIOD` | `FREE_PERIOD [start, free_end)`                             |
//! | `AVAILABLE`   | `AVAILABLE [today, window_end)`                             |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{add_days, ContainerId, ContractId, DateSpan, Money};
use crate::accrual::{accrued_total, overage_amount, overage_days};
use crate::contract::LeaseContract;
use crate::status::LeaseStatus;

/// Optional exact-match filters applied before projection
///
/// `None` means "do not filter on this field"; `Some("")` only matches an
/// empty field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFilters {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub size: Option<String>,
    pub status: Option<LeaseStatus>,
}

impl CalendarFilters {
    /// Returns true if `contract` passes every present filter as of `today`
    pub fn matches(&self, contract: &LeaseContract, today: NaiveDate) -> bool {
        let container = &contract.container;

        if let Some(ref origin) = self.origin {
            if &container.origin != origin {
                return false;
            }
        }
        if let Some(ref destination) = self.destination {
            if &container.destination != destination {
                return false;
            }
        }
        if let Some(ref size) = self.size {
            if &container.size != size {
                return false;
            }
        }
        if let Some(status) = self.status {
            if contract.status(today) != status {
                return false;
            }
        }
        true
    }
}

/// Figures attached to an overage span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverageDetails {
    /// Overage days elapsed as of the projection date
    pub overage_days: u32,
    /// Charge for the next billing tick (one day at the per-diem rate)
    pub overage_amount: Money,
    /// Running overage total to date
    pub accrued_total: Money,
    /// Day the next daily charge falls due
    pub next_billing_date: NaiveDate,
}

/// A display-only, time-ranged rendering of one lifecycle phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub contract_id: ContractId,
    pub container_id: ContainerId,
    pub container_number: String,
    pub title: String,
    pub span: DateSpan,
    pub classification: LeaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overage: Option<OverageDetails>,
}

impl CalendarEvent {
    fn new(contract: &LeaseContract, classification: LeaseStatus, span: DateSpan) -> Self {
        let label = match classification {
            LeaseStatus::Available => "Available",
            LeaseStatus::FreePeriod => "Free period",
            LeaseStatus::Overage => "Overage",
        };
        Self {
            contract_id: contract.id,
            container_id: contract.container.id,
            container_number: contract.container.container_number.clone(),
            title: format!("{} - {}", contract.container.container_number, label),
            span,
            classification,
            overage: None,
        }
    }
}

/// Projects calendar events for `contracts` that pass `filters`
///
/// `today` is the date status is evaluated at. Only `window.end` bounds the
/// open-ended spans; spans are not clipped to `window.start`. Output follows
/// the order of `contracts`.
pub fn project_events(
    contracts: &[LeaseContract],
    filters: &CalendarFilters,
    window: DateSpan,
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for contract in contracts.iter().filter(|c| filters.matches(c, today)) {
        let free_end = contract.free_period_end();
        let free_span = DateSpan::unchecked(contract.start_date, free_end);

        match contract.status(today) {
            LeaseStatus::Overage => {
                events.push(CalendarEvent::new(contract, LeaseStatus::FreePeriod, free_span));

                let mut overage = CalendarEvent::new(
                    contract,
                    LeaseStatus::Overage,
                    DateSpan::unchecked(free_end, window.end),
                );
                overage.overage = Some(OverageDetails {
                    overage_days: overage_days(contract, today),
                    overage_amount: overage_amount(contract.per_diem_rate, 1),
                    accrued_total: accrued_total(contract, today),
                    next_billing_date: add_days(today, 1),
                });
                events.push(overage);
            }
            LeaseStatus::FreePeriod => {
                events.push(CalendarEvent::new(contract, LeaseStatus::FreePeriod, free_span));
            }
            LeaseStatus::Available => {
                events.push(CalendarEvent::new(
                    contract,
                    LeaseStatus::Available,
                    DateSpan::unchecked(today, window.end),
                ));
            }
        }
    }

    tracing::debug!(
        contracts = contracts.len(),
        events = events.len(),
        %today,
        "Projected calendar events"
    );

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn day(n: u64) -> NaiveDate {
        add_days(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), n)
    }

    fn contract(origin: &str, size: &str) -> LeaseContract {
        LeaseContract::new(
            Container::new("SEGU5550001", origin, "Felixstowe", size),
            day(0),
            10,
            Money::new(dec!(50.00), Currency::USD),
        ).unwrap()
    }

    #[test]
    fn test_empty_string_filter_is_not_absent() {
        let c = contract("Qingdao", "20ft");
        let filters = CalendarFilters {
            origin: Some(String::new()),
            ..Default::default()
        };
        assert!(!filters.matches(&c, day(1)));
        assert!(CalendarFilters::default().matches(&c, day(1)));
    }

    #[test]
    fn test_overage_emits_two_spans() {
        let c = contract("Qingdao", "20ft");
        let window = DateSpan::new(day(0), day(30)).unwrap();
        let events = project_events(&[c], &CalendarFilters::default(), window, day(12));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].classification, LeaseStatus::FreePeriod);
        assert_eq!(events[0].span, DateSpan::unchecked(day(0), day(10)));
        assert_eq!(events[1].classification, LeaseStatus::Overage);
        assert_eq!(events[1].span, DateSpan::unchecked(day(10), day(30)));

        let details = events[1].overage.as_ref().unwrap();
        assert_eq!(details.overage_days, 2);
        assert_eq!(details.overage_amount.amount(), dec!(50.00));
        assert_eq!(details.accrued_total.amount(), dec!(100.00));
        assert_eq!(details.next_billing_date, day(13));
    }

    #[test]
    fn test_available_span_starts_today() {
        let c = contract("Qingdao", "20ft").with_end_date(day(5)).unwrap();
        let window = DateSpan::new(day(0), day(30)).unwrap();
        let events = project_events(&[c], &CalendarFilters::default(), window, day(20));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].classification, LeaseStatus::Available);
        assert_eq!(events[0].span.start, day(20));
        assert!(events[0].overage.is_none());
    }
}
