//! Custom Test Assertions
//!
//! Assertion helpers that give clearer failure messages than `assert_eq!`
//! on whole invoices or raw decimals.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_billing::{Invoice, InvoiceStatus};

/// Asserts a Money value's amount and that it sits at currency precision
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money amount mismatch: actual={}, expected={} {}",
        actual,
        actual.currency(),
        expected
    );
    assert_currency_precision(actual);
}

/// Asserts that an amount has no digits beyond its currency's minor unit
pub fn assert_currency_precision(money: &Money) {
    let dp = money.currency().decimal_places();
    assert_eq!(
        money.amount(),
        money.amount().round_dp(dp),
        "{} carries more than {} decimal places",
        money,
        dp
    );
}

/// Asserts an invoice's status
pub fn assert_invoice_status(invoice: &Invoice, expected: InvoiceStatus) {
    assert_eq!(
        invoice.status, expected,
        "Invoice {} ({}) status mismatch: actual={}, expected={}",
        invoice.invoice_number, invoice.id, invoice.status, expected
    );
}

/// Asserts that capture was initiated and recorded on the invoice
pub fn assert_capture_recorded(invoice: &Invoice) {
    assert!(
        invoice.payment_id.is_some() && invoice.payment_method.is_some(),
        "Invoice {} has no capture recorded (payment_id={:?}, payment_method={:?})",
        invoice.invoice_number,
        invoice.payment_id,
        invoice.payment_method
    );
}
