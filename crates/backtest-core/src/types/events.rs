//! Ledger and equity-curve records produced by the simulation engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    DividendCash,
    DividendStock,
    Split,
}

/// One append-only ledger record.
///
/// `amount` is the cash delta of the event (negative for the entry
/// buy, zero for splits and stock dividends). `balance_after` is the
/// portfolio value (cash plus shares marked at the event's reference
/// price) immediately after the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_per_share: Option<Decimal>,
    pub amount: Decimal,
    pub balance_after: Decimal,
}

/// One point of the daily equity curve. The engine emits exactly one
/// per input price bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_wire_names() {
        let json = serde_json::to_string(&TransactionKind::DividendCash).unwrap();
        assert_eq!(json, "\"DIVIDEND_CASH\"");

        let kind: TransactionKind = serde_json::from_str("\"SPLIT\"").unwrap();
        assert_eq!(kind, TransactionKind::Split);
    }
}
