//! Corporate Action Provider.
//!
//! Supplies one ordered, deduplicated view of forward-split events for
//! a listing: a curated table of announced splits merged with
//! split-like entries implied by stock-dividend records (a record
//! granting `s` units per 10 held shares implies a share multiplier of
//! `1 + s/10`). The provider emits share multipliers only; it never
//! adjusts prices.

use backtest_core::types::{DividendEvent, SplitEvent, SplitSource};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Announced forward splits. Effective dates are the first trading day
/// after the split took effect.
const CURATED_SPLITS: &[(&str, (i32, u32, u32), u32)] = &[
    // 0050: 1-for-4 split
    ("0050", (2025, 6, 18), 4),
    // 00663L: 1-for-7 split
    ("00663L", (2025, 6, 11), 7),
];

/// List all forward splits for `symbol` within `[start, end]`,
/// ascending by effective date.
///
/// Curated entries take precedence over derived entries when both fall
/// on the same date. `dividend_records` are passed in by the caller
/// because data retrieval belongs to the market-data collaborator.
pub fn list_splits(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    dividend_records: &[DividendEvent],
) -> Vec<SplitEvent> {
    let mut by_date: BTreeMap<NaiveDate, SplitEvent> = BTreeMap::new();

    for record in dividend_records {
        if record.stock_per_10 > Decimal::ZERO && record.date >= start && record.date <= end {
            by_date.insert(
                record.date,
                SplitEvent {
                    effective_date: record.date,
                    multiplier: Decimal::ONE + record.stock_per_10 / Decimal::TEN,
                    source: SplitSource::Derived,
                },
            );
        }
    }

    // Inserted second so a curated entry replaces a derived one on a
    // date collision.
    for event in curated_splits(symbol) {
        if event.effective_date >= start && event.effective_date <= end {
            by_date.insert(event.effective_date, event);
        }
    }

    by_date.into_values().collect()
}

fn curated_splits(symbol: &str) -> Vec<SplitEvent> {
    CURATED_SPLITS
        .iter()
        .filter(|(id, _, _)| *id == symbol)
        .filter_map(|(_, (year, month, day), multiplier)| {
            NaiveDate::from_ymd_opt(*year, *month, *day).map(|date| SplitEvent {
                effective_date: date,
                multiplier: Decimal::from(*multiplier),
                source: SplitSource::Curated,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range_2025() -> (NaiveDate, NaiveDate) {
        (date(2025, 1, 1), date(2025, 12, 31))
    }

    #[test]
    fn test_curated_split_for_known_symbol() {
        let (start, end) = range_2025();
        let splits = list_splits("0050", start, end, &[]);

        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].effective_date, date(2025, 6, 18));
        assert_eq!(splits[0].multiplier, Decimal::from(4));
        assert_eq!(splits[0].source, SplitSource::Curated);
    }

    #[test]
    fn test_unknown_symbol_yields_derived_only() {
        let (start, end) = range_2025();
        let dividends = vec![DividendEvent::stock(date(2025, 7, 1), Decimal::new(5, 1))];
        let splits = list_splits("2330", start, end, &dividends);

        assert_eq!(splits.len(), 1);
        // stock_per_10 = 0.5 implies a 1.05x multiplier
        assert_eq!(splits[0].multiplier, Decimal::new(105, 2));
        assert_eq!(splits[0].source, SplitSource::Derived);
    }

    #[test]
    fn test_cash_only_dividends_derive_nothing() {
        let (start, end) = range_2025();
        let dividends = vec![DividendEvent::cash(date(2025, 7, 1), Decimal::from(3))];
        assert!(list_splits("2330", start, end, &dividends).is_empty());
    }

    #[test]
    fn test_curated_wins_on_date_collision() {
        let (start, end) = range_2025();
        let dividends = vec![DividendEvent::stock(date(2025, 6, 18), Decimal::ONE)];
        let splits = list_splits("0050", start, end, &dividends);

        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].source, SplitSource::Curated);
        assert_eq!(splits[0].multiplier, Decimal::from(4));
    }

    #[test]
    fn test_ascending_order_and_range_filter() {
        let (start, end) = range_2025();
        let dividends = vec![
            DividendEvent::stock(date(2025, 9, 1), Decimal::ONE),
            DividendEvent::stock(date(2025, 3, 1), Decimal::ONE),
            // Outside the requested range
            DividendEvent::stock(date(2024, 3, 1), Decimal::ONE),
        ];
        let splits = list_splits("0050", start, end, &dividends);

        let dates: Vec<NaiveDate> = splits.iter().map(|s| s.effective_date).collect();
        assert_eq!(dates, vec![date(2025, 3, 1), date(2025, 6, 18), date(2025, 9, 1)]);
    }

    #[test]
    fn test_range_excludes_curated_entry() {
        let splits = list_splits("0050", date(2024, 1, 1), date(2024, 12, 31), &[]);
        assert!(splits.is_empty());
    }
}
