//! Row-level validation and conversion.
//!
//! The portal emits incidental formatting noise: trailing blank rows, short
//! rows, thousands separators in quantities. A row that fails any field
//! check is dropped on its own; it never fails the card or the batch.

use chrono::NaiveDate;

use crate::types::{TargetPeriod, Transaction};

/// Column layout of a data row.
const MIN_CELLS: usize = 9;
const COL_SL_NO: usize = 0;
const COL_MEMBER: usize = 1;
const COL_AVAILED_FPS: usize = 2;
const COL_ALLOTTED_MONTH: usize = 3;
const COL_ALLOTTED_YEAR: usize = 4;
const COL_AVAIL_DATE: usize = 5;
const COL_AVAIL_TYPE: usize = 6;
const COL_SUGAR_KG: usize = 7;
const COL_RICE_KG: usize = 8;

/// Dates come off the page day-first.
const PAGE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Convert one data row into a `Transaction`, or `None` to skip it.
///
/// Skipping covers short rows, any unparseable field, and well-formed rows
/// whose avail date falls outside the target period.
pub fn parse_row(cells: &[String], period: TargetPeriod) -> Option<Transaction> {
    if cells.len() < MIN_CELLS {
        return None;
    }

    let sl_no: u32 = cells[COL_SL_NO].parse().ok().filter(|n| *n > 0)?;
    let member = &cells[COL_MEMBER];
    if member.is_empty() {
        return None;
    }
    let allotted_year: i32 = cells[COL_ALLOTTED_YEAR].parse().ok()?;
    let avail_date = NaiveDate::parse_from_str(&cells[COL_AVAIL_DATE], PAGE_DATE_FORMAT).ok()?;
    if !period.contains(avail_date) {
        return None;
    }
    let sugar_kg = parse_quantity(&cells[COL_SUGAR_KG])?;
    let rice_kg = parse_quantity(&cells[COL_RICE_KG])?;

    Some(Transaction {
        sl_no,
        member: member.clone(),
        availed_fps: cells[COL_AVAILED_FPS].clone(),
        allotted_month: cells[COL_ALLOTTED_MONTH].clone(),
        allotted_year,
        avail_date,
        avail_type: cells[COL_AVAIL_TYPE].clone(),
        sugar_kg,
        rice_kg,
    })
}

/// Quantities carry thousands separators ("2,500") and must be finite and
/// non-negative.
fn parse_quantity(raw: &str) -> Option<f64> {
    let value: f64 = raw.replace(',', "").trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    fn period() -> TargetPeriod {
        TargetPeriod::new(9, 2025).unwrap()
    }

    const WELL_FORMED: &[&str] = &[
        "1",
        "Jane Doe",
        "FPS12",
        "September",
        "2025",
        "05-09-2025",
        "Normal",
        "2,500",
        "10.000",
    ];

    #[test]
    fn test_well_formed_row_parses() {
        let tx = parse_row(&cells(WELL_FORMED), period()).unwrap();
        assert_eq!(tx.sl_no, 1);
        assert_eq!(tx.member, "Jane Doe");
        assert_eq!(tx.availed_fps, "FPS12");
        assert_eq!(tx.allotted_month, "September");
        assert_eq!(tx.allotted_year, 2025);
        assert_eq!(tx.avail_date, NaiveDate::from_ymd_opt(2025, 9, 5).unwrap());
        assert_eq!(tx.avail_type, "Normal");
        assert_eq!(tx.sugar_kg, 2500.0);
        assert_eq!(tx.rice_kg, 10.0);
    }

    #[test]
    fn test_period_mismatch_is_skipped() {
        let other = TargetPeriod::new(8, 2025).unwrap();
        assert!(parse_row(&cells(WELL_FORMED), other).is_none());

        let other_year = TargetPeriod::new(9, 2024).unwrap();
        assert!(parse_row(&cells(WELL_FORMED), other_year).is_none());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        for len in 0..MIN_CELLS {
            let short = cells(&WELL_FORMED[..len]);
            assert!(parse_row(&short, period()).is_none(), "len {}", len);
        }
    }

    #[test]
    fn test_bad_fields_are_skipped() {
        let mut bad_sl_no = cells(WELL_FORMED);
        bad_sl_no[0] = "x".to_string();
        assert!(parse_row(&bad_sl_no, period()).is_none());

        let mut zero_sl_no = cells(WELL_FORMED);
        zero_sl_no[0] = "0".to_string();
        assert!(parse_row(&zero_sl_no, period()).is_none());

        let mut empty_member = cells(WELL_FORMED);
        empty_member[1] = String::new();
        assert!(parse_row(&empty_member, period()).is_none());

        let mut bad_year = cells(WELL_FORMED);
        bad_year[4] = "20x5".to_string();
        assert!(parse_row(&bad_year, period()).is_none());

        let mut bad_date = cells(WELL_FORMED);
        bad_date[5] = "2025-09-05".to_string();
        assert!(parse_row(&bad_date, period()).is_none());

        let mut negative_qty = cells(WELL_FORMED);
        negative_qty[7] = "-1".to_string();
        assert!(parse_row(&negative_qty, period()).is_none());

        let mut bad_qty = cells(WELL_FORMED);
        bad_qty[8] = "n/a".to_string();
        assert!(parse_row(&bad_qty, period()).is_none());
    }

    #[test]
    fn test_extra_cells_are_tolerated() {
        let mut extra = cells(WELL_FORMED);
        extra.push("trailing".to_string());
        assert!(parse_row(&extra, period()).is_some());
    }
}
