//! Grouped totals over the cleaned table.
//!
//! Groups are kept in first-encountered order and ranked with a stable sort,
//! so ties always resolve to the group seen first.

use crate::cleaner::WEEKDAYS;
use crate::types::{MonthlyTotal, RankedTotal, WeekdayTotal};
use crate::utils::{column_f64, column_strings};
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// Sum `measure` per distinct `key`, in first-encountered key order.
///
/// Rows with a null key are skipped; null measures count as zero.
pub fn group_sum(df: &DataFrame, key: &str, measure: &str) -> Result<Vec<RankedTotal>> {
    let keys = column_strings(df, key)?;
    let values = column_f64(df, measure)?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RankedTotal> = Vec::new();

    for (k, v) in keys.into_iter().zip(values) {
        let Some(label) = k else { continue };
        let amount = v.unwrap_or(0.0);
        match index.get(&label) {
            Some(&i) => groups[i].total += amount,
            None => {
                index.insert(label.clone(), groups.len());
                groups.push(RankedTotal {
                    label,
                    total: amount,
                });
            }
        }
    }

    Ok(groups)
}

/// Largest `n` groups of `measure` by `key`, descending.
pub fn top_n(df: &DataFrame, key: &str, measure: &str, n: usize) -> Result<Vec<RankedTotal>> {
    let mut groups = group_sum(df, key, measure)?;
    // Vec::sort_by is stable.
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups.truncate(n);
    Ok(groups)
}

/// Sales per calendar month, ascending. Months without rows are omitted.
pub fn monthly_totals(df: &DataFrame, month: &str, measure: &str) -> Result<Vec<MonthlyTotal>> {
    let months = column_f64(df, month)?;
    let values = column_f64(df, measure)?;

    let mut totals = [None::<f64>; 12];
    for (m, v) in months.into_iter().zip(values) {
        let Some(m) = m else { continue };
        let m = m as usize;
        if (1..=12).contains(&m) {
            *totals[m - 1].get_or_insert(0.0) += v.unwrap_or(0.0);
        }
    }

    Ok(totals
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            t.map(|total| MonthlyTotal {
                month: i as u32 + 1,
                total,
            })
        })
        .collect())
}

/// Sales per weekday, Monday through Sunday. Always seven entries; days
/// without rows total zero.
pub fn weekday_totals(df: &DataFrame, day: &str, measure: &str) -> Result<Vec<WeekdayTotal>> {
    let days = column_strings(df, day)?;
    let values = column_f64(df, measure)?;

    let mut totals = [0.0f64; 7];
    for (d, v) in days.into_iter().zip(values) {
        if let Some(i) = d.and_then(|d| WEEKDAYS.iter().position(|w| *w == d)) {
            totals[i] += v.unwrap_or(0.0);
        }
    }

    Ok(WEEKDAYS
        .iter()
        .zip(totals)
        .map(|(day, total)| WeekdayTotal {
            day: day.to_string(),
            total,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ranked(label: &str, total: f64) -> RankedTotal {
        RankedTotal {
            label: label.to_string(),
            total,
        }
    }

    #[test]
    fn test_group_sum_first_encountered_order() {
        let df = df![
            "Country" => ["France", "Spain", "France", "Italy"],
            "TotalSales" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();
        let groups = group_sum(&df, "Country", "TotalSales").unwrap();
        assert_eq!(
            groups,
            vec![ranked("France", 4.0), ranked("Spain", 2.0), ranked("Italy", 4.0)]
        );
    }

    #[test]
    fn test_top_n_ties_keep_first_encountered() {
        let df = df![
            "Country" => ["Spain", "France", "Italy", "Spain"],
            "TotalSales" => [5.0, 10.0, 10.0, 5.0],
        ]
        .unwrap();
        let top = top_n(&df, "Country", "TotalSales", 10).unwrap();
        // Spain 10 seen first, then France 10, then Italy 10
        assert_eq!(
            top,
            vec![ranked("Spain", 10.0), ranked("France", 10.0), ranked("Italy", 10.0)]
        );
    }

    #[test]
    fn test_top_ten_of_fifteen_countries() {
        let countries: Vec<String> = (0..15).map(|i| format!("Country{i:02}")).collect();
        let sales: Vec<f64> = (0..15).map(|i| ((i * 7) % 15) as f64).collect();
        let df = df![
            "Country" => countries,
            "TotalSales" => sales,
        ]
        .unwrap();

        let top = top_n(&df, "Country", "TotalSales", 10).unwrap();
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(top[0].total, 14.0);
    }

    #[test]
    fn test_group_sum_skips_null_keys() {
        let df = df![
            "Description" => [Some("MUG"), None, Some("MUG")],
            "Quantity" => [1.0, 50.0, 2.0],
        ]
        .unwrap();
        let groups = group_sum(&df, "Description", "Quantity").unwrap();
        assert_eq!(groups, vec![ranked("MUG", 3.0)]);
    }

    #[test]
    fn test_monthly_totals_sorted_and_sparse() {
        let df = df![
            "Month" => [12i32, 1, 12, 3],
            "TotalSales" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();
        let months = monthly_totals(&df, "Month", "TotalSales").unwrap();
        assert_eq!(
            months,
            vec![
                MonthlyTotal { month: 1, total: 2.0 },
                MonthlyTotal { month: 3, total: 4.0 },
                MonthlyTotal { month: 12, total: 4.0 },
            ]
        );
    }

    #[test]
    fn test_weekday_totals_always_seven_in_order() {
        let df = df![
            "DayOfWeek" => ["Friday", "Monday", "Friday"],
            "TotalSales" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let days = weekday_totals(&df, "DayOfWeek", "TotalSales").unwrap();

        assert_eq!(days.len(), 7);
        let names: Vec<&str> = days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(names, WEEKDAYS.to_vec());
        assert_eq!(days[0].total, 2.0);
        assert_eq!(days[4].total, 4.0);
        assert_eq!(days[6].total, 0.0);
    }

    #[test]
    fn test_weekday_totals_empty_table() {
        let df = df![
            "DayOfWeek" => Vec::<String>::new(),
            "TotalSales" => Vec::<f64>::new(),
        ]
        .unwrap();
        let days = weekday_totals(&df, "DayOfWeek", "TotalSales").unwrap();
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| d.total == 0.0));
    }
}
