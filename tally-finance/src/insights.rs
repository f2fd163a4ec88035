//! Spending insights: per-tag comparison against the previous period,
//! distribution, and short "interesting facts".

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tally_core::{Tag, TransactionRecord, parse_record_date};
use tracing::debug;

use crate::error::FinanceError;

/// Change (in percent) a tag needs before it is worth a fact
pub const FACT_THRESHOLD_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    fn months(&self) -> i32 {
        match self {
            Period::Month => 1,
            Period::Quarter => 3,
            Period::Year => 12,
        }
    }

    /// First day of the period containing `date`
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        let month0 = date.month0() as i32;
        let aligned = month0 - month0 % self.months();
        first_of_month(date.year(), aligned)
    }

    /// `[start, end)` of the period `offset` periods away from the one containing `date`
    pub fn range(&self, date: NaiveDate, offset: i32) -> (NaiveDate, NaiveDate) {
        let start = self.start_of(date);
        let base = start.year() * 12 + start.month0() as i32 + offset * self.months();
        let from = first_of_month(base.div_euclid(12), base.rem_euclid(12));
        let next = base + self.months();
        let to = first_of_month(next.div_euclid(12), next.rem_euclid(12));
        (from, to)
    }
}

fn first_of_month(year: i32, month0: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(NaiveDate::MIN)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        })
    }
}

impl FromStr for Period {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(FinanceError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Bar chart row: spending for one tag now and in the previous period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSpending {
    pub tag: Tag,
    pub current: f64,
    pub previous: f64,
}

/// Pie chart slice for the current period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub tag: Tag,
    pub value: f64,
    /// 0.0 - 1.0
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    pub tag: Tag,
    pub percent_change: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub period: Period,
    pub current_start: NaiveDate,
    pub previous_start: NaiveDate,
    pub total_spending: f64,
    /// Credits (income, refunds) in the current period, left out of spending
    pub total_income: f64,
    pub by_tag: Vec<TagSpending>,
    pub distribution: Vec<Slice>,
    pub biggest_tag: Option<Tag>,
    pub most_active_day: Option<Weekday>,
    pub facts: Vec<Fact>,
    /// Records left out because their date could not be read
    pub undated: usize,
}

/// Summarize spending for the period containing `as_of` against the one before it.
///
/// Only expenses (negative amounts) count as spending, each once under its
/// first confirmed tag, else its first suggested tag, else `Other`.
/// Credits are summed into `total_income` instead.
pub fn compute_insights(records: &[TransactionRecord], as_of: NaiveDate, period: Period) -> Insights {
    let (cur_from, cur_to) = period.range(as_of, 0);
    let (prev_from, prev_to) = period.range(as_of, -1);

    let mut current: HashMap<Tag, f64> = HashMap::new();
    let mut previous: HashMap<Tag, f64> = HashMap::new();
    let mut weekdays: HashMap<Weekday, usize> = HashMap::new();
    let mut total_income = 0.0;
    let mut undated = 0usize;

    for r in records {
        let Some(date) = parse_record_date(&r.date) else {
            undated += 1;
            continue;
        };
        let in_current = date >= cur_from && date < cur_to;
        let in_previous = date >= prev_from && date < prev_to;
        if in_current {
            *weekdays.entry(date.weekday()).or_default() += 1;
        }

        if !r.is_expense() {
            if in_current {
                total_income += r.amount;
            }
            continue;
        }
        let bucket = if in_current {
            &mut current
        } else if in_previous {
            &mut previous
        } else {
            continue;
        };
        *bucket.entry(r.primary_tag()).or_default() -= r.amount;
    }

    let by_tag: Vec<TagSpending> = Tag::ALL
        .iter()
        .map(|&tag| TagSpending {
            tag,
            current: current.get(&tag).copied().unwrap_or(0.0),
            previous: previous.get(&tag).copied().unwrap_or(0.0),
        })
        .filter(|t| t.current > 0.0 || t.previous > 0.0)
        .collect();

    let total_spending: f64 = by_tag.iter().map(|t| t.current).sum();

    let distribution = by_tag
        .iter()
        .filter(|t| t.current > 0.0)
        .map(|t| Slice {
            tag: t.tag,
            value: t.current,
            share: t.current / total_spending,
        })
        .collect();

    let biggest_tag = by_tag
        .iter()
        .filter(|t| t.current > 0.0)
        .max_by(|a, b| a.current.total_cmp(&b.current))
        .map(|t| t.tag);

    // Monday-first so ties resolve to the earlier day.
    let most_active_day = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .filter_map(|d| weekdays.get(&d).map(|n| (d, *n)))
    .fold(None, |best: Option<(Weekday, usize)>, (d, n)| match best {
        Some((_, m)) if m >= n => best,
        _ => Some((d, n)),
    })
    .map(|(d, _)| d);

    let facts = by_tag
        .iter()
        .filter(|t| t.previous > 0.0)
        .filter_map(|t| {
            let pct = (t.current - t.previous) / t.previous * 100.0;
            (pct.abs() > FACT_THRESHOLD_PCT).then(|| Fact {
                tag: t.tag,
                percent_change: pct,
                message: format!(
                    "You spent {:.1}% {} on {} this {}",
                    pct.abs(),
                    if pct > 0.0 { "more" } else { "less" },
                    t.tag.label().to_lowercase(),
                    period
                ),
            })
        })
        .collect();

    debug!(%period, %cur_from, records = records.len(), undated, "computed insights");

    Insights {
        period,
        current_start: cur_from,
        previous_start: prev_from,
        total_spending,
        total_income,
        by_tag,
        distribution,
        biggest_tag,
        most_active_day,
        facts,
        undated,
    }
}
