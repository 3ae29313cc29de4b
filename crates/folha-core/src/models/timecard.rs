//! Time card data models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Situation tag recorded for weekly rest days and holidays.
pub const REST_SITUATION: &str = "Descanso";

/// Time card extracted from one document.
///
/// The aggregate fields are never derived by this type. Consumers compute
/// them with [`TimeCardTotals::from_work_days`] and store them explicitly
/// through [`TimeCardData::apply_totals`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeCardData {
    /// Primary month/year label ("MM/YYYY"), the first one seen.
    pub month_year: String,

    /// Every parsed work day, in document order.
    pub work_days: Vec<WorkDay>,

    /// Work days bucketed by their own month/year, in first-seen order.
    pub months: Vec<MonthData>,

    /// Total worked hours (ATN).
    #[serde(default)]
    pub total_hours: Decimal,

    /// Total daytime overtime.
    #[serde(default)]
    pub total_overtime_day: Decimal,

    /// Total nighttime overtime.
    #[serde(default)]
    pub total_overtime_night: Decimal,
}

/// Work days belonging to one month/year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthData {
    pub month_year: String,
    pub work_days: Vec<WorkDay>,
}

/// One calendar day's attendance record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkDay {
    /// Day of month (1-31).
    pub day: u8,

    /// Weekday abbreviation (SEG, TER, ...).
    pub day_of_week: String,

    /// Owning month/year ("MM/YYYY").
    pub month_year: String,

    /// Morning check-in ("HH:MM").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,

    /// Afternoon check-out ("HH:MM").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,

    /// Lunch break as "HH:MM - HH:MM".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval1: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval2: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval3: Option<String>,

    /// "Descanso" for rest days, otherwise a single-letter code or empty.
    pub situation: String,

    /// Function code (3 digits).
    pub function: String,

    /// Worked hours.
    pub atn: Decimal,

    /// Daytime overtime.
    pub overtime_day: Decimal,

    /// Nighttime overtime.
    pub overtime_night: Decimal,

    /// Concession hours (not populated by the current layout rules).
    pub concession: Decimal,

    /// Insalubrity (not populated by the current layout rules).
    pub insalubrity: Decimal,
}

impl WorkDay {
    /// Create an empty work day for the given date key.
    pub fn new(day: u8, day_of_week: impl Into<String>, month_year: impl Into<String>) -> Self {
        Self {
            day,
            day_of_week: day_of_week.into(),
            month_year: month_year.into(),
            ..Default::default()
        }
    }

    /// Create a rest day: no times, all measures zero.
    pub fn rest(day: u8, day_of_week: impl Into<String>, month_year: impl Into<String>) -> Self {
        Self {
            situation: REST_SITUATION.to_string(),
            ..Self::new(day, day_of_week, month_year)
        }
    }

    pub fn is_rest(&self) -> bool {
        self.situation == REST_SITUATION
    }

    /// Check the rest-day invariant: a rest day carries no times or measures.
    pub fn is_consistent(&self) -> bool {
        if !self.is_rest() {
            return true;
        }
        self.check_in.is_none()
            && self.check_out.is_none()
            && self.interval1.is_none()
            && self.interval2.is_none()
            && self.interval3.is_none()
            && self.atn.is_zero()
            && self.overtime_day.is_zero()
            && self.overtime_night.is_zero()
            && self.concession.is_zero()
            && self.insalubrity.is_zero()
    }
}

impl TimeCardData {
    /// Create an empty time card.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a work day to the flat list and to the bucket keyed by its own
    /// month/year, creating the bucket on first use.
    pub fn push_work_day(&mut self, work_day: WorkDay) {
        if self.month_year.is_empty() {
            self.month_year = work_day.month_year.clone();
        }

        match self
            .months
            .iter_mut()
            .find(|m| m.month_year == work_day.month_year)
        {
            Some(bucket) => bucket.work_days.push(work_day.clone()),
            None => self.months.push(MonthData {
                month_year: work_day.month_year.clone(),
                work_days: vec![work_day.clone()],
            }),
        }

        self.work_days.push(work_day);
    }

    /// Find the bucket for a month/year label.
    pub fn month(&self, month_year: &str) -> Option<&MonthData> {
        self.months.iter().find(|m| m.month_year == month_year)
    }

    /// Check that the flat list is exactly the union of the buckets and that
    /// every day sits in the bucket matching its own month/year.
    pub fn is_consistent(&self) -> bool {
        let bucketed: usize = self.months.iter().map(|m| m.work_days.len()).sum();
        if bucketed != self.work_days.len() {
            return false;
        }

        let keyed = self
            .months
            .iter()
            .all(|m| m.work_days.iter().all(|d| d.month_year == m.month_year));

        let covered = self.work_days.iter().all(|day| {
            self.month(&day.month_year)
                .map(|m| {
                    let in_bucket = m.work_days.iter().filter(|d| *d == day).count();
                    let in_flat = self.work_days.iter().filter(|d| *d == day).count();
                    in_bucket == in_flat
                })
                .unwrap_or(false)
        });

        keyed && covered
    }

    /// Store consumer-computed totals on the record.
    pub fn apply_totals(&mut self, totals: TimeCardTotals) {
        self.total_hours = totals.hours;
        self.total_overtime_day = totals.overtime_day;
        self.total_overtime_night = totals.overtime_night;
    }
}

/// Aggregate measures summed over a set of work days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCardTotals {
    pub hours: Decimal,
    pub overtime_day: Decimal,
    pub overtime_night: Decimal,
}

impl TimeCardTotals {
    pub fn from_work_days(work_days: &[WorkDay]) -> Self {
        work_days.iter().fold(Self::default(), |acc, day| Self {
            hours: acc.hours + day.atn,
            overtime_day: acc.overtime_day + day.overtime_day,
            overtime_night: acc.overtime_night + day.overtime_night,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn day(n: u8, month_year: &str, atn: &str) -> WorkDay {
        WorkDay {
            atn: Decimal::from_str(atn).unwrap(),
            ..WorkDay::new(n, "SEG", month_year)
        }
    }

    #[test]
    fn test_push_work_day_buckets_by_month() {
        let mut card = TimeCardData::new();
        card.push_work_day(day(1, "01/2024", "8"));
        card.push_work_day(day(1, "02/2024", "7.5"));
        card.push_work_day(day(2, "01/2024", "6"));

        assert_eq!(card.month_year, "01/2024");
        assert_eq!(card.months.len(), 2);
        assert_eq!(card.months[0].month_year, "01/2024");
        assert_eq!(card.months[0].work_days.len(), 2);
        assert_eq!(card.months[1].work_days.len(), 1);
        assert!(card.is_consistent());
    }

    #[test]
    fn test_inconsistent_when_bucket_missing_day() {
        let mut card = TimeCardData::new();
        card.push_work_day(day(1, "01/2024", "8"));
        card.work_days.push(day(2, "01/2024", "8"));

        assert!(!card.is_consistent());
    }

    #[test]
    fn test_totals_match_sum_of_atn() {
        let mut card = TimeCardData::new();
        card.push_work_day(day(1, "01/2024", "8.5"));
        card.push_work_day(day(2, "01/2024", "7.25"));
        card.push_work_day(WorkDay::rest(3, "SAB", "01/2024"));

        let totals = TimeCardTotals::from_work_days(&card.work_days);
        let atn_sum: Decimal = card.work_days.iter().map(|d| d.atn).sum();
        assert_eq!(totals.hours, atn_sum);
        assert_eq!(totals.hours, Decimal::from_str("15.75").unwrap());

        // Nothing is derived until a consumer stores the totals.
        assert!(card.total_hours.is_zero());
        card.apply_totals(totals);
        assert_eq!(card.total_hours, atn_sum);
    }

    #[test]
    fn test_rest_day_is_consistent() {
        let rest = WorkDay::rest(7, "DOM", "01/2024");
        assert!(rest.is_rest());
        assert!(rest.is_consistent());

        let broken = WorkDay {
            check_in: Some("08:00".to_string()),
            ..rest
        };
        assert!(!broken.is_consistent());
    }
}
