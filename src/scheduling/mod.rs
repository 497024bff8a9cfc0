//! Job scheduling core.
//!
//! Everything in here is a pure function over values the service layer has
//! already loaded: stage timelines, payment schedules, staff availability,
//! workload and auto-assignment, and the job status label. Nothing touches
//! the store.

pub mod availability;
pub mod workload;
pub mod timeline;
pub mod payment_schedule;
pub mod auto_assign;
pub mod job_status;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::model::job::Job;
use crate::model::job_assignment::AssignmentRole;

pub const DEFAULT_BUILD_DAYS: u32 = 7;
pub const DEFAULT_FITTING_DAYS: u32 = 3;
pub const SPRAY_DAYS: i64 = 5;
pub const SNAG_DAYS: i64 = 2;

/// A pair of calendar dates. Whether `end` is inclusive depends on the caller:
/// timelines treat it as exclusive, availability checks as inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow { start, end }
    }

    pub fn starting(start: NaiveDate, days: u32) -> Self {
        DateWindow { start, end: add_days(start, days as i64) }
    }

    /// Inclusive overlap test.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        availability::ranges_overlap(self.start, self.end, start, end)
    }
}

/// `date + days`, saturating at the ends of the calendar.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let bound = if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
    date.checked_add_signed(Duration::days(days)).unwrap_or(bound)
}

/// Build length: explicit duration, then the estimate, then the default.
/// Zero counts as unset.
pub fn build_days(job: &Job) -> u32 {
    job.build_duration_days
        .filter(|d| *d > 0)
        .or(job.estimated_build_days.filter(|d| *d > 0))
        .unwrap_or(DEFAULT_BUILD_DAYS)
}

pub fn fitting_days(job: &Job) -> u32 {
    job.estimated_fitting_days
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_FITTING_DAYS)
}

/// Starts on `build_start` and ends `build_days` later, if the build is scheduled.
/// Timelines read `end` as exclusive; availability and assignment checks read
/// it as the last booked day. Both readings are intended.
pub fn build_window(job: &Job) -> Option<DateWindow> {
    job.build_start_date
        .map(|start| DateWindow::starting(start, build_days(job)))
}

/// Starts on `fitting_date` and ends `fitting_days` later, if a fitting date is
/// set. `end` is read the same two ways as in [`build_window`].
pub fn fit_window(job: &Job) -> Option<DateWindow> {
    job.fitting_date
        .map(|start| DateWindow::starting(start, fitting_days(job)))
}

/// The days an assignment in `role` occupies on `job`.
pub fn role_window(job: &Job, role: AssignmentRole) -> Option<DateWindow> {
    match role {
        AssignmentRole::BuildTeam => build_window(job),
        AssignmentRole::FitTeam => fit_window(job),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use bson::oid::ObjectId;
    use chrono::NaiveDate;

    use crate::model::job::{FittingDateStatus, Job, JobStage};

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn job() -> Job {
        Job {
            id: ObjectId::new(),
            client_id: ObjectId::new(),
            quote_id: None,
            name: "Smith kitchen".to_string(),
            category: "Kitchen".to_string(),
            stage: JobStage::NotStarted,
            booking_date: None,
            build_start_date: None,
            build_duration_days: None,
            fitting_date: None,
            fitting_date_status: FittingDateStatus::Planned,
            price: None,
            client_needs_update: false,
            client_contacted: false,
            estimated_build_days: None,
            estimated_fitting_days: None,
            actual_build_days: None,
            actual_fitting_days: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{date, job};
    use super::*;

    #[test]
    fn test_build_days_fallback_chain() {
        let mut j = job();
        assert_eq!(build_days(&j), 7);
        j.estimated_build_days = Some(12);
        assert_eq!(build_days(&j), 12);
        j.build_duration_days = Some(0);
        assert_eq!(build_days(&j), 12);
        j.build_duration_days = Some(9);
        assert_eq!(build_days(&j), 9);
    }

    #[test]
    fn test_windows_require_dates() {
        let mut j = job();
        assert!(build_window(&j).is_none());
        assert!(fit_window(&j).is_none());
        j.build_start_date = Some(date("2024-02-01"));
        j.fitting_date = Some(date("2024-03-01"));
        assert_eq!(build_window(&j).unwrap().end, date("2024-02-08"));
        assert_eq!(fit_window(&j).unwrap().end, date("2024-03-04"));
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(date("2024-02-28"), 2), date("2024-03-01"));
        assert_eq!(add_days(date("2024-03-01"), -1), date("2024-02-29"));
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
    }

    #[test]
    fn test_oversized_stored_duration_does_not_overflow() {
        let mut j = job();
        j.build_start_date = Some(date("2024-02-01"));
        j.build_duration_days = Some(u32::MAX);
        j.estimated_fitting_days = Some(u32::MAX);
        assert_eq!(build_window(&j).unwrap().end, NaiveDate::MAX);
        let stages = timeline::generate(&j).unwrap();
        assert_eq!(stages[0].end, NaiveDate::MAX);
    }
}
