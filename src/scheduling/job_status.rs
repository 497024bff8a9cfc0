use chrono::NaiveDate;
use serde::Serialize;

use super::add_days;
use crate::model::job::{Job, JobStage};

/// Human-facing status label shown on job lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Completed,
    Issue,
    NotScheduled,
    Scheduled,
    Delayed,
    OnTrack,
}

/// First matching rule wins. The build overrun check only looks at an explicit
/// `build_duration_days`, never the estimate.
pub fn calculate(
    stage: JobStage,
    build_start_date: Option<NaiveDate>,
    build_duration_days: Option<u32>,
    fitting_date: Option<NaiveDate>,
    today: NaiveDate,
) -> JobStatus {
    if stage == JobStage::Finished {
        return JobStatus::Completed;
    }
    if stage == JobStage::Snag {
        return JobStatus::Issue;
    }
    let Some(build_start) = build_start_date else {
        return JobStatus::NotScheduled;
    };
    if build_start > today {
        return JobStatus::Scheduled;
    }
    if stage == JobStage::Build {
        if let Some(days) = build_duration_days {
            if today > add_days(build_start, days as i64) {
                return JobStatus::Delayed;
            }
        }
    }
    if stage == JobStage::Fit {
        if let Some(fitting) = fitting_date {
            if today > fitting {
                return JobStatus::Delayed;
            }
        }
    }
    JobStatus::OnTrack
}

pub fn for_job(job: &Job, today: NaiveDate) -> JobStatus {
    calculate(
        job.stage,
        job.build_start_date,
        job.build_duration_days,
        job.fitting_date,
        today,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::fixtures::date;

    #[test]
    fn test_terminal_stages_win() {
        let today = date("2024-03-01");
        assert_eq!(calculate(JobStage::Finished, None, None, None, today), JobStatus::Completed);
        assert_eq!(calculate(JobStage::Snag, None, None, None, today), JobStatus::Issue);
    }

    #[test]
    fn test_unscheduled_and_future() {
        let today = date("2024-03-01");
        assert_eq!(calculate(JobStage::Planned, None, None, None, today), JobStatus::NotScheduled);
        assert_eq!(
            calculate(JobStage::Planned, Some(date("2024-03-02")), None, None, today),
            JobStatus::Scheduled
        );
    }

    #[test]
    fn test_build_overrun() {
        let start = Some(date("2024-02-01"));
        assert_eq!(
            calculate(JobStage::Build, start, Some(7), None, date("2024-02-09")),
            JobStatus::Delayed
        );
        assert_eq!(
            calculate(JobStage::Build, start, Some(7), None, date("2024-02-08")),
            JobStatus::OnTrack
        );
        // no explicit duration, no delay
        assert_eq!(
            calculate(JobStage::Build, start, None, None, date("2024-06-01")),
            JobStatus::OnTrack
        );
    }

    #[test]
    fn test_fit_overrun() {
        let start = Some(date("2024-02-01"));
        let fitting = Some(date("2024-03-01"));
        assert_eq!(
            calculate(JobStage::Fit, start, None, fitting, date("2024-03-02")),
            JobStatus::Delayed
        );
        assert_eq!(
            calculate(JobStage::Fit, start, None, fitting, date("2024-03-01")),
            JobStatus::OnTrack
        );
        assert_eq!(
            calculate(JobStage::Spray, start, None, fitting, date("2024-04-01")),
            JobStatus::OnTrack
        );
    }
}
