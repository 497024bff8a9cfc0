use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{add_days, build_days, build_window, fit_window, fitting_days, DateWindow, SNAG_DAYS, SPRAY_DAYS};
use crate::model::job::{Job, JobStage};

/// One bar of a job's Gantt timeline. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageWindow {
    #[serde(rename = "name")]
    pub stage: JobStage,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
}

/// 100 once the job has moved past `stage`, 50 while in it, 0 before it.
pub fn stage_progress(current: JobStage, stage: JobStage) -> u8 {
    if current > stage {
        100
    } else if current == stage {
        50
    } else {
        0
    }
}

/// Build, spray and fit windows (plus snag while snagging), or `None` when the
/// build has no start date.
pub fn generate(job: &Job) -> Option<Vec<StageWindow>> {
    let build_start = job.build_start_date?;
    let build_end = add_days(build_start, build_days(job) as i64);

    let spray_start = add_days(build_end, -1);
    let spray_end = add_days(spray_start, SPRAY_DAYS);

    let fit_start = job.fitting_date.unwrap_or(add_days(spray_end, 1));
    let fit_end = add_days(fit_start, fitting_days(job) as i64);

    let mut stages = vec![
        StageWindow {
            stage: JobStage::Build,
            start: build_start,
            end: build_end,
            progress: stage_progress(job.stage, JobStage::Build),
        },
        StageWindow {
            stage: JobStage::Spray,
            start: spray_start,
            end: spray_end,
            progress: stage_progress(job.stage, JobStage::Spray),
        },
        StageWindow {
            stage: JobStage::Fit,
            start: fit_start,
            end: fit_end,
            progress: stage_progress(job.stage, JobStage::Fit),
        },
    ];

    if job.stage == JobStage::Snag {
        stages.push(StageWindow {
            stage: JobStage::Snag,
            start: fit_end,
            end: add_days(fit_end, SNAG_DAYS),
            progress: 50,
        });
    }

    Some(stages)
}

/// Days of `week` on which the job is in build, spray or fit, for the
/// calendar view. Stage windows are taken inclusive of their end day here;
/// fit days only appear once a fitting date is booked.
pub fn calendar_days(job: &Job, week: DateWindow) -> Vec<(NaiveDate, JobStage)> {
    let mut days = Vec::new();
    let mut push_range = |stage: JobStage, start: NaiveDate, end: NaiveDate| {
        let mut day = start.max(week.start);
        let last = end.min(week.end);
        while day <= last {
            days.push((day, stage));
            day += Duration::days(1);
        }
    };

    if let Some(build) = build_window(job) {
        push_range(JobStage::Build, build.start, build.end);
        let spray_start = add_days(build.end, -1);
        push_range(JobStage::Spray, spray_start, add_days(spray_start, SPRAY_DAYS));
    }
    if let Some(fit) = fit_window(job) {
        push_range(JobStage::Fit, fit.start, fit.end);
    }
    days
}
