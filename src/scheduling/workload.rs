use std::collections::HashMap;

use bson::oid::ObjectId;

use crate::model::job::JobStage;
use crate::model::job_assignment::JobAssignment;

/// Number of assignments whose job is under way (neither NotStarted nor Finished).
pub fn current_workload<I>(stages: I) -> usize
where
    I: IntoIterator<Item = JobStage>,
{
    stages.into_iter().filter(JobStage::is_active).count()
}

/// Workload of every user that appears in `assignments`.
///
/// Assignments of `exclude_job` are skipped so a job being re-assigned does not
/// count against the staff who currently hold it. Assignments whose job is
/// unknown are ignored.
pub fn workload_by_user(
    assignments: &[JobAssignment],
    job_stages: &HashMap<ObjectId, JobStage>,
    exclude_job: Option<ObjectId>,
) -> HashMap<ObjectId, usize> {
    let mut stages_by_user: HashMap<ObjectId, Vec<JobStage>> = HashMap::new();
    for assignment in assignments {
        if Some(assignment.job_id) == exclude_job {
            continue;
        }
        if let Some(stage) = job_stages.get(&assignment.job_id) {
            stages_by_user.entry(assignment.user_id).or_default().push(*stage);
        }
    }
    stages_by_user
        .into_iter()
        .map(|(user, stages)| (user, current_workload(stages)))
        .collect()
}
