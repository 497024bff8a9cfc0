//! Greedy staff selection for a job's build and fit teams.

use bson::oid::ObjectId;

use super::availability::is_available;
use super::{build_window, fit_window, DateWindow};
use crate::model::job::Job;
use crate::model::job_assignment::AssignmentRole;
use crate::model::staff_absence::StaffAbsence;
use crate::model::user::UserRole;

/// Builds longer than this many estimated days get a second cabinet maker.
pub const LONG_BUILD_DAYS: u32 = 10;

/// What the engine needs to know about one staff member.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub user_id: ObjectId,
    pub role: UserRole,
    pub absences: Vec<StaffAbsence>,
    pub workload: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPlan {
    pub build_team: Vec<ObjectId>,
    pub fit_team: Vec<ObjectId>,
}

impl AssignmentPlan {
    pub fn into_pairs(self) -> Vec<(ObjectId, AssignmentRole)> {
        self.build_team
            .into_iter()
            .map(|u| (u, AssignmentRole::BuildTeam))
            .chain(self.fit_team.into_iter().map(|u| (u, AssignmentRole::FitTeam)))
            .collect()
    }
}

pub fn build_team_size(job: &Job) -> usize {
    match job.estimated_build_days {
        Some(days) if days > LONG_BUILD_DAYS => 2,
        _ => 1,
    }
}

/// Up to `count` candidates from `roles` free over `window`, least loaded first.
/// Ties keep the input order.
pub fn select(candidates: &[Candidate], roles: &[UserRole], window: DateWindow, count: usize) -> Vec<ObjectId> {
    let mut pool: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| roles.contains(&c.role))
        .filter(|c| is_available(&c.absences, window.start, window.end))
        .collect();
    pool.sort_by_key(|c| c.workload);
    pool.into_iter().take(count).map(|c| c.user_id).collect()
}

/// Build team from cabinet makers, fit team from cabinet makers and fitters.
/// A team is left short, without error, when too few people are free.
pub fn plan(job: &Job, candidates: &[Candidate]) -> AssignmentPlan {
    let build_team = build_window(job)
        .map(|window| select(candidates, &[UserRole::CabinetMaker], window, build_team_size(job)))
        .unwrap_or_default();
    let fit_team = fit_window(job)
        .map(|window| select(candidates, &[UserRole::CabinetMaker, UserRole::Fitter], window, 1))
        .unwrap_or_default();
    AssignmentPlan { build_team, fit_team }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::staff_absence::AbsenceType;
    use crate::scheduling::fixtures::{date, job};

    fn candidate(role: UserRole, workload: usize) -> Candidate {
        Candidate {
            user_id: ObjectId::new(),
            role,
            absences: Vec::new(),
            workload,
        }
    }

    fn away(c: &mut Candidate, start: &str, end: &str) {
        c.absences.push(StaffAbsence {
            id: ObjectId::new(),
            user_id: c.user_id,
            start_date: date(start),
            end_date: date(end),
            absence_type: AbsenceType::Sickness,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        });
    }

    #[test]
    fn test_least_loaded_cabinet_maker_builds() {
        let busy = candidate(UserRole::CabinetMaker, 3);
        let idle = candidate(UserRole::CabinetMaker, 0);
        let fitter = candidate(UserRole::Fitter, 0);
        let staff = vec![busy.clone(), idle.clone(), fitter.clone()];

        let mut j = job();
        j.build_start_date = Some(date("2024-02-01"));
        let plan = plan(&j, &staff);
        assert_eq!(plan.build_team, vec![idle.user_id]);
        assert!(plan.fit_team.is_empty());
    }

    #[test]
    fn test_long_builds_take_two() {
        let staff = vec![
            candidate(UserRole::CabinetMaker, 2),
            candidate(UserRole::CabinetMaker, 1),
            candidate(UserRole::CabinetMaker, 5),
        ];
        let mut j = job();
        j.build_start_date = Some(date("2024-02-01"));
        j.estimated_build_days = Some(11);
        let plan = plan(&j, &staff);
        assert_eq!(plan.build_team, vec![staff[1].user_id, staff[0].user_id]);

        j.estimated_build_days = Some(10);
        assert_eq!(super::plan(&j, &staff).build_team.len(), 1);
    }

    #[test]
    fn test_absent_staff_are_skipped_and_shortfall_is_silent() {
        let mut only = candidate(UserRole::CabinetMaker, 0);
        away(&mut only, "2024-02-10", "2024-02-15");
        let staff = vec![only];

        let mut j = job();
        j.build_start_date = Some(date("2024-02-01"));
        j.build_duration_days = Some(20);
        j.estimated_build_days = Some(20);
        let plan = plan(&j, &staff);
        assert!(plan.build_team.is_empty());

        j.build_duration_days = Some(7);
        j.estimated_build_days = Some(7);
        assert_eq!(super::plan(&j, &staff).build_team.len(), 1);
    }

    #[test]
    fn test_fit_team_pool_includes_fitters() {
        let mut maker = candidate(UserRole::CabinetMaker, 0);
        away(&mut maker, "2024-03-02", "2024-03-02");
        let fitter = candidate(UserRole::Fitter, 4);
        let manager = candidate(UserRole::Manager, 0);
        let staff = vec![maker, fitter.clone(), manager];

        let mut j = job();
        j.fitting_date = Some(date("2024-03-01"));
        let plan = plan(&j, &staff);
        assert!(plan.build_team.is_empty());
        assert_eq!(plan.fit_team, vec![fitter.user_id]);
    }

    #[test]
    fn test_equal_workload_keeps_input_order() {
        let staff = vec![
            candidate(UserRole::Fitter, 1),
            candidate(UserRole::CabinetMaker, 1),
        ];
        let window = DateWindow::starting(date("2024-03-01"), 3);
        let picked = select(&staff, &[UserRole::CabinetMaker, UserRole::Fitter], window, 1);
        assert_eq!(picked, vec![staff[0].user_id]);
    }

    #[test]
    fn test_into_pairs_tags_roles() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let plan = AssignmentPlan { build_team: vec![a], fit_team: vec![b] };
        assert_eq!(
            plan.into_pairs(),
            vec![(a, AssignmentRole::BuildTeam), (b, AssignmentRole::FitTeam)]
        );
    }
}
