use serde::{Deserialize, Serialize};

use crate::club::stats::round2;
use crate::storage::models::Milestone;

/// Team-Ziele in km
pub struct TeamGoals;

impl TeamGoals {
    pub const MONTHLY_KM: f64 = 500.0;
    pub const WEEKLY_KM: f64 = 125.0;
    pub const DAILY_KM: f64 = 18.0;
}

/// Fortschritt in Prozent, gedeckelt auf 100
pub fn progress(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    round2(((current / target) * 100.0).min(100.0))
}

/// Fortschritt gegen einen Meilenstein
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub milestone: Milestone,
    pub achieved: bool,
    pub progress: f64,
}

/// Bewerte alle Meilensteine gegen die Team-Gesamtdistanz. Inaktive
/// Meilensteine werden mit ausgegeben, zählen aber nie als erreicht.
pub fn milestone_progress(milestones: &[Milestone], team_total_km: f64) -> Vec<GoalProgress> {
    let mut sorted: Vec<&Milestone> = milestones.iter().collect();
    sorted.sort_by(|a, b| {
        a.target_km
            .partial_cmp(&b.target_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    sorted
        .into_iter()
        .map(|m| GoalProgress {
            achieved: m.is_active && team_total_km >= m.target_km,
            progress: progress(team_total_km, m.target_km),
            milestone: m.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milestone(target_km: f64, active: bool) -> Milestone {
        let mut m = Milestone::new(target_km, format!("{target_km}km reward"), active);
        m.id = format!("milestone_{target_km}");
        m
    }

    #[test]
    fn progress_is_capped_at_100() {
        assert_eq!(progress(600.0, 500.0), 100.0);
        assert_eq!(progress(250.0, 500.0), 50.0);
        assert_eq!(progress(0.0, 500.0), 0.0);
    }

    #[test]
    fn progress_with_zero_target_is_zero() {
        assert_eq!(progress(10.0, 0.0), 0.0);
    }

    #[test]
    fn milestones_sorted_and_evaluated() {
        let milestones = vec![milestone(300.0, true), milestone(100.0, true)];
        let result = milestone_progress(&milestones, 150.0);

        assert_eq!(result[0].milestone.target_km, 100.0);
        assert!(result[0].achieved);
        assert_eq!(result[0].progress, 100.0);

        assert_eq!(result[1].milestone.target_km, 300.0);
        assert!(!result[1].achieved);
        assert_eq!(result[1].progress, 50.0);
    }

    #[test]
    fn inactive_milestone_never_achieved() {
        let milestones = vec![milestone(100.0, false)];
        let result = milestone_progress(&milestones, 999.0);
        assert!(!result[0].achieved);
        assert_eq!(result[0].progress, 100.0);
    }
}
