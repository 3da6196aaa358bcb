use serde::{Deserialize, Serialize};

use crate::club::dates;
use crate::storage::models::{Member, RunRecord};

/// Statistiken für ein einzelnes Mitglied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub member: Member,
    pub rank: u32,
    pub average_pace: Option<String>,
    pub last_run_date: Option<String>,
    pub weekly_distance: f64,
    pub monthly_distance: f64,
    pub average_distance: f64,
    pub total_distance: f64,
    pub record_count: usize,
}

/// Team-Statistiken über alle Mitglieder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub total_distance: f64,
    pub total_records: usize,
    pub average_distance: f64,
    pub active_members: usize,
    pub weekly_goal_progress: f64,
    pub monthly_goal_progress: f64,
}

/// Kompakte Übersicht für die Startseite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_members: usize,
    pub total_records: usize,
    pub this_month_records: usize,
    pub total_distance: f64,
}

/// Runde auf 2 Nachkommastellen (km-Anzeige)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Berechne Statistiken für ein Mitglied aus allen Kilometer-Einträgen.
/// `rank` wird erst über [`member_ranks`] gesetzt.
pub fn member_stats(member: &Member, records: &[RunRecord]) -> MemberStats {
    let member_records: Vec<&RunRecord> = records
        .iter()
        .filter(|r| r.member_id == member.id)
        .collect();

    let total_distance: f64 = member_records.iter().map(|r| r.distance).sum();
    let record_count = member_records.len();

    let weekly_distance = member_records
        .iter()
        .filter(|r| dates::within_last_days(&r.date, 7))
        .map(|r| r.distance)
        .sum();
    let monthly_distance = member_records
        .iter()
        .filter(|r| dates::within_last_days(&r.date, 30))
        .map(|r| r.distance)
        .sum();

    let paces: Vec<&str> = member_records
        .iter()
        .filter_map(|r| r.pace.as_deref())
        .collect();
    let average_pace = average_pace(&paces);

    let last_run_date = member_records
        .iter()
        .map(|r| r.date.as_str())
        .max()
        .map(str::to_string);

    MemberStats {
        member: member.clone(),
        rank: 0,
        average_pace,
        last_run_date,
        weekly_distance,
        monthly_distance,
        average_distance: if record_count > 0 {
            total_distance / record_count as f64
        } else {
            0.0
        },
        total_distance,
        record_count,
    }
}

/// Sortiere Mitglieder nach Gesamtdistanz absteigend und vergebe Ränge (1-basiert)
pub fn member_ranks(mut stats: Vec<MemberStats>) -> Vec<MemberStats> {
    stats.sort_by(|a, b| {
        b.total_distance
            .partial_cmp(&a.total_distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (index, entry) in stats.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    stats
}

/// Team-Statistiken inkl. Wochen-/Monatsziel-Fortschritt
pub fn team_stats(records: &[RunRecord]) -> TeamStats {
    use crate::club::goals::{progress, TeamGoals};

    let total_distance: f64 = records.iter().map(|r| r.distance).sum();
    let total_records = records.len();

    let active_members = records
        .iter()
        .map(|r| r.member_id.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    let weekly_distance: f64 = records
        .iter()
        .filter(|r| dates::within_last_days(&r.date, 7))
        .map(|r| r.distance)
        .sum();
    let monthly_distance: f64 = records
        .iter()
        .filter(|r| dates::within_last_days(&r.date, 30))
        .map(|r| r.distance)
        .sum();

    TeamStats {
        total_distance,
        total_records,
        average_distance: if total_records > 0 {
            total_distance / total_records as f64
        } else {
            0.0
        },
        active_members,
        weekly_goal_progress: progress(weekly_distance, TeamGoals::WEEKLY_KM),
        monthly_goal_progress: progress(monthly_distance, TeamGoals::MONTHLY_KM),
    }
}

/// Übersicht: Mitglieder, Einträge, Einträge im laufenden KST-Monat, Gesamt-km
pub fn summary(members: &[Member], records: &[RunRecord]) -> StatsSummary {
    let this_month_records = records
        .iter()
        .filter(|r| dates::is_current_month(&r.date))
        .count();
    let total_distance: f64 = records.iter().map(|r| r.distance).sum();

    StatsSummary {
        total_members: members.len(),
        total_records: records.len(),
        this_month_records,
        total_distance: round2(total_distance),
    }
}

/// Mittlere Pace über M:SS Strings; None wenn keine Pace vorliegt
pub fn average_pace(paces: &[&str]) -> Option<String> {
    let seconds: Vec<u32> = paces.iter().filter_map(|p| pace_seconds(p)).collect();
    if seconds.is_empty() {
        return None;
    }

    let avg = (seconds.iter().sum::<u32>() as f64 / seconds.len() as f64).round() as u32;
    Some(format!("{}:{:02}", avg / 60, avg % 60))
}

fn pace_seconds(pace: &str) -> Option<u32> {
    let (minutes, seconds) = pace.split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    Some(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{Member, RunRecord};

    fn member(id: &str, name: &str) -> Member {
        let mut m = Member::new(name.to_string(), None, None, None);
        m.id = id.to_string();
        m
    }

    fn record(member_id: &str, distance: f64, date: &str, pace: Option<&str>) -> RunRecord {
        let mut r = RunRecord::new(
            member_id.to_string(),
            distance,
            "00:30:00".to_string(),
            pace.map(str::to_string),
            None,
            Some(date.to_string()),
        );
        r.date = date.to_string();
        r
    }

    #[test]
    fn member_stats_aggregates_own_records_only() {
        let m = member("member_a", "지수");
        let records = vec![
            record("member_a", 5.0, "2025-01-10", Some("5:30")),
            record("member_a", 10.0, "2025-01-12", Some("6:30")),
            record("member_b", 42.2, "2025-01-11", None),
        ];

        let stats = member_stats(&m, &records);
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.total_distance, 15.0);
        assert_eq!(stats.average_distance, 7.5);
        assert_eq!(stats.average_pace.as_deref(), Some("6:00"));
        assert_eq!(stats.last_run_date.as_deref(), Some("2025-01-12"));
    }

    #[test]
    fn member_without_records_is_zeroed() {
        let m = member("member_x", "민준");
        let stats = member_stats(&m, &[]);
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.total_distance, 0.0);
        assert_eq!(stats.average_distance, 0.0);
        assert!(stats.average_pace.is_none());
        assert!(stats.last_run_date.is_none());
    }

    #[test]
    fn ranks_are_ordered_by_total_distance() {
        let records = vec![
            record("member_a", 5.0, "2025-01-10", None),
            record("member_b", 20.0, "2025-01-10", None),
            record("member_c", 10.0, "2025-01-10", None),
        ];
        let stats = vec![
            member_stats(&member("member_a", "a"), &records),
            member_stats(&member("member_b", "b"), &records),
            member_stats(&member("member_c", "c"), &records),
        ];

        let ranked = member_ranks(stats);
        assert_eq!(ranked[0].member.id, "member_b");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].member.id, "member_c");
        assert_eq!(ranked[2].member.id, "member_a");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn team_stats_counts_distinct_active_members() {
        let records = vec![
            record("member_a", 5.0, "2025-01-10", None),
            record("member_a", 5.0, "2025-01-11", None),
            record("member_b", 8.0, "2025-01-10", None),
        ];
        let stats = team_stats(&records);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_distance, 18.0);
        assert_eq!(stats.active_members, 2);
        assert_eq!(stats.average_distance, 6.0);
    }

    #[test]
    fn team_stats_on_empty_data() {
        let stats = team_stats(&[]);
        assert_eq!(stats.total_distance, 0.0);
        assert_eq!(stats.average_distance, 0.0);
        assert_eq!(stats.active_members, 0);
        assert_eq!(stats.weekly_goal_progress, 0.0);
    }

    #[test]
    fn summary_rounds_total_distance() {
        let members = vec![member("member_a", "a")];
        let records = vec![
            record("member_a", 5.123, "2025-01-10", None),
            record("member_a", 4.211, "2025-01-11", None),
        ];
        let s = summary(&members, &records);
        assert_eq!(s.total_members, 1);
        assert_eq!(s.total_records, 2);
        assert_eq!(s.total_distance, 9.33);
    }

    #[test]
    fn average_pace_rounds_to_seconds() {
        assert_eq!(average_pace(&["5:30", "6:30"]).as_deref(), Some("6:00"));
        assert_eq!(average_pace(&["5:00"]).as_deref(), Some("5:00"));
        assert_eq!(average_pace(&[]), None);
        assert_eq!(average_pace(&["bogus"]), None);
    }
}
