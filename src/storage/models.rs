use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::club::dates::{kst_date_string, kst_iso_string};

/// Klubmitglied mit kumulierten Zählern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Beitrittsdatum YYYY-MM-DD (KST)
    pub join_date: String,
    /// Kumulierte Distanz in km über alle Einträge
    #[serde(default)]
    pub total_distance: f64,
    /// Anzahl der Kilometer-Einträge
    #[serde(default)]
    pub record_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl Member {
    pub fn new(
        name: String,
        email: Option<String>,
        phone: Option<String>,
        join_date: Option<String>,
    ) -> Self {
        let now = kst_iso_string();

        Self {
            id: format!("member_{}", Uuid::new_v4()),
            name,
            email,
            phone,
            join_date: join_date.unwrap_or_else(kst_date_string),
            total_distance: 0.0,
            record_count: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Zähler nach neuem Eintrag fortschreiben
    pub fn apply_record(&mut self, distance: f64) {
        self.total_distance += distance;
        self.record_count += 1;
        self.updated_at = kst_iso_string();
    }

    /// Zähler nach gelöschtem Eintrag zurücknehmen
    pub fn revert_record(&mut self, distance: f64) {
        self.total_distance = (self.total_distance - distance).max(0.0);
        self.record_count = self.record_count.saturating_sub(1);
        self.updated_at = kst_iso_string();
    }
}

/// Update-Payload für Mitglieder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Einzelner Kilometer-Eintrag eines Mitglieds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: String,
    pub member_id: String,
    /// Distanz in km
    pub distance: f64,
    /// Laufzeit als String, z.B. "00:42:10"
    pub time: String,
    /// Pace pro km im M:SS Format
    pub pace: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// Laufdatum YYYY-MM-DD (KST)
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RunRecord {
    pub fn new(
        member_id: String,
        distance: f64,
        time: String,
        pace: Option<String>,
        notes: Option<String>,
        date: Option<String>,
    ) -> Self {
        let now = kst_iso_string();

        Self {
            id: format!("record_{}", Uuid::new_v4()),
            member_id,
            distance,
            time,
            pace,
            notes: notes.unwrap_or_default(),
            date: date.unwrap_or_else(kst_date_string),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Trainingstermin im gemeinsamen Kalender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    /// Datum YYYY-MM-DD (KST)
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// Uhrzeit HH:MM, leer wenn offen
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Schedule {
    pub fn new(
        date: Option<String>,
        title: String,
        description: Option<String>,
        location: Option<String>,
        time: Option<String>,
        participants: Option<Vec<String>>,
    ) -> Self {
        let now = kst_iso_string();

        Self {
            id: format!("schedule_{}", Uuid::new_v4()),
            date: date.unwrap_or_else(kst_date_string),
            title,
            description: description.unwrap_or_default(),
            location: location.unwrap_or_default(),
            time: time.unwrap_or_default(),
            participants: participants.unwrap_or_default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Update-Payload für Termine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub date: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub participants: Option<Vec<String>>,
}

/// Team-Meilenstein: Ziel-km mit Belohnung
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub target_km: f64,
    pub reward: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Milestone {
    pub fn new(target_km: f64, reward: String, is_active: bool) -> Self {
        let now = kst_iso_string();

        Self {
            id: format!("milestone_{}", Uuid::new_v4()),
            target_km,
            reward,
            is_active,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Update-Payload für Meilensteine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneUpdate {
    pub target_km: f64,
    pub reward: String,
    pub is_active: bool,
}

/// Kompletter Datensatz — Export/Import-Payload und Dokumentform des
/// S3-Backends
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClubData {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub records: Vec<RunRecord>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub last_updated: String,
}

impl ClubData {
    pub fn new(
        members: Vec<Member>,
        records: Vec<RunRecord>,
        schedules: Vec<Schedule>,
        milestones: Vec<Milestone>,
    ) -> Self {
        Self {
            members,
            records,
            schedules,
            milestones,
            last_updated: kst_iso_string(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_member_has_defaults() {
        let member = Member::new("서연".to_string(), None, None, None);
        assert!(member.id.starts_with("member_"));
        assert_eq!(member.total_distance, 0.0);
        assert_eq!(member.record_count, 0);
        assert_eq!(member.join_date.len(), 10);
    }

    #[test]
    fn member_counters_follow_records() {
        let mut member = Member::new("서연".to_string(), None, None, None);
        member.apply_record(5.0);
        member.apply_record(10.0);
        assert_eq!(member.total_distance, 15.0);
        assert_eq!(member.record_count, 2);

        member.revert_record(10.0);
        assert_eq!(member.total_distance, 5.0);
        assert_eq!(member.record_count, 1);
    }

    #[test]
    fn revert_never_goes_negative() {
        let mut member = Member::new("서연".to_string(), None, None, None);
        member.revert_record(3.0);
        assert_eq!(member.total_distance, 0.0);
        assert_eq!(member.record_count, 0);
    }

    #[test]
    fn record_ids_are_unique() {
        let a = RunRecord::new("member_1".into(), 5.0, "00:30:00".into(), None, None, None);
        let b = RunRecord::new("member_1".into(), 5.0, "00:30:00".into(), None, None, None);
        assert!(a.id.starts_with("record_"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn club_data_deserializes_with_missing_sections() {
        let data: ClubData = serde_json::from_str(r#"{"members":[]}"#).expect("valid json");
        assert!(data.records.is_empty());
        assert!(data.milestones.is_empty());
    }

    #[test]
    fn member_wire_format_is_camel_case() {
        let member = Member::new("서연".to_string(), None, None, Some("2025-01-01".into()));
        let json = serde_json::to_value(&member).expect("serializable");
        assert!(json.get("joinDate").is_some());
        assert!(json.get("totalDistance").is_some());
        assert!(json.get("join_date").is_none());
    }
}
