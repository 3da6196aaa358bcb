use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::models::{
    ClubData, Member, MemberUpdate, Milestone, MilestoneUpdate, RunRecord, Schedule,
    ScheduleUpdate,
};
use crate::storage::{StorageError, Store};
use crate::club::dates::kst_iso_string;

/// In-Memory Backend — lokaler Betrieb ohne AWS und Basis für Tests.
/// Semantik entspricht den Cloud-Backends (last writer wins).
pub struct MemoryStore {
    data: RwLock<ClubData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(ClubData::empty()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_members(&self) -> Result<Vec<Member>, StorageError> {
        Ok(self.data.read().await.members.clone())
    }

    async fn put_member(&self, member: &Member) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.members.retain(|m| m.id != member.id);
        data.members.push(member.clone());
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn update_member(&self, id: &str, updates: &MemberUpdate) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        let member = data
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        member.name = updates.name.clone();
        member.email = updates.email.clone();
        member.phone = updates.phone.clone();
        member.updated_at = kst_iso_string();
        Ok(())
    }

    async fn delete_member(&self, id: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.members.retain(|m| m.id != id);
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn load_records(&self) -> Result<Vec<RunRecord>, StorageError> {
        Ok(self.data.read().await.records.clone())
    }

    async fn load_member_records(&self, member_id: &str) -> Result<Vec<RunRecord>, StorageError> {
        let mut records: Vec<RunRecord> = self
            .data
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.member_id == member_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn put_record(&self, record: &RunRecord) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.records.retain(|r| r.id != record.id);
        data.records.push(record.clone());
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.records.retain(|r| r.id != id);
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn load_schedules(&self) -> Result<Vec<Schedule>, StorageError> {
        Ok(self.data.read().await.schedules.clone())
    }

    async fn load_schedules_by_date(&self, date: &str) -> Result<Vec<Schedule>, StorageError> {
        Ok(self
            .data
            .read()
            .await
            .schedules
            .iter()
            .filter(|s| s.date == date)
            .cloned()
            .collect())
    }

    async fn put_schedule(&self, schedule: &Schedule) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.schedules.retain(|s| s.id != schedule.id);
        data.schedules.push(schedule.clone());
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn update_schedule(&self, id: &str, updates: &ScheduleUpdate) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        let schedule = data
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        schedule.date = updates.date.clone();
        schedule.title = updates.title.clone();
        schedule.description = updates.description.clone().unwrap_or_default();
        schedule.location = updates.location.clone().unwrap_or_default();
        schedule.time = updates.time.clone().unwrap_or_default();
        if let Some(participants) = &updates.participants {
            schedule.participants = participants.clone();
        }
        schedule.updated_at = kst_iso_string();
        Ok(())
    }

    async fn delete_schedule(&self, id: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.schedules.retain(|s| s.id != id);
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn load_milestones(&self) -> Result<Vec<Milestone>, StorageError> {
        Ok(self.data.read().await.milestones.clone())
    }

    async fn put_milestone(&self, milestone: &Milestone) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.milestones.retain(|m| m.id != milestone.id);
        data.milestones.push(milestone.clone());
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn update_milestone(&self, id: &str, updates: &MilestoneUpdate) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        let milestone = data
            .milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        milestone.target_km = updates.target_km;
        milestone.reward = updates.reward.clone();
        milestone.is_active = updates.is_active;
        milestone.updated_at = kst_iso_string();
        Ok(())
    }

    async fn delete_milestone(&self, id: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.milestones.retain(|m| m.id != id);
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn replace_all(&self, new_data: &ClubData) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        *data = new_data.clone();
        data.last_updated = kst_iso_string();
        Ok(())
    }

    async fn check_connection(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn member_roundtrip() {
        let store = MemoryStore::new();
        let member = Member::new("하은".to_string(), None, None, None);
        store.put_member(&member).await.unwrap();

        let members = store.load_members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "하은");

        store.delete_member(&member.id).await.unwrap();
        assert!(store.load_members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_member_is_not_found() {
        let store = MemoryStore::new();
        let updates = MemberUpdate {
            name: "x".into(),
            email: None,
            phone: None,
        };
        let err = store.update_member("member_missing", &updates).await;
        assert!(matches!(err, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn member_records_are_newest_first() {
        let store = MemoryStore::new();
        for date in ["2025-01-01", "2025-03-01", "2025-02-01"] {
            let record = RunRecord::new(
                "member_a".into(),
                5.0,
                "00:30:00".into(),
                None,
                None,
                Some(date.to_string()),
            );
            store.put_record(&record).await.unwrap();
        }
        let other = RunRecord::new("member_b".into(), 3.0, "00:20:00".into(), None, None, None);
        store.put_record(&other).await.unwrap();

        let records = store.load_member_records("member_a").await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, "2025-03-01");
        assert_eq!(records[2].date, "2025-01-01");
    }

    #[tokio::test]
    async fn schedules_filter_by_date() {
        let store = MemoryStore::new();
        let schedule = Schedule::new(
            Some("2025-05-05".into()),
            "새벽 러닝".into(),
            None,
            Some("한강공원".into()),
            Some("06:00".into()),
            None,
        );
        store.put_schedule(&schedule).await.unwrap();

        assert_eq!(
            store.load_schedules_by_date("2025-05-05").await.unwrap().len(),
            1
        );
        assert!(store
            .load_schedules_by_date("2025-05-06")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn replace_all_overwrites_everything() {
        let store = MemoryStore::new();
        let member = Member::new("하은".to_string(), None, None, None);
        store.put_member(&member).await.unwrap();

        store.replace_all(&ClubData::empty()).await.unwrap();
        let data = store.load_all().await.unwrap();
        assert!(data.members.is_empty());
        assert!(data.records.is_empty());
    }

    #[tokio::test]
    async fn milestone_toggle() {
        let store = MemoryStore::new();
        let milestone = Milestone::new(100.0, "클럽 저녁 회식".into(), true);
        store.put_milestone(&milestone).await.unwrap();

        let updates = MilestoneUpdate {
            target_km: 100.0,
            reward: "클럽 저녁 회식".into(),
            is_active: false,
        };
        store.update_milestone(&milestone.id, &updates).await.unwrap();

        let milestones = store.load_milestones().await.unwrap();
        assert!(!milestones[0].is_active);
    }
}
