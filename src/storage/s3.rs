use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::club::dates::kst_iso_string;
use crate::storage::error::map_sdk_error;
use crate::storage::models::{
    ClubData, Member, MemberUpdate, Milestone, MilestoneUpdate, RunRecord, Schedule,
    ScheduleUpdate,
};
use crate::storage::retry::with_retry;
use crate::storage::{StorageError, Store};

pub const MEMBERS_KEY: &str = "members.json";
pub const RECORDS_KEY: &str = "records.json";
pub const SCHEDULES_KEY: &str = "schedules.json";
pub const MILESTONES_KEY: &str = "milestones.json";

/// S3 Storage Layer — ein JSON-Dokument pro Entität, kompletter
/// Überschreib pro Save (last writer wins). Fehlende Objekte werden als
/// leere Initialdaten angelegt.
pub struct S3Store {
    client: Client,
    bucket: String,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembersDoc {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordsDoc {
    #[serde(default)]
    records: Vec<RunRecord>,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulesDoc {
    #[serde(default)]
    schedules: Vec<Schedule>,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestonesDoc {
    #[serde(default)]
    milestones: Vec<Milestone>,
}

impl S3Store {
    /// Erstelle neue S3 Store Instanz aus der Umgebung
    pub async fn new(bucket: &str, region: aws_config::Region) -> anyhow::Result<Self> {
        let config = aws_config::from_env().region(region).load().await;
        let client = Client::new(&config);
        Ok(Self::with_client(client, bucket))
    }

    pub fn with_client(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(())
    }

    /// Lade ein Dokument; fehlende Objekte werden als Initialdaten
    /// angelegt und zurückgegeben
    async fn load_doc<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Serialize + Default + Send + Sync,
    {
        match with_retry("s3_get", || self.get_object(key)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(StorageError::NotFound(_)) => {
                tracing::info!(key, "Object missing, writing initial data");
                let initial = T::default();
                self.save_doc(key, &initial).await?;
                Ok(initial)
            }
            Err(e) => Err(e),
        }
    }

    /// Speichere ein Dokument mit `lastUpdated`-Stempel
    async fn save_doc<T>(&self, key: &str, doc: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        let mut value = serde_json::to_value(doc)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "lastUpdated".to_string(),
                serde_json::Value::String(kst_iso_string()),
            );
        }
        let body = serde_json::to_vec_pretty(&value)?;

        with_retry("s3_put", || self.put_object(key, body.clone())).await
    }
}

#[async_trait]
impl Store for S3Store {
    async fn load_members(&self) -> Result<Vec<Member>, StorageError> {
        Ok(self.load_doc::<MembersDoc>(MEMBERS_KEY).await?.members)
    }

    async fn put_member(&self, member: &Member) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<MembersDoc>(MEMBERS_KEY).await?;
        doc.members.retain(|m| m.id != member.id);
        doc.members.push(member.clone());
        self.save_doc(MEMBERS_KEY, &doc).await
    }

    async fn update_member(&self, id: &str, updates: &MemberUpdate) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<MembersDoc>(MEMBERS_KEY).await?;
        let member = doc
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        member.name = updates.name.clone();
        member.email = updates.email.clone();
        member.phone = updates.phone.clone();
        member.updated_at = kst_iso_string();
        self.save_doc(MEMBERS_KEY, &doc).await
    }

    async fn delete_member(&self, id: &str) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<MembersDoc>(MEMBERS_KEY).await?;
        doc.members.retain(|m| m.id != id);
        self.save_doc(MEMBERS_KEY, &doc).await
    }

    async fn load_records(&self) -> Result<Vec<RunRecord>, StorageError> {
        Ok(self.load_doc::<RecordsDoc>(RECORDS_KEY).await?.records)
    }

    async fn load_member_records(&self, member_id: &str) -> Result<Vec<RunRecord>, StorageError> {
        let mut records: Vec<RunRecord> = self
            .load_records()
            .await?
            .into_iter()
            .filter(|r| r.member_id == member_id)
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn put_record(&self, record: &RunRecord) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<RecordsDoc>(RECORDS_KEY).await?;
        doc.records.retain(|r| r.id != record.id);
        doc.records.push(record.clone());
        self.save_doc(RECORDS_KEY, &doc).await
    }

    async fn delete_record(&self, id: &str) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<RecordsDoc>(RECORDS_KEY).await?;
        doc.records.retain(|r| r.id != id);
        self.save_doc(RECORDS_KEY, &doc).await
    }

    async fn load_schedules(&self) -> Result<Vec<Schedule>, StorageError> {
        Ok(self.load_doc::<SchedulesDoc>(SCHEDULES_KEY).await?.schedules)
    }

    async fn load_schedules_by_date(&self, date: &str) -> Result<Vec<Schedule>, StorageError> {
        Ok(self
            .load_schedules()
            .await?
            .into_iter()
            .filter(|s| s.date == date)
            .collect())
    }

    async fn put_schedule(&self, schedule: &Schedule) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<SchedulesDoc>(SCHEDULES_KEY).await?;
        doc.schedules.retain(|s| s.id != schedule.id);
        doc.schedules.push(schedule.clone());
        self.save_doc(SCHEDULES_KEY, &doc).await
    }

    async fn update_schedule(&self, id: &str, updates: &ScheduleUpdate) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<SchedulesDoc>(SCHEDULES_KEY).await?;
        let schedule = doc
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
        self.save_doc(SCHEDULES_KEY, &doc).await
    }

    async fn delete_schedule(&self, id: &str) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<SchedulesDoc>(SCHEDULES_KEY).await?;
        doc.schedules.retain(|s| s.id != id);
        self.save_doc(SCHEDULES_KEY, &doc).await
    }

    async fn load_milestones(&self) -> Result<Vec<Milestone>, StorageError> {
        Ok(self
            .load_doc::<MilestonesDoc>(MILESTONES_KEY)
            .await?
            .milestones)
    }

    async fn put_milestone(&self, milestone: &Milestone) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<MilestonesDoc>(MILESTONES_KEY).await?;
        doc.milestones.retain(|m| m.id != milestone.id);
        doc.milestones.push(milestone.clone());
        self.save_doc(MILESTONES_KEY, &doc).await
    }

    async fn update_milestone(&self, id: &str, updates: &MilestoneUpdate) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<MilestonesDoc>(MILESTONES_KEY).await?;
        let milestone = doc
            .milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        milestone.target_km = updates.target_km;
        milestone.reward = updates.reward.clone();
        milestone.is_active = updates.is_active;
        milestone.updated_at = kst_iso_string();
        self.save_doc(MILESTONES_KEY, &doc).await
    }

    async fn delete_milestone(&self, id: &str) -> Result<(), StorageError> {
        let mut doc = self.load_doc::<MilestonesDoc>(MILESTONES_KEY).await?;
        doc.milestones.retain(|m| m.id != id);
        self.save_doc(MILESTONES_KEY, &doc).await
    }

    async fn replace_all(&self, data: &ClubData) -> Result<(), StorageError> {
        self.save_doc(
            MEMBERS_KEY,
            &MembersDoc {
                members: data.members.clone(),
            },
        )
        .await?;
        self.save_doc(
            RECORDS_KEY,
            &RecordsDoc {
                records: data.records.clone(),
            },
        )
        .await?;
        self.save_doc(
            SCHEDULES_KEY,
            &SchedulesDoc {
                schedules: data.schedules.clone(),
            },
        )
        .await?;
        self.save_doc(
            MILESTONES_KEY,
            &MilestonesDoc {
                milestones: data.milestones.clone(),
            },
        )
        .await
    }

    async fn check_connection(&self) -> bool {
        self.client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_deserialize_legacy_payloads() {
        // Dokumente ohne lastUpdated oder mit Zusatzfeldern bleiben lesbar
        let doc: MembersDoc =
            serde_json::from_str(r#"{"members":[],"lastUpdated":"2024-01-01T00:00:00+09:00"}"#)
                .expect("valid doc");
        assert!(doc.members.is_empty());

        let doc: RecordsDoc = serde_json::from_str("{}").expect("valid doc");
        assert!(doc.records.is_empty());
    }
}
