use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::club::dates::kst_iso_string;
use crate::storage::error::map_sdk_error;
use crate::storage::models::{
    ClubData, Member, MemberUpdate, Milestone, MilestoneUpdate, RunRecord, Schedule,
    ScheduleUpdate,
};
use crate::storage::retry::with_retry;
use crate::storage::{StorageError, Store};

/// Index auf der Records-Tabelle: memberId (HASH) + date (RANGE)
pub const MEMBER_DATE_INDEX: &str = "memberId-date-index";
/// Index auf der Schedules-Tabelle: date (HASH)
pub const DATE_INDEX: &str = "date-index";

/// DynamoDB Storage Layer — eine Tabelle pro Entität unter gemeinsamem
/// Prefix (`<prefix>-Members` usw.), Items mit `id` als Hash-Key.
pub struct DynamoStore {
    client: Client,
    members_table: String,
    records_table: String,
    schedules_table: String,
    milestones_table: String,
}

impl DynamoStore {
    /// Erstelle neue DynamoDB Store Instanz aus der Umgebung
    pub async fn new(table_prefix: &str, region: aws_config::Region) -> anyhow::Result<Self> {
        let config = aws_config::from_env().region(region).load().await;
        let client = Client::new(&config);
        Ok(Self::with_client(client, table_prefix))
    }

    pub fn with_client(client: Client, table_prefix: &str) -> Self {
        Self {
            client,
            members_table: format!("{table_prefix}-Members"),
            records_table: format!("{table_prefix}-Records"),
            schedules_table: format!("{table_prefix}-Schedules"),
            milestones_table: format!("{table_prefix}-Milestones"),
        }
    }

    pub fn table_names(&self) -> [&str; 4] {
        [
            &self.members_table,
            &self.records_table,
            &self.schedules_table,
            &self.milestones_table,
        ]
    }

    /// Scan über alle Items einer Tabelle, Pagination inklusive
    async fn scan_table(
        &self,
        table: &str,
    ) -> Result<Vec<HashMap<String, AttributeValue>>, StorageError> {
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let response = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_sdk_error(e, table))?;

            items.extend(response.items.unwrap_or_default());

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn put_item(
        &self,
        table: &str,
        item: HashMap<String, AttributeValue>,
    ) -> Result<(), StorageError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, table))?;
        Ok(())
    }

    async fn delete_item(&self, table: &str, id: &str) -> Result<(), StorageError> {
        self.client
            .delete_item()
            .table_name(table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, table))?;
        Ok(())
    }

    async fn clear_table(&self, table: &str) -> Result<(), StorageError> {
        let items = self.scan_table(table).await?;
        for item in items {
            if let Ok(id) = self.get_string(&item, "id") {
                self.delete_item(table, &id).await?;
            }
        }
        Ok(())
    }

    // Item-Konvertierung

    fn member_to_item(&self, member: &Member) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(member.id.clone()));
        item.insert("name".to_string(), AttributeValue::S(member.name.clone()));
        item.insert(
            "email".to_string(),
            optional_string(member.email.as_deref()),
        );
        item.insert(
            "phone".to_string(),
            optional_string(member.phone.as_deref()),
        );
        item.insert(
            "joinDate".to_string(),
            AttributeValue::S(member.join_date.clone()),
        );
        item.insert(
            "totalDistance".to_string(),
            AttributeValue::N(member.total_distance.to_string()),
        );
        item.insert(
            "recordCount".to_string(),
            AttributeValue::N(member.record_count.to_string()),
        );
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(member.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(member.updated_at.clone()),
        );
        item
    }

    fn item_to_member(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<Member, StorageError> {
        Ok(Member {
            id: self.get_string(item, "id")?,
            name: self.get_string(item, "name")?,
            email: self.get_optional_string(item, "email"),
            phone: self.get_optional_string(item, "phone"),
            join_date: self.get_string(item, "joinDate")?,
            total_distance: self.get_optional_number(item, "totalDistance").unwrap_or(0.0),
            record_count: self.get_optional_number(item, "recordCount").unwrap_or(0.0) as u32,
            created_at: self.get_string(item, "createdAt")?,
            updated_at: self.get_string(item, "updatedAt")?,
        })
    }

    fn record_to_item(&self, record: &RunRecord) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(record.id.clone()));
        item.insert(
            "memberId".to_string(),
            AttributeValue::S(record.member_id.clone()),
        );
        item.insert(
            "distance".to_string(),
            AttributeValue::N(record.distance.to_string()),
        );
        item.insert("time".to_string(), AttributeValue::S(record.time.clone()));
        item.insert("pace".to_string(), optional_string(record.pace.as_deref()));
        item.insert("notes".to_string(), AttributeValue::S(record.notes.clone()));
        item.insert("date".to_string(), AttributeValue::S(record.date.clone()));
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(record.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(record.updated_at.clone()),
        );
        item
    }

    fn item_to_record(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<RunRecord, StorageError> {
        Ok(RunRecord {
            id: self.get_string(item, "id")?,
            member_id: self.get_string(item, "memberId")?,
            distance: self.get_number(item, "distance")?,
            time: self.get_string(item, "time")?,
            pace: self.get_optional_string(item, "pace"),
            notes: self.get_optional_string(item, "notes").unwrap_or_default(),
            date: self.get_string(item, "date")?,
            created_at: self.get_string(item, "createdAt")?,
            updated_at: self.get_string(item, "updatedAt")?,
        })
    }

    fn schedule_to_item(&self, schedule: &Schedule) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(schedule.id.clone()));
        item.insert("date".to_string(), AttributeValue::S(schedule.date.clone()));
        item.insert(
            "title".to_string(),
            AttributeValue::S(schedule.title.clone()),
        );
        item.insert(
            "description".to_string(),
            AttributeValue::S(schedule.description.clone()),
        );
        item.insert(
            "location".to_string(),
            AttributeValue::S(schedule.location.clone()),
        );
        item.insert("time".to_string(), AttributeValue::S(schedule.time.clone()));
        // Leere String-Sets sind in DynamoDB nicht erlaubt
        if !schedule.participants.is_empty() {
            item.insert(
                "participants".to_string(),
                AttributeValue::Ss(schedule.participants.clone()),
            );
        }
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(schedule.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(schedule.updated_at.clone()),
        );
        item
    }

    fn item_to_schedule(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<Schedule, StorageError> {
        Ok(Schedule {
            id: self.get_string(item, "id")?,
            date: self.get_string(item, "date")?,
            title: self.get_string(item, "title")?,
            description: self
                .get_optional_string(item, "description")
                .unwrap_or_default(),
            location: self
                .get_optional_string(item, "location")
                .unwrap_or_default(),
            time: self.get_optional_string(item, "time").unwrap_or_default(),
            participants: self
                .get_optional_string_list(item, "participants")
                .unwrap_or_default(),
            created_at: self.get_string(item, "createdAt")?,
            updated_at: self.get_string(item, "updatedAt")?,
        })
    }

    fn milestone_to_item(&self, milestone: &Milestone) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(milestone.id.clone()));
        item.insert(
            "targetKm".to_string(),
            AttributeValue::N(milestone.target_km.to_string()),
        );
        item.insert(
            "reward".to_string(),
            AttributeValue::S(milestone.reward.clone()),
        );
        item.insert(
            "isActive".to_string(),
            AttributeValue::Bool(milestone.is_active),
        );
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(milestone.created_at.clone()),
        );
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(milestone.updated_at.clone()),
        );
        item
    }

    fn item_to_milestone(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<Milestone, StorageError> {
        Ok(Milestone {
            id: self.get_string(item, "id")?,
            target_km: self.get_number(item, "targetKm")?,
            reward: self.get_string(item, "reward")?,
            is_active: self.get_bool(item, "isActive")?,
            created_at: self.get_string(item, "createdAt")?,
            updated_at: self.get_string(item, "updatedAt")?,
        })
    }

    fn get_string(
        &self,
        item: &HashMap<String, AttributeValue>,
        key: &str,
    ) -> Result<String, StorageError> {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| StorageError::InvalidItem(format!("missing field: {key}")))
    }

    fn get_optional_string(
        &self,
        item: &HashMap<String, AttributeValue>,
        key: &str,
    ) -> Option<String> {
        item.get(key).and_then(|v| v.as_s().ok()).cloned()
    }

    fn get_optional_string_list(
        &self,
        item: &HashMap<String, AttributeValue>,
        key: &str,
    ) -> Option<Vec<String>> {
        item.get(key).and_then(|v| v.as_ss().ok()).cloned()
    }

    fn get_number(
        &self,
        item: &HashMap<String, AttributeValue>,
        key: &str,
    ) -> Result<f64, StorageError> {
        item.get(key)
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<f64>().ok())
            .ok_or_else(|| StorageError::InvalidItem(format!("missing number field: {key}")))
    }

    fn get_optional_number(&self, item: &HashMap<String, AttributeValue>, key: &str) -> Option<f64> {
        item.get(key)
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<f64>().ok())
    }

    fn get_bool(
        &self,
        item: &HashMap<String, AttributeValue>,
        key: &str,
    ) -> Result<bool, StorageError> {
        item.get(key)
            .and_then(|v| v.as_bool().ok())
            .copied()
            .ok_or_else(|| StorageError::InvalidItem(format!("missing bool field: {key}")))
    }
}

/// None wird als DynamoDB-Null abgelegt
fn optional_string(value: Option<&str>) -> AttributeValue {
    match value {
        Some(v) => AttributeValue::S(v.to_string()),
        None => AttributeValue::Null(true),
    }
}

#[async_trait]
impl Store for DynamoStore {
    async fn load_members(&self) -> Result<Vec<Member>, StorageError> {
        let items = with_retry("load_members", || self.scan_table(&self.members_table)).await?;
        items.iter().map(|i| self.item_to_member(i)).collect()
    }

    async fn put_member(&self, member: &Member) -> Result<(), StorageError> {
        with_retry("put_member", || {
            self.put_item(&self.members_table, self.member_to_item(member))
        })
        .await
    }

    async fn update_member(&self, id: &str, updates: &MemberUpdate) -> Result<(), StorageError> {
        with_retry("update_member", || async {
            self.client
                .update_item()
                .table_name(&self.members_table)
                .key("id", AttributeValue::S(id.to_string()))
                .update_expression(
                    "SET #name = :name, email = :email, phone = :phone, updatedAt = :updatedAt",
                )
                .expression_attribute_names("#name", "name")
                .expression_attribute_values(":name", AttributeValue::S(updates.name.clone()))
                .expression_attribute_values(":email", optional_string(updates.email.as_deref()))
                .expression_attribute_values(":phone", optional_string(updates.phone.as_deref()))
                .expression_attribute_values(":updatedAt", AttributeValue::S(kst_iso_string()))
                .condition_expression("attribute_exists(id)")
                .send()
                .await
                .map_err(|e| map_sdk_error(e, id))?;
            Ok(())
        })
        .await
    }

    async fn delete_member(&self, id: &str) -> Result<(), StorageError> {
        with_retry("delete_member", || self.delete_item(&self.members_table, id)).await
    }

    async fn load_records(&self) -> Result<Vec<RunRecord>, StorageError> {
        let items = with_retry("load_records", || self.scan_table(&self.records_table)).await?;
        items.iter().map(|i| self.item_to_record(i)).collect()
    }

    async fn load_member_records(&self, member_id: &str) -> Result<Vec<RunRecord>, StorageError> {
        let items = with_retry("load_member_records", || async {
            let response = self
                .client
                .query()
                .table_name(&self.records_table)
                .index_name(MEMBER_DATE_INDEX)
                .key_condition_expression("memberId = :memberId")
                .expression_attribute_values(
                    ":memberId",
                    AttributeValue::S(member_id.to_string()),
                )
                // Neueste zuerst
                .scan_index_forward(false)
                .send()
                .await
                .map_err(|e| map_sdk_error(e, &self.records_table))?;
            Ok(response.items.unwrap_or_default())
        })
        .await?;

        items.iter().map(|i| self.item_to_record(i)).collect()
    }

    async fn put_record(&self, record: &RunRecord) -> Result<(), StorageError> {
        with_retry("put_record", || {
            self.put_item(&self.records_table, self.record_to_item(record))
        })
        .await
    }

    async fn delete_record(&self, id: &str) -> Result<(), StorageError> {
        with_retry("delete_record", || self.delete_item(&self.records_table, id)).await
    }

    async fn load_schedules(&self) -> Result<Vec<Schedule>, StorageError> {
        let items = with_retry("load_schedules", || self.scan_table(&self.schedules_table)).await?;
        items.iter().map(|i| self.item_to_schedule(i)).collect()
    }

    async fn load_schedules_by_date(&self, date: &str) -> Result<Vec<Schedule>, StorageError> {
        let items = with_retry("load_schedules_by_date", || async {
            let response = self
                .client
                .query()
                .table_name(&self.schedules_table)
                .index_name(DATE_INDEX)
                .key_condition_expression("#date = :date")
                .expression_attribute_names("#date", "date")
                .expression_attribute_values(":date", AttributeValue::S(date.to_string()))
                .send()
                .await
                .map_err(|e| map_sdk_error(e, &self.schedules_table))?;
            Ok(response.items.unwrap_or_default())
        })
        .await?;

        items.iter().map(|i| self.item_to_schedule(i)).collect()
    }

    async fn put_schedule(&self, schedule: &Schedule) -> Result<(), StorageError> {
        with_retry("put_schedule", || {
            self.put_item(&self.schedules_table, self.schedule_to_item(schedule))
        })
        .await
    }

    async fn update_schedule(&self, id: &str, updates: &ScheduleUpdate) -> Result<(), StorageError> {
        // Termin komplett neu schreiben; Update-Semantik wie bei S3
        let schedules = self.load_schedules().await?;
        let mut schedule = schedules
            .into_iter()
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

        self.put_schedule(&schedule).await
    }

    async fn delete_schedule(&self, id: &str) -> Result<(), StorageError> {
        with_retry("delete_schedule", || {
            self.delete_item(&self.schedules_table, id)
        })
        .await
    }

    async fn load_milestones(&self) -> Result<Vec<Milestone>, StorageError> {
        let items =
            with_retry("load_milestones", || self.scan_table(&self.milestones_table)).await?;
        items.iter().map(|i| self.item_to_milestone(i)).collect()
    }

    async fn put_milestone(&self, milestone: &Milestone) -> Result<(), StorageError> {
        with_retry("put_milestone", || {
            self.put_item(&self.milestones_table, self.milestone_to_item(milestone))
        })
        .await
    }

    async fn update_milestone(&self, id: &str, updates: &MilestoneUpdate) -> Result<(), StorageError> {
        with_retry("update_milestone", || async {
            self.client
                .update_item()
                .table_name(&self.milestones_table)
                .key("id", AttributeValue::S(id.to_string()))
                .update_expression(
                    "SET targetKm = :targetKm, reward = :reward, isActive = :isActive, updatedAt = :updatedAt",
                )
                .expression_attribute_values(
                    ":targetKm",
                    AttributeValue::N(updates.target_km.to_string()),
                )
                .expression_attribute_values(":reward", AttributeValue::S(updates.reward.clone()))
                .expression_attribute_values(":isActive", AttributeValue::Bool(updates.is_active))
                .expression_attribute_values(":updatedAt", AttributeValue::S(kst_iso_string()))
                .condition_expression("attribute_exists(id)")
                .send()
                .await
                .map_err(|e| map_sdk_error(e, id))?;
            Ok(())
        })
        .await
    }

    async fn delete_milestone(&self, id: &str) -> Result<(), StorageError> {
        with_retry("delete_milestone", || {
            self.delete_item(&self.milestones_table, id)
        })
        .await
    }

    async fn replace_all(&self, data: &ClubData) -> Result<(), StorageError> {
        for table in self.table_names() {
            let table = table.to_string();
            with_retry("clear_table", || self.clear_table(&table)).await?;
        }

        for member in &data.members {
            self.put_member(member).await?;
        }
        for record in &data.records {
            self.put_record(record).await?;
        }
        for schedule in &data.schedules {
            self.put_schedule(schedule).await?;
        }
        for milestone in &data.milestones {
            self.put_milestone(milestone).await?;
        }

        Ok(())
    }

    async fn check_connection(&self) -> bool {
        self.client
            .scan()
            .table_name(&self.members_table)
            .limit(1)
            .send()
            .await
            .is_ok()
    }
}
