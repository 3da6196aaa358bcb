pub mod dynamodb;
pub mod error;
pub mod memory;
pub mod models;
pub mod provision;
pub mod retry;
pub mod s3;

pub use dynamodb::DynamoStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use models::{ClubData, Member, MemberUpdate, Milestone, MilestoneUpdate, RunRecord, Schedule, ScheduleUpdate};
pub use s3::S3Store;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Storage-Schnittstelle für alle Backends (DynamoDB, S3, In-Memory).
/// Lesen liefert leere Listen wenn noch keine Daten existieren.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync {
    // Members
    async fn load_members(&self) -> Result<Vec<Member>, StorageError>;
    async fn put_member(&self, member: &Member) -> Result<(), StorageError>;
    async fn update_member(&self, id: &str, updates: &MemberUpdate) -> Result<(), StorageError>;
    async fn delete_member(&self, id: &str) -> Result<(), StorageError>;

    // Records
    async fn load_records(&self) -> Result<Vec<RunRecord>, StorageError>;
    /// Einträge eines Mitglieds, neueste zuerst
    async fn load_member_records(&self, member_id: &str) -> Result<Vec<RunRecord>, StorageError>;
    async fn put_record(&self, record: &RunRecord) -> Result<(), StorageError>;
    async fn delete_record(&self, id: &str) -> Result<(), StorageError>;

    // Schedules
    async fn load_schedules(&self) -> Result<Vec<Schedule>, StorageError>;
    async fn load_schedules_by_date(&self, date: &str) -> Result<Vec<Schedule>, StorageError>;
    async fn put_schedule(&self, schedule: &Schedule) -> Result<(), StorageError>;
    async fn update_schedule(&self, id: &str, updates: &ScheduleUpdate) -> Result<(), StorageError>;
    async fn delete_schedule(&self, id: &str) -> Result<(), StorageError>;

    // Milestones
    async fn load_milestones(&self) -> Result<Vec<Milestone>, StorageError>;
    async fn put_milestone(&self, milestone: &Milestone) -> Result<(), StorageError>;
    async fn update_milestone(&self, id: &str, updates: &MilestoneUpdate) -> Result<(), StorageError>;
    async fn delete_milestone(&self, id: &str) -> Result<(), StorageError>;

    /// Alle Daten auf einmal laden (Export, Statistiken)
    async fn load_all(&self) -> Result<ClubData, StorageError> {
        let (members, records, schedules, milestones) = futures::try_join!(
            self.load_members(),
            self.load_records(),
            self.load_schedules(),
            self.load_milestones(),
        )?;
        Ok(ClubData::new(members, records, schedules, milestones))
    }

    /// Kompletten Datensatz ersetzen (Import, Reset). Last writer wins.
    async fn replace_all(&self, data: &ClubData) -> Result<(), StorageError>;

    /// Schneller Verbindungscheck ohne Fehlerpropagierung
    async fn check_connection(&self) -> bool;
}
