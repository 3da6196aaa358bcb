use std::time::Duration;

use anyhow::{Context, Result};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;

use crate::storage::dynamodb::{DATE_INDEX, MEMBER_DATE_INDEX};

const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const WAIT_MAX_POLLS: u32 = 60;

/// Tabellen-Setup für das DynamoDB-Backend. Idempotent: existierende
/// Tabellen werden übersprungen.
pub struct TableProvisioner {
    client: Client,
    table_prefix: String,
}

impl TableProvisioner {
    pub async fn new(table_prefix: &str, region: aws_config::Region) -> Result<Self> {
        let config = aws_config::from_env().region(region).load().await;
        Ok(Self {
            client: Client::new(&config),
            table_prefix: table_prefix.to_string(),
        })
    }

    fn table(&self, suffix: &str) -> String {
        format!("{}-{}", self.table_prefix, suffix)
    }

    /// Lege alle vier Tabellen an und warte bis sie aktiv sind
    pub async fn create_all(&self) -> Result<()> {
        self.create_members_table().await?;
        self.create_records_table().await?;
        self.create_schedules_table().await?;
        self.create_milestones_table().await?;
        tracing::info!("All tables ready");
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        match self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(e)) if e.err().is_resource_not_found_exception() => {
                Ok(false)
            }
            Err(e) => Err(e).with_context(|| format!("describe table {table}")),
        }
    }

    async fn wait_until_active(&self, table: &str) -> Result<()> {
        for _ in 0..WAIT_MAX_POLLS {
            let response = self
                .client
                .describe_table()
                .table_name(table)
                .send()
                .await
                .with_context(|| format!("describe table {table}"))?;

            let status = response.table.and_then(|t| t.table_status);
            if status == Some(TableStatus::Active) {
                tracing::info!(table, "Table active");
                return Ok(());
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
        anyhow::bail!("table {table} did not become active in time")
    }

    fn id_key_schema() -> Result<(KeySchemaElement, AttributeDefinition)> {
        let key = KeySchemaElement::builder()
            .attribute_name("id")
            .key_type(KeyType::Hash)
            .build()?;
        let attr = AttributeDefinition::builder()
            .attribute_name("id")
            .attribute_type(ScalarAttributeType::S)
            .build()?;
        Ok((key, attr))
    }

    fn string_attribute(name: &str) -> Result<AttributeDefinition> {
        Ok(AttributeDefinition::builder()
            .attribute_name(name)
            .attribute_type(ScalarAttributeType::S)
            .build()?)
    }

    async fn create_members_table(&self) -> Result<()> {
        let table = self.table("Members");
        if self.table_exists(&table).await? {
            tracing::info!(table, "Table already exists, skipping");
            return Ok(());
        }

        let (key, attr) = Self::id_key_schema()?;
        self.client
            .create_table()
            .table_name(&table)
            .key_schema(key)
            .attribute_definitions(attr)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .with_context(|| format!("create table {table}"))?;

        self.wait_until_active(&table).await
    }

    async fn create_records_table(&self) -> Result<()> {
        let table = self.table("Records");
        if self.table_exists(&table).await? {
            tracing::info!(table, "Table already exists, skipping");
            return Ok(());
        }

        let (key, id_attr) = Self::id_key_schema()?;
        let index = GlobalSecondaryIndex::builder()
            .index_name(MEMBER_DATE_INDEX)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("memberId")
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("date")
                    .key_type(KeyType::Range)
                    .build()?,
            )
            .projection(
                Projection::builder()
                    .projection_type(ProjectionType::All)
                    .build(),
            )
            .build()?;

        self.client
            .create_table()
            .table_name(&table)
            .key_schema(key)
            .attribute_definitions(id_attr)
            .attribute_definitions(Self::string_attribute("memberId")?)
            .attribute_definitions(Self::string_attribute("date")?)
            .global_secondary_indexes(index)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .with_context(|| format!("create table {table}"))?;

        self.wait_until_active(&table).await
    }

    async fn create_schedules_table(&self) -> Result<()> {
        let table = self.table("Schedules");
        if self.table_exists(&table).await? {
            tracing::info!(table, "Table already exists, skipping");
            return Ok(());
        }

        let (key, id_attr) = Self::id_key_schema()?;
        let index = GlobalSecondaryIndex::builder()
            .index_name(DATE_INDEX)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("date")
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .projection(
                Projection::builder()
                    .projection_type(ProjectionType::All)
                    .build(),
            )
            .build()?;

        self.client
            .create_table()
            .table_name(&table)
            .key_schema(key)
            .attribute_definitions(id_attr)
            .attribute_definitions(Self::string_attribute("date")?)
            .global_secondary_indexes(index)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .with_context(|| format!("create table {table}"))?;

        self.wait_until_active(&table).await
    }

    async fn create_milestones_table(&self) -> Result<()> {
        let table = self.table("Milestones");
        if self.table_exists(&table).await? {
            tracing::info!(table, "Table already exists, skipping");
            return Ok(());
        }

        let (key, attr) = Self::id_key_schema()?;
        self.client
            .create_table()
            .table_name(&table)
            .key_schema(key)
            .attribute_definitions(attr)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .with_context(|| format!("create table {table}"))?;

        self.wait_until_active(&table).await
    }

    /// Lösche alle Tabellen (nur für Entwicklungsumgebungen)
    pub async fn delete_all(&self) -> Result<()> {
        for suffix in ["Members", "Records", "Schedules", "Milestones"] {
            let table = self.table(suffix);
            if !self.table_exists(&table).await? {
                tracing::info!(table, "Table does not exist, skipping deletion");
                continue;
            }
            self.client
                .delete_table()
                .table_name(&table)
                .send()
                .await
                .with_context(|| format!("delete table {table}"))?;
            tracing::warn!(table, "Table deleted");
        }
        Ok(())
    }
}
