use aws_config::Region;
use serde::Deserialize;

/// Auswahl des Storage-Backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    DynamoDb,
    S3,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::DynamoDb => "dynamodb",
            StorageBackend::S3 => "s3",
            StorageBackend::Memory => "memory",
        }
    }
}

/// Hauptkonfiguration für das Backend
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub aws_region: String,
    pub table_prefix: String,
    pub s3_bucket: String,
    pub api_port: u16,
    /// Verzeichnis für rotierende Logdateien, optional
    pub log_dir: Option<String>,
}

impl Config {
    /// Lade Config aus Environment Variablen
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "dynamodb".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            "memory" => StorageBackend::Memory,
            _ => StorageBackend::DynamoDb,
        };

        Self {
            storage_backend,
            aws_region: std::env::var("AWS_REGION")
                .unwrap_or_else(|_| "ap-northeast-1".to_string()),
            table_prefix: std::env::var("DYNAMODB_TABLE_PREFIX")
                .unwrap_or_else(|_| "RunningClub".to_string()),
            s3_bucket: std::env::var("S3_BUCKET")
                .unwrap_or_else(|_| "agrace-run-data".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("API_PORT muss eine Zahl sein"),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Region für die AWS-Clients
    pub fn sdk_region(&self) -> Region {
        Region::new(self.aws_region.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_flows_into_sdk_type() {
        let config = Config {
            storage_backend: StorageBackend::Memory,
            aws_region: "ap-northeast-1".to_string(),
            table_prefix: "RunningClub".to_string(),
            s3_bucket: "agrace-run-data".to_string(),
            api_port: 8080,
            log_dir: None,
        };
        assert_eq!(config.sdk_region().as_ref(), "ap-northeast-1");
    }

    #[test]
    fn backend_names() {
        assert_eq!(StorageBackend::DynamoDb.as_str(), "dynamodb");
        assert_eq!(StorageBackend::S3.as_str(), "s3");
        assert_eq!(StorageBackend::Memory.as_str(), "memory");
    }
}
