//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{CloudConfig, ServerConfig, UploadConfig};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Cloud provider settings
    pub cloud: CloudSettings,
    /// Upload settings
    pub upload: Option<UploadSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origin allowed by CORS
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSettings {
    /// Provider region
    pub region: String,
    /// Upload bucket
    pub bucket: String,
    /// Object storage endpoint override
    pub storage_endpoint: Option<String>,
    /// Transcription API endpoint override
    pub transcribe_endpoint: Option<String>,
    /// Transcription language
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Maximum upload size in MB
    pub max_upload_mb: Option<usize>,
    /// Where local subtitle copies are written
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = ServerConfig::default();
        Self {
            server: ServerSettings {
                host: defaults.host,
                port: defaults.port,
                allowed_origin: Some(defaults.allowed_origin),
            },
            cloud: CloudSettings {
                region: defaults.cloud.region,
                bucket: defaults.cloud.bucket,
                storage_endpoint: None,
                transcribe_endpoint: None,
                language_code: Some(defaults.cloud.language_code),
            },
            upload: Some(UploadSettings {
                max_upload_mb: Some(defaults.upload.max_upload_mb),
                output_dir: Some(defaults.upload.output_dir),
            }),
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some(defaults.log_format),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let upload = self.upload.unwrap_or(UploadSettings {
            max_upload_mb: None,
            output_dir: None,
        });
        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            allowed_origin: self
                .server
                .allowed_origin
                .unwrap_or(defaults.allowed_origin),
            cloud: CloudConfig {
                region: self.cloud.region,
                bucket: self.cloud.bucket,
                storage_endpoint: self.cloud.storage_endpoint,
                transcribe_endpoint: self.cloud.transcribe_endpoint,
                language_code: self
                    .cloud
                    .language_code
                    .unwrap_or(defaults.cloud.language_code),
            },
            upload: UploadConfig {
                max_upload_mb: upload
                    .max_upload_mb
                    .unwrap_or(defaults.upload.max_upload_mb),
                output_dir: upload.output_dir.unwrap_or(defaults.upload.output_dir),
            },
            log_level,
            log_format,
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default_config();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cloud.language_code.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_minimal_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "[server]\nhost = \"127.0.0.1\"\nport = 4000\n\n[cloud]\nregion = \"eu-central-1\"\nbucket = \"talks\"\n"
        )
        .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_server_config();
        assert_eq!(config.port, 4000);
        assert_eq!(config.cloud.bucket, "talks");
        assert_eq!(config.cloud.language_code, "en-US");
        assert_eq!(config.upload.max_upload_mb, 100);
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn test_logging_and_endpoints() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"
[server]
host = "0.0.0.0"
port = 3000

[cloud]
region = "us-east-1"
bucket = "media"
storage_endpoint = "http://localhost:4566"
transcribe_endpoint = "http://localhost:4566"

[upload]
max_upload_mb = 10
output_dir = "/var/lib/subgen"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_server_config();
        assert_eq!(config.cloud.storage_endpoint.as_deref().unwrap(), "http://localhost:4566");
        assert_eq!(config.upload.max_upload_mb, 10);
        assert_eq!(config.upload.output_dir, PathBuf::from("/var/lib/subgen"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn test_generate_default_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        generate_default_config(&path).unwrap();

        let loaded = ConfigFile::from_file(&path).unwrap().into_server_config();
        assert_eq!(loaded.port, 3000);
        assert_eq!(loaded.allowed_origin, "http://localhost:5173");
    }
}
