use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const IMG_WIDTH: u32 = 150;
pub const IMG_HEIGHT: u32 = 150;

/// Decoder limits for uploaded images, independent of the upload byte limit.
pub const MAX_IMAGE_DIMENSION: u32 = 6000;
pub const MAX_DECODE_ALLOC: u64 = 128 * 1024 * 1024;

const DEFAULT_CONFIG_PATH: &str = "config/service.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("./model/best_animal_classifier_fine_tuned.onnx"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    /// Reads the YAML file named by `CLASSIFIER_CONFIG` (or `config/service.yaml` when present),
    /// then applies environment overrides.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match std::env::var("CLASSIFIER_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        let config: ServiceConfig = serde_yaml::from_str(&config_str)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|e| format!("Invalid PORT value {:?}: {}", port, e))?;
        }
        if let Some(model_path) = lookup("MODEL_PATH") {
            self.model_path = PathBuf::from(model_path);
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = limit
                .parse()
                .map_err(|e| format!("Invalid MAX_UPLOAD_BYTES value {:?}: {}", limit, e))?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
