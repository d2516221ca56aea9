use crate::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("ARAM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let export_dir = match env::var("ARAM_EXPORT_DIR") {
            Ok(dir) if dir.trim().is_empty() => {
                return Err(AppError::ConfigError(
                    "ARAM_EXPORT_DIR is set but empty".to_string(),
                ));
            }
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_export_dir(),
        };

        Ok(Config {
            data_dir,
            export_dir,
        })
    }

    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, export_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = export_dir {
            self.export_dir = dir;
        }
        self
    }
}

fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .map(|dir| dir.join("aram_dashboard"))
        .unwrap_or_else(|| PathBuf::from("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_env_values() {
        let config = Config {
            data_dir: PathBuf::from("."),
            export_dir: PathBuf::from("exports"),
        }
        .with_overrides(Some(PathBuf::from("/data")), None);

        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.export_dir, PathBuf::from("exports"));
    }
}
