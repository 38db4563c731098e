//! Run configuration: built-in defaults rooted at the working directory, an optional
//! YAML file, then command-line overrides applied by the CLI.
//!
//! ```yaml
//! root_dir: /srv/na-map
//! server_id: eu3
//! unreachable: zero
//! workers: 4
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::distances::{TableFormat, UnreachablePolicy};
use crate::error::{DistanceError, Result};
use crate::map::{Projection, RasterOptions};
use crate::parallel::WorkerPool;
use crate::time::{current_server_start_date, format_date, parse_snapshot_date};

/// Overrides the base directory the default paths hang off.
pub const ROOT_ENV: &str = "PORT_DISTANCES_ROOT";
/// Path of a YAML config file to load when `--config` is not given.
pub const CONFIG_ENV: &str = "PORT_DISTANCES_CONFIG";

pub const DEFAULT_SERVER_ID: &str = "eu2";

fn default_root() -> PathBuf {
    env::var_os(ROOT_ENV)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub root_dir: PathBuf,
    /// Defaults to `<root>/build/API`.
    pub api_dir: Option<PathBuf>,
    /// Defaults to `<root>/src/map/frontline-map-<distance_map_size>.png`.
    pub map_file: Option<PathBuf>,
    /// Defaults to `<root>/lib/distances.<json|csv>` following `output_format`.
    pub output_file: Option<PathBuf>,
    pub output_format: TableFormat,
    pub server_id: String,
    /// Snapshot date `YYYY-MM-DD`; the current server day when unset.
    pub date: Option<String>,
    pub map_size: f64,
    pub distance_map_size: u32,
    pub water_threshold: u8,
    pub strict_bitonal: bool,
    pub projection: Projection,
    pub unreachable: UnreachablePolicy,
    pub parallel: bool,
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let raster = RasterOptions::default();
        Self {
            root_dir: default_root(),
            api_dir: None,
            map_file: None,
            output_file: None,
            output_format: TableFormat::Json,
            server_id: DEFAULT_SERVER_ID.to_string(),
            date: None,
            map_size: raster.map_size,
            distance_map_size: 4096,
            water_threshold: raster.water_threshold,
            strict_bitonal: raster.strict_bitonal,
            projection: Projection::default(),
            unreachable: UnreachablePolicy::Omit,
            parallel: true,
            workers: 0,
        }
    }
}

impl AppConfig {
    /// Load `path`, or the file named by [`CONFIG_ENV`], or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => {
                let raw = fs::read_to_string(&path).map_err(|source| DistanceError::ConfigRead {
                    path: path.clone(),
                    source,
                })?;
                Self::from_yaml(&raw, &path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|source| DistanceError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn api_dir(&self) -> PathBuf {
        self.api_dir
            .clone()
            .unwrap_or_else(|| self.root_dir.join("build").join("API"))
    }

    pub fn map_file(&self) -> PathBuf {
        self.map_file.clone().unwrap_or_else(|| {
            self.root_dir
                .join("src")
                .join("map")
                .join(format!("frontline-map-{}.png", self.distance_map_size))
        })
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_file.clone().unwrap_or_else(|| {
            self.root_dir
                .join("lib")
                .join(format!("distances.{}", self.output_format.extension()))
        })
    }

    /// Validated snapshot date, defaulting to the current server day.
    pub fn snapshot_date(&self) -> Result<String> {
        match &self.date {
            Some(raw) => parse_snapshot_date(raw).map(format_date),
            None => Ok(current_server_start_date()),
        }
    }

    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            map_size: self.map_size,
            water_threshold: self.water_threshold,
            strict_bitonal: self.strict_bitonal,
        }
    }

    pub fn worker_pool(&self) -> WorkerPool {
        WorkerPool::with_workers(self.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_hang_off_the_root() {
        let config = AppConfig {
            root_dir: PathBuf::from("/srv/site"),
            ..AppConfig::default()
        };
        assert_eq!(config.api_dir(), PathBuf::from("/srv/site/build/API"));
        assert_eq!(
            config.map_file(),
            PathBuf::from("/srv/site/src/map/frontline-map-4096.png")
        );
        assert_eq!(config.output_file(), PathBuf::from("/srv/site/lib/distances.json"));
    }

    #[test]
    fn default_output_name_follows_the_format() {
        let mut config = AppConfig {
            root_dir: PathBuf::from("/srv/site"),
            output_format: TableFormat::Csv,
            ..AppConfig::default()
        };
        assert_eq!(config.output_file(), PathBuf::from("/srv/site/lib/distances.csv"));

        config.output_file = Some(PathBuf::from("/tmp/table.txt"));
        assert_eq!(config.output_file(), PathBuf::from("/tmp/table.txt"));
    }

    #[test]
    fn yaml_overrides_only_what_it_names() {
        let raw = "root_dir: /data\nserver_id: eu3\nunreachable: zero\n\
                   workers: 3\noutput_format: csv\n";
        let config = AppConfig::from_yaml(raw, Path::new("test.yaml")).unwrap();

        assert_eq!(config.server_id, "eu3");
        assert_eq!(config.unreachable, UnreachablePolicy::Zero);
        assert_eq!(config.output_format, TableFormat::Csv);
        assert_eq!(config.worker_pool(), WorkerPool::with_workers(3));
        assert_eq!(config.water_threshold, 127);
        assert_eq!(config.api_dir(), PathBuf::from("/data/build/API"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_yaml("sever_id: eu3\n", Path::new("typo.yaml")).unwrap_err();
        assert!(matches!(err, DistanceError::ConfigParse { .. }));
    }

    #[test]
    fn explicit_date_is_validated() {
        let mut config = AppConfig {
            date: Some("2024-05-01".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.snapshot_date().unwrap(), "2024-05-01");

        config.date = Some("May 1st".to_string());
        assert!(config.snapshot_date().is_err());
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(matches!(err, DistanceError::ConfigRead { .. }));
    }
}
