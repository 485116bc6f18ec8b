//! Reconciliation settings
//!
//! Every field has a default matching the delivered data, so an empty YAML
//! document (or no file at all) is a valid configuration.

use crate::graph::SourceTag;
use crate::loader::ROADMAP_FILE;
use crate::repair::{CorrectionTable, Repairer, RoleRules};
use crate::temporal::TemporalNormalizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// File names of the input documents, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub journalist: String,
    #[serde(rename = "FILAH")]
    pub filah: String,
    #[serde(rename = "TROUT")]
    pub trout: String,
    pub roadmap: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            journalist: format!("{}.json", SourceTag::Journalist),
            filah: format!("{}.json", SourceTag::Filah),
            trout: format!("{}.json", SourceTag::Trout),
            roadmap: ROADMAP_FILE.to_string(),
        }
    }
}

impl DataFiles {
    pub fn source(&self, tag: SourceTag) -> &str {
        match tag {
            SourceTag::Journalist => &self.journalist,
            SourceTag::Filah => &self.filah,
            SourceTag::Trout => &self.trout,
        }
    }

    pub fn source_path(&self, data_dir: &Path, tag: SourceTag) -> PathBuf {
        data_dir.join(self.source(tag))
    }

    pub fn roadmap_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.roadmap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub files: DataFiles,
    /// Source the consistency report measures coverage against
    pub reference_source: SourceTag,
    /// Attribute whose presence marks a node as a place
    pub coordinate_key: String,
    /// Source the correction table applies to
    pub correction_source: SourceTag,
    pub corrections: CorrectionTable,
    pub role_rules: RoleRules,
    /// Node and edge attributes holding a date
    pub date_fields: Vec<String>,
    /// Node and edge attributes holding a date and time
    pub datetime_fields: Vec<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            files: DataFiles::default(),
            reference_source: SourceTag::Journalist,
            coordinate_key: "lat".to_string(),
            correction_source: SourceTag::Journalist,
            corrections: CorrectionTable::builtin(),
            role_rules: RoleRules::builtin(),
            date_fields: vec!["date".to_string()],
            datetime_fields: vec!["time".to_string()],
        }
    }
}

impl ReconcileConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn repairer(&self) -> Repairer {
        Repairer::new()
            .with_coordinate_key(self.coordinate_key.clone())
            .with_corrections(self.correction_source, self.corrections.clone())
            .with_role_rules(self.role_rules.clone())
    }

    pub fn normalizer(&self) -> TemporalNormalizer {
        TemporalNormalizer::new(self.date_fields.clone(), self.datetime_fields.clone())
    }
}
