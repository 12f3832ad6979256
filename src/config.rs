//! Run configuration.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Directory dump files are read from when none is given.
pub const DEFAULT_DATABASE_DIR: &str = "./databases";

/// Dump files in processing order.
///
/// `arin_db.txt` is ARIN's bulk WHOIS export in its flat format; every
/// other file is RPSL.
pub const DEFAULT_FILES: &[&str] = &[
    "arin_db.txt",
    "afrinic.db.gz",
    "apnic.db.inet6num.gz",
    "apnic.db.inetnum.gz",
    "apnic.db.route-set.gz",
    "apnic.db.route.gz",
    "apnic.db.route6.gz",
    "lacnic.db.gz",
    "lacnic_irr.db.gz",
    "ripe.db.inetnum.gz",
    "ripe.db.inet6num.gz",
    "ripe.db.route-set.gz",
    "ripe.db.route.gz",
    "ripe.db.route6.gz",
    "arin.db.gz",
    "arin-nonauth.db.gz",
    "level3.db.gz",
    "nttcom.db.gz",
    "radb.db.gz",
    "tc.db.gz",
    "reach.db.gz",
    "wcgdb.db.gz",
    "jpirr.db.gz",
];

/// Which dump files to parse and where to find them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Directory holding the dump files
    pub database_dir: PathBuf,
    /// File names, parsed in this order
    pub files: Vec<String>,
}

impl ParserConfig {
    /// Create a config for `database_dir` with the default file list.
    pub fn new(database_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_dir: database_dir.into(),
            files: DEFAULT_FILES.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Replace the file list. An empty list keeps the defaults.
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        if !files.is_empty() {
            self.files = files;
        }
        self
    }

    /// Reject configurations that cannot name a single dump file.
    ///
    /// A directory that does not exist yet is accepted; its files are
    /// reported missing one by one.
    pub fn validate(&self) -> Result<()> {
        if self.database_dir.as_os_str().is_empty() {
            return Err(Error::Config("database directory is empty".into()));
        }
        if self.database_dir.exists() && !self.database_dir.is_dir() {
            return Err(Error::Config(format!(
                "{} is not a directory",
                self.database_dir.display()
            )));
        }
        if let Some(file) = self.files.iter().find(|f| f.trim().is_empty()) {
            return Err(Error::Config(format!("invalid dump file name {:?}", file)));
        }
        if self.files.is_empty() {
            return Err(Error::Config("no dump files configured".into()));
        }
        Ok(())
    }

    /// Full path of a configured file.
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.database_dir.join(file)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_DIR)
    }
}

/// Where run outputs are published after a successful parse.
///
/// Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishConfig {
    pub system_version: Option<String>,
    pub bucket: Option<String>,
    /// Key the TSV is uploaded under
    pub data_key: Option<String>,
    /// Key the metadata document is uploaded under
    pub metadata_key: Option<String>,
}

impl PublishConfig {
    /// `(bucket, key)` for the TSV upload, if configured.
    pub fn data_target(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.bucket)?, non_empty(&self.data_key)?))
    }

    /// `(bucket, key)` for the metadata upload, if configured.
    pub fn metadata_target(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.bucket)?, non_empty(&self.metadata_key)?))
    }

    pub fn system_version(&self) -> Option<&str> {
        non_empty(&self.system_version)
    }
}

/// Credential used by the dump downloader for ARIN's bulk WHOIS.
///
/// A literal key wins; otherwise the key is looked up by secret name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArinCredentials {
    pub api_key: Option<String>,
    pub secret_name: Option<String>,
}

impl ArinCredentials {
    pub fn api_key(&self) -> Option<&str> {
        non_empty(&self.api_key)
    }

    pub fn secret_name(&self) -> Option<&str> {
        non_empty(&self.secret_name)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Name used for the metadata document next to the output file.
pub fn metadata_path(output: &Path) -> PathBuf {
    output
        .parent()
        .map(|dir| dir.join("metadata.json"))
        .unwrap_or_else(|| PathBuf::from("metadata.json"))
}
