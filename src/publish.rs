//! Secret lookup and object storage used around a parse run.
//!
//! Both are narrow traits so deployments can plug in their own backends.
//! The bundled implementations read secrets from the environment and
//! "upload" by copying into a local directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{metadata_path, ArinCredentials, PublishConfig};
use crate::metadata::RunMetadata;
use crate::{Error, Result};

/// Resolves a named secret to its value.
pub trait SecretSource {
    fn secret(&self, name: &str) -> Result<String>;
}

/// Stores a local file under `(bucket, key)`.
pub trait ObjectStore {
    fn upload(&self, local: &Path, bucket: &str, key: &str) -> Result<()>;
}

/// Secrets exposed as environment variables named after the secret.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn secret(&self, name: &str) -> Result<String> {
        std::env::var(name).map_err(|_| Error::Secret(name.to_string()))
    }
}

/// Object store rooted in a local directory: `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Destination path of an object.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key.trim_start_matches('/'))
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, local: &Path, bucket: &str, key: &str) -> Result<()> {
        let dest = self.object_path(bucket, key);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(local, &dest)?;
        log::info!("Uploaded {:?} to {:?}", local, dest);
        Ok(())
    }
}

/// Resolve the ARIN API key, consulting `secrets` when only a secret name is set.
///
/// A secret whose value is `NONE` counts as no key.
pub fn resolve_arin_key(
    credentials: &ArinCredentials,
    secrets: &dyn SecretSource,
) -> Result<Option<String>> {
    if let Some(key) = credentials.api_key() {
        return Ok(Some(key.to_string()));
    }
    let Some(name) = credentials.secret_name() else {
        return Ok(None);
    };
    let value = secrets.secret(name)?;
    let value = value.trim();
    if value.is_empty() || value == "NONE" {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}

/// Upload the TSV and its metadata document where configured.
///
/// Returns the metadata written, if any.
pub fn publish_outputs(
    store: &dyn ObjectStore,
    config: &PublishConfig,
    output: &Path,
    num_network_blocks: usize,
) -> Result<Option<RunMetadata>> {
    if let Some((bucket, key)) = config.data_target() {
        log::info!("Found storage configuration, uploading to desired path");
        store.upload(output, bucket, key)?;
    }

    let Some((bucket, key)) = config.metadata_target() else {
        return Ok(None);
    };
    log::info!("Found storage configuration, uploading metadata to desired path");
    let metadata = RunMetadata::now(config.system_version(), num_network_blocks);
    let path = metadata_path(output);
    metadata.save(&path)?;
    store.upload(&path, bucket, key)?;
    Ok(Some(metadata))
}
