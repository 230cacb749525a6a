use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::{OptionRecord, Slug};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::OptionBackend;
use crate::errors::ServiceError;

/// JSON file-backed option storage.
///
/// Keeps every `slug -> record` pair in memory and rewrites the whole file
/// after each mutation. Intended for small option sets where a database is overkill.
pub struct JsonFileBackend {
    inner: RwLock<BTreeMap<Slug, OptionRecord>>,
    file_path: PathBuf,
}

fn storage_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

impl JsonFileBackend {
    /// Open the store at `path`. Creates the file with an empty map if missing;
    /// an unreadable or corrupt file is an error rather than a silent reset.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(storage_err)?;
            }
        }

        let map: BTreeMap<Slug, OptionRecord> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Storage(format!("{}: {}", file_path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: BTreeMap<Slug, OptionRecord> = BTreeMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(storage_err)?)
                    .await
                    .map_err(storage_err)?;
                empty
            }
            Err(e) => return Err(storage_err(e)),
        };

        debug!(path = %file_path.display(), slugs = map.len(), "option file loaded");
        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    pub fn path(&self) -> &std::path::Path { &self.file_path }

    /// Write to a sibling temp file, then rename it over the store file.
    async fn save(&self, map: &BTreeMap<Slug, OptionRecord>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(storage_err)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(storage_err)?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(storage_err(e));
        }
        Ok(())
    }
}

#[async_trait]
impl OptionBackend for JsonFileBackend {
    async fn read(&self, slug: &Slug) -> Result<Option<OptionRecord>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(slug).cloned())
    }

    async fn write(&self, slug: &Slug, record: OptionRecord) -> Result<(), ServiceError> {
        // hold the write lock across the save so file order matches memory order
        let mut map = self.inner.write().await;
        let previous = map.insert(slug.clone(), record);
        if let Err(e) = self.save(&map).await {
            match previous {
                Some(prev) => map.insert(slug.clone(), prev),
                None => map.remove(slug),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, slug: &Slug) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(removed) = map.remove(slug) else {
            return Ok(false);
        };
        if let Err(e) = self.save(&map).await {
            map.insert(slug.clone(), removed);
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("options_json_{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_file_backend_persists_across_reopen() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let backend = JsonFileBackend::open(&tmp).await?;
        let a = Slug::new("plugin_a")?;
        let b = Slug::new("plugin_b")?;

        backend.write(&a, [("color", json!("red"))].into_iter().collect()).await?;
        backend.write(&b, [("size", json!(3))].into_iter().collect()).await?;
        assert!(backend.delete(&b).await?);

        let reloaded = JsonFileBackend::open(&tmp).await?;
        let rec = reloaded.read(&a).await?.expect("record a");
        assert_eq!(rec.get("color"), Some(&json!("red")));
        assert!(reloaded.read(&b).await?.is_none());

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, b"{not json").await?;
        let err = JsonFileBackend::open(&tmp).await.err().expect("must fail");
        assert!(matches!(err, ServiceError::Storage(_)));
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_memory_untouched() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let backend = JsonFileBackend::open(&tmp).await?;
        let kept = Slug::new("kept")?;
        let fresh = Slug::new("fresh")?;
        backend.write(&kept, [("a", json!(1))].into_iter().collect()).await?;

        // a directory in place of the store file makes the rename fail
        fs::remove_file(&tmp).await?;
        fs::create_dir(&tmp).await?;

        let err = backend.write(&fresh, [("a", json!(1))].into_iter().collect()).await.err().expect("write must fail");
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(backend.read(&fresh).await?.is_none());

        assert!(backend.write(&kept, [("a", json!(2))].into_iter().collect()).await.is_err());
        assert_eq!(backend.read(&kept).await?.and_then(|r| r.get("a").cloned()), Some(json!(1)));

        assert!(backend.delete(&kept).await.is_err());
        assert!(backend.read(&kept).await?.is_some());
        assert!(!tmp.with_extension("json.tmp").exists());

        fs::remove_dir(&tmp).await?;
        Ok(())
    }

    #[tokio::test]
    async fn save_replaces_file_without_leftovers() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let backend = JsonFileBackend::open(&tmp).await?;
        backend.write(&Slug::new("a")?, [("x", json!(true))].into_iter().collect()).await?;
        assert!(!tmp.with_extension("json.tmp").exists());
        let on_disk: BTreeMap<Slug, OptionRecord> = serde_json::from_slice(&fs::read(&tmp).await?)?;
        assert_eq!(on_disk.len(), 1);
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_slug_in_file_is_rejected() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, br#"{"bad slug": {"a": 1}}"#).await?;
        assert!(JsonFileBackend::open(&tmp).await.is_err());
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }
}
