use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A persisted entity with a stable identity.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human name used in error messages ("Group not found").
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
}

/// In-memory map mirroring one JSON file.
///
/// The whole file is read once on open and rewritten after every mutation.
/// The lock keeps the map and the file in step inside this process; nothing
/// coordinates with other processes writing the same file.
pub struct JsonTable<T> {
    path: PathBuf,
    rows: RwLock<BTreeMap<Uuid, T>>,
}

impl<T: Record> JsonTable<T> {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<Uuid, T>>(&bytes) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable table file; starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", path.display()));
            }
        };
        debug!(path = %path.display(), rows = rows.len(), entity = T::ENTITY, "table opened");
        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.values().find(|r| pred(*r)).cloned()
    }

    pub async fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .await
            .values()
            .filter(|r| pred(*r))
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    /// Insert a new row, failing when its id is taken or `conflict` matches
    /// an existing row.
    pub async fn insert_unless(
        &self,
        row: T,
        conflict: impl Fn(&T) -> bool,
        conflict_msg: &str,
    ) -> AppResult<T> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&row.id()) {
            return Err(AppError::validation(format!("{} already exists", T::ENTITY)));
        }
        if rows.values().any(|r| conflict(r)) {
            return Err(AppError::validation(conflict_msg));
        }
        rows.insert(row.id(), row.clone());
        self.flush(&rows).await?;
        Ok(row)
    }

    pub async fn insert(&self, row: T) -> AppResult<T> {
        self.insert_unless(row, |_| false, "").await
    }

    /// Replace a stored row wholesale.
    pub async fn update(&self, row: T) -> AppResult<T> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&row.id()) {
            Some(slot) => *slot = row.clone(),
            None => return Err(self.missing()),
        }
        self.flush(&rows).await?;
        Ok(row)
    }

    /// Read-modify-write a single row under the write lock. The row is left
    /// untouched when `f` fails.
    pub async fn modify(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut T) -> AppResult<()>,
    ) -> AppResult<T> {
        let mut rows = self.rows.write().await;
        let mut row = rows.get(&id).cloned().ok_or_else(|| self.missing())?;
        f(&mut row)?;
        rows.insert(id, row.clone());
        self.flush(&rows).await?;
        Ok(row)
    }

    /// `modify` that also refuses the change when the edited row conflicts
    /// with any other stored row. `f` runs first, so its errors win.
    pub async fn modify_unless(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut T) -> AppResult<()>,
        conflict: impl Fn(&T, &T) -> bool,
        conflict_msg: &str,
    ) -> AppResult<T> {
        let mut rows = self.rows.write().await;
        let mut row = rows.get(&id).cloned().ok_or_else(|| self.missing())?;
        f(&mut row)?;
        if rows.values().any(|other| other.id() != id && conflict(other, &row)) {
            return Err(AppError::validation(conflict_msg));
        }
        rows.insert(id, row.clone());
        self.flush(&rows).await?;
        Ok(row)
    }

    /// Apply `f` and then drop the row instead of saving it when `drop_if`
    /// holds, all under one write lock. Returns the row as last seen and
    /// whether it was dropped.
    pub async fn modify_or_remove(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut T) -> AppResult<()>,
        drop_if: impl FnOnce(&T) -> bool,
    ) -> AppResult<(T, bool)> {
        let mut rows = self.rows.write().await;
        let mut row = rows.get(&id).cloned().ok_or_else(|| self.missing())?;
        f(&mut row)?;
        let dropped = drop_if(&row);
        if dropped {
            rows.remove(&id);
        } else {
            rows.insert(id, row.clone());
        }
        self.flush(&rows).await?;
        Ok((row, dropped))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<T> {
        let mut rows = self.rows.write().await;
        let row = rows.remove(&id).ok_or_else(|| self.missing())?;
        self.flush(&rows).await?;
        Ok(row)
    }

    /// Drop every row matching `pred`; the file is only rewritten when
    /// something was removed.
    pub async fn remove_where(&self, pred: impl Fn(&T) -> bool) -> AppResult<usize> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, r| !pred(&*r));
        let removed = before - rows.len();
        if removed > 0 {
            self.flush(&rows).await?;
        }
        Ok(removed)
    }

    fn missing(&self) -> AppError {
        AppError::not_found(format!("{} not found", T::ENTITY))
    }

    async fn flush(&self, rows: &BTreeMap<Uuid, T>) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(rows).context("serialize table")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("write {}", self.path.display()))?;
        debug!(path = %self.path.display(), rows = rows.len(), "table flushed");
        Ok(())
    }
}
