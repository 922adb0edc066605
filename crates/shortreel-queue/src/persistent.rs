// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic bounded FIFO mirrored to a JSON file.
//!
//! The in-memory vector is the source of truth while the process runs.
//! After every mutation the whole vector is rewritten as a pretty-printed
//! JSON array (write to a temp file, then rename). Write failures are
//! logged and do not roll back the in-memory state.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use shortreel_core::ShortreelError;
use tracing::{debug, warn};

/// A bounded, ordered, durable sequence of `T`.
///
/// All operations take a single per-queue lock; readers use the shared
/// side. Closures passed to [`update`](Self::update) and the predicate
/// helpers run under that lock and must not call back into the queue.
#[derive(Debug)]
pub struct PersistentQueue<T> {
    name: String,
    path: PathBuf,
    capacity: usize,
    items: RwLock<Vec<T>>,
}

impl<T> PersistentQueue<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Opens the queue stored at `data_dir/file_name`.
    ///
    /// A missing file yields an empty queue. An unreadable or unparseable
    /// file is logged and also yields an empty queue.
    pub fn open(
        name: impl Into<String>,
        data_dir: &Path,
        file_name: &str,
        capacity: usize,
    ) -> Self {
        let name = name.into();
        let path = data_dir.join(file_name);
        let items: Vec<T> = load_items(&name, &path);

        if items.len() > capacity {
            warn!(
                queue = name.as_str(),
                len = items.len(),
                capacity,
                "loaded queue exceeds capacity; adds are rejected until it drains"
            );
        }

        debug!(
            queue = name.as_str(),
            path = %path.display(),
            len = items.len(),
            "queue opened"
        );

        Self {
            name,
            path,
            capacity,
            items: RwLock::new(items),
        }
    }

    /// Queue name used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `item`, returning the new length.
    pub fn add(&self, item: T) -> Result<usize, ShortreelError> {
        self.modify(|items| {
            if items.len() >= self.capacity {
                return Err(self.full_error());
            }
            items.push(item);
            Ok(items.len())
        })
    }

    /// Removes and returns the head.
    pub fn pop(&self) -> Result<T, ShortreelError> {
        self.modify(|items| {
            if items.is_empty() {
                Err(self.empty_error())
            } else {
                Ok(items.remove(0))
            }
        })
    }

    /// Returns a copy of the head without removing it.
    pub fn peek(&self) -> Result<T, ShortreelError> {
        self.read()
            .first()
            .cloned()
            .ok_or_else(|| self.empty_error())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.read().len() >= self.capacity
    }

    /// Returns a snapshot copy of every item in order.
    pub fn list(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn clear(&self) {
        self.modify(|items| items.clear());
    }

    /// Atomically replaces the contents with `f(current)`.
    ///
    /// Results longer than the capacity are truncated (and logged) so the
    /// bound always holds.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(Vec<T>) -> Vec<T>,
    {
        self.modify(|items| {
            let mut next = f(std::mem::take(items));
            if next.len() > self.capacity {
                warn!(
                    queue = self.name.as_str(),
                    len = next.len(),
                    capacity = self.capacity,
                    "update exceeded capacity, truncating"
                );
                next.truncate(self.capacity);
            }
            *items = next;
        });
    }

    /// Returns a copy of the first item matching `pred`.
    pub fn find_first<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().iter().find(|item| pred(item)).cloned()
    }

    /// Removes and returns the first item matching `pred`.
    pub fn find_and_remove<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.modify(|items| {
            let index = items.iter().position(|item| pred(item))?;
            Some(items.remove(index))
        })
    }

    /// Runs `f` on the contents under the write lock, then persists.
    ///
    /// The write is synchronous and happens with the lock held, so async
    /// callers block their worker for one small file write. Files are
    /// bounded by the queue capacity.
    pub(crate) fn modify<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut items = self.write();
        let result = f(&mut items);
        if let Err(e) = save_items(&self.path, &items) {
            warn!(
                queue = self.name.as_str(),
                error = %e,
                "failed to persist queue; in-memory state remains authoritative"
            );
        }
        result
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn full_error(&self) -> ShortreelError {
        ShortreelError::QueueFull {
            queue: self.name.clone(),
            capacity: self.capacity,
        }
    }

    pub(crate) fn empty_error(&self) -> ShortreelError {
        ShortreelError::QueueEmpty {
            queue: self.name.clone(),
        }
    }
}

/// Reads a JSON array from `path`.
///
/// Missing, unreadable and corrupted files all yield an empty vector; the
/// latter two are logged under `name`.
pub fn load_items<T: DeserializeOwned>(name: &str, path: &Path) -> Vec<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(queue = name, path = %path.display(), error = %e, "failed to read state file, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => items,
        Err(e) => {
            warn!(queue = name, path = %path.display(), error = %e, "corrupted state file, starting empty");
            Vec::new()
        }
    }
}

/// Writes `items` to `path` as a pretty-printed JSON array via a temp file
/// and rename, creating the parent directory if needed.
pub fn save_items<T: Serialize>(path: &Path, items: &[T]) -> Result<(), ShortreelError> {
    let persistence = |message: String, e: Box<dyn std::error::Error + Send + Sync>| {
        ShortreelError::Persistence {
            message,
            source: Some(e),
        }
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            persistence(format!("failed to create {}", parent.display()), Box::new(e))
        })?;
    }

    let json = serde_json::to_vec_pretty(items)
        .map_err(|e| persistence("failed to serialize items".into(), Box::new(e)))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .map_err(|e| persistence(format!("failed to write {}", tmp.display()), Box::new(e)))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| persistence(format!("failed to replace {}", path.display()), Box::new(e)))?;
    Ok(())
}
