// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registered reviewers, persisted to `reviewers.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use shortreel_core::types::{ChatId, Reviewer};
use shortreel_queue::persistent::{load_items, save_items};
use tracing::{info, warn};

/// File name of the reviewer registry inside the data directory.
pub const REVIEWERS_FILE: &str = "reviewers.json";

/// Mapping from chat id to [`Reviewer`].
///
/// Writes persist synchronously while the write lock is held, so the file
/// never lags behind a returned call. Persistence failures are logged.
#[derive(Debug)]
pub struct ReviewerRegistry {
    path: PathBuf,
    reviewers: RwLock<HashMap<ChatId, Reviewer>>,
}

impl ReviewerRegistry {
    /// Loads the registry. A missing or corrupted file yields no reviewers.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(REVIEWERS_FILE);
        let reviewers: HashMap<ChatId, Reviewer> = load_items::<Reviewer>("reviewers", &path)
            .into_iter()
            .map(|r| (r.chat_id, r))
            .collect();

        if !reviewers.is_empty() {
            info!(count = reviewers.len(), "loaded reviewers");
        }

        Self {
            path,
            reviewers: RwLock::new(reviewers),
        }
    }

    /// Adds `reviewer` unless its chat id is already registered.
    /// Returns `true` when the reviewer was new.
    pub fn register(&self, reviewer: Reviewer) -> bool {
        let mut reviewers = self.reviewers.write().unwrap_or_else(PoisonError::into_inner);
        if reviewers.contains_key(&reviewer.chat_id) {
            return false;
        }
        info!(chat_id = reviewer.chat_id, name = reviewer.name.as_str(), "reviewer registered");
        reviewers.insert(reviewer.chat_id, reviewer);
        self.persist(&reviewers);
        true
    }

    /// Removes the reviewer for `chat_id`. Returns `true` if one existed.
    pub fn remove(&self, chat_id: ChatId) -> bool {
        let mut reviewers = self.reviewers.write().unwrap_or_else(PoisonError::into_inner);
        let removed = reviewers.remove(&chat_id).is_some();
        if removed {
            info!(chat_id, "reviewer removed");
            self.persist(&reviewers);
        }
        removed
    }

    pub fn contains(&self, chat_id: ChatId) -> bool {
        self.reviewers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&chat_id)
    }

    /// Chat ids of every reviewer, ascending.
    pub fn chat_ids(&self) -> Vec<ChatId> {
        self.list().into_iter().map(|r| r.chat_id).collect()
    }

    /// Every reviewer, ordered by chat id.
    pub fn list(&self) -> Vec<Reviewer> {
        let reviewers = self.reviewers.read().unwrap_or_else(PoisonError::into_inner);
        sorted(&reviewers)
    }

    pub fn len(&self) -> usize {
        self.reviewers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, reviewers: &HashMap<ChatId, Reviewer>) {
        if let Err(e) = save_items(&self.path, &sorted(reviewers)) {
            warn!(error = %e, "failed to persist reviewers");
        }
    }
}

fn sorted(reviewers: &HashMap<ChatId, Reviewer>) -> Vec<Reviewer> {
    let mut list: Vec<Reviewer> = reviewers.values().cloned().collect();
    list.sort_by_key(|r| r.chat_id);
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewer(chat_id: ChatId, name: &str) -> Reviewer {
        Reviewer {
            chat_id,
            name: name.into(),
            username: None,
        }
    }

    #[test]
    fn register_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ReviewerRegistry::open(dir.path());
        assert!(registry.register(reviewer(999, "Ann")));
        assert!(!registry.register(reviewer(999, "Ann again")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list()[0].name, "Ann");
    }

    #[test]
    fn registry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let registry = ReviewerRegistry::open(dir.path());
            registry.register(reviewer(3, "C"));
            registry.register(reviewer(1, "A"));
            registry.register(reviewer(2, "B"));
            registry.remove(2);
        }
        let registry = ReviewerRegistry::open(dir.path());
        assert_eq!(registry.chat_ids(), vec![1, 3]);

        let raw = std::fs::read_to_string(dir.path().join(REVIEWERS_FILE)).unwrap();
        assert!(raw.starts_with("[\n  {"), "expected pretty JSON array, got {raw}");
    }

    #[test]
    fn remove_unknown_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ReviewerRegistry::open(dir.path());
        assert!(!registry.remove(42));
        assert!(!dir.path().join(REVIEWERS_FILE).exists());
    }

    #[test]
    fn corrupted_file_yields_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REVIEWERS_FILE), "{ not json").unwrap();
        let registry = ReviewerRegistry::open(dir.path());
        assert!(registry.is_empty());

        // The next write replaces the corrupted file.
        registry.register(reviewer(1, "A"));
        assert_eq!(ReviewerRegistry::open(dir.path()).chat_ids(), vec![1]);
    }
}
