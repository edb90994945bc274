//! Write-through mirroring of store state into a key-value surface.
//!
//! Reads never fail: a missing key, an unreadable value or a value that does
//! not parse all yield the caller's default. Writes never fail either; a
//! failed write is logged and the in-memory state stays authoritative.
use std::collections::HashSet;

use log::{debug, trace, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::{Item, KeyValueStore, Theme, UserProfile};

pub const FAVORITES_KEY: &str = "favorites";
pub const NEWS_KEY: &str = "newsBooks";
pub const LIBRARY_KEY: &str = "libraryBooks";
pub const PROJECTS_KEY: &str = "projects";
pub const USER_KEY: &str = "user";
pub const SELECTED_CLASS_KEY: &str = "selectedClass";
pub const THEME_KEY: &str = "theme";
pub const LAST_PAGE_KEY: &str = "lastPage";

/// Typed access to every persisted entity
pub struct PersistenceAdapter<S> {
    store: S,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn write_raw(&mut self, key: &str, value: &str) {
        match self.store.set(key, value) {
            Ok(()) => trace!("Persisted {}", key),
            Err(e) => warn!("Failed to persist {}: {}", key, e),
        }
    }

    /// Parses the JSON stored under `key`, `None` when absent or corrupt
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("Loaded {} from storage", key);
                Some(value)
            }
            Err(e) => {
                warn!("Ignoring unparsable value for {}: {}", key, e);
                None
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => warn!("Failed to serialize {}: {}", key, e),
        }
    }

    /// Favorites with duplicates dropped, first occurrence wins
    pub fn load_favorites(&self) -> Option<Vec<String>> {
        let mut favorites: Vec<String> = self.load_json(FAVORITES_KEY)?;
        let mut seen = HashSet::new();
        favorites.retain(|id| seen.insert(id.clone()));
        Some(favorites)
    }

    pub fn save_favorites(&mut self, favorites: &[String]) {
        self.save_json(FAVORITES_KEY, favorites);
    }

    /// Items stored under `key`, `None` unless every id is present and unique
    fn load_items(&self, key: &str) -> Option<Vec<Item>> {
        let items: Vec<Item> = self.load_json(key)?;
        let mut seen = HashSet::new();
        if let Some(bad) = items
            .iter()
            .find(|item| item.id.is_empty() || !seen.insert(item.id.as_str()))
        {
            warn!("Ignoring {}: missing or repeated item id {:?}", key, bad.id);
            return None;
        }
        Some(items)
    }

    pub fn load_news(&self) -> Option<Vec<Item>> {
        self.load_items(NEWS_KEY)
    }

    pub fn load_library(&self) -> Option<Vec<Item>> {
        self.load_items(LIBRARY_KEY)
    }

    pub fn load_projects(&self) -> Option<Vec<Item>> {
        self.load_items(PROJECTS_KEY)
    }

    pub fn save_collections(&mut self, news: &[Item], library: &[Item], projects: &[Item]) {
        self.save_json(NEWS_KEY, news);
        self.save_json(LIBRARY_KEY, library);
        self.save_json(PROJECTS_KEY, projects);
    }

    /// Outer `None`: nothing usable stored. `Some(None)`: signed out.
    pub fn load_user(&self) -> Option<Option<UserProfile>> {
        self.load_json(USER_KEY)
    }

    pub fn save_user(&mut self, user: Option<&UserProfile>) {
        self.save_json(USER_KEY, &user);
    }

    pub fn load_selected_class(&self) -> Option<String> {
        self.read_raw(SELECTED_CLASS_KEY)
            .map(|class| class.trim().to_lowercase())
            .filter(|class| !class.is_empty())
    }

    pub fn save_selected_class(&mut self, class: &str) {
        self.write_raw(SELECTED_CLASS_KEY, class);
    }

    pub fn load_theme(&self) -> Option<Theme> {
        let raw = self.read_raw(THEME_KEY)?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                warn!("Ignoring stored theme: {}", e);
                None
            }
        }
    }

    pub fn save_theme(&mut self, theme: Theme) {
        self.write_raw(THEME_KEY, theme.as_str());
    }

    pub fn load_last_page(&self) -> Option<String> {
        self.read_raw(LAST_PAGE_KEY).filter(|page| page.starts_with('/'))
    }

    pub fn save_last_page(&mut self, page: &str) {
        self.write_raw(LAST_PAGE_KEY, page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKvStore;

    fn adapter_with(key: &str, value: &str) -> PersistenceAdapter<MemoryKvStore> {
        let mut store = MemoryKvStore::new();
        store.set(key, value).unwrap();
        PersistenceAdapter::new(store)
    }

    #[test]
    fn corrupt_favorites_read_as_missing() {
        let adapter = adapter_with(FAVORITES_KEY, "{not json");
        assert_eq!(adapter.load_favorites(), None);
    }

    #[test]
    fn duplicate_favorites_are_collapsed() {
        let adapter = adapter_with(FAVORITES_KEY, r#"["a","b","a"]"#);
        assert_eq!(
            adapter.load_favorites(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn signed_out_user_is_distinct_from_missing() {
        let adapter = adapter_with(USER_KEY, "null");
        assert_eq!(adapter.load_user(), Some(None));

        let empty = PersistenceAdapter::new(MemoryKvStore::new());
        assert_eq!(empty.load_user(), None);
    }

    #[test]
    fn plain_string_values() {
        let mut adapter = PersistenceAdapter::new(MemoryKvStore::new());
        adapter.save_selected_class("isi");
        adapter.save_theme(Theme::Light);
        adapter.save_last_page("/bibliotheque");

        assert_eq!(
            adapter.store().get(THEME_KEY).unwrap().as_deref(),
            Some("light")
        );
        assert_eq!(adapter.load_selected_class().as_deref(), Some("isi"));
        assert_eq!(adapter.load_theme(), Some(Theme::Light));
        assert_eq!(adapter.load_last_page().as_deref(), Some("/bibliotheque"));
    }

    #[test]
    fn collections_without_ids_read_as_missing() {
        let adapter = adapter_with(
            NEWS_KEY,
            r#"[{"title":"a","type":"cours"},{"title":"b","type":"cours"}]"#,
        );
        assert_eq!(adapter.load_news(), None);

        let adapter = adapter_with(
            LIBRARY_KEY,
            r#"[{"id":"x","title":"a"},{"id":"x","title":"b"}]"#,
        );
        assert_eq!(adapter.load_library(), None);

        let adapter = adapter_with(PROJECTS_KEY, r#"[{"id":"p-0","name":"VLAN"}]"#);
        assert_eq!(adapter.load_projects().map(|items| items.len()), Some(1));
    }

    #[test]
    fn foreign_theme_is_ignored() {
        let adapter = adapter_with(THEME_KEY, "solarized");
        assert_eq!(adapter.load_theme(), None);
    }
}
