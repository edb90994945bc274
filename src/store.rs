use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{
    ingest, rank_by_relevance, Collection, DatasetCatalog, IdGenerator, Item, ItemKind,
    KeyValueStore, PersistenceAdapter, Publication, Repertoire, Section, Theme, UserProfile,
    UuidIds,
};

/// Owns the three collections and the favorites set.
///
/// The favorites set is the source of truth for likes: after every mutation
/// an item's `liked` flag is true exactly when its id is in the set. Every
/// mutation is written through to the persistence adapter before returning.
pub struct ContentStore<S> {
    /// Durable mirror of the state below
    persistence: PersistenceAdapter<S>,

    /// Seed data used when nothing usable is persisted
    catalog: DatasetCatalog,

    /// Source of identifiers for published items
    ids: Box<dyn IdGenerator>,

    default_class: String,
    default_theme: Theme,

    news: Vec<Item>,
    library: Vec<Item>,
    projects: Vec<Item>,

    /// Ordered, without duplicates
    favorites: Vec<String>,

    user: Option<UserProfile>,
    selected_class: String,
    theme: Theme,
    last_page: Option<String>,

    initialized: bool,
}

impl<S: KeyValueStore> ContentStore<S> {
    /// Creates an empty store; call [`ContentStore::initialize`] before use.
    pub fn new(store: S, catalog: DatasetCatalog) -> Self {
        Self {
            persistence: PersistenceAdapter::new(store),
            catalog,
            ids: Box::new(UuidIds),
            default_class: "isi".to_string(),
            default_theme: Theme::default(),
            news: Vec::new(),
            library: Vec::new(),
            projects: Vec::new(),
            favorites: Vec::new(),
            user: None,
            selected_class: "isi".to_string(),
            theme: Theme::default(),
            last_page: None,
            initialized: false,
        }
    }

    /// Replaces the identifier source for published items
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Fallbacks for the selected class and theme
    pub fn with_defaults(mut self, class: &str, theme: Theme) -> Self {
        self.default_class = class.to_lowercase();
        self.default_theme = theme;
        self
    }

    /// Loads every entity from storage, rebuilding collections from the
    /// seed datasets when missing or unreadable.
    ///
    /// State is replaced rather than merged, so calling this again against
    /// the same storage yields the same collections and favorites.
    pub fn initialize(&mut self) {
        if self.initialized {
            debug!("Reinitializing content store from storage");
        }

        self.favorites = self.persistence.load_favorites().unwrap_or_default();

        self.news = self.persistence.load_news().unwrap_or_else(|| {
            debug!("Building news collection from seed datasets");
            self.catalog.seed_news()
        });
        self.library = self.persistence.load_library().unwrap_or_else(|| {
            debug!("Building library collection from seed datasets");
            self.catalog.seed_library()
        });
        self.projects = self.persistence.load_projects().unwrap_or_else(|| {
            debug!("Building projects collection from seed datasets");
            self.catalog.seed_projects()
        });

        self.user = self
            .persistence
            .load_user()
            .unwrap_or_else(|| Some(UserProfile::default_profile()));
        self.selected_class = self
            .persistence
            .load_selected_class()
            .unwrap_or_else(|| self.default_class.clone());
        self.theme = self.persistence.load_theme().unwrap_or(self.default_theme);
        self.last_page = self.persistence.load_last_page();

        // Collections and favorites are separate keys and may disagree
        self.recompute_liked_projection();
        self.flush();

        self.initialized = true;
        info!(
            "Content store ready: {} news, {} library, {} projects, {} favorites",
            self.news.len(),
            self.library.len(),
            self.projects.len(),
            self.favorites.len()
        );
    }

    /// Writes every entity to storage
    pub fn flush(&mut self) {
        self.persistence.save_favorites(&self.favorites);
        self.save_collections();
        self.persistence.save_user(self.user.as_ref());
        self.persistence.save_selected_class(&self.selected_class);
        self.persistence.save_theme(self.theme);
        if let Some(page) = &self.last_page {
            self.persistence.save_last_page(page);
        }
    }

    fn save_collections(&mut self) {
        self.persistence
            .save_collections(&self.news, &self.library, &self.projects);
    }

    /// Sets every item's `liked` flag from favorites membership
    pub fn recompute_liked_projection(&mut self) {
        let favorites: HashSet<&str> = self.favorites.iter().map(String::as_str).collect();
        for item in self
            .news
            .iter_mut()
            .chain(self.library.iter_mut())
            .chain(self.projects.iter_mut())
        {
            item.liked = favorites.contains(item.id.as_str());
        }
    }

    /// Flips `item_id` in the favorites set.
    ///
    /// Returns the new liked state, or `None` (and changes nothing) when no
    /// item has that id.
    pub fn toggle_favorite(&mut self, item_id: &str) -> Option<bool> {
        if self.get_item(item_id).is_none() {
            debug!("Ignoring favorite toggle for unknown item {}", item_id);
            return None;
        }

        let liked = match self.favorites.iter().position(|id| id == item_id) {
            Some(pos) => {
                self.favorites.remove(pos);
                false
            }
            None => {
                self.favorites.push(item_id.to_string());
                true
            }
        };

        self.recompute_liked_projection();
        self.persistence.save_favorites(&self.favorites);
        self.save_collections();

        debug!("Item {} liked: {}", item_id, liked);
        Some(liked)
    }

    /// Favorited item ids, in insertion order
    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn collection(&self, collection: Collection) -> &[Item] {
        match collection {
            Collection::News => &self.news,
            Collection::Library => &self.library,
            Collection::Projects => &self.projects,
        }
    }

    fn collection_mut(&mut self, collection: Collection) -> &mut Vec<Item> {
        match collection {
            Collection::News => &mut self.news,
            Collection::Library => &mut self.library,
            Collection::Projects => &mut self.projects,
        }
    }

    fn all_items(&self) -> impl Iterator<Item = &Item> + Clone + '_ {
        self.news
            .iter()
            .chain(self.library.iter())
            .chain(self.projects.iter())
    }

    pub fn get_item(&self, item_id: &str) -> Option<&Item> {
        self.all_items().find(|item| item.id == item_id)
    }

    /// Every item of a section regardless of class, News before Library
    fn section_items(&self, section: Section) -> impl Iterator<Item = &Item> + Clone + '_ {
        let empty: &[Item] = &[];
        let (first, second) = match section {
            Section::Course | Section::Book => (self.news.as_slice(), self.library.as_slice()),
            Section::PracticalWork | Section::Exam => (empty, self.library.as_slice()),
            Section::Tutorial => (empty, self.projects.as_slice()),
        };
        let kind = ItemKind::from(section);

        first
            .iter()
            .chain(second.iter())
            .filter(move |item| section == Section::Tutorial || item.kind == kind)
    }

    /// Items of `section` for `class` (case-insensitive), merged across
    /// collections. The iterator is lazy and can be cloned to restart.
    pub fn query_by_section(
        &self,
        section: Section,
        class: &str,
    ) -> impl Iterator<Item = &Item> + Clone + '_ {
        let class = class.to_lowercase();
        self.section_items(section)
            .filter(move |item| item.in_class(&class))
    }

    /// Favorited items of `section` for `class`
    pub fn favorites_by_section(
        &self,
        section: Section,
        class: &str,
    ) -> impl Iterator<Item = &Item> + Clone + '_ {
        self.query_by_section(section, class)
            .filter(|item| item.liked)
    }

    /// Items of `section` authored by `author`, across every class
    pub fn publications_by<'a>(
        &'a self,
        author: &'a str,
        section: Section,
    ) -> impl Iterator<Item = &'a Item> + Clone + 'a {
        self.section_items(section)
            .filter(move |item| item.auteur.as_deref() == Some(author))
    }

    /// Ranked fuzzy search over every collection
    pub fn search(&self, query: &str) -> Vec<&Item> {
        rank_by_relevance(self.all_items(), query)
    }

    /// Validates and appends a user-authored item.
    ///
    /// Returns the new item's id, or `None` when the publication is invalid
    /// or nobody is signed in.
    pub fn add_item(&mut self, publication: Publication) -> Option<String> {
        let Some(author) = self.user.as_ref().map(|user| user.name.clone()) else {
            warn!("Cannot publish while signed out");
            return None;
        };

        let (news, library, projects, favorites) =
            (&self.news, &self.library, &self.projects, &self.favorites);
        let is_taken = |id: &str| {
            news.iter()
                .chain(library.iter())
                .chain(projects.iter())
                .any(|item| item.id == id)
                || favorites.iter().any(|fav| fav == id)
        };

        let (collection, item) = ingest(publication, &author, self.ids.as_mut(), is_taken)?;
        let id = item.id.clone();

        info!("Publishing {} item {} into {}", item.kind, id, collection);
        self.collection_mut(collection).push(item);
        self.save_collections();

        Some(id)
    }

    /// The signed-in profile, if any
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Replaces the signed-in profile and persists it
    pub fn sign_in(&mut self, profile: UserProfile) {
        info!("Signed in as {}", profile.name);
        self.user = Some(profile);
        self.persistence.save_user(self.user.as_ref());
    }

    /// Clears the signed-in profile and persists the signed-out state
    pub fn sign_out(&mut self) {
        self.user = None;
        self.persistence.save_user(None);
    }

    /// Class label used when a command names none
    pub fn selected_class(&self) -> &str {
        &self.selected_class
    }

    /// Stores a new selected class, lower-cased
    pub fn set_selected_class(&mut self, class: &str) {
        self.selected_class = class.trim().to_lowercase();
        self.persistence.save_selected_class(&self.selected_class);
    }

    /// Current display theme
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switches between dark and light and returns the new theme
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.persistence.save_theme(self.theme);
        self.theme
    }

    /// Last visited page path, if one was recorded
    pub fn last_page(&self) -> Option<&str> {
        self.last_page.as_deref()
    }

    /// Records the last visited page path
    pub fn set_last_page(&mut self, page: &str) {
        self.last_page = Some(page.to_string());
        self.persistence.save_last_page(page);
    }

    /// Class datasets the seeds were built from
    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }

    /// Document counts per header, summed across classes
    pub fn repertoire_stats(&self) -> Vec<Repertoire> {
        self.catalog.repertoire_stats()
    }

    /// Typed view of the underlying key-value store
    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Flushes and hands back the underlying key-value store
    pub fn into_store(mut self) -> S {
        self.flush();
        self.persistence.into_inner()
    }
}
