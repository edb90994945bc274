//! Static per-class seed datasets.
//!
//! Each class lives in `<class>.json` inside the datasets directory:
//!
//! ```json
//! {
//!   "news": [ { "title": "...", "type": "cours" } ],
//!   "bibliotheque": { "cours": [ ... ], "tdtp": [ ... ] },
//!   "projets": { "web": [ { "name": "...", "url": "..." } ] },
//!   "repertoires": [ { "header": { "name": "Cours", "icon": "BookIcon" },
//!                      "contents": [ { "name": "Algèbre", "count": 4 } ] } ]
//! }
//! ```
//!
//! Section order inside `bibliotheque` and `projets` is kept as written.
use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use log::{debug, error, info, warn};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use walkdir::WalkDir;

use crate::{Item, ItemKind, Result, ShelfError};

/// Headers summed by [`DatasetCatalog::repertoire_stats`], in display order
pub const REPERTOIRE_HEADERS: [(&str, &str); 3] = [
    ("Cours", "BookIcon"),
    ("TD & TP", "TDIcon"),
    ("Examens", "FolderIcon"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepertoireHeader {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepertoireEntry {
    pub name: String,
    pub count: u64,
}

/// Per-section document counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repertoire {
    pub header: RepertoireHeader,
    #[serde(default)]
    pub contents: Vec<RepertoireEntry>,
}

/// Named sections in file order
pub type Sections = Vec<(String, Vec<Item>)>;

/// Seed content of one class
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDataset {
    #[serde(default)]
    pub news: Vec<Item>,
    #[serde(default, deserialize_with = "ordered_sections")]
    pub bibliotheque: Sections,
    #[serde(default, deserialize_with = "ordered_sections")]
    pub projets: Sections,
    #[serde(default)]
    pub repertoires: Vec<Repertoire>,
}

fn ordered_sections<'de, D>(deserializer: D) -> std::result::Result<Sections, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let items = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("section {}: {}", key, e)))?;
            Ok((key, items))
        })
        .collect()
}

/// Every known class dataset, in catalog order
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    classes: Vec<(String, ClassDataset)>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the dataset for `class`, keeping its position
    pub fn insert(&mut self, class: &str, dataset: ClassDataset) {
        let class = class.to_lowercase();
        match self.classes.iter_mut().find(|(name, _)| *name == class) {
            Some(slot) => slot.1 = dataset,
            None => self.classes.push((class, dataset)),
        }
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, class: &str) -> Option<&ClassDataset> {
        let class = class.to_lowercase();
        self.classes
            .iter()
            .find(|(name, _)| *name == class)
            .map(|(_, dataset)| dataset)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Loads every `*.json` file of `dir`.
    ///
    /// Classes listed in `known_classes` come first in that order, any other
    /// file follows alphabetically. Files that fail to parse are skipped.
    pub fn load_dir(dir: &Path, known_classes: &[String]) -> Result<Self> {
        if !dir.exists() {
            warn!(
                "Datasets directory {} does not exist, starting without seed data",
                dir.display()
            );
            return Ok(Self::new());
        }
        if !dir.is_dir() {
            return Err(ShelfError::DirectoryError {
                path: dir.to_path_buf(),
            });
        }

        let mut loaded: HashMap<String, ClassDataset> = HashMap::new();
        let mut load_errors = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !(path.is_file() && path.extension().is_some_and(|ext| ext == "json")) {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let class = stem.to_string_lossy().to_lowercase();

            match Self::load_file(&class, path) {
                Ok(dataset) => {
                    loaded.insert(class, dataset);
                }
                Err(e) => {
                    warn!("Skipping dataset {}: {}", path.display(), e);
                    load_errors.push(e);
                }
            }
        }

        if !load_errors.is_empty() {
            error!(
                "Encountered {} errors while loading datasets",
                load_errors.len()
            );
        }

        let mut catalog = Self::new();
        for class in known_classes {
            let class = class.to_lowercase();
            match loaded.remove(&class) {
                Some(dataset) => catalog.insert(&class, dataset),
                None => debug!("No dataset for class {}", class),
            }
        }
        let mut rest: Vec<_> = loaded.into_iter().collect();
        rest.sort_by(|a, b| a.0.cmp(&b.0));
        for (class, dataset) in rest {
            catalog.insert(&class, dataset);
        }

        info!(
            "Loaded {} class datasets from {}",
            catalog.len(),
            dir.display()
        );
        Ok(catalog)
    }

    fn load_file(class: &str, path: &Path) -> Result<ClassDataset> {
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to open dataset file {}: {}", path.display(), e);
            ShelfError::Io(e)
        })?;
        serde_json::from_str(&content).map_err(|e| ShelfError::DatasetError {
            class: class.to_string(),
            message: e.to_string(),
        })
    }

    /// News seed items, ids `{class}-news-{index}`
    pub fn seed_news(&self) -> Vec<Item> {
        self.classes
            .iter()
            .flat_map(|(class, data)| {
                data.news
                    .iter()
                    .enumerate()
                    .map(move |(index, item)| seed_item(item, class, "news", index, None))
            })
            .collect()
    }

    /// Library seed items, typed by their section key
    pub fn seed_library(&self) -> Vec<Item> {
        self.classes
            .iter()
            .flat_map(|(class, data)| {
                data.bibliotheque.iter().flat_map(move |(section, items)| {
                    items.iter().enumerate().map(move |(index, item)| {
                        let kind = ItemKind::from(section.clone());
                        seed_item(item, class, section, index, Some(kind))
                    })
                })
            })
            .collect()
    }

    /// Tutorial seed items, always typed `tutos`
    pub fn seed_projects(&self) -> Vec<Item> {
        self.classes
            .iter()
            .flat_map(|(class, data)| {
                data.projets.iter().flat_map(move |(section, items)| {
                    items.iter().enumerate().map(move |(index, item)| {
                        seed_item(item, class, section, index, Some(ItemKind::Tutorial))
                    })
                })
            })
            .collect()
    }

    /// Sums repertoire counts across classes for the known headers
    pub fn repertoire_stats(&self) -> Vec<Repertoire> {
        REPERTOIRE_HEADERS
            .iter()
            .map(|(header, icon)| {
                let mut contents: Vec<RepertoireEntry> = Vec::new();
                let sections = self
                    .classes
                    .iter()
                    .flat_map(|(_, data)| data.repertoires.iter())
                    .filter(|rep| rep.header.name == *header);

                for section in sections {
                    for entry in &section.contents {
                        match contents.iter_mut().find(|c| c.name == entry.name) {
                            Some(total) => total.count += entry.count,
                            None => contents.push(entry.clone()),
                        }
                    }
                }

                Repertoire {
                    header: RepertoireHeader {
                        name: header.to_string(),
                        icon: icon.to_string(),
                    },
                    contents,
                }
            })
            .collect()
    }
}

fn seed_item(
    item: &Item,
    class: &str,
    section: &str,
    index: usize,
    kind: Option<ItemKind>,
) -> Item {
    let mut seeded = item.clone();
    if seeded.id.is_empty() {
        seeded.id = format!("{}-{}-{}", class, section, index);
    }
    if let Some(kind) = kind {
        seeded.kind = kind;
    }
    seeded.classe = class.to_lowercase();
    seeded.liked = false;
    seeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(value: serde_json::Value) -> ClassDataset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn library_sections_keep_file_order() {
        let data = dataset(json!({
            "bibliotheque": {
                "tdtp": [{"title": "TD1"}],
                "cours": [{"title": "C1"}, {"title": "C2", "id": "fixed"}],
                "livres": [{"title": "L1"}]
            }
        }));
        let mut catalog = DatasetCatalog::new();
        catalog.insert("RT", data);

        let ids: Vec<_> = catalog.seed_library().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["rt-tdtp-0", "rt-cours-0", "fixed", "rt-livres-0"]);

        let library = catalog.seed_library();
        assert_eq!(library[3].kind, ItemKind::Book);
        assert!(library.iter().all(|i| i.classe == "rt"));
    }

    #[test]
    fn news_and_projects_ids() {
        let data = dataset(json!({
            "news": [{"title": "N", "type": "livre"}],
            "projets": {"web": [{"name": "P", "type": "video"}]}
        }));
        let mut catalog = DatasetCatalog::new();
        catalog.insert("gl", data);

        let news = catalog.seed_news();
        assert_eq!(news[0].id, "gl-news-0");
        assert_eq!(news[0].kind, ItemKind::Book);

        let projects = catalog.seed_projects();
        assert_eq!(projects[0].id, "gl-web-0");
        assert_eq!(projects[0].kind, ItemKind::Tutorial);
    }

    #[test]
    fn repertoire_counts_are_summed() {
        let rep = |count| {
            json!({"repertoires": [
                {"header": {"name": "Cours", "icon": "BookIcon"},
                 "contents": [{"name": "Algèbre", "count": count}]},
                {"header": {"name": "Autres", "icon": "X"},
                 "contents": [{"name": "Divers", "count": 9}]}
            ]})
        };
        let mut catalog = DatasetCatalog::new();
        catalog.insert("isi", dataset(rep(2)));
        catalog.insert("rt", dataset(rep(3)));

        let stats = catalog.repertoire_stats();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].header.name, "Cours");
        assert_eq!(stats[0].contents[0].count, 5);
        assert!(stats[1].contents.is_empty());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut catalog = DatasetCatalog::new();
        catalog.insert("isi", ClassDataset::default());
        catalog.insert("rt", ClassDataset::default());
        catalog.insert("ISI", dataset(json!({"news": [{"title": "x"}]})));

        let names: Vec<_> = catalog.class_names().collect();
        assert_eq!(names, vec!["isi", "rt"]);
        assert_eq!(catalog.get("isi").unwrap().news.len(), 1);
    }
}
