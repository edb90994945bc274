//! Validation and placement of user-authored items.
use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::{Collection, IdGenerator, Item, ItemKind};

/// A candidate item as submitted from the publication form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub domaine: String,
    #[serde(default)]
    pub classe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Uploaded locator, stored as `url` for tutorials and `file` otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Publication {
    /// The title-or-name field required for this type
    fn heading(&self, kind: &ItemKind) -> Option<&str> {
        let field = if *kind == ItemKind::Tutorial {
            self.name.as_deref()
        } else {
            self.title.as_deref()
        };
        field.filter(|value| !value.trim().is_empty())
    }

    /// Checks the required fields, returning the canonical kind and
    /// target collection on success
    pub fn validate(&self) -> Option<(ItemKind, Collection)> {
        if self.kind.trim().is_empty()
            || self.domaine.trim().is_empty()
            || self.classe.trim().is_empty()
        {
            debug!("Rejecting publication with a missing type, domain or class");
            return None;
        }

        let kind = ItemKind::from(self.kind.clone());
        if self.heading(&kind).is_none() {
            debug!("Rejecting {} publication without title or name", kind);
            return None;
        }

        match Collection::for_publication(&kind) {
            Some(collection) => Some((kind, collection)),
            None => {
                warn!("Rejecting publication with unsupported type {}", kind);
                None
            }
        }
    }
}

/// Builds the stored item for a publication.
///
/// `is_taken` reports identifiers already used by any collection; fresh ids
/// are drawn until one is free.
pub fn ingest<G, F>(
    publication: Publication,
    author: &str,
    ids: &mut G,
    is_taken: F,
) -> Option<(Collection, Item)>
where
    G: IdGenerator + ?Sized,
    F: Fn(&str) -> bool,
{
    let (kind, collection) = publication.validate()?;

    let mut id = ids.next_id();
    while is_taken(&id) {
        warn!("Generated id {} already in use, drawing another", id);
        id = ids.next_id();
    }

    let Publication {
        title,
        name,
        domaine,
        classe,
        description,
        mut file,
        mut url,
        source,
        ..
    } = publication;

    if let Some(source) = source {
        let slot = if kind == ItemKind::Tutorial {
            &mut url
        } else {
            &mut file
        };
        slot.get_or_insert(source);
    }

    let item = Item {
        id,
        title,
        name,
        classe: classe.trim().to_lowercase(),
        kind,
        auteur: Some(author.to_string()),
        domaine: Some(domaine),
        description,
        file,
        url,
        liked: false,
        published_at: Some(Utc::now()),
        extra: Map::new(),
    };

    Some((collection, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialIds;

    fn tutorial() -> Publication {
        Publication {
            kind: "tutos".to_string(),
            name: Some("Intro".to_string()),
            domaine: "Web".to_string(),
            classe: "ISI".to_string(),
            source: Some("blob:video".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn tutorial_requires_name_not_title() {
        let mut publication = tutorial();
        publication.name = None;
        publication.title = Some("Intro".to_string());
        assert_eq!(publication.validate(), None);
    }

    #[test]
    fn blank_domain_is_missing() {
        let mut publication = tutorial();
        publication.domaine = "  ".to_string();
        assert_eq!(publication.validate(), None);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut publication = tutorial();
        publication.kind = "podcast".to_string();
        publication.title = Some("x".to_string());
        assert_eq!(publication.validate(), None);
    }

    #[test]
    fn book_aliases_land_in_news() {
        let publication = Publication {
            kind: "livres".to_string(),
            title: Some("Rust in Action".to_string()),
            domaine: "Programmation".to_string(),
            classe: "gl".to_string(),
            ..Default::default()
        };
        assert_eq!(
            publication.validate(),
            Some((ItemKind::Book, Collection::News))
        );
    }

    #[test]
    fn ingest_stamps_metadata() {
        let mut ids = SequentialIds::new("pub");
        let (collection, item) = ingest(tutorial(), "Ana", &mut ids, |_| false).unwrap();

        assert_eq!(collection, Collection::Projects);
        assert_eq!(item.id, "pub-0");
        assert_eq!(item.auteur.as_deref(), Some("Ana"));
        assert_eq!(item.classe, "isi");
        assert_eq!(item.url.as_deref(), Some("blob:video"));
        assert!(item.file.is_none());
        assert!(!item.liked);
        assert!(item.published_at.is_some());
    }

    #[test]
    fn ingest_skips_taken_ids() {
        let mut ids = SequentialIds::new("pub");
        let (_, item) = ingest(tutorial(), "Ana", &mut ids, |id| id == "pub-0").unwrap();
        assert_eq!(item.id, "pub-1");
    }
}
