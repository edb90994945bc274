//! The content unit shared by every collection.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ItemKind;

/// A single document, book or tutorial project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier, assigned once at creation
    #[serde(default)]
    pub id: String,
    /// Display title (documents and books)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display name (tutorials)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lower-case owning class label
    #[serde(default)]
    pub classe: String,
    /// Item type tag
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ItemKind,
    /// Authoring user name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auteur: Option<String>,
    /// Domain or topic label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domaine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Document locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Video locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Projection of favorites membership
    #[serde(default)]
    pub liked: bool,
    /// Set on user-authored items only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Dataset fields with no dedicated slot (year, pages, poster...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_kind() -> ItemKind {
    ItemKind::Other(String::new())
}

impl Item {
    /// Title for documents, name for tutorials, whichever is present.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    /// File or media reference of the item.
    pub fn locator(&self) -> Option<&str> {
        self.file.as_deref().or(self.url.as_deref())
    }

    /// Case-insensitive comparison against a class label.
    pub fn in_class(&self, class: &str) -> bool {
        self.classe.to_lowercase() == class.to_lowercase()
    }
}
