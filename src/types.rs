//! Core shared types for the edushelf application.
//!
//! This module contains the enums that classify items, the persisted
//! preference types, and the CLI subcommands.
use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::ShelfError;

/// A specialized Result type for edushelf operations.
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Logical category of content, cutting across collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Section {
    /// Course material
    #[value(name = "cours", alias = "course")]
    Course,
    /// Practical work (TD & TP)
    #[value(name = "tdtp", alias = "practical")]
    PracticalWork,
    /// Past exams
    #[value(name = "examens", alias = "exam")]
    Exam,
    /// Books
    #[value(name = "livres", alias = "book")]
    Book,
    /// Video tutorials
    #[value(name = "tutos", alias = "tutorial")]
    Tutorial,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Course,
        Section::PracticalWork,
        Section::Exam,
        Section::Book,
        Section::Tutorial,
    ];

    /// Key used for the section in dataset files and the CLI.
    pub fn key(self) -> &'static str {
        match self {
            Section::Course => "cours",
            Section::PracticalWork => "tdtp",
            Section::Exam => "examens",
            Section::Book => "livres",
            Section::Tutorial => "tutos",
        }
    }

    /// Human readable label, as shown in the library sidebar.
    pub fn label(self) -> &'static str {
        match self {
            Section::Course => "Cours",
            Section::PracticalWork => "TD & TP",
            Section::Exam => "Examens",
            Section::Book => "Livres",
            Section::Tutorial => "Tutos",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self> {
        match ItemKind::from(s.to_string()).section() {
            Some(section) => Ok(section),
            None => Err(ShelfError::InvalidFormat {
                message: format!("Unknown section: {}", s),
            }),
        }
    }
}

/// The type tag carried by every item.
///
/// Serialized as the short tags used by the datasets (`cours`, `tdtp`,
/// `examens`, `livre`, `tutos`). Book tags (`livre`, `livres`, `book`) are
/// canonicalized to `livre`. Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Course,
    PracticalWork,
    Exam,
    Book,
    Tutorial,
    Other(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::Course => "cours",
            ItemKind::PracticalWork => "tdtp",
            ItemKind::Exam => "examens",
            ItemKind::Book => "livre",
            ItemKind::Tutorial => "tutos",
            ItemKind::Other(tag) => tag,
        }
    }

    /// The section this kind belongs to, if it is a known one.
    pub fn section(&self) -> Option<Section> {
        match self {
            ItemKind::Course => Some(Section::Course),
            ItemKind::PracticalWork => Some(Section::PracticalWork),
            ItemKind::Exam => Some(Section::Exam),
            ItemKind::Book => Some(Section::Book),
            ItemKind::Tutorial => Some(Section::Tutorial),
            ItemKind::Other(_) => None,
        }
    }
}

impl From<Section> for ItemKind {
    fn from(section: Section) -> Self {
        match section {
            Section::Course => ItemKind::Course,
            Section::PracticalWork => ItemKind::PracticalWork,
            Section::Exam => ItemKind::Exam,
            Section::Book => ItemKind::Book,
            Section::Tutorial => ItemKind::Tutorial,
        }
    }
}

impl From<String> for ItemKind {
    fn from(tag: String) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "cours" | "course" => ItemKind::Course,
            "tdtp" | "td" | "tp" => ItemKind::PracticalWork,
            "examens" | "examen" | "exam" => ItemKind::Exam,
            "livre" | "livres" | "book" | "books" => ItemKind::Book,
            "tutos" | "tuto" | "tutorial" => ItemKind::Tutorial,
            _ => ItemKind::Other(tag),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three top-level groupings of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    News,
    Library,
    Projects,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::News, Collection::Library, Collection::Projects];

    /// Collection a freshly published item of `kind` is placed into.
    pub fn for_publication(kind: &ItemKind) -> Option<Collection> {
        match kind {
            ItemKind::Tutorial => Some(Collection::Projects),
            ItemKind::Course | ItemKind::Book => Some(Collection::News),
            ItemKind::PracticalWork | ItemKind::Exam => Some(Collection::Library),
            ItemKind::Other(_) => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::News => "news",
            Collection::Library => "library",
            Collection::Projects => "projects",
        };
        f.write_str(name)
    }
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ShelfError::InvalidFormat {
                message: format!("Unknown theme: {}", other),
            }),
        }
    }
}

/// Summary of a backup restoration operation
#[derive(Debug, Clone)]
pub struct RestoreSummary {
    /// Path to the backup file that was restored
    pub backup_file: PathBuf,
    /// Keys written back to the store
    pub keys_restored: Vec<String>,
    /// Entries that could not be restored
    pub failed_keys: Vec<(String, String)>, // (key, error_message)
}

/// Available subcommands for the edushelf application
#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild in-memory state from storage and print collection sizes
    Init,

    /// List the items of a section for a class
    List {
        /// Section to list
        #[clap(value_enum)]
        section: Section,

        /// Class label (defaults to the selected class)
        #[clap(short, long)]
        class: Option<String>,

        /// Filter by title, name, author or domain
        #[clap(short, long)]
        search: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Toggle an item in the favorites
    Favorite {
        /// ID of the item
        id: String,
    },

    /// List favorited items of a section for a class
    Favorites {
        /// Section to list
        #[clap(value_enum)]
        section: Section,

        /// Class label (defaults to the selected class)
        #[clap(short, long)]
        class: Option<String>,

        /// Filter by title, name, author or domain
        #[clap(short, long)]
        search: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Publish a new document or tutorial
    Publish {
        /// Type of the publication (cours, tdtp, examens, livre, tutos)
        #[clap(short = 'k', long = "type")]
        kind: String,

        /// Title of the document, or name of the tutorial
        #[clap(short = 'T', long)]
        title: String,

        /// Domain or topic
        #[clap(short, long)]
        domaine: String,

        /// Class label
        #[clap(short, long)]
        classe: String,

        /// Free-text description
        #[clap(long)]
        description: Option<String>,

        /// File or media reference
        #[clap(short, long)]
        source: Option<String>,
    },

    /// Search all collections
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List the signed-in user's publications
    Mine {
        /// Section to list
        #[clap(value_enum)]
        section: Section,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show aggregated document counts across classes
    Stats {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show or change the selected class
    Class {
        /// New class label
        set: Option<String>,
    },

    /// Show or toggle the theme
    Theme {
        /// Switch between dark and light
        #[clap(short, long)]
        toggle: bool,
    },

    /// Show, replace or clear the signed-in profile
    Profile {
        /// Sign in with the profile stored in a JSON file
        #[clap(short, long)]
        login: Option<PathBuf>,

        /// Sign out
        #[clap(long)]
        logout: bool,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Create a backup of the durable store
    Backup {
        /// Directory for the backup file (default uses config setting)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore the durable store from a backup
    Restore {
        /// Path to the backup file
        backup_file: PathBuf,
    },
}
