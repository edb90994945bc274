//! CLI module for the edushelf application
//!
//! This module handles the command-line interface for browsing, favoriting
//! and publishing content.
use std::{fs::read_to_string, path::PathBuf};

use log::info;

use crate::{
    filter_by_search_term, Collection, Commands, Config, ContentStore, FileKvStore, Item,
    ItemKind, Publication, Result, Section, ShelfError, UserProfile,
};

/// CLI Application handler - processes CLI commands against the content store
pub struct App {
    /// The content store backend
    store: ContentStore<FileKvStore>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with an initialized store and its config
    pub fn new(store: ContentStore<FileKvStore>, config: Config, verbose: bool) -> Self {
        Self {
            store,
            config,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Init => self.show_summary(),

            Commands::List {
                section,
                class,
                search,
                json,
            } => {
                let class = self.class_or_selected(class);
                self.store.set_last_page("/bibliotheque");
                let items: Vec<&Item> = self.store.query_by_section(section, &class).collect();
                let items = filter_by_search_term(items, search.as_deref().unwrap_or_default());
                display_items(&items, json)?;
            }

            Commands::Favorite { id } => self.handle_favorite(&id)?,

            Commands::Favorites {
                section,
                class,
                search,
                json,
            } => {
                let class = self.class_or_selected(class);
                self.store.set_last_page("/favorite");
                let items: Vec<&Item> = self.store.favorites_by_section(section, &class).collect();
                let items = filter_by_search_term(items, search.as_deref().unwrap_or_default());
                display_items(&items, json)?;
            }

            Commands::Publish {
                kind,
                title,
                domaine,
                classe,
                description,
                source,
            } => self.handle_publish(kind, title, domaine, classe, description, source)?,

            Commands::Search { query, limit, json } => {
                let mut results = self.store.search(&query);
                results.truncate(limit);
                display_items(&results, json)?;
            }

            Commands::Mine { section, json } => self.handle_mine(section, json)?,

            Commands::Stats { json } => self.handle_stats(json)?,

            Commands::Class { set } => {
                if let Some(class) = set {
                    self.store.set_selected_class(&class);
                }
                println!("{}", self.store.selected_class());
            }

            Commands::Theme { toggle } => {
                if toggle {
                    self.store.toggle_theme();
                }
                println!("{}", self.store.theme().as_str());
            }

            Commands::Profile {
                login,
                logout,
                json,
            } => self.handle_profile(login, logout, json)?,

            Commands::Backup { output } => {
                let dir = output.unwrap_or_else(|| self.config.backup_dir.clone());
                self.store.flush();
                let kv = self.store.persistence().store();
                let path = kv.create_backup(&dir, self.config.max_backups)?;
                println!("Backup created at {}", path.display());
            }

            Commands::Restore { backup_file } => {
                let data_dir = self.store.persistence().store().dir().to_path_buf();
                let mut kv = FileKvStore::open(data_dir)?;
                let summary = kv.restore_backup(&backup_file)?;
                println!(
                    "Restored {} keys from {}",
                    summary.keys_restored.len(),
                    summary.backup_file.display()
                );
                for (key, message) in &summary.failed_keys {
                    println!("  failed {}: {}", key, message);
                }
                // Reload so the final flush does not overwrite the restored values
                let catalog = self.store.catalog().clone();
                self.store = ContentStore::new(kv, catalog)
                    .with_defaults(&self.config.default_class, self.config.default_theme);
                self.store.initialize();
            }
        }

        Ok(())
    }

    /// Flushes state before exit
    pub fn shutdown(&mut self) {
        self.store.flush();
        info!("State flushed to {}", self.config.data_dir.display());
    }

    fn class_or_selected(&self, class: Option<String>) -> String {
        class
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| self.store.selected_class().to_string())
    }

    fn show_summary(&self) {
        for collection in Collection::ALL {
            println!(
                "{:<10} {}",
                collection.to_string(),
                self.store.collection(collection).len()
            );
        }
        println!("{:<10} {}", "favorites", self.store.favorites().len());
        if self.verbose {
            let classes: Vec<_> = self.store.catalog().class_names().collect();
            println!("classes    {}", classes.join(", "));
            println!("selected   {}", self.store.selected_class());
            for section in Section::ALL {
                let count = self
                    .store
                    .query_by_section(section, self.store.selected_class())
                    .count();
                println!("  {:<8} {}", section.label(), count);
            }
        }
    }

    fn handle_favorite(&mut self, id: &str) -> Result<()> {
        match self.store.toggle_favorite(id) {
            Some(true) => println!("Added {} to favorites", id),
            Some(false) => println!("Removed {} from favorites", id),
            None => {
                return Err(ShelfError::ItemNotFound { id: id.to_string() });
            }
        }
        Ok(())
    }

    fn handle_publish(
        &mut self,
        kind: String,
        title: String,
        domaine: String,
        classe: String,
        description: Option<String>,
        source: Option<String>,
    ) -> Result<()> {
        let is_tutorial = ItemKind::from(kind.clone()) == ItemKind::Tutorial;
        let (title, name) = if is_tutorial {
            (None, Some(title))
        } else {
            (Some(title), None)
        };

        let publication = Publication {
            kind,
            title,
            name,
            domaine,
            classe,
            description,
            source,
            ..Default::default()
        };

        match self.store.add_item(publication) {
            Some(id) => {
                println!("Published with ID: {}", id);
                Ok(())
            }
            None if self.store.user().is_none() => Err(ShelfError::ApplicationError {
                message: "Sign in with `profile --login <file>` before publishing".to_string(),
            }),
            None => Err(ShelfError::InvalidFormat {
                message: "Type, title, domain and class are required".to_string(),
            }),
        }
    }

    fn handle_mine(&self, section: Section, json: bool) -> Result<()> {
        let Some(user) = self.store.user() else {
            println!("Not signed in.");
            return Ok(());
        };
        let items: Vec<&Item> = self.store.publications_by(&user.name, section).collect();
        display_items(&items, json)
    }

    fn handle_stats(&self, json: bool) -> Result<()> {
        let stats = self.store.repertoire_stats();
        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }
        for repertoire in &stats {
            println!("{}", console::style(&repertoire.header.name).bold());
            for entry in &repertoire.contents {
                println!("  {:<30} {}", entry.name, entry.count);
            }
        }
        Ok(())
    }

    fn handle_profile(&mut self, login: Option<PathBuf>, logout: bool, json: bool) -> Result<()> {
        if logout {
            self.store.sign_out();
            println!("Signed out.");
            return Ok(());
        }

        if let Some(path) = login {
            if !path.exists() {
                return Err(ShelfError::FileNotFound {
                    file_path: path.display().to_string(),
                });
            }
            let profile: UserProfile = serde_json::from_str(&read_to_string(&path)?)?;
            self.store.sign_in(profile);
        }

        let Some(user) = self.store.user() else {
            println!("Not signed in.");
            return Ok(());
        };

        if json {
            println!("{}", serde_json::to_string_pretty(user)?);
            return Ok(());
        }

        println!(
            "[{}] {} <{}>",
            console::style(user.initial()).cyan().bold(),
            console::style(&user.name).bold(),
            user.email
        );
        if !user.formation.is_empty() {
            println!("{}", user.formation);
        }
        if !user.description.is_empty() {
            println!("{}", user.description);
        }
        if !user.competences.is_empty() {
            println!("Skills: {}", console::style(user.competences.join(", ")).cyan());
        }
        for entry in &user.parcours {
            println!(
                "  {} {} {} ({}) - {:?}",
                entry.annee, entry.niveau, entry.filiere, entry.etablissement, entry.statut
            );
        }
        Ok(())
    }
}

/// Display items as pretty JSON or as text cards
fn display_items(items: &[&Item], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Aucun document trouvé");
        return Ok(());
    }

    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            println!("{}", "-".repeat(term_width.min(50)));
        }

        let heart = if item.liked { "♥" } else { " " };
        println!(
            "{} {} | {} | {}",
            console::style(heart).red(),
            item.id,
            item.kind,
            item.classe
        );
        println!("{}", console::style(item.display_name()).bold());

        let byline: Vec<&str> = [item.auteur.as_deref(), item.domaine.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !byline.is_empty() {
            println!("{}", console::style(byline.join(" · ")).cyan());
        }
        if let Some(locator) = item.locator() {
            println!("{}", locator);
        }
    }

    println!(
        "\nFound {} item{}",
        items.len(),
        if items.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
