use std::fs;
use std::path::{Path, PathBuf};

use edushelf::{
    Collection, Config, ContentStore, DatasetCatalog, FileKvStore, KeyValueStore, Section, Theme,
    UserProfile, DEFAULT_CLASSES,
};
use tempfile::TempDir;

fn datasets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn known_classes() -> Vec<String> {
    DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect()
}

fn open_store(data_dir: &Path) -> ContentStore<FileKvStore> {
    let kv = FileKvStore::open(data_dir).unwrap();
    let catalog = DatasetCatalog::load_dir(&datasets_dir(), &known_classes()).unwrap();
    let mut store = ContentStore::new(kv, catalog).with_defaults("isi", Theme::Dark);
    store.initialize();
    store
}

#[test]
fn bundled_datasets_load_in_catalog_order() {
    let catalog = DatasetCatalog::load_dir(&datasets_dir(), &known_classes()).unwrap();
    let names: Vec<_> = catalog.class_names().collect();
    assert_eq!(names, vec!["isi", "rt"]);

    let stats = catalog.repertoire_stats();
    let cours = &stats[0];
    assert_eq!(cours.header.name, "Cours");
    let informatique = cours
        .contents
        .iter()
        .find(|c| c.name == "Informatique")
        .unwrap();
    assert_eq!(informatique.count, 4);
    assert!(stats[2].contents.iter().all(|c| c.name != "Réseaux"));
}

#[test]
fn unknown_dataset_files_follow_known_classes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("zz.json"), r#"{"news": []}"#).unwrap();
    fs::write(dir.path().join("aa.json"), r#"{"news": []}"#).unwrap();
    fs::write(dir.path().join("rt.json"), r#"{"news": []}"#).unwrap();
    fs::write(dir.path().join("broken.json"), "{").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let catalog = DatasetCatalog::load_dir(dir.path(), &known_classes()).unwrap();
    let names: Vec<_> = catalog.class_names().collect();
    assert_eq!(names, vec!["rt", "aa", "zz"]);
}

#[test]
fn missing_datasets_dir_yields_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = DatasetCatalog::load_dir(&dir.path().join("absent"), &known_classes()).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn state_survives_restart() {
    let data = TempDir::new().unwrap();
    let published;
    {
        let mut store = open_store(data.path());
        assert_eq!(store.toggle_favorite("rt-tdtp-0"), Some(true));
        store.set_selected_class("RT");
        store.toggle_theme();
        store.set_last_page("/portail");
        store.sign_in(UserProfile {
            name: "Ana Traoré".to_string(),
            ..UserProfile::default_profile()
        });
        published = store
            .add_item(edushelf::Publication {
                kind: "examens".to_string(),
                title: Some("Examen Réseaux 2025".to_string()),
                domaine: "Réseaux".to_string(),
                classe: "rt".to_string(),
                source: Some("/uploads/exam.pdf".to_string()),
                ..Default::default()
            })
            .unwrap();
        store.flush();
    }

    let store = open_store(data.path());
    assert!(store.get_item("rt-tdtp-0").unwrap().liked);
    assert_eq!(store.selected_class(), "rt");
    assert_eq!(store.theme(), Theme::Light);
    assert_eq!(store.last_page(), Some("/portail"));
    assert_eq!(store.user().unwrap().name, "Ana Traoré");

    let exam = store.get_item(&published).unwrap();
    assert_eq!(exam.file.as_deref(), Some("/uploads/exam.pdf"));
    assert!(store
        .collection(Collection::Library)
        .iter()
        .any(|i| i.id == published));
    let exams: Vec<_> = store.query_by_section(Section::Exam, "rt").collect();
    assert_eq!(exams.len(), 1);
}

#[test]
fn corrupt_collection_falls_back_to_seeds() {
    let data = TempDir::new().unwrap();
    {
        let mut kv = FileKvStore::open(data.path()).unwrap();
        kv.set("newsBooks", "<<not json>>").unwrap();
        kv.set("favorites", r#"["isi-news-0"]"#).unwrap();
        kv.set("theme", "sepia").unwrap();
    }

    let store = open_store(data.path());
    let news = store.collection(Collection::News);
    assert_eq!(news.len(), 3);
    assert!(news.iter().find(|i| i.id == "isi-news-0").unwrap().liked);
    assert_eq!(store.theme(), Theme::Dark);

    // The repaired value replaced the corrupt one
    let raw = store.persistence().store().get("newsBooks").unwrap().unwrap();
    assert!(raw.starts_with('['));
}

#[test]
fn publication_and_sign_in_persist_without_flush() {
    let data = TempDir::new().unwrap();
    let published;
    {
        let mut store = open_store(data.path());
        store.sign_in(UserProfile {
            name: "Ana Traoré".to_string(),
            ..UserProfile::default_profile()
        });
        published = store
            .add_item(edushelf::Publication {
                kind: "tutos".to_string(),
                name: Some("Intro Docker".to_string()),
                domaine: "DevOps".to_string(),
                classe: "isi".to_string(),
                source: Some("https://videos.example/docker".to_string()),
                ..Default::default()
            })
            .unwrap();
        // Dropped without flushing
    }

    let store = open_store(data.path());
    assert_eq!(store.user().unwrap().name, "Ana Traoré");
    let item = store.get_item(&published).unwrap();
    assert_eq!(item.url.as_deref(), Some("https://videos.example/docker"));
    let mine: Vec<_> = store.publications_by("Ana Traoré", Section::Tutorial).collect();
    assert_eq!(mine.len(), 1);
}

#[test]
fn items_without_ids_fall_back_to_seeds() {
    let data = TempDir::new().unwrap();
    {
        let mut kv = FileKvStore::open(data.path()).unwrap();
        kv.set(
            "newsBooks",
            r#"[{"title":"a","type":"cours"},{"title":"b","type":"cours"}]"#,
        )
        .unwrap();
    }

    let mut store = open_store(data.path());
    let news = store.collection(Collection::News);
    assert_eq!(news.len(), 3);
    assert!(news.iter().all(|i| !i.id.is_empty()));
    assert_eq!(store.toggle_favorite(""), None);
    assert!(store.favorites().is_empty());
}

#[test]
fn sign_out_is_remembered() {
    let data = TempDir::new().unwrap();
    {
        let mut store = open_store(data.path());
        assert!(store.user().is_some());
        store.sign_out();
    }
    let mut store = open_store(data.path());
    assert!(store.user().is_none());

    let rejected = store.add_item(edushelf::Publication {
        kind: "cours".to_string(),
        title: Some("Routage".to_string()),
        domaine: "Réseaux".to_string(),
        classe: "rt".to_string(),
        ..Default::default()
    });
    assert_eq!(rejected, None);
}

#[test]
fn config_points_at_bundled_datasets() {
    let data = TempDir::new().unwrap();
    let config = Config {
        data_dir: data.path().join("store"),
        datasets_dir: datasets_dir(),
        ..Config::default()
    };
    let path = data.path().join("config.json");
    config.save(&path).unwrap();

    let loaded = Config::resolve(Some(&path)).unwrap();
    let catalog = DatasetCatalog::load_dir(&loaded.datasets_dir, &loaded.classes).unwrap();
    let mut store = ContentStore::new(FileKvStore::open(&loaded.data_dir).unwrap(), catalog);
    store.initialize();
    assert_eq!(store.collection(Collection::Projects).len(), 2);
    assert!(loaded.data_dir.join("favorites.kv").is_file());
}
