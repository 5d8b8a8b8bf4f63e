use std::sync::Arc;

use asset_workflow::config::AppConfig;
use asset_workflow::database::schema::asset::AssetKind;
use asset_workflow::database::slot::MemorySlots;
use asset_workflow::library::{AssetEdit, AssetLibrary};
use asset_workflow::models::dto::{SortDirection, SortKey, TableQuery};

async fn library_with(names: &[(&str, &str)]) -> (tempfile::TempDir, AssetLibrary) {
    let dir = tempfile::tempdir().unwrap();
    for (name, bytes) in names {
        std::fs::write(dir.path().join(name), bytes.as_bytes()).unwrap();
    }
    let mut library = AssetLibrary::open(
        AssetKind::Image,
        Arc::new(MemorySlots::new()),
        &AppConfig::default(),
    );
    let report = library.import_dir(dir.path()).await.unwrap();
    assert_eq!(report.added.len(), names.len());
    (dir, library)
}

#[tokio::test]
async fn import_dir_picks_only_matching_extensions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
    std::fs::write(dir.path().join("nested").join("b.PNG"), b"bb").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
    std::fs::write(dir.path().join("clip.mp4"), b"skip").unwrap();

    let mut library = AssetLibrary::open(
        AssetKind::Image,
        Arc::new(MemorySlots::new()),
        &AppConfig::default(),
    );
    let report = library.import_dir(dir.path()).await.unwrap();
    assert_eq!(report.added.len(), 2);
    assert!(report.failed.is_empty());

    let mut names: Vec<&str> = library.records().iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a.jpg", "b.PNG"]);

    let files = library
        .import_files(vec![dir.path().join("clip.mp4"), dir.path().join("gone.jpg")])
        .await;
    assert_eq!(files.skipped.len(), 1);
    assert_eq!(files.failed.len(), 1);
    assert!(library.import_dir(dir.path().join("a.jpg")).await.is_err());
}

#[tokio::test]
async fn search_category_sort_and_pages() {
    let (_dir, mut library) = library_with(&[
        ("sunset.jpg", "123"),
        ("beach.png", "1"),
        ("forest.gif", "12345"),
        ("office.webp", "12"),
    ])
    .await;

    let ids: Vec<String> = library.records().iter().map(|r| r.id.to_string()).collect();
    for id in &ids {
        let record = library.get(id).unwrap();
        let (category, tags) = match record.name.as_str() {
            "sunset.jpg" => ("nature", "evening, Sky"),
            "beach.png" => ("nature", "sunset, sea"),
            "forest.gif" => ("nature", "trees"),
            _ => ("work", ""),
        };
        let edit = AssetEdit {
            category: category.into(),
            tags: tags.into(),
            ..AssetEdit::from_record(record)
        };
        assert!(library.edit(id, edit).unwrap());
    }

    let mut query = TableQuery::default();
    query.set_search("SUNSET", None);
    query.toggle_sort(SortKey::Name);
    let page = library.query(&query);
    let names: Vec<&str> = page.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["beach.png", "sunset.jpg"]);

    query.set_search("", Some("nature".into()));
    query.toggle_sort(SortKey::Size);
    query.toggle_sort(SortKey::Size);
    assert_eq!(query.direction, SortDirection::Desc);
    query.set_page_size(2);
    let first = library.rows(&query);
    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items[0].name, "forest.gif");
    assert_eq!(first.items[0].size, "5 Bytes");
    assert_eq!(first.items[0].category, "nature");

    query.change_page(5, first.total_pages);
    let last = library.rows(&query);
    assert_eq!(last.page, 2);
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].name, "beach.png");

    query.set_search("no such asset", None);
    let empty = library.rows(&query);
    assert_eq!((empty.total, empty.total_pages, empty.page), (0, 0, 1));
}

#[tokio::test]
async fn equal_keys_keep_store_order() {
    let (_dir, mut library) = library_with(&[("a.jpg", "x"), ("b.jpg", "y"), ("c.jpg", "z")]).await;
    let stored: Vec<String> = library.records().iter().map(|r| r.name.clone()).collect();

    let mut query = TableQuery::default();
    query.toggle_sort(SortKey::Size);
    let page = library.query(&query);
    let sorted: Vec<String> = page.items.iter().map(|r| r.name.clone()).collect();
    assert_eq!(sorted, stored);

    let first = stored[0].clone();
    let id = library
        .records()
        .iter()
        .find(|r| r.name == first)
        .unwrap()
        .id;
    assert!(library.delete(&id));
    assert!(!library.delete(&id));
    assert_eq!(library.records().len(), 2);
}
