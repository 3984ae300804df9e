mod common;

use agsync_core::path::PathKind;
use agsync_pipeline::{RootMode, SyncAction, SyncEvent, TransferReason};
use common::{engine, media_url, Call, FakeFiles, OLD};

fn services() -> FakeFiles {
    let fake = FakeFiles::new();
    fake.dir("src")
        .file("src", "a.txt", 4, OLD)
        .dir("src/sub")
        .file("src/sub", "b.txt", 4, OLD)
        .dir("dest");
    fake
}

fn ingests(fake: &FakeFiles) -> Vec<Call> {
    fake.calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Ingest(..)))
        .collect()
}

#[tokio::test]
async fn import_copies_tree_server_side() {
    let fake = services();
    let (engine, _sink) = engine(&fake);

    let stats = engine
        .import(
            &media_url("src"),
            PathKind::Remote,
            &media_url("dest"),
            RootMode::Nest,
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        ingests(&fake),
        vec![
            Call::Ingest(media_url("src/a.txt"), "dest/src".into(), "a.txt".into()),
            Call::Ingest(media_url("src/sub/b.txt"), "dest/src/sub".into(), "b.txt".into()),
        ]
    );
    assert_eq!(stats.dirs_created, 2);
    assert_eq!(stats.files_imported, 2);
    assert_eq!(stats.bytes_transferred, 0);
}

#[tokio::test]
async fn new_destination_dir_is_listed_before_ingest() {
    let fake = services();
    let (engine, _sink) = engine(&fake);

    engine
        .import(
            &media_url("src"),
            PathKind::Remote,
            &media_url("dest"),
            RootMode::Nest,
            None,
        )
        .await
        .unwrap();

    let calls = fake.calls();
    let pos = |wanted: &Call| calls.iter().position(|c| c == wanted).unwrap();
    let mkdir = pos(&Call::Mkdir("dest".into(), "src".into()));
    let relist = pos(&Call::List("dest/src".into()));
    let ingest = pos(&Call::Ingest(
        media_url("src/a.txt"),
        "dest/src".into(),
        "a.txt".into(),
    ));
    assert!(mkdir < relist && relist < ingest, "{calls:?}");
}

#[tokio::test]
async fn newer_source_is_imported_once() {
    let fake = services();
    fake.dir("dest/src")
        .file("dest/src", "a.txt", 4, "2019-01-01T00:00:00.000-06:00");
    let (engine, sink) = engine(&fake);

    engine
        .import(
            &media_url("src"),
            PathKind::Remote,
            &media_url("dest"),
            RootMode::Nest,
            None,
        )
        .await
        .unwrap();

    let a_ingests: Vec<_> = ingests(&fake)
        .into_iter()
        .filter(|c| matches!(c, Call::Ingest(_, _, name) if name == "a.txt"))
        .collect();
    assert_eq!(a_ingests.len(), 1);
    assert!(sink.events().contains(&SyncEvent::new(
        1,
        SyncAction::Import(TransferReason::Modified),
        "a.txt"
    )));
}

#[tokio::test]
async fn equal_timestamps_are_not_imported() {
    let fake = services();
    fake.dir("dest/src").file("dest/src", "a.txt", 4, OLD);
    let (engine, sink) = engine(&fake);

    engine
        .import(
            &media_url("src"),
            PathKind::Remote,
            &media_url("dest"),
            RootMode::Nest,
            None,
        )
        .await
        .unwrap();

    assert!(!ingests(&fake)
        .iter()
        .any(|c| matches!(c, Call::Ingest(_, _, name) if name == "a.txt")));
    assert!(sink.lines().contains(&"skipping a.txt (exists)".to_string()));
}

#[tokio::test]
async fn second_import_issues_no_ingest() {
    let fake = services();
    let (engine, _sink) = engine(&fake);
    let (src, dest) = (media_url("src"), media_url("dest"));

    engine
        .import(&src, PathKind::Remote, &dest, RootMode::Nest, None)
        .await
        .unwrap();
    fake.clear_calls();
    let stats = engine
        .import(&src, PathKind::Remote, &dest, RootMode::Nest, None)
        .await
        .unwrap();

    assert!(fake.mutations().is_empty(), "{:?}", fake.mutations());
    assert_eq!(stats.changes(), 0);
}

#[tokio::test]
async fn destination_directory_blocks_file_import() {
    let fake = services();
    fake.dir("dest/src").dir("dest/src/a.txt");
    let (engine, sink) = engine(&fake);

    engine
        .import(
            &media_url("src"),
            PathKind::Remote,
            &media_url("dest"),
            RootMode::Nest,
            None,
        )
        .await
        .unwrap();

    assert!(!ingests(&fake)
        .iter()
        .any(|c| matches!(c, Call::Ingest(_, _, name) if name == "a.txt")));
    assert!(sink
        .events()
        .contains(&SyncEvent::new(1, SyncAction::TypeConflict, "a.txt")));
}

#[tokio::test]
async fn contents_mode_imports_into_destination() {
    let fake = services();
    let (engine, _sink) = engine(&fake);

    engine
        .import(
            &media_url("src"),
            PathKind::Remote,
            &media_url("dest"),
            RootMode::Contents,
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        ingests(&fake)[0],
        Call::Ingest(media_url("src/a.txt"), "dest".into(), "a.txt".into())
    );
    assert!(!fake.calls().contains(&Call::Mkdir("dest".into(), "src".into())));
}
