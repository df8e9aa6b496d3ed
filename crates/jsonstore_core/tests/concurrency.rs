use jsonstore_core::{Driver, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Payload {
    writer: usize,
    round: usize,
    // Large enough that an interleaved write would be visible.
    body: String,
}

fn payload(writer: usize, round: usize) -> Payload {
    Payload {
        writer,
        round,
        body: format!("{writer}-").repeat(4096),
    }
}

fn assert_consistent(p: &Payload) {
    assert_eq!(p.body, format!("{}-", p.writer).repeat(4096));
}

#[test]
fn concurrent_writers_to_one_collection_never_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Driver::open_default(dir.path()).unwrap();

    thread::scope(|scope| {
        for writer in 0..8 {
            let driver = &driver;
            scope.spawn(move || {
                for round in 0..10 {
                    driver
                        .write("shared", &format!("doc-{writer}"), &payload(writer, round))
                        .unwrap();
                }
            });
        }
    });

    let docs: Vec<Payload> = driver.read_all_as("shared").unwrap();
    assert_eq!(docs.len(), 8);
    for doc in &docs {
        assert_eq!(doc.round, 9);
        assert_consistent(doc);
    }
}

#[test]
fn racing_writers_on_one_resource_leave_one_complete_document() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Driver::open_default(dir.path()).unwrap();

    thread::scope(|scope| {
        for writer in 0..6 {
            let driver = &driver;
            scope.spawn(move || {
                for round in 0..10 {
                    driver.write("shared", "hot", &payload(writer, round)).unwrap();
                }
            });
        }
    });

    let doc: Payload = driver.read("shared", "hot").unwrap();
    assert_eq!(doc.round, 9);
    assert_consistent(&doc);
    assert!(!dir.path().join("shared").join("hot.json.tmp").exists());
}

#[test]
fn readers_only_observe_complete_documents_during_writes() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Arc::new(Driver::open_default(dir.path()).unwrap());
    driver.write("live", "doc", &payload(0, 0)).unwrap();

    let writer = {
        let driver = Arc::clone(&driver);
        thread::spawn(move || {
            for round in 1..50 {
                driver.write("live", "doc", &payload(round % 7, round)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let driver = Arc::clone(&driver);
            thread::spawn(move || {
                for _ in 0..50 {
                    let doc: Payload = driver.read("live", "doc").unwrap();
                    assert_consistent(&doc);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn read_racing_delete_sees_old_document_or_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Driver::open_default(dir.path()).unwrap();
    driver.write("race", "doc", &payload(3, 0)).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| driver.delete("race", "doc").unwrap());
        scope.spawn(|| match driver.read::<Payload>("race", "doc") {
            Ok(doc) => assert_consistent(&doc),
            Err(StoreError::NotFound(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        });
    });

    let err = driver.read::<Payload>("race", "doc").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn different_collections_write_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let driver = Driver::open_default(dir.path()).unwrap();
    let collections = ["users", "orders", "invoices", "audit"];

    thread::scope(|scope| {
        for (writer, collection) in collections.iter().enumerate() {
            let driver = &driver;
            scope.spawn(move || {
                for round in 0..5 {
                    driver
                        .write(collection, &format!("r{round}"), &payload(writer, round))
                        .unwrap();
                }
            });
        }
    });

    for collection in collections {
        assert_eq!(driver.read_all(collection).unwrap().len(), 5);
    }
}
