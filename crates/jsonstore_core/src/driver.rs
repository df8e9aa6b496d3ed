//! Storage driver: the public face of the document store.
//!
//! # Responsibility
//! - Map `(collection, resource)` keys onto JSON files under one root.
//! - Serialize mutations per collection through the lock registry.
//! - Publish every write with temp-file + rename so readers never see a
//!   partially written document.
//!
//! # Invariants
//! - `<root>/<collection>/<resource>.json`, when present, holds one complete
//!   JSON document.
//! - Writes and deletes on one collection never overlap; reads take no lock.
//! - Argument errors are raised before any filesystem access.
//!
//! # Concurrency
//! A read racing a delete of the same resource may return the old document
//! or `NotFound`. Locks are process-local: two processes sharing one root
//! are not coordinated.

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::lock::{self, LockRegistry};
use crate::logger::{ConsoleLogger, Logger};
use crate::path::{self, NameKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Driver configuration.
#[derive(Debug, Clone, Default)]
pub struct Options<L = ConsoleLogger> {
    /// Sink for driver events. Defaults to [`ConsoleLogger`] at `Info`.
    pub logger: L,
}

impl<L: Logger> Options<L> {
    pub fn with_logger(logger: L) -> Self {
        Self { logger }
    }
}

/// Handle to one store root.
///
/// Cheap operations borrow `&self`, so one driver can be shared across
/// threads by reference or behind an `Arc`.
#[derive(Debug)]
pub struct Driver<L: Logger = ConsoleLogger> {
    root: PathBuf,
    locks: LockRegistry,
    log: L,
}

impl Driver<ConsoleLogger> {
    /// Opens `root` with default options.
    pub fn open_default(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(root, Options::default())
    }
}

impl<L: Logger> Driver<L> {
    /// Opens (or creates) a store rooted at `root`.
    ///
    /// The path is normalized lexically first. An existing directory is
    /// reused as is; a missing one is created together with its parents.
    ///
    /// # Errors
    /// - `InvalidArgument` when `root` exists but is not a directory.
    /// - `Io` when the directory cannot be inspected or created.
    pub fn open(root: impl AsRef<Path>, options: Options<L>) -> StoreResult<Self> {
        let root = path::normalize_root(root.as_ref());
        let log = options.logger;

        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {
                log.debug(format_args!(
                    "Using '{}' (database already exists)",
                    root.display()
                ));
            }
            Ok(_) => {
                return Err(StoreError::invalid(format!(
                    "store root `{}` exists but is not a directory",
                    root.display()
                )));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log.debug(format_args!(
                    "Creating the database at '{}'...",
                    root.display()
                ));
                fs::create_dir_all(&root).map_err(|err| {
                    log.error(format_args!(
                        "event=store_open module=driver status=error error_code=root_create_failed root={} error={}",
                        root.display(),
                        err
                    ));
                    StoreError::io(&root, err)
                })?;
            }
            Err(err) => return Err(StoreError::io(&root, err)),
        }

        Ok(Self {
            root,
            locks: LockRegistry::new(),
            log,
        })
    }

    /// Normalized store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logger(&self) -> &L {
        &self.log
    }

    /// Stores `value` as `<collection>/<resource>.json`, replacing any
    /// previous document atomically.
    ///
    /// # Errors
    /// - `InvalidArgument` for empty or unsafe names, or a resource name that
    ///   already ends in `.json`.
    /// - `Encoding` when `value` cannot be serialized.
    /// - `Io` when the collection directory, temp file or rename fails. The
    ///   previous document stays intact; a stale `.tmp` file may remain.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> StoreResult<()> {
        path::validate_name(NameKind::Collection, collection)?;
        path::validate_write_resource(resource)?;

        let started_at = Instant::now();
        let collection_lock = self.locks.get_or_create(collection);
        let _guard = lock::acquire(&collection_lock);

        let result = self.write_locked(collection, resource, value);
        self.report("store_write", collection, resource, started_at, &result);
        result
    }

    fn write_locked<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> StoreResult<()> {
        let dir = path::collection_dir(&self.root, collection);
        fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;

        let bytes = codec::encode(value)?;
        let final_path = path::resource_path(&self.root, collection, resource);
        let temp_path = path::temp_path(&final_path);

        write_synced(&temp_path, &bytes)?;
        fs::rename(&temp_path, &final_path).map_err(|err| StoreError::io(&final_path, err))
    }

    /// Reads and decodes one resource. The `.json` suffix is optional.
    ///
    /// # Errors
    /// - `InvalidArgument` for empty or unsafe names.
    /// - `NotFound` when no file matches.
    /// - `Encoding` when the stored bytes do not decode into `T`.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> StoreResult<T> {
        path::validate_name(NameKind::Collection, collection)?;
        path::validate_name(NameKind::Resource, resource)?;

        let target = path::collection_dir(&self.root, collection).join(resource);
        let file = path::resolve_file(&target)?.ok_or(StoreError::NotFound(target))?;

        let bytes = fs::read(&file).map_err(|err| match err.kind() {
            // Removed between stat and read by a concurrent delete.
            std::io::ErrorKind::NotFound => StoreError::NotFound(file.clone()),
            _ => StoreError::io(&file, err),
        })?;
        let value = codec::decode(&bytes)?;
        self.log.trace(format_args!(
            "event=store_read module=driver status=ok collection={} resource={} bytes={}",
            collection,
            resource,
            bytes.len()
        ));
        Ok(value)
    }

    /// Like [`Driver::read`], decoding into a caller-owned destination.
    ///
    /// `dest` is only assigned when the whole read succeeds.
    pub fn read_into<T: DeserializeOwned>(
        &self,
        collection: &str,
        resource: &str,
        dest: &mut T,
    ) -> StoreResult<()> {
        *dest = self.read(collection, resource)?;
        Ok(())
    }

    /// Returns the raw contents of every document in `collection`, ordered
    /// by file name.
    ///
    /// Subdirectories and leftover `.tmp` files are skipped. Any unreadable
    /// file fails the whole call.
    pub fn read_all(&self, collection: &str) -> StoreResult<Vec<String>> {
        path::validate_name(NameKind::Collection, collection)?;

        let dir = path::collection_dir(&self.root, collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(dir));
            }
            Err(err) => return Err(StoreError::io(&dir, err)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io(&dir, err))?;
            let file_type = entry.file_type().map_err(|err| StoreError::io(entry.path(), err))?;
            let entry_path = entry.path();
            if file_type.is_dir() || path::is_temp_file(&entry_path) {
                continue;
            }
            files.push(entry_path);
        }
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let raw = fs::read_to_string(&file).map_err(|err| StoreError::io(&file, err))?;
            records.push(raw);
        }

        self.log.trace(format_args!(
            "event=store_read_all module=driver status=ok collection={} count={}",
            collection,
            records.len()
        ));
        Ok(records)
    }

    /// [`Driver::read_all`] followed by decoding each document into `T`.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        self.read_all(collection)?
            .iter()
            .map(|raw| codec::decode(raw.as_bytes()))
            .collect()
    }

    /// Deletes one resource, or the whole collection when `resource` is
    /// empty or names a directory.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty/unsafe collection or unsafe resource.
    /// - `NotFound` when nothing matches.
    /// - `Io` when removal fails.
    pub fn delete(&self, collection: &str, resource: &str) -> StoreResult<()> {
        path::validate_name(NameKind::Collection, collection)?;
        if !resource.is_empty() {
            path::validate_name(NameKind::Resource, resource)?;
        }

        let started_at = Instant::now();
        let collection_lock = self.locks.get_or_create(collection);
        let _guard = lock::acquire(&collection_lock);

        let result = self.delete_locked(collection, resource);
        self.report("store_delete", collection, resource, started_at, &result);
        result
    }

    fn delete_locked(&self, collection: &str, resource: &str) -> StoreResult<()> {
        let dir = path::collection_dir(&self.root, collection);
        if resource.is_empty() {
            return match fs::metadata(&dir) {
                Ok(metadata) if metadata.is_dir() => {
                    fs::remove_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))
                }
                Ok(_) => Err(StoreError::NotFound(dir)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    Err(StoreError::NotFound(dir))
                }
                Err(err) => Err(StoreError::io(&dir, err)),
            };
        }

        let target = dir.join(resource);
        match path::stat_or_suffixed(&target)? {
            Some((resolved, metadata)) if metadata.is_dir() => {
                fs::remove_dir_all(&resolved).map_err(|err| StoreError::io(&resolved, err))
            }
            Some((resolved, _)) => {
                fs::remove_file(&resolved).map_err(|err| StoreError::io(&resolved, err))
            }
            None => Err(StoreError::NotFound(target)),
        }
    }

    fn report(
        &self,
        event: &str,
        collection: &str,
        resource: &str,
        started_at: Instant,
        result: &StoreResult<()>,
    ) {
        let duration_ms = started_at.elapsed().as_millis();
        match result {
            Ok(()) => self.log.debug(format_args!(
                "event={event} module=driver status=ok collection={collection} resource={resource} duration_ms={duration_ms}"
            )),
            Err(err) => self.log.error(format_args!(
                "event={event} module=driver status=error collection={collection} resource={resource} duration_ms={duration_ms} error_code={} error={err}",
                err.code()
            )),
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut file = fs::File::create(path).map_err(|err| StoreError::io(path, err))?;
    file.write_all(bytes).map_err(|err| StoreError::io(path, err))?;
    file.sync_all().map_err(|err| StoreError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::{Driver, Options};
    use crate::error::StoreError;
    use crate::logger::{LogLevel, Logger};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recording(Mutex<Vec<(LogLevel, String)>>);

    impl Logger for Recording {
        fn log(&self, level: LogLevel, args: std::fmt::Arguments<'_>) {
            self.0.lock().unwrap().push((level, args.to_string()));
        }
    }

    #[test]
    fn open_creates_missing_root_and_logs_it() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("nested").join("db");
        let sink = Arc::new(Recording::default());

        let driver = Driver::open(&root, Options::with_logger(Arc::clone(&sink))).unwrap();
        assert!(root.is_dir());
        assert_eq!(driver.root(), root.as_path());

        let records = sink.0.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == LogLevel::Debug && msg.starts_with("Creating the database")));
    }

    #[test]
    fn open_reuses_existing_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("keep.txt"), b"x").unwrap();
        let sink = Arc::new(Recording::default());

        Driver::open(tmp.path(), Options::with_logger(Arc::clone(&sink))).unwrap();

        assert!(tmp.path().join("keep.txt").exists());
        let records = sink.0.lock().unwrap();
        assert!(records.iter().any(|(_, msg)| msg.contains("database already exists")));
    }

    #[test]
    fn open_rejects_root_that_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        let err = Driver::open_default(&file).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn write_reports_structured_event() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = Arc::new(Recording::default());
        let driver = Driver::open(tmp.path(), Options::with_logger(Arc::clone(&sink))).unwrap();

        driver.write("users", "alice", &json!({"age": 30})).unwrap();

        let records = sink.0.lock().unwrap();
        assert!(records.iter().any(|(level, msg)| *level == LogLevel::Debug
            && msg.contains("event=store_write")
            && msg.contains("status=ok")
            && msg.contains("collection=users")));
    }

    #[test]
    fn failed_delete_reports_error_code() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = Arc::new(Recording::default());
        let driver = Driver::open(tmp.path(), Options::with_logger(Arc::clone(&sink))).unwrap();

        let err = driver.delete("users", "ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let records = sink.0.lock().unwrap();
        assert!(records.iter().any(|(level, msg)| *level == LogLevel::Error
            && msg.contains("error_code=not_found")));
    }

    #[test]
    fn read_into_leaves_destination_untouched_on_error() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = Driver::open_default(tmp.path()).unwrap();
        let mut dest = json!({"sentinel": true});

        let err = driver.read_into("users", "missing", &mut dest).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(dest, json!({"sentinel": true}));
    }
}
