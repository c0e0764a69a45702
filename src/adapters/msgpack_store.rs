//! MessagePack implementation of the tree store.
//!
//! Each stored tree becomes one file in a directory, holding a small
//! MessagePack envelope around the encoded tree.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    identifiers::{SessionId, StorageRef},
    ports::TreeStore,
};

#[derive(Debug, Serialize, Deserialize)]
struct StoredTree {
    version: u32,
    session: SessionId,
    tree: String,
}

impl StoredTree {
    const VERSION: u32 = 1;
}

/// MessagePack-based store rooted at a directory.
///
/// References are `<session>-<16 hex digits>`; the file is
/// `<dir>/<reference>.msgpack`.
///
/// # Examples
///
/// ```no_run
/// use movetree::adapters::MsgPackStore;
/// use movetree::identifiers::SessionId;
/// use movetree::ports::TreeStore;
///
/// let store = MsgPackStore::new("sessions");
/// let reference = store.put(&SessionId::new("s1"), "{}")?;
/// let blob = store.get(&reference)?;
/// # Ok::<(), movetree::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MsgPackStore {
    dir: PathBuf,
}

impl MsgPackStore {
    /// Create a store writing into `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, reference: &StorageRef) -> Option<PathBuf> {
        let name = reference.as_str();
        let safe = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.dir.join(format!("{name}.msgpack")))
    }
}

/// Session ids may carry characters that do not belong in a file name.
fn file_safe(session: &SessionId) -> String {
    session
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

impl TreeStore for MsgPackStore {
    fn put(&self, session: &SessionId, blob: &str) -> Result<StorageRef> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            operation: format!("create store directory {:?}", self.dir),
            source,
        })?;

        let reference = loop {
            let candidate = StorageRef::new(format!(
                "{}-{:016x}",
                file_safe(session),
                rand::random::<u64>()
            ));
            if let Some(path) = self.path_for(&candidate)
                && !path.exists()
            {
                break candidate;
            }
        };
        let path = self.dir.join(format!("{reference}.msgpack"));

        let file = File::create(&path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let envelope = StoredTree {
            version: StoredTree::VERSION,
            session: session.clone(),
            tree: blob.to_string(),
        };
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write(&mut writer, &envelope).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize tree envelope to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })?;

        tracing::info!(%session, %reference, "persisted move tree");
        Ok(reference)
    }

    fn get(&self, reference: &StorageRef) -> Result<String> {
        let not_found = || Error::NotFound {
            id: reference.to_string(),
        };
        let path = self.path_for(reference).ok_or_else(not_found)?;

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("open file {path:?}"),
                    source,
                });
            }
        };

        let envelope: StoredTree = rmp_serde::decode::from_read(BufReader::new(file)).map_err(
            |e| Error::SerializationContext {
                operation: "deserialize tree envelope from MessagePack".to_string(),
                message: e.to_string(),
            },
        )?;

        if envelope.version != StoredTree::VERSION {
            return Err(Error::SerializationContext {
                operation: format!("read stored tree {reference}"),
                message: format!(
                    "unsupported envelope version {} (expected {})",
                    envelope.version,
                    StoredTree::VERSION
                ),
            });
        }

        Ok(envelope.tree)
    }
}
