use crate::errors::ScoutError;
use serde_json::Value;

/// Key/value persistence collaborator used for saved settings and results
pub mod kv {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::Map;
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Durable key/value storage.
    ///
    /// The scanner core only reads and writes whole values; durability and
    /// corruption handling are up to the implementation.
    pub trait KeyValueStore: Send + Sync {
        fn get(&self, key: &str) -> Result<Option<Value>, ScoutError>;
        fn set(&self, key: &str, value: Value) -> Result<(), ScoutError>;
    }

    /// Volatile store, used when nothing needs to outlive the process
    #[derive(Default)]
    pub struct MemoryStore {
        entries: Mutex<HashMap<String, Value>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<Value>, ScoutError> {
            Ok(self.entries.lock().get(key).cloned())
        }

        fn set(&self, key: &str, value: Value) -> Result<(), ScoutError> {
            self.entries.lock().insert(key.to_string(), value);
            Ok(())
        }
    }

    /// All keys kept as one JSON object in a single file
    pub struct JsonFileStore {
        path: PathBuf,
        // Serialises read-modify-write cycles within this process
        guard: Mutex<()>,
    }

    impl JsonFileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                guard: Mutex::new(()),
            }
        }

        /// Store file under the per-user data directory
        pub fn default_location() -> Result<Self, ScoutError> {
            let dirs = directories::ProjectDirs::from("", "", "nodescout").ok_or_else(|| {
                ScoutError::Persistence("no home directory to keep data in".to_string())
            })?;
            Ok(Self::new(dirs.data_dir().join("storage.json")))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load(&self) -> Result<Map<String, Value>, ScoutError> {
            match fs::read(&self.path) {
                Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
                Ok(bytes) => match serde_json::from_slice(&bytes)? {
                    Value::Object(map) => Ok(map),
                    _ => Err(ScoutError::Persistence(format!(
                        "{} does not hold a JSON object",
                        self.path.display()
                    ))),
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
                Err(e) => Err(e.into()),
            }
        }

        fn write(&self, map: &Map<String, Value>) -> Result<(), ScoutError> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }

    impl KeyValueStore for JsonFileStore {
        fn get(&self, key: &str) -> Result<Option<Value>, ScoutError> {
            let _guard = self.guard.lock();
            Ok(self.load()?.remove(key))
        }

        fn set(&self, key: &str, value: Value) -> Result<(), ScoutError> {
            let _guard = self.guard.lock();
            let mut map = self.load()?;
            map.insert(key.to_string(), value);
            self.write(&map)
        }
    }
}
