//! Storage backends

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsValue;

    use crate::persistence::{KeyValueStore, Result, StorageError};

    /// The browser's `window.localStorage`
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn open() -> Result<Self> {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StorageError::Unavailable)?;
            Ok(Self { storage })
        }
    }

    fn js_error(err: JsValue) -> StorageError {
        StorageError::Backend(format!("{:?}", err))
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.storage.get_item(key).map_err(js_error)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.storage.set_item(key, value).map_err(js_error)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.storage.remove_item(key).map_err(js_error)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use crate::persistence::{KeyValueStore, Result};

    /// One `<key>.json` file per key in a data directory
    ///
    /// Writes go to a temporary file first and are renamed into place, so
    /// a crash mid-write leaves the previous document intact.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        /// Open (and create if needed) a data directory
        pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
            let dir = dir.into();
            fs::create_dir_all(&dir)?;
            log::debug!("Using data directory {}", dir.display());
            Ok(Self { dir })
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            match fs::read_to_string(self.path(key)) {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let path = self.path(key);
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            match fs::remove_file(self.path(key)) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
    }

}
