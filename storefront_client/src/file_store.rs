use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use log::*;
use storefront_engine::traits::KeyValueStore;

use crate::ClientError;

/// A [`KeyValueStore`] that keeps each key in its own file, `<dir>/<key>.json`.
///
/// Read failures look like a missing key and write failures are logged, matching the best-effort contract of the
/// trait.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates, if necessary) the data directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, ClientError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| ClientError::DataDirectory {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!("🪛️ Using {} for local storage", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe = key.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' });
        self.dir.join(format!("{}.json", safe.collect::<String>()))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("🪛️ Could not read {}. {e}", path.display());
                None
            },
        }
    }

    fn set_item(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        if let Err(e) = fs::write(&path, value) {
            error!("🪛️ Could not write {}. {e}", path.display());
        }
    }

    fn remove_item(&self, key: &str) {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => trace!("🪛️ Removed {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => error!("🪛️ Could not remove {}. {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod test {
    use shop_common::Money;
    use storefront_engine::{
        session::{SessionStore, SessionUser},
        store_types::{CartItem, ProductId},
        CartStore,
    };

    use super::*;

    #[test]
    fn keys_map_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        assert!(store.get_item("cart").is_none());
        store.set_item("cart", "[]");
        assert!(store.dir().join("cart.json").exists());
        assert_eq!(store.get_item("cart").as_deref(), Some("[]"));
        store.remove_item("cart");
        store.remove_item("cart");
        assert!(store.get_item("cart").is_none());
        store.set_item("../escape", "x");
        assert!(store.dir().join("___escape.json").exists());
    }

    #[test]
    fn cart_and_session_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let cart = CartStore::new(FileStore::open(dir.path()).unwrap());
        cart.add_item(cart.load(), CartItem::new(ProductId(3), "Oud", Money::from(75)));
        SessionStore::new(FileStore::open(dir.path()).unwrap()).set_auth_token(Some("tok"));

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(CartStore::new(reopened.clone()).load().len(), 1);
        let session = SessionStore::new(reopened);
        assert!(session.is_authenticated());
        assert_eq!(session.user(), None::<SessionUser>);
    }

    #[test]
    fn corrupt_files_load_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cart.json"), "{{{").unwrap();
        let cart = CartStore::new(FileStore::open(dir.path()).unwrap());
        assert!(cart.load().is_empty());
    }
}
