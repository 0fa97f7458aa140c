use crate::error::{CallbackError, CallbackResult};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use directories::ProjectDirs;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

const NONCE_LEN: usize = 12;

/// Durable key/value storage that outlives one activation.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> CallbackResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CallbackResult<()>;
    fn remove(&self, key: &str) -> CallbackResult<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> CallbackResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CallbackResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CallbackResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Encrypted JSON map on disk. Every call reads and rewrites the whole file.
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> CallbackResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn open_default() -> CallbackResult<Self> {
        Self::open(Self::default_dir()?)
    }

    pub fn default_dir() -> CallbackResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "oauth-callback", "oauth-callback").ok_or_else(
            || {
                CallbackError::Storage(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine project directories",
                ))
            },
        )?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    fn storage_path(&self) -> PathBuf {
        self.dir.join("storage.bin")
    }

    fn secret_key_path(&self) -> PathBuf {
        self.dir.join(".secret_key")
    }

    fn load(&self) -> CallbackResult<BTreeMap<String, String>> {
        let path = self.storage_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let encrypted = fs::read(&path)?;
        let decrypted = self.decrypt(&encrypted)?;
        Ok(serde_json::from_slice(&decrypted)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> CallbackResult<()> {
        let json = serde_json::to_vec(entries)?;
        let encrypted = self.encrypt(&json)?;
        write_secure_file(&self.storage_path(), &encrypted)
    }

    fn update<F>(&self, apply: F) -> CallbackResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e @ (CallbackError::Crypto(_) | CallbackError::Serialization(_))) => {
                self.quarantine(&e)?;
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        apply(&mut entries);
        self.save(&entries)
    }

    /// Moves an unreadable storage file aside so writes can start over.
    fn quarantine(&self, cause: &CallbackError) -> CallbackResult<()> {
        let path = self.storage_path();
        let aside = path.with_extension("bin.corrupt");
        warn!(
            "Local storage unreadable ({}), moving it to {}",
            cause,
            aside.display()
        );
        fs::rename(&path, &aside)?;
        Ok(())
    }

    fn get_or_create_key(&self) -> CallbackResult<[u8; 32]> {
        let path = self.secret_key_path();

        if path.exists() {
            let key_bytes = fs::read(&path)?;
            if key_bytes.len() == 32 {
                let mut key = [0u8; 32];
                key.copy_from_slice(&key_bytes);
                return Ok(key);
            }
        }

        let mut key = [0u8; 32];
        rand::thread_rng().fill(&mut key);
        write_secure_file(&path, &key)?;
        Ok(key)
    }

    fn encrypt(&self, plaintext: &[u8]) -> CallbackResult<Vec<u8>> {
        let key = self.get_or_create_key()?;
        let cipher = Aes256Gcm::new(aes_gcm::aead::Key::<Aes256Gcm>::from_slice(&key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CallbackError::Crypto("encryption failed".to_string()))?;

        let mut result = nonce_bytes.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CallbackResult<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN {
            return Err(CallbackError::Crypto("ciphertext too short".to_string()));
        }

        let key = self.get_or_create_key()?;
        let cipher = Aes256Gcm::new(aes_gcm::aead::Key::<Aes256Gcm>::from_slice(&key));

        let nonce = Nonce::from_slice(&ciphertext[..NONCE_LEN]);
        cipher
            .decrypt(nonce, &ciphertext[NONCE_LEN..])
            .map_err(|_| CallbackError::Crypto("decryption failed".to_string()))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> CallbackResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> CallbackResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> CallbackResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// Writes through a sibling temp file and renames it into place, so a crash
/// never leaves `path` half written.
fn write_secure_file(path: &Path, bytes: &[u8]) -> CallbackResult<()> {
    let tmp = path.with_extension("tmp");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)?;
    Ok(())
}
