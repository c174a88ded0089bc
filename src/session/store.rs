use crate::session::{BiometricCredentials, SessionRecord};
use anyhow::{Context, Result};
use rand::{distributions::Alphanumeric, Rng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const USER_DATA_FILE: &str = "user_data.json";
const SAVED_PIN_FILE: &str = "saved_pin";
const BIOMETRIC_FILE: &str = "biometric_credentials.json";
const DEVICE_ID_FILE: &str = "device_id";

/// Durable key-value persistence for the session record and related
/// artifacts, one JSON document per key under a data directory.
///
/// No concurrency control: concurrent writers race and the last write wins
/// per document. Acceptable for a single-user, single-device client where
/// writes are infrequent.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Open (and create if needed) the store under `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Serialize and write the full session record, replacing any prior
    /// value.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.path(USER_DATA_FILE), json).context("failed to write session record")?;
        debug!("session record saved");
        Ok(())
    }

    /// Load the session record. Absent or corrupted documents are treated
    /// as "no session"; parse failures never surface to the caller.
    ///
    /// # Errors
    /// Returns an error only on I/O failures other than not-found.
    pub fn load(&self) -> Result<Option<SessionRecord>> {
        let path = self.path(USER_DATA_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!("corrupted session record treated as absent: {err}");
                Ok(None)
            }
        }
    }

    /// Read-modify-write of selected fields. Last write wins; no merge
    /// guarantee across concurrent writers.
    ///
    /// # Errors
    /// Returns an error if there is no record to mutate or the write fails.
    pub fn merge<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut SessionRecord),
    {
        let mut record = self
            .load()?
            .context("cannot update fields: no session record present")?;
        mutate(&mut record);
        self.save(&record)
    }

    /// Remove the session record and the saved-pin artifact. Idempotent:
    /// clearing an absent store is not an error.
    ///
    /// # Errors
    /// Returns an error only on I/O failures other than not-found.
    pub fn clear(&self) -> Result<()> {
        for name in [USER_DATA_FILE, SAVED_PIN_FILE] {
            match fs::remove_file(self.path(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to remove {name}"));
                }
            }
        }
        debug!("session store cleared");
        Ok(())
    }

    /// Write the last successfully verified PIN. Part of the on-disk
    /// schema; nothing reads it back.
    pub fn write_saved_pin(&self, pin: &str) {
        if let Err(err) = fs::write(self.path(SAVED_PIN_FILE), pin) {
            warn!("failed to write saved pin artifact: {err}");
        }
    }

    /// Persist credentials for biometric re-login.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_biometric_credentials(&self, creds: &BiometricCredentials) -> Result<()> {
        let json = serde_json::to_string(creds)?;
        fs::write(self.path(BIOMETRIC_FILE), json)
            .context("failed to write biometric credentials")?;
        Ok(())
    }

    /// Load cached biometric re-login credentials, treating absence or
    /// corruption as "not enrolled".
    ///
    /// # Errors
    /// Returns an error only on I/O failures other than not-found.
    pub fn load_biometric_credentials(&self) -> Result<Option<BiometricCredentials>> {
        let path = self.path(BIOMETRIC_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    /// Forget cached biometric credentials. Idempotent.
    ///
    /// # Errors
    /// Returns an error only on I/O failures other than not-found.
    pub fn clear_biometric_credentials(&self) -> Result<()> {
        match fs::remove_file(self.path(BIOMETRIC_FILE)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("failed to remove biometric credentials"),
        }
    }

    /// Stable per-installation identifier, generated on first use.
    ///
    /// # Errors
    /// Returns an error if the identifier cannot be persisted.
    pub fn device_id(&self) -> Result<String> {
        let path = self.path(DEVICE_ID_FILE);
        if let Ok(id) = fs::read_to_string(&path) {
            let id = id.trim().to_string();
            if !id.is_empty() {
                return Ok(id);
            }
        }
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        fs::write(&path, &id).context("failed to persist device id")?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Transaction, Wallet};

    fn record() -> SessionRecord {
        SessionRecord {
            token: "T1".to_string(),
            token_expiration: "2030-01-01T00:00:00Z".to_string(),
            user_id: "42".to_string(),
            pin: Some("1234".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("a@b.com".to_string()),
            phone: Some("+254700000001".to_string()),
            reg_complete: Some("1".to_string()),
            photo_verification: Some("VERIFIED".to_string()),
            wallets: vec![Wallet {
                currency: "KES".to_string(),
                balance: "1050.00".to_string(),
                account_number: Some("0011223344".to_string()),
            }],
            transactions: vec![Transaction {
                reference: "TX-1".to_string(),
                kind: "transfer".to_string(),
                amount: "500.00".to_string(),
                currency: "KES".to_string(),
                status: "success".to_string(),
                narration: Some("rent".to_string()),
                created_at: Some("2026-01-01T10:00:00Z".to_string()),
            }],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let record = record();
        store.save(&record).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupted_record_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        fs::write(dir.path().join(USER_DATA_FILE), "{not json").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.save(&record()).unwrap();
        store.write_saved_pin("1234");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Double clear must not error
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn merge_overwrites_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.save(&record()).unwrap();
        store
            .merge(|record| {
                record.pin = Some("9876".to_string());
                record.transactions.clear();
            })
            .unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.pin.as_deref(), Some("9876"));
        assert!(loaded.transactions.is_empty());
        assert_eq!(loaded.token, "T1");
    }

    #[test]
    fn merge_without_record_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        assert!(store.merge(|_| {}).is_err());
    }

    #[test]
    fn biometric_credentials_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        assert!(store.load_biometric_credentials().unwrap().is_none());
        let creds = BiometricCredentials {
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
            auth_token: Some("T1".to_string()),
        };
        store.save_biometric_credentials(&creds).unwrap();
        assert_eq!(store.load_biometric_credentials().unwrap(), Some(creds));
        store.clear_biometric_credentials().unwrap();
        assert!(store.load_biometric_credentials().unwrap().is_none());
        store.clear_biometric_credentials().unwrap();
    }

    #[test]
    fn device_id_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let first = store.device_id().unwrap();
        assert_eq!(first.len(), 16);
        assert_eq!(store.device_id().unwrap(), first);
    }
}
