//! On-disk encrypted key files.
//!
//! One Web3 Secret Storage (v3) file per account, named
//! `UTC--<timestamp>--<lowercase hex address>`. Encryption and decryption
//! are delegated to alloy's local signer; this module owns the naming
//! convention and the address → file index.
//!
//! # Security
//! - Passwords and key bytes are never logged
//! - Scrypt runs on the blocking pool so it cannot stall the runtime

use alloy::primitives::{hex, Address};
use alloy::signers::local::PrivateKeySigner;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::blockchain::types::{GatewayError, GatewayResult};
use crate::observability::metrics;

const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.9fZ";
const PARSE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.fZ";

static KEYSTORE_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^UTC--(.+)--(?:0[xX])?([0-9a-fA-F]{40})$").expect("static regex")
});

/// Build the keystore file name for `address` created at `at`.
pub fn keystore_file_name(address: Address, at: DateTime<Utc>) -> String {
    format!(
        "UTC--{}--{}",
        at.format(FILE_TIMESTAMP_FORMAT),
        hex::encode(address)
    )
}

/// One keystore file recognized by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreEntry {
    pub address: Address,
    pub path: PathBuf,
    /// Creation time embedded in the file name, when it parses.
    pub created_at: Option<DateTime<Utc>>,
}

impl KeystoreEntry {
    /// Parse a file name following the keystore convention.
    pub fn from_file_name(dir: &Path, name: &str) -> Option<Self> {
        let captures = KEYSTORE_FILE_NAME.captures(name)?;
        let address: Address = captures[2].parse().ok()?;
        let created_at = NaiveDateTime::parse_from_str(&captures[1], PARSE_TIMESTAMP_FORMAT)
            .ok()
            .map(|t| t.and_utc());

        Some(Self {
            address,
            path: dir.join(name),
            created_at,
        })
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Ordering used to break ties between files of one address: newest wins.
    fn recency_key(&self) -> (Option<DateTime<Utc>>, &str) {
        (self.created_at, self.file_name())
    }
}

/// Manages the keystore directory.
#[derive(Debug, Clone)]
pub struct KeystoreStore {
    dir: PathBuf,
}

impl KeystoreStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure_dir(&self) -> GatewayResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Generate a keypair, write it encrypted under `password`, return its address.
    pub async fn create(&self, password: Option<&str>) -> GatewayResult<Address> {
        let password = match password {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return Err(GatewayError::Validation("Password cannot be empty".to_string())),
        };

        let store = self.clone();
        let address = tokio::task::spawn_blocking(move || store.create_blocking(&password))
            .await
            .map_err(|e| GatewayError::Keystore(io::Error::other(e)))??;

        metrics::record_account_created();
        Ok(address)
    }

    fn create_blocking(&self, password: &str) -> GatewayResult<Address> {
        self.ensure_dir()?;

        let signer = PrivateKeySigner::random();
        let address = signer.address();
        let name = keystore_file_name(address, Utc::now());

        // The encryptor truncates whatever it writes to, so it gets a scratch
        // name that the index ignores; publishing is create-new only.
        let partial = format!(".{}.partial", name);
        let mut rng = rand::thread_rng();
        let encrypted = PrivateKeySigner::encrypt_keystore(
            &self.dir,
            &mut rng,
            signer.to_bytes(),
            password,
            Some(partial.as_str()),
        )
        .map_err(|e| io::Error::other(e.to_string()))
        .and_then(|_| publish_new(&self.dir.join(&partial), &self.dir.join(&name)));

        let _ = fs::remove_file(self.dir.join(&partial));
        encrypted?;

        tracing::info!(address = %address, file = %name, "Account created");
        Ok(address)
    }

    /// Every recognized keystore file, in directory order.
    pub fn entries(&self) -> GatewayResult<Vec<KeystoreEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item?;
            if !item.file_type()?.is_file() {
                continue;
            }
            let name = item.file_name();
            match name.to_str().and_then(|n| KeystoreEntry::from_file_name(&self.dir, n)) {
                Some(entry) => entries.push(entry),
                None => tracing::debug!(file = ?name, "Ignoring non-keystore file"),
            }
        }
        Ok(entries)
    }

    /// Address → keystore file, rebuilt from the directory on every call.
    ///
    /// When several files carry the same address the most recent embedded
    /// timestamp wins, then the greatest file name.
    pub fn index(&self) -> GatewayResult<HashMap<Address, KeystoreEntry>> {
        let mut index: HashMap<Address, KeystoreEntry> = HashMap::new();
        for entry in self.entries()? {
            match index.get(&entry.address) {
                Some(existing) if existing.recency_key() >= entry.recency_key() => {
                    tracing::warn!(
                        address = %entry.address,
                        kept = %existing.path.display(),
                        ignored = %entry.path.display(),
                        "Duplicate keystore files for address"
                    );
                }
                _ => {
                    index.insert(entry.address, entry);
                }
            }
        }
        Ok(index)
    }

    /// Locate the keystore file for `address` (case-insensitive, `0x` optional).
    pub fn find_file_for(&self, address: &str) -> GatewayResult<PathBuf> {
        let not_found = || GatewayError::KeystoreNotFound(address.to_string());

        let trimmed = address.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let wanted: Address = digits.parse().map_err(|_| not_found())?;

        self.index()?
            .remove(&wanted)
            .map(|entry| entry.path)
            .ok_or_else(not_found)
    }

    /// Decrypt a keystore file into a signer.
    pub async fn decrypt(&self, path: PathBuf, password: &str) -> GatewayResult<PrivateKeySigner> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || decrypt_file(&path, &password))
            .await
            .map_err(|e| GatewayError::Decryption(e.to_string()))?
    }

    /// Addresses derivable from current keystore file names, sorted.
    pub fn list_accounts(&self) -> GatewayResult<Vec<Address>> {
        let mut accounts: Vec<Address> = self.index()?.into_keys().collect();
        accounts.sort();
        Ok(accounts)
    }
}

/// Copy `from` to `to`, failing with `AlreadyExists` instead of replacing `to`.
fn publish_new(from: &Path, to: &Path) -> io::Result<()> {
    let contents = fs::read(from)?;
    let mut file = fs::OpenOptions::new().write(true).create_new(true).open(to)?;
    file.write_all(&contents)?;
    file.sync_all()
}

fn decrypt_file(path: &Path, password: &str) -> GatewayResult<PrivateKeySigner> {
    PrivateKeySigner::decrypt_keystore(path, password)
        .map_err(|e| GatewayError::Decryption(e.to_string()))
}
