use std::collections::BTreeMap;

use shared_crypto::keccak256;
use shared_types::{AccountData, ChangeLogKind, Hash, VersionRecord};

use crate::errors::AccountError;

/// Direct getters/setters over one account's persisted state plus a
/// dirty/cached storage split. No change-log emission here — that is
/// `SafeAccount`'s (i.e. the `Manager`'s mutating API) responsibility.
pub struct RawAccount {
    pub data: AccountData,
    cached: BTreeMap<Hash, Hash>,
    dirty: BTreeMap<Hash, Option<Hash>>,
    /// Per-kind mutation counters for the current (unfinalised) block,
    /// seeded from `data.version(kind)` on load.
    runtime_versions: BTreeMap<ChangeLogKind, u32>,
}

impl RawAccount {
    pub fn new(data: AccountData, storage: BTreeMap<Hash, Hash>) -> Self {
        Self {
            data,
            cached: storage,
            dirty: BTreeMap::new(),
            runtime_versions: BTreeMap::new(),
        }
    }

    /// The account's mutation counter for `kind`, including any mutations
    /// made so far in the current (unfinalised) block.
    pub fn version(&self, kind: ChangeLogKind) -> u32 {
        *self
            .runtime_versions
            .get(&kind)
            .unwrap_or(&self.data.version(kind))
    }

    /// Bump and return the new version for `kind`.
    pub fn bump_version(&mut self, kind: ChangeLogKind) -> u32 {
        let next = self.version(kind) + 1;
        self.runtime_versions.insert(kind, next);
        next
    }

    /// Forcibly set the version counter for `kind` (used by Undo/Redo).
    pub fn set_version(&mut self, kind: ChangeLogKind, version: u32) {
        self.runtime_versions.insert(kind, version);
    }

    /// `cached[key]` if present (authoritative read-through), else the trie
    /// value at the account's current `storage_root`. Trie lookups are
    /// simulated: the "trie" is exactly the committed `cached` map, so a
    /// miss there is absence, never `TrieFail` — a real trie adapter could
    /// still surface inconsistency, which is why the error exists.
    pub fn get_storage_state(&self, key: Hash) -> Result<Option<Hash>, AccountError> {
        if let Some(pending) = self.dirty.get(&key) {
            return Ok(*pending);
        }
        Ok(self.cached.get(&key).copied())
    }

    /// Normalises an empty/absent value to deletion; writes to `dirty`.
    pub fn set_storage_state(&mut self, key: Hash, value: Option<Hash>) {
        self.dirty.insert(key, value);
    }

    /// Recomputes `code_hash` (Keccak256 of `code`, or of the empty string)
    /// and records the new bytecode for the caller to persist.
    pub fn set_code(&mut self, code: &[u8]) -> Hash {
        let hash = keccak256(code);
        self.data.code_hash = hash;
        hash
    }

    /// Commits dirty storage into the cache, recomputes `storage_root`
    /// (Keccak256 over the sorted, concatenated key/value pairs — the trie
    /// itself is out of scope, but root determinism is in scope), and
    /// appends a `VersionRecord` for each kind whose version advanced since
    /// the last finalisation at this height.
    pub fn finalise(&mut self, height: u32) {
        for (key, value) in self.dirty.drain().collect::<Vec<_>>() {
            match value {
                Some(v) => {
                    self.cached.insert(key, v);
                }
                None => {
                    self.cached.remove(&key);
                }
            }
        }
        self.data.storage_root = merkle_of_storage(&self.cached);

        for (kind, version) in self.runtime_versions.clone() {
            if version != self.data.version(kind) {
                upsert_version_record(&mut self.data.version_records, kind, version, height);
            }
        }
    }

    pub fn storage_snapshot(&self) -> BTreeMap<Hash, Hash> {
        self.cached.clone()
    }
}

fn upsert_version_record(records: &mut Vec<VersionRecord>, kind: ChangeLogKind, version: u32, height: u32) {
    if let Some(existing) = records
        .iter_mut()
        .find(|r| r.log_type == kind && r.height == height)
    {
        existing.version = version;
        return;
    }
    records.push(VersionRecord {
        log_type: kind,
        version,
        height,
    });
}

fn merkle_of_storage(storage: &BTreeMap<Hash, Hash>) -> Hash {
    let mut buf = Vec::with_capacity(storage.len() * 64);
    for (k, v) in storage {
        buf.extend_from_slice(k);
        buf.extend_from_slice(v);
    }
    keccak256(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_roundtrips_through_dirty_then_finalise() {
        let mut acct = RawAccount::new(AccountData::empty([1; 20]), BTreeMap::new());
        let key = [9u8; 32];
        let value = [7u8; 32];

        assert_eq!(acct.get_storage_state(key).unwrap(), None);
        acct.set_storage_state(key, Some(value));
        assert_eq!(acct.get_storage_state(key).unwrap(), Some(value));

        acct.finalise(1);
        assert_eq!(acct.get_storage_state(key).unwrap(), Some(value));
        assert_ne!(acct.data.storage_root, shared_types::EMPTY_TRIE_ROOT);
    }

    #[test]
    fn deletion_removes_from_cache_after_finalise() {
        let mut acct = RawAccount::new(AccountData::empty([1; 20]), BTreeMap::new());
        let key = [9u8; 32];
        acct.set_storage_state(key, Some([1; 32]));
        acct.finalise(1);
        acct.set_storage_state(key, None);
        acct.finalise(2);
        assert_eq!(acct.get_storage_state(key).unwrap(), None);
    }

    #[test]
    fn version_records_advance_per_kind() {
        let mut acct = RawAccount::new(AccountData::empty([1; 20]), BTreeMap::new());
        acct.bump_version(ChangeLogKind::Balance);
        acct.finalise(5);
        assert_eq!(acct.data.version(ChangeLogKind::Balance), 1);
    }
}
