use std::collections::HashMap;
use std::sync::Arc;

use shared_crypto::merkle_root_of;
use shared_types::{
    AccountData, Address, ChangeLog, ChangeLogData, ChangeLogKind, Hash, SignerEntry,
};
use std::collections::BTreeMap;

use crate::errors::AccountError;
use crate::ports::AccountStore;
use crate::raw_account::RawAccount;
use tracing::debug;

/// A lightweight handle into the manager's account slab. Cheap to copy,
/// avoids the source's raw-pointer `SafeAccount` back-references (Design
/// Note §9: arena-with-indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountHandle(usize);

/// Owns a `{parentHash -> account cache}` binding: loads accounts lazily
/// from the `AccountStore` port, mutates them in memory, and emits a
/// `ChangeLog` per mutation. See `SPEC_FULL.md` §4.3.
pub struct Manager {
    bound_parent: Hash,
    store: Arc<dyn AccountStore>,
    slab: Vec<RawAccount>,
    index_by_address: HashMap<Address, usize>,
    logs: Vec<ChangeLog>,
    pending_code: Vec<(Hash, Vec<u8>)>,
    version_root: Hash,
    read_only: bool,
}

impl Manager {
    pub fn new(store: Arc<dyn AccountStore>, parent_hash: Hash) -> Self {
        Self {
            bound_parent: parent_hash,
            store,
            slab: Vec::new(),
            index_by_address: HashMap::new(),
            logs: Vec::new(),
            pending_code: Vec::new(),
            version_root: [0u8; 32],
            read_only: false,
        }
    }

    /// A manager that rejects `finalise`/`save` and any mutating call,
    /// for RPC and validation read-paths (`SPEC_FULL.md` §4.3).
    pub fn new_read_only(store: Arc<dyn AccountStore>, parent_hash: Hash) -> Self {
        let mut m = Self::new(store, parent_hash);
        m.read_only = true;
        m
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn bound_parent(&self) -> Hash {
        self.bound_parent
    }

    /// Rebind this manager to a different parent hash, discarding the
    /// in-memory cache (`reset(parentHash)` per `SPEC_FULL.md` §3).
    pub fn reset(&mut self, parent_hash: Hash) {
        self.bound_parent = parent_hash;
        self.slab.clear();
        self.index_by_address.clear();
        self.logs.clear();
        self.pending_code.clear();
        self.version_root = [0u8; 32];
    }

    /// Load-or-create the account at `address`, returning a handle to it.
    pub fn get_account(&mut self, address: Address) -> AccountHandle {
        if let Some(&idx) = self.index_by_address.get(&address) {
            return AccountHandle(idx);
        }
        let data = self
            .store
            .load_account(self.bound_parent, address)
            .unwrap_or_else(|| AccountData::empty(address));
        let storage = self.store.load_storage(self.bound_parent, address);
        self.slab.push(RawAccount::new(data, storage));
        let idx = self.slab.len() - 1;
        self.index_by_address.insert(address, idx);
        AccountHandle(idx)
    }

    fn raw(&self, handle: AccountHandle) -> &RawAccount {
        &self.slab[handle.0]
    }

    fn raw_mut(&mut self, handle: AccountHandle) -> &mut RawAccount {
        &mut self.slab[handle.0]
    }

    pub fn balance(&self, handle: AccountHandle) -> u128 {
        self.raw(handle).data.balance
    }

    pub fn account_data(&self, handle: AccountHandle) -> &AccountData {
        &self.raw(handle).data
    }

    pub fn get_storage_state(&self, handle: AccountHandle, key: Hash) -> Result<Option<Hash>, AccountError> {
        self.raw(handle).get_storage_state(key)
    }

    pub fn set_balance(&mut self, handle: AccountHandle, new: u128) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).data.balance;
        self.raw_mut(handle).data.balance = new;
        self.emit(handle, ChangeLogKind::Balance, ChangeLogData::Balance { old, new });
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Fails with `InsufficientFunds` if
    /// the sender's balance is too low.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<(), AccountError> {
        self.guard_writable()?;
        let from_handle = self.get_account(from);
        let from_balance = self.balance(from_handle);
        if from_balance < amount {
            return Err(AccountError::InsufficientFunds);
        }
        self.set_balance(from_handle, from_balance - amount)?;
        let to_handle = self.get_account(to);
        let to_balance = self.balance(to_handle);
        self.set_balance(to_handle, to_balance + amount)?;
        Ok(())
    }

    pub fn set_code(&mut self, handle: AccountHandle, code: Vec<u8>) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).data.code_hash;
        let new = self.raw_mut(handle).set_code(&code);
        self.pending_code.push((new, code));
        self.emit(handle, ChangeLogKind::Code, ChangeLogData::Code { old, new });
        Ok(())
    }

    pub fn set_storage_state(
        &mut self,
        handle: AccountHandle,
        key: Hash,
        value: Option<Hash>,
    ) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).get_storage_state(key)?;
        self.raw_mut(handle).set_storage_state(key, value);
        self.emit(
            handle,
            ChangeLogKind::StorageRoot,
            ChangeLogData::StorageRoot { key, old, new: value },
        );
        Ok(())
    }

    pub fn set_vote_for(&mut self, handle: AccountHandle, new: Address) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).data.vote_for;
        self.raw_mut(handle).data.vote_for = new;
        self.emit(handle, ChangeLogKind::Vote, ChangeLogData::Vote { old, new });
        Ok(())
    }

    pub fn set_candidate_votes(&mut self, handle: AccountHandle, new: u128) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).data.candidate_votes;
        self.raw_mut(handle).data.candidate_votes = new;
        self.emit(
            handle,
            ChangeLogKind::CandidateVotes,
            ChangeLogData::CandidateVotes { old, new },
        );
        Ok(())
    }

    pub fn set_candidate_profile(
        &mut self,
        handle: AccountHandle,
        new: BTreeMap<String, String>,
    ) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).data.candidate_profile.clone();
        self.raw_mut(handle).data.candidate_profile = new.clone();
        self.emit(
            handle,
            ChangeLogKind::CandidateProfile,
            ChangeLogData::CandidateProfile { old, new },
        );
        Ok(())
    }

    pub fn set_signers(&mut self, handle: AccountHandle, new: Vec<SignerEntry>) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = self.raw(handle).data.signers.clone();
        self.raw_mut(handle).data.signers = new.clone();
        self.emit(handle, ChangeLogKind::Signer, ChangeLogData::Signer { old, new });
        Ok(())
    }

    pub fn suicide(&mut self, handle: AccountHandle) -> Result<(), AccountError> {
        self.guard_writable()?;
        let old = Box::new(self.raw(handle).data.clone());
        let address = old.address;
        self.raw_mut(handle).data = AccountData::empty(address);
        self.emit(handle, ChangeLogKind::Suicide, ChangeLogData::Suicide { old });
        Ok(())
    }

    fn emit(&mut self, handle: AccountHandle, kind: ChangeLogKind, data: ChangeLogData) {
        let version = self.raw_mut(handle).bump_version(kind);
        let address = self.raw(handle).data.address;
        self.logs.push(ChangeLog { address, version, data });
    }

    /// Current change-log length, to be passed back to `revert_to_snapshot`.
    pub fn snapshot(&self) -> usize {
        self.logs.len()
    }

    /// Drop logs past `snapshot_id` and Undo them in reverse order.
    pub fn revert_to_snapshot(&mut self, snapshot_id: usize) -> Result<(), AccountError> {
        while self.logs.len() > snapshot_id {
            let log = self.logs.pop().expect("checked len() > snapshot_id");
            self.undo_log(&log)?;
        }
        Ok(())
    }

    /// All change-logs emitted since construction or the last `reset`, in
    /// emission order.
    pub fn logs(&self) -> &[ChangeLog] {
        &self.logs
    }

    pub fn version_root(&self) -> Hash {
        self.version_root
    }

    /// Commits dirty storage for every touched account, updates
    /// `versionRecords`, and computes `version_root` as the Merkle root of
    /// all logs sorted by `(address, version)`.
    pub fn finalise(&mut self, height: u32) -> Result<(), AccountError> {
        if self.read_only {
            return Err(AccountError::SaveReadOnly);
        }
        self.logs.sort_by_key(|l| (l.address, l.version));
        for raw in &mut self.slab {
            raw.finalise(height);
        }
        self.version_root = merkle_root_of(&self.logs);
        debug!(height, logs = self.logs.len(), "account manager finalised");
        Ok(())
    }

    /// Persists every touched account, its storage, and any new bytecode
    /// under `block_hash`.
    pub fn save(&mut self, block_hash: Hash) -> Result<(), AccountError> {
        if self.read_only {
            return Err(AccountError::SaveReadOnly);
        }
        let accounts: Vec<AccountData> = self.slab.iter().map(|r| r.data.clone()).collect();
        self.store.save_accounts(block_hash, &accounts);
        for raw in &self.slab {
            self.store
                .save_storage(block_hash, raw.data.address, raw.storage_snapshot());
        }
        for (hash, code) in self.pending_code.drain(..) {
            self.store.save_code(hash, code);
        }
        Ok(())
    }

    /// Apply a previously-recorded mutation (used when replaying a block
    /// during fork-switch Redo).
    pub fn redo_log(&mut self, log: &ChangeLog) -> Result<(), AccountError> {
        let handle = self.get_account(log.address);
        let kind = log.kind();
        let current = self.raw(handle).version(kind);
        if current >= log.version {
            return Err(AccountError::AlreadyRedo);
        }
        if current + 1 != log.version {
            return Err(AccountError::WrongChangeLogVersion);
        }
        apply_new_value(self.raw_mut(handle), &log.data);
        self.raw_mut(handle).set_version(kind, log.version);
        Ok(())
    }

    /// Reverse a previously-applied mutation (fork-switch Undo, or
    /// `revert_to_snapshot`).
    pub fn undo_log(&mut self, log: &ChangeLog) -> Result<(), AccountError> {
        let handle = self.get_account(log.address);
        let kind = log.kind();
        let current = self.raw(handle).version(kind);
        if current < log.version {
            return Err(AccountError::AlreadyRedo);
        }
        if current != log.version {
            return Err(AccountError::WrongChangeLogVersion);
        }
        apply_old_value(self.raw_mut(handle), &log.data);
        self.raw_mut(handle).set_version(kind, log.version - 1);
        Ok(())
    }

    fn guard_writable(&self) -> Result<(), AccountError> {
        if self.read_only {
            Err(AccountError::SaveReadOnly)
        } else {
            Ok(())
        }
    }
}

fn apply_new_value(raw: &mut RawAccount, data: &ChangeLogData) {
    match data {
        ChangeLogData::Balance { new, .. } => raw.data.balance = *new,
        ChangeLogData::Code { new, .. } => raw.data.code_hash = *new,
        ChangeLogData::StorageRoot { key, new, .. } => raw.set_storage_state(*key, *new),
        ChangeLogData::Suicide { old } => raw.data = AccountData::empty(old.address),
        ChangeLogData::Vote { new, .. } => raw.data.vote_for = *new,
        ChangeLogData::CandidateProfile { new, .. } => raw.data.candidate_profile = new.clone(),
        ChangeLogData::CandidateVotes { new, .. } => raw.data.candidate_votes = *new,
        ChangeLogData::Signer { new, .. } => raw.data.signers = new.clone(),
    }
}

fn apply_old_value(raw: &mut RawAccount, data: &ChangeLogData) {
    match data {
        ChangeLogData::Balance { old, .. } => raw.data.balance = *old,
        ChangeLogData::Code { old, .. } => raw.data.code_hash = *old,
        ChangeLogData::StorageRoot { key, old, .. } => raw.set_storage_state(*key, *old),
        ChangeLogData::Suicide { old } => raw.data = (**old).clone(),
        ChangeLogData::Vote { old, .. } => raw.data.vote_for = *old,
        ChangeLogData::CandidateProfile { old, .. } => raw.data.candidate_profile = old.clone(),
        ChangeLogData::CandidateVotes { old, .. } => raw.data.candidate_votes = *old,
        ChangeLogData::Signer { old, .. } => raw.data.signers = old.clone(),
    }
}
