//! Core domain entities per `SPEC_FULL.md` §3.
//!
//! Fixed-size cryptographic types (`Address`, `Hash`, `SignData`) use
//! `serde_with::Bytes` the way the teacher's `BlockHeader` does, so they
//! serialize as compact byte arrays rather than JSON number arrays.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::BTreeMap;

/// 20-byte account/miner identifier.
pub type Address = [u8; 20];

/// 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// 65-byte recoverable ECDSA signature: `r (32) || s (32) || recovery_id (1)`.
///
/// A confirm is a `SignData` produced by a deputy over a block hash.
pub type SignData = [u8; 65];

/// 64-byte uncompressed-public-key suffix identifying a deputy's node.
pub type NodeId = [u8; 64];

/// A member of the committee. Ordered by `rank` within a term; rank determines
/// the deputy's slot in the mining rotation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deputy {
    pub miner_address: Address,
    /// 64-byte public-key suffix.
    #[serde_as(as = "Bytes")]
    pub node_id: NodeId,
    /// 0-based, unique within a term.
    pub rank: u32,
    pub votes: u128,
}

/// A committee snapshot effective from `start_height` until the next term's
/// `start_height`. Terms are stored in insertion order and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub start_height: u32,
    pub nodes: Vec<Deputy>,
}

/// A single signer entry in a multi-sig account (`AccountData::signers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEntry {
    pub address: Address,
    pub weight: u8,
}

/// A record of one finalised change-log version at a given block height, used
/// to let `versionRecords` be replayed deterministically across finalisations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub log_type: ChangeLogKind,
    pub version: u32,
    pub height: u32,
}

/// Per-address account state. See `SPEC_FULL.md` §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountData {
    pub address: Address,
    pub balance: u128,
    pub code_hash: Hash,
    pub storage_root: Hash,
    pub asset_code_root: Hash,
    pub asset_id_root: Hash,
    pub equity_root: Hash,
    pub vote_for: Address,
    pub candidate_votes: u128,
    pub candidate_profile: BTreeMap<String, String>,
    pub version_records: Vec<VersionRecord>,
    pub signers: Vec<SignerEntry>,
}

impl AccountData {
    /// A brand-new, never-touched account at the given address.
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            code_hash: EMPTY_CODE_HASH,
            storage_root: EMPTY_TRIE_ROOT,
            asset_code_root: EMPTY_TRIE_ROOT,
            asset_id_root: EMPTY_TRIE_ROOT,
            equity_root: EMPTY_TRIE_ROOT,
            vote_for: [0u8; 20],
            candidate_votes: 0,
            candidate_profile: BTreeMap::new(),
            version_records: Vec::new(),
            signers: Vec::new(),
        }
    }

    /// Current version counter for a given log kind, i.e. the number of
    /// committed mutations of that kind so far.
    pub fn version(&self, kind: ChangeLogKind) -> u32 {
        self.version_records
            .iter()
            .rev()
            .find(|r| r.log_type == kind)
            .map(|r| r.version)
            .unwrap_or(0)
    }
}

/// Keccak256 of the empty byte string. Canonical "no code" marker.
pub const EMPTY_CODE_HASH: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Canonical empty-trie root (Keccak256 of the RLP encoding of an empty string).
pub const EMPTY_TRIE_ROOT: Hash = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];

/// Discriminant for `ChangeLog` variants. Kept as a separate type (rather than
/// matching on the enum directly) so `AccountData::version_records` can record
/// "which kind changed" without embedding the mutation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeLogKind {
    Balance,
    Code,
    StorageRoot,
    Suicide,
    Vote,
    CandidateProfile,
    CandidateVotes,
    Signer,
}

/// A single reversible account mutation. Implemented as an exhaustive
/// tagged-variant enum per `SPEC_FULL.md` §9 Design Note ("Change-log engine
/// vs. direct mutation") rather than the source's registered per-type
/// decoder table: there is no `UnknownChangeLogType` at runtime, only a
/// deserialization error on an unrecognised wire tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeLogData {
    Balance { old: u128, new: u128 },
    Code { old: Hash, new: Hash },
    /// A single storage-slot mutation. `key` and `old`/`new` values are
    /// 32-byte words; an empty `new` represents slot deletion.
    StorageRoot {
        key: Hash,
        old: Option<Hash>,
        new: Option<Hash>,
    },
    /// `old` is the full pre-suicide account snapshot, needed to Undo.
    Suicide { old: Box<AccountData> },
    Vote { old: Address, new: Address },
    CandidateProfile {
        old: BTreeMap<String, String>,
        new: BTreeMap<String, String>,
    },
    CandidateVotes { old: u128, new: u128 },
    Signer {
        old: Vec<SignerEntry>,
        new: Vec<SignerEntry>,
    },
}

impl ChangeLogData {
    pub fn kind(&self) -> ChangeLogKind {
        match self {
            ChangeLogData::Balance { .. } => ChangeLogKind::Balance,
            ChangeLogData::Code { .. } => ChangeLogKind::Code,
            ChangeLogData::StorageRoot { .. } => ChangeLogKind::StorageRoot,
            ChangeLogData::Suicide { .. } => ChangeLogKind::Suicide,
            ChangeLogData::Vote { .. } => ChangeLogKind::Vote,
            ChangeLogData::CandidateProfile { .. } => ChangeLogKind::CandidateProfile,
            ChangeLogData::CandidateVotes { .. } => ChangeLogKind::CandidateVotes,
            ChangeLogData::Signer { .. } => ChangeLogKind::Signer,
        }
    }
}

/// A single semantic mutation of one address's state, the unit of Undo/Redo
/// during fork switches. `data` carries `oldVal`/`newVal` together as one
/// tagged payload (Design Note §9); `data`'s `old` half is never persisted
/// to the wire hash, only used locally for Undo (see `ChangeLog::hash`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    pub address: Address,
    pub version: u32,
    pub data: ChangeLogData,
}

impl ChangeLog {
    pub fn kind(&self) -> ChangeLogKind {
        self.data.kind()
    }
}

/// Discriminates the payload-specific rules a transaction body-verify
/// applies (`SpecialTx`/`TxType`/`CreateContract`/`BoxTx` in `SPEC_FULL.md`
/// §4.4/§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Ordinary,
    CreateContract,
    RegisterCandidate,
    Vote,
    Asset,
    Box,
}

/// A signed transaction. EVM execution (`TxExecutor`) is out of scope per
/// `SPEC_FULL.md` §1; only the envelope needed for consensus bookkeeping lives
/// here.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Option<Address>,
    pub amount: u128,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Seconds since epoch after which the transaction is no longer valid.
    pub expiration_time: u64,
    pub kind: TransactionKind,
    pub data: Vec<u8>,
    pub to_name: String,
    pub message: String,
    pub chain_id: u16,
    /// Sub-transactions of a "box" transaction; empty for ordinary transactions.
    pub sub_transactions: Vec<Transaction>,
    #[serde_as(as = "Bytes")]
    pub signature: SignData,
}

impl Transaction {
    pub fn is_box_tx(&self) -> bool {
        matches!(self.kind, TransactionKind::Box)
    }
}

/// Block header. `extra` length is bounded by `MaxExtraDataLen`
/// (`shared_types::params::MAX_EXTRA_DATA_LEN`).
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: Hash,
    pub miner_address: Address,
    pub version_root: Hash,
    pub tx_root: Hash,
    pub log_root: Hash,
    pub event_root: Hash,
    /// Only populated (non-zero) on snapshot-block heights.
    pub deputy_root: Hash,
    /// Bloom filter over event topics. EVM execution is out of scope
    /// (`SPEC_FULL.md` §1), so this stays all-zero; kept for header-shape
    /// fidelity since it's part of the canonical hash input.
    #[serde_as(as = "Bytes")]
    pub bloom: [u8; 256],
    pub height: u32,
    pub gas_limit: u64,
    pub gas_used: u64,
    /// Seconds since epoch.
    pub time: u64,
    pub extra: Vec<u8>,
}

impl Header {
    /// Canonical block hash: Keccak-256 over the header's deterministic
    /// bincode encoding. Not RLP, and not `#[derive(Hash)]` (which hashes
    /// into a `std::hash::Hasher`, not a content digest) — see `SPEC_FULL.md`
    /// §3. The single source of truth for block identity; every crate that
    /// needs a block hash calls this rather than re-deriving its own.
    pub fn hash(&self) -> Hash {
        shared_crypto::keccak256(&bincode::serialize(self).expect("header is always encodable"))
    }
}

/// A block: header plus body (transactions, change logs, confirms, and the
/// next term's committee on snapshot blocks).
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub txs: Vec<Transaction>,
    pub change_logs: Vec<ChangeLog>,
    /// The miner's own signature over `header`'s hash, recovered to identify
    /// the signer independently of `header.miner_address`. Distinct from
    /// `confirms`, which are other deputies' attestations to finality.
    #[serde_as(as = "Bytes")]
    pub miner_signature: SignData,
    pub confirms: Vec<SignData>,
    pub deputy_nodes: Vec<Deputy>,
}

impl Block {
    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    pub fn miner_address(&self) -> Address {
        self.header.miner_address
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn is_confirm_exist(&self, sig: &SignData) -> bool {
        self.confirms.iter().any(|s| s == sig)
    }
}

/// Per-peer status summary exchanged over the (out-of-scope) peer protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestStatus {
    pub cur_height: u32,
    pub cur_hash: Hash,
    pub sta_height: u32,
    pub sta_hash: Hash,
}
