//! Peer protocol surface. No transport or RLP framing is implemented here —
//! `PeerMessage` models the on-the-wire message kinds named in
//! `SPEC_FULL.md` §6, and `PeerTransport` is the port a real P2P stack would
//! implement; the binary wires a no-op adapter in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_types::{Block, Hash, SignData, Transaction};

/// On-the-wire message kinds exchanged between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PeerMessage {
    ProHandshake { genesis_hash: Hash, node_id: shared_types::NodeId },
    Heartbeat,
    GetBlocks { from: u32, to: u32 },
    Blocks(Vec<Block>),
    BlockHash { height: u32, hash: Hash },
    GetConfirms { height: u32, hash: Hash },
    Confirms { height: u32, hash: Hash, sigs: Vec<SignData> },
    Confirm { height: u32, hash: Hash, sig: SignData },
    GetLstStatus { revert: bool },
    LstStatus(shared_types::LatestStatus),
    Txs(Vec<Transaction>),
    DiscoverReq { seq: u64 },
    DiscoverRes,
}

/// A remote peer to exchange `PeerMessage`s with. No production body ships
/// here; a real adapter owns the socket/handshake/framing.
pub trait PeerTransport: Send + Sync {
    fn send(&self, msg: PeerMessage) -> Result<(), NetworkError>;
    fn recv(&self) -> Result<Option<PeerMessage>, NetworkError>;
}

/// A `PeerTransport` that accepts sends and never has anything to receive,
/// for wiring a node up without a real network stack.
pub struct NoopTransport;

impl PeerTransport for NoopTransport {
    fn send(&self, _msg: PeerMessage) -> Result<(), NetworkError> {
        Ok(())
    }

    fn recv(&self) -> Result<Option<PeerMessage>, NetworkError> {
        Ok(None)
    }
}

/// Peer-protocol errors. Port-boundary only; no transport implements the
/// cases that would actually produce these today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("refused to connect to self")]
    ConnectSelf,
    #[error("peer's genesis hash does not match ours")]
    GenesisNotMatch,
    #[error("remote node ID is malformed")]
    BadRemoteID,
    #[error("remote node ID is missing")]
    NilRemoteID,
    #[error("received an unavailable package")]
    UnavailablePackage,
    #[error("remote public key is malformed")]
    BadPubKey,
    #[error("signature recovery failed")]
    RecoveryFailed,
    #[error("server is already running")]
    AlreadyRunning,
    #[error("server has not started")]
    NotStart,
    #[error("RLP decode failed")]
    RlpDecode,
    #[error("server has stopped")]
    SrvHasStopped,
}
