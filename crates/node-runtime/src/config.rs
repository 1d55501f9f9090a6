//! Node configuration, populated from CLI flags (`cli::StartArgs`).

/// Runtime configuration for a `start`ed node. One field per CLI flag named
/// in `SPEC_FULL.md` §6; fields with no effect yet (the RPC/WS/IPC transport
/// and P2P networking are out-of-scope ports, see `rpc_ports`/`peer`) are
/// still threaded through so the flag surface is stable for when those
/// transports are implemented.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub datadir: String,
    pub networkid: u64,
    pub port: u16,
    pub maxpeers: u32,
    pub nodekey: Option<String>,
    pub extradata: Vec<u8>,
    pub mine: bool,

    pub rpc: bool,
    pub rpcaddr: String,
    pub rpcport: u16,
    pub rpcapi: Vec<String>,
    pub rpccorsdomain: Vec<String>,
    pub rpcvhosts: Vec<String>,

    pub ipcdisable: bool,
    pub ipcpath: Option<String>,

    pub ws: bool,
    pub wsaddr: String,
    pub wsport: u16,
    pub wsapi: Vec<String>,
    pub wsorigins: Vec<String>,

    pub debug: bool,
    pub loglevel: String,
    pub metrics: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            datadir: "./chaindata".to_string(),
            networkid: 1,
            port: 7001,
            maxpeers: 25,
            nodekey: None,
            extradata: Vec::new(),
            mine: false,

            rpc: false,
            rpcaddr: "127.0.0.1".to_string(),
            rpcport: 8001,
            rpcapi: vec!["chain".to_string(), "account".to_string(), "tx".to_string()],
            rpccorsdomain: Vec::new(),
            rpcvhosts: vec!["localhost".to_string()],

            ipcdisable: false,
            ipcpath: None,

            ws: false,
            wsaddr: "127.0.0.1".to_string(),
            wsport: 8002,
            wsapi: vec!["chain".to_string()],
            wsorigins: Vec::new(),

            debug: false,
            loglevel: "info".to_string(),
            metrics: false,
        }
    }
}
