//! CLI surface: `init <genesisPath>` / `start [flags]`.
//!
//! Grounded in `tools/qc-admin`'s `clap::Parser` usage — the teacher's own
//! `node-runtime::main` never grew argument parsing beyond a hardcoded
//! `NodeConfig::default()` (`SPEC_FULL.md` §6).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::NodeConfig;

#[derive(Parser, Debug)]
#[command(name = "node-runtime")]
#[command(about = "A permissioned PoA/DPoS consensus node")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bootstrap and initialize a new genesis block.
    Init {
        /// Path to the genesis JSON file.
        genesis_path: PathBuf,
        /// Data directory the genesis block is written under.
        #[arg(long, default_value = "./chaindata")]
        datadir: String,
    },
    /// Run the node.
    Start(StartArgs),
}

#[derive(Parser, Debug)]
pub struct StartArgs {
    #[arg(long, default_value = "./chaindata")]
    pub datadir: String,
    #[arg(long, default_value_t = 1)]
    pub networkid: u64,
    #[arg(long, default_value_t = 7001)]
    pub port: u16,
    #[arg(long, default_value_t = 25)]
    pub maxpeers: u32,
    #[arg(long)]
    pub nodekey: Option<String>,
    #[arg(long, default_value = "")]
    pub extradata: String,
    #[arg(long)]
    pub mine: bool,

    #[arg(long)]
    pub rpc: bool,
    #[arg(long, default_value = "127.0.0.1")]
    pub rpcaddr: String,
    #[arg(long, default_value_t = 8001)]
    pub rpcport: u16,
    #[arg(long, value_delimiter = ',', default_value = "chain,account,tx")]
    pub rpcapi: Vec<String>,
    #[arg(long, value_delimiter = ',', default_value = "")]
    pub rpccorsdomain: Vec<String>,
    #[arg(long, value_delimiter = ',', default_value = "localhost")]
    pub rpcvhosts: Vec<String>,

    #[arg(long)]
    pub ipcdisable: bool,
    #[arg(long)]
    pub ipcpath: Option<String>,

    #[arg(long)]
    pub ws: bool,
    #[arg(long, default_value = "127.0.0.1")]
    pub wsaddr: String,
    #[arg(long, default_value_t = 8002)]
    pub wsport: u16,
    #[arg(long, value_delimiter = ',', default_value = "chain")]
    pub wsapi: Vec<String>,
    #[arg(long, value_delimiter = ',', default_value = "")]
    pub wsorigins: Vec<String>,

    #[arg(long)]
    pub debug: bool,
    #[arg(long, default_value = "info")]
    pub loglevel: String,
    #[arg(long)]
    pub metrics: bool,
}

impl From<StartArgs> for NodeConfig {
    fn from(args: StartArgs) -> Self {
        let non_empty = |v: Vec<String>| -> Vec<String> { v.into_iter().filter(|s| !s.is_empty()).collect() };
        Self {
            datadir: args.datadir,
            networkid: args.networkid,
            port: args.port,
            maxpeers: args.maxpeers,
            nodekey: args.nodekey,
            extradata: args.extradata.into_bytes(),
            mine: args.mine,

            rpc: args.rpc,
            rpcaddr: args.rpcaddr,
            rpcport: args.rpcport,
            rpcapi: non_empty(args.rpcapi),
            rpccorsdomain: non_empty(args.rpccorsdomain),
            rpcvhosts: non_empty(args.rpcvhosts),

            ipcdisable: args.ipcdisable,
            ipcpath: args.ipcpath,

            ws: args.ws,
            wsaddr: args.wsaddr,
            wsport: args.wsport,
            wsapi: non_empty(args.wsapi),
            wsorigins: non_empty(args.wsorigins),

            debug: args.debug,
            loglevel: args.loglevel,
            metrics: args.metrics,
        }
    }
}
