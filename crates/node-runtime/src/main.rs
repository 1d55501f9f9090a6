//! `node-runtime` binary: `init <genesisPath>` bootstraps a genesis block,
//! `start` runs the consensus core against it. See `SPEC_FULL.md` §6.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use chain::adapters::memory::MemoryChainDb;
use chain::Chain;
use confirmer::Confirmer;
use deputy_manager::DeputyManager;
use miner::{DefaultTxExecutor, Miner, MinerConfig};
use node_runtime::cli::{Cli, Command, StartArgs};
use node_runtime::config::NodeConfig;
use node_runtime::genesis::{setup_genesis_block, Genesis};
use node_runtime::miner_adapter::ChainAdapter;
use quantum_telemetry::{init_telemetry, TelemetryConfig};
use shared_crypto::Secp256k1KeyPair;
use tx_pool::{TxPool, TxPoolConfig};

const MINE_WINDOW_MS: u64 = 8_000;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn genesis_path(datadir: &str) -> PathBuf {
    Path::new(datadir).join("genesis.json")
}

/// Loads the node identity from `--nodekey` (a raw 32-byte secret), or mints
/// an ephemeral one. A node started without `--nodekey` can mine and confirm
/// but forgets its identity on restart.
fn load_or_generate_keypair(nodekey: Option<&str>) -> Result<Secp256k1KeyPair> {
    match nodekey {
        Some(path) => {
            let bytes = fs::read(path).with_context(|| format!("reading node key at {path}"))?;
            let secret: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow!("node key at {path} must be exactly 32 bytes"))?;
            Secp256k1KeyPair::from_bytes(secret).map_err(|e| anyhow!("invalid node key: {e}"))
        }
        None => {
            warn!("no --nodekey given, generating an ephemeral node identity");
            Ok(Secp256k1KeyPair::generate())
        }
    }
}

fn run_init(genesis_file: PathBuf, datadir: String) -> Result<()> {
    let genesis = Genesis::from_file(&genesis_file)
        .with_context(|| format!("reading genesis file {}", genesis_file.display()))?;

    let dm = DeputyManager::new(genesis.consensus);
    let db = Arc::new(MemoryChainDb::new());
    let hash = setup_genesis_block(&genesis, &dm, &*db, db.clone())
        .context("building genesis block")?;

    fs::create_dir_all(&datadir).with_context(|| format!("creating data directory {datadir}"))?;
    fs::copy(&genesis_file, genesis_path(&datadir))
        .context("copying genesis file into the data directory")?;

    println!("genesis block: 0x{}", to_hex(&hash));
    Ok(())
}

/// Rebuilds the in-memory chain stack from `<datadir>/genesis.json`.
/// `MemoryChainDb` has no cross-process durability, so every `start` replays
/// the deterministic genesis setup rather than loading a saved chain state;
/// blocks mined by prior runs of this node are not recovered.
fn rebuild_genesis_state(
    datadir: &str,
) -> Result<(Arc<DeputyManager>, Arc<MemoryChainDb>, Genesis)> {
    let path = genesis_path(datadir);
    let genesis = Genesis::from_file(&path).with_context(|| {
        format!("no genesis found at {}; run `init <genesisPath>` first", path.display())
    })?;

    let dm = Arc::new(DeputyManager::new(genesis.consensus));
    let db = Arc::new(MemoryChainDb::new());
    setup_genesis_block(&genesis, &dm, &*db, db.clone()).context("rebuilding genesis state")?;
    Ok((dm, db, genesis))
}

async fn run_start(args: StartArgs) -> Result<()> {
    let debug = args.debug;
    let config: NodeConfig = args.into();

    let telemetry_config = TelemetryConfig {
        log_level: if debug { "debug".to_string() } else { config.loglevel.clone() },
        ..TelemetryConfig::from_env()
    };
    let _telemetry = init_telemetry(telemetry_config).context("initializing logging")?;

    let (dm, db, genesis) = rebuild_genesis_state(&config.datadir)?;
    let genesis_block = db.load_latest_block().expect("setup_genesis_block just persisted one");

    let keypair = load_or_generate_keypair(config.nodekey.as_deref())?;
    let identity_secret = keypair.to_bytes();

    let pool_cfg = TxPoolConfig {
        consensus: genesis.consensus,
        chain_id: config.networkid as u16,
        ..TxPoolConfig::default()
    };
    let pool = Arc::new(TxPool::new(pool_cfg.clone(), db.clone()));
    let confirmer = Arc::new(Confirmer::new(keypair));

    let chain = Arc::new(Chain::new(
        db.clone(),
        db.clone(),
        dm.clone(),
        pool.clone(),
        pool_cfg,
        confirmer,
        MINE_WINDOW_MS,
        genesis_block,
    ));

    let (stop_tx, stop_rx) = watch::channel(false);

    if config.mine {
        let miner_keypair = Secp256k1KeyPair::from_bytes(identity_secret)
            .expect("re-deriving the node's own key from its own secret never fails");
        let adapter = Arc::new(ChainAdapter::new(chain.clone()));
        let miner = Miner::new(
            miner_keypair,
            dm.clone(),
            pool.clone(),
            adapter.clone(),
            adapter,
            Arc::new(DefaultTxExecutor),
            MinerConfig::default(),
        );
        let miner_stop = stop_rx.clone();
        tokio::spawn(async move { miner.run(miner_stop).await });
        info!("mining enabled");
    }

    info!(
        port = config.port,
        networkid = config.networkid,
        datadir = %config.datadir,
        "node started"
    );
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutting down");
    let _ = stop_tx.send(true);
    drop(stop_rx);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init { genesis_path, datadir } => run_init(genesis_path, datadir),
        Command::Start(args) => run_start(args).await,
    }
}
