//! Veyra Chain node: wires the VRF committee / LPoW consensus core to an
//! in-memory storage backend and runs the round loop until interrupted.

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use node_runtime::config::NodeConfig;
use node_runtime::genesis::{self, GenesisSpec};
use node_runtime::keys;
use node_runtime::node::Node;
use veyra_consensus::RoundOutcome;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }

    if let Err(err) = run().await {
        error!(error = %err, "fatal bootstrap failure");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("starting veyra-chain node");
    let config = NodeConfig::from_env();

    let keypair = keys::load_or_generate(&config.node.keypair_path)?;
    info!(public_key = %keypair.public_key(), "node identity loaded");

    let genesis_path = std::env::var("CHAIN_GENESIS_PATH").unwrap_or_else(|_| "./genesis.json".to_string());
    let spec = GenesisSpec::load(std::path::Path::new(&genesis_path))?;
    let (genesis_block, world_state) = genesis::bootstrap(&spec, config.consensus.base_difficulty)?;
    genesis::verify_genesis_hash(&genesis_block, config.chain.genesis_hash)?;

    let committee = world_state.chain().active_super_nodes.clone();
    info!(committee_size = committee.len(), "genesis bootstrapped");

    let mut node = Node::new(keypair, committee, genesis_block, world_state, &config)?;

    info!("node is running, press Ctrl+C to stop");
    let round_loop = async {
        loop {
            match node.run_round().await {
                Ok(RoundOutcome::HeightAdvanced { block }) => {
                    info!(height = block.height, proposer = %block.proposer_pk, "block accepted");
                }
                Ok(RoundOutcome::RoundFailed { round }) => {
                    info!(round, "round failed, retrying at the same height");
                }
                Err(err) => return Err::<(), anyhow::Error>(err),
            }
        }
    };

    tokio::select! {
        result = round_loop => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down gracefully");
        }
    }

    Ok(())
}
