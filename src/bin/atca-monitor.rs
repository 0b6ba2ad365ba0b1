//! Monitor binary: parses configuration, opens a transport to the shelf
//! manager, and runs the poll engine until the process is killed.

use std::sync::mpsc;
use std::sync::Arc;

use clap::Parser;

use atca_crate_monitor::config::{Config, TopologyMode};
use atca_crate_monitor::poll::{DynamicTopology, PollEngine, StaticTopology};
use atca_crate_monitor::transport::Transport;
use atca_crate_monitor::tree::Tree;

fn main() {
    let config = Config::parse();
    config.init_logging();

    let tree = Arc::new(Tree::new());
    tree.set_min_poll_period(config.min_poll_period);

    let transport = Transport::new(config.host.clone(), config.port);

    // No shutdown signal is ever sent on this channel; the engine runs
    // until the process is killed. A long-lived host process embedding
    // this engine would hold on to `shutdown_tx` and drop it to interrupt
    // the current sleep immediately.
    let (_shutdown_tx, shutdown_rx) = mpsc::channel();

    let engine = match config.mode {
        TopologyMode::Static => PollEngine::new(tree.clone(), transport, StaticTopology::new()),
        TopologyMode::Dynamic => PollEngine::new(tree.clone(), transport, DynamicTopology::new()),
    };

    let engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("failed to start poll engine: {e:?}");
            std::process::exit(1);
        }
    };

    log::info!("monitoring {} in {:?} mode", config.host, config.mode);
    engine.run(&shutdown_rx);
}
