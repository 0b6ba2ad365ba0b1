//! Command-line configuration for the monitor binary.

use clap::{Parser, ValueEnum};

/// Which topology strategy the poll engine uses for slot sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopologyMode {
    /// Fixed per-slot sensor schema, bound via SDR search.
    Static,
    /// Per-target SDR scan; topology fixed at startup.
    Dynamic,
}

/// Monitor a single ATCA shelf over IPMI/RMCP and serve its sensor tree.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Config {
    /// Shelf manager hostname or IP address.
    #[arg(long)]
    pub host: String,

    /// RMCP port.
    #[arg(long, default_value_t = 623)]
    pub port: u16,

    /// Topology strategy.
    #[arg(long, value_enum, default_value_t = TopologyMode::Static)]
    pub mode: TopologyMode,

    /// Minimum seconds between the start of consecutive poll cycles.
    #[arg(long, default_value_t = 5.0)]
    pub min_poll_period: f64,

    /// Log level passed through to `RUST_LOG` if that variable is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Initialize `pretty_env_logger`, honoring `RUST_LOG` if set and
    /// otherwise falling back to [`Config::log_level`].
    pub fn init_logging(&self) {
        pretty_env_logger::formatted_builder()
            .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| self.log_level.clone()))
            .init();
    }
}
