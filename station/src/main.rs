use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::StationConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod link;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Arduino radar ground station")]
struct Args {
    /// Load a station config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Serial port to open instead of USB discovery
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    baud: Option<u32>,
    /// Drive a synthetic sensor instead of the serial device
    #[arg(long, default_value_t = false)]
    simulate: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Address for the HTTP display bridge
    #[arg(long)]
    bridge: Option<SocketAddr>,
    #[arg(long, default_value_t = false, conflicts_with = "bridge")]
    no_bridge: bool,
}

impl Args {
    fn apply(&self, config: &mut StationConfig) {
        if let Some(port) = &self.port {
            config.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if self.simulate {
            config.simulate = true;
        }
        if let Some(seed) = self.seed {
            config.sensor.seed = seed;
        }
        if let Some(address) = self.bridge {
            config.bridge_address = Some(address);
        }
        if self.no_bridge {
            config.bridge_address = None;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => StationConfig::load(path)?,
        None => StationConfig::default(),
    };
    args.apply(&mut config);

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for station loop")?;
    runtime.block_on(Runner::new(config).run())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "station",
            "--port",
            "/dev/ttyACM1",
            "--baud",
            "9600",
            "--simulate",
            "--no-bridge",
        ]);
        let mut config = StationConfig::default();
        args.apply(&mut config);
        assert_eq!(config.port.as_deref(), Some("/dev/ttyACM1"));
        assert_eq!(config.baud_rate, 9600);
        assert!(config.simulate);
        assert!(config.bridge_address.is_none());
    }

    #[test]
    fn defaults_leave_config_untouched() {
        let args = Args::parse_from(["station"]);
        let mut config = StationConfig::default();
        args.apply(&mut config);
        assert!(config.port.is_none());
        assert!(!config.simulate);
        assert!(config.bridge_address.is_some());
    }
}
