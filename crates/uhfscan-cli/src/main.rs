//! `uhfscan`: run a scan session against a simulated UHF reader.
//!
//! The reader is a mock whose buffer is fed by a simulated tag field, so the
//! full engine path (gates, rate windows, loss detection, auto-stop and
//! audio feedback) can be exercised without hardware.

use anyhow::{Context, bail};
use clap::Parser;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uhfscan_core::{DataTypeView, ModuleKind, OperatingMode};
use uhfscan_engine::{
    BeeperConfig, EngineConfig, FeedbackBeeper, InventoryEngine, ResultSink, TagPresence,
    session::{InventorySession, InventoryUpdate, LocateSession, LockReadSession},
};
use uhfscan_hardware::{InventoryParams, mock::MockTagSource};

mod output;
mod simulate;

use output::TerminalBell;
use simulate::{TagField, spawn_producer};

/// Grace period after the scan deadline for the final updates to arrive.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "uhfscan")]
#[command(version)]
#[command(about = "Scan a simulated UHF tag field", long_about = None)]
struct Cli {
    /// Scan mode: inventory, locate or lock-read
    #[arg(short, long, default_value = "inventory")]
    mode: OperatingMode,

    /// Scan duration in seconds
    #[arg(short, long, default_value_t = 5)]
    duration: u64,

    /// Data type view: epc, tid, epc+tid, epc+usr, epc+tid+usr, epc+tid+rfu, epc+rfu or 0-6
    #[arg(short, long, default_value = "epc")]
    view: DataTypeView,

    /// Reader module family: UM, UM510, RM, SLR or GX
    #[arg(long, default_value = "UM")]
    module: ModuleKind,

    /// Path to a TOML engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output power in dBm, overriding the configuration (0 disables reading)
    #[arg(short, long)]
    power: Option<u8>,

    /// Only accept tags whose TID starts with this prefix
    #[arg(short, long)]
    filter: Option<String>,

    /// Show tag fields as ASCII instead of hex
    #[arg(long)]
    ascii: bool,

    /// Ring the terminal bell for audio feedback
    #[arg(long)]
    beep: bool,

    /// Number of simulated tags in range
    #[arg(long, default_value_t = 8)]
    tags: usize,

    /// Milliseconds between simulated reads
    #[arg(long, default_value_t = 20)]
    read_interval_ms: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(power) = self.power {
            config.output_power = power;
        }
        if self.filter.is_some() {
            config.read_filter = self.filter.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();

    if !cli.mode.is_active() {
        bail!("mode '{}' does not scan; choose inventory, locate or lock-read", cli.mode);
    }
    if cli.duration == 0 {
        bail!("duration must be at least one second");
    }

    let config = cli.engine_config()?;
    let duration = Duration::from_secs(cli.duration);
    let params = InventoryParams::default()
        .with_power(config.output_power()?)
        .with_auto_stop(duration)?;

    let (source, handle) = MockTagSource::new(cli.module);
    let engine = InventoryEngine::new(Arc::new(source), config.clone())?;
    engine.start()?;

    info!(
        mode = %cli.mode,
        module = %cli.module,
        view = %cli.view,
        duration_s = cli.duration,
        "Starting scan"
    );

    let producer = spawn_producer(
        TagField::new(cli.module, cli.tags),
        handle,
        Duration::from_millis(cli.read_interval_ms.max(1)),
    );

    let result = match cli.mode {
        OperatingMode::Locate => run_locate(&cli, &engine, &params).await,
        OperatingMode::LockRead => run_lock_read(&engine, &params).await,
        _ => run_inventory(&cli, &config, &engine, &params).await,
    };

    producer.abort();
    engine.end_session();
    engine.destroy();
    result
}

async fn run_inventory(
    cli: &Cli,
    config: &EngineConfig,
    engine: &InventoryEngine,
    params: &InventoryParams,
) -> anyhow::Result<()> {
    let presence = Arc::new(TagPresence::new());
    let (session, mut updates) = InventorySession::new(cli.view, cli.module);
    let session = Arc::new(
        session
            .with_ascii_display(cli.ascii)
            .with_presence(presence.clone()),
    );
    let beeper = cli.beep.then(|| {
        FeedbackBeeper::spawn(
            Arc::new(TerminalBell),
            presence,
            BeeperConfig::from(config),
        )
    });

    engine.begin_session(OperatingMode::ContinuousInventory, session.clone(), params)?;

    let deadline = tokio::time::sleep(scan_window(params));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                output::inventory_update(&update);
                if matches!(update, InventoryUpdate::Ended(_)) {
                    break;
                }
            }
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    if let Some(beeper) = beeper {
        beeper.shutdown().await;
    }
    output::inventory_table(&session.rows(), &session.summary());
    Ok(())
}

async fn run_locate(
    cli: &Cli,
    engine: &InventoryEngine,
    params: &InventoryParams,
) -> anyhow::Result<()> {
    let (session, updates) = LocateSession::new(cli.module);
    let session = if cli.beep {
        session.with_player(Arc::new(TerminalBell))
    } else {
        session
    };

    engine.begin_session(OperatingMode::Locate, Arc::new(session), params)?;
    print_until_done(updates, scan_window(params), output::locate_update).await;
    Ok(())
}

async fn run_lock_read(engine: &InventoryEngine, params: &InventoryParams) -> anyhow::Result<()> {
    let (session, updates) = LockReadSession::new();
    engine.begin_session(
        OperatingMode::LockRead,
        Arc::new(session) as Arc<dyn ResultSink>,
        params,
    )?;
    print_until_done(updates, scan_window(params), output::lock_read_update).await;
    Ok(())
}

/// Print updates until the channel closes, `window` elapses or Ctrl-C.
async fn print_until_done<T>(
    mut updates: mpsc::UnboundedReceiver<T>,
    window: Duration,
    print: impl Fn(&T),
) {
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => print(&update),
                None => break,
            },
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }
}

fn scan_window(params: &InventoryParams) -> Duration {
    params.auto_stop_after.unwrap_or_default() + DRAIN_GRACE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_views_and_modes() {
        let cli = Cli::try_parse_from([
            "uhfscan",
            "--mode",
            "locate",
            "--view",
            "epc+tid+usr",
            "--module",
            "um510",
            "--duration",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.mode, OperatingMode::Locate);
        assert_eq!(cli.view, DataTypeView::EpcTidUsr);
        assert_eq!(cli.module, ModuleKind::Um510);
        assert_eq!(cli.duration, 3);
    }

    #[test]
    fn test_cli_rejects_unknown_module() {
        assert!(Cli::try_parse_from(["uhfscan", "--module", "R2000"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from(["uhfscan", "--power", "0", "--filter", "582004"]).unwrap();
        let config = cli.engine_config().unwrap();

        assert_eq!(config.output_power, 0);
        assert_eq!(config.read_filter.as_deref(), Some("582004"));
        assert_eq!(config.poll_interval_ms, 5);
    }

    #[test]
    fn test_cli_rejects_excessive_power() {
        let cli = Cli::try_parse_from(["uhfscan", "--power", "50"]).unwrap();
        assert!(cli.engine_config().is_err());
    }

    #[test]
    fn test_scan_window_includes_grace() {
        let params = InventoryParams::default()
            .with_auto_stop(Duration::from_secs(2))
            .unwrap();
        assert_eq!(scan_window(&params), Duration::from_millis(2200));
    }
}
