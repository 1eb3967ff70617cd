//! `patchwire` — command-line monitor for a patchwire server.
//!
//! Connects to the server, mirrors its parameter state, and prints a
//! summary line on every change until interrupted.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use patchwire_client::Engine;
use patchwire_core::input::InputNode;
use patchwire_settings::{PatchwireSettings, apply_env_overrides, load_settings_from_path, settings_path};

#[derive(Parser, Debug)]
#[command(name = "patchwire", version, about = "Live mirror of a patchwire server")]
struct Cli {
    /// Server host (overrides settings)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides settings)
    #[arg(long)]
    port: Option<u16>,

    /// Path to a settings file (default: ~/.patchwire/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<PatchwireSettings> {
    let path = cli.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    apply_env_overrides(&mut settings);
    if let Some(host) = &cli.host {
        settings.connection.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        settings.connection.port = port;
    }
    Ok(settings)
}

fn summarize(state: &patchwire_client::Mirror) -> String {
    let inputs = state
        .inputs
        .iter()
        .map(|node| match node {
            InputNode::Group(group) => format!("{} [{} inputs]", group.name, group.inputs.len()),
            InputNode::Input(input) => format!("{}={:?}", input.name, input.values),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "connected={} product={} patch={} inputs: {inputs}",
        state.connected,
        state.product.version(),
        state.patch.display_name,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    patchwire_core::logging::init_subscriber(&settings.logging.level);

    let engine = Engine::new();
    let mut mirror = engine.mirror();
    let mut errors = engine.errors();

    info!(
        host = %settings.connection.host,
        port = settings.connection.port,
        "connecting"
    );
    engine.connect(&settings.connection.host, settings.connection.port);

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                break;
            }
            changed = mirror.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = mirror.borrow_and_update().clone();
                println!("{}", summarize(&state));
            }
            event = errors.recv() => {
                if let Ok(event) = event {
                    warn!(
                        request_id = ?event.request_id,
                        request_path = ?event.request_path,
                        "{}", event.message
                    );
                }
            }
        }
    }

    info!("shutting down");
    let _ = engine.disconnect();
    Ok(())
}
