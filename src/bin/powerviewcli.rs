//! Command-line control of a PowerView hub's scenes and shades

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use powerview::{Hub, HubConfig};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "powerviewcli")]
#[command(about = "Control Hunter Douglas PowerView blinds & shades", long_about = None)]
struct Cli {
    /// IP address of hub
    #[arg(long, env = "POWERVIEW_HUB", default_value = "10.0.0.31")]
    ip: String,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Log requests and responses to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List scenes, rooms and shades (default)
    List,
    /// Activate a scene by name
    Scene { name: String },
    /// Move a shade's bottom and top rails (0-65535)
    Shade {
        name: String,
        bottom: u16,
        top: u16,
    },
    /// Show hub identity and counts
    Info,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "powerview=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = HubConfig::new(cli.ip).with_timeout(Duration::from_millis(cli.timeout_ms));
    let hub = Hub::new(config);

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => list(&hub).await,
        Commands::Scene { name } => {
            let scenes = hub.scenes().await.context("Error getting scenes")?;
            scenes
                .activate(&name)
                .await
                .with_context(|| format!("error switching to scene {name:?}"))
        }
        Commands::Shade { name, bottom, top } => {
            let shades = hub.shades().await.context("Error getting shades")?;
            let mut shade = shades.require(&name).context("Unknown shade")?;
            shade
                .move_to(bottom, top)
                .await
                .context("Error moving shade")?;
            println!("Moved shade {:?} to bottom={} top={}", shade.name, shade.bottom, shade.top);
            Ok(())
        }
        Commands::Info => {
            let info = hub.info().await.context("Error getting hub info")?;
            println!("Hub {:?}", info.name);
            println!("  serial:  {}", info.serial_number);
            println!("  mac:     {}", info.mac_address);
            println!(
                "  rooms: {}  shades: {}  scenes: {}  groups: {}",
                info.room_count, info.shade_count, info.scene_count, info.group_count
            );
            Ok(())
        }
    }
}

async fn list(hub: &Hub) -> Result<()> {
    let scenes = hub.scenes().await.context("Error getting scenes")?;
    for scene in scenes.by_name() {
        println!("Scene {}: {} (room {})", scene.id, scene.name, scene.room.id);
    }

    let rooms = hub.rooms().await.context("Error getting rooms")?;
    for room in rooms.by_name() {
        println!("Room {}: {}", room.id, room.name.unwrap_or_default());
    }

    let shades = hub.shades().await.context("Error getting shades")?;
    for shade in shades.by_name() {
        let low = if shade.battery_is_low { " LOW" } else { "" };
        println!(
            "Shade {}: {} bottom={} top={} battery={}{}",
            shade.id, shade.name, shade.bottom, shade.top, shade.battery_strength, low
        );
    }

    Ok(())
}
