//! nmapplet - NetworkManager secrets agent and network menu.
//!
//! `run` serves the secrets agent until interrupted; the other commands are
//! one-shot diagnostics.

use std::{error::Error, sync::Arc};

use clap::{Parser, Subcommand};
use nmapplet::{
    config::Config,
    services::{
        network_manager::{
            DeviceInfo, NMDeviceType, NetworkManagerProxy,
            connection::{ConnectionStore, DbusConnectionStore},
            menu::NetworkMenu,
        },
        secrets::{
            self, FilePrivateKeyLoader, HeadlessPrompt, KeyringSecretsResolver, ResolverParts,
            SecretAgent,
            keyring::{MemorySecretStore, SecretServiceStore, SecretStore},
        },
    },
    tracing_config,
};
use tracing::{Level, info, span, warn};
use zbus::Connection;

#[derive(Parser)]
#[command(name = "nmapplet", version, about = "NetworkManager applet core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register the secrets agent and serve it until interrupted
    Run {
        /// Keep secrets in memory instead of the session keyring
        #[arg(long)]
        ephemeral: bool,
    },
    /// Print the merged network menu of every Wi-Fi device
    Networks,
    /// Print the effective configuration as TOML
    Config,
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Run { ephemeral } => {
            tracing_config::init_with_file(config.general.log_level)?;
            let _span = span!(Level::INFO, "nmapplet_main").entered();
            run_agent(&config, ephemeral).await?;
        }
        Command::Networks => {
            tracing_config::init(config.general.log_level)?;
            print_networks().await?;
        }
        Command::Config => println!("{}", config.to_toml()?),
        Command::Schema => println!("{}", Config::schema()?),
    }

    Ok(())
}

async fn run_agent(config: &Config, ephemeral: bool) -> Result<(), Box<dyn Error>> {
    info!(identifier = %config.agent.identifier, ephemeral, "Starting secrets agent");

    let system = Connection::system().await?;

    let store: Arc<dyn SecretStore> = if ephemeral {
        Arc::new(MemorySecretStore::new())
    } else {
        Arc::new(SecretServiceStore::connect(&config.agent.keyring_collection).await?)
    };

    let resolver = KeyringSecretsResolver::new(
        ResolverParts {
            secrets: store,
            prompt: Arc::new(HeadlessPrompt),
            connections: Arc::new(DbusConnectionStore::new(system.clone())),
            private_keys: Arc::new(FilePrivateKeyLoader),
        },
        config.agent.save_prompted_secrets,
    );
    let agent = Arc::new(SecretAgent::new(resolver));

    secrets::dbus::register(&system, Arc::clone(&agent), &config.agent.identifier).await?;
    let restarts = secrets::dbus::watch_daemon_restarts(&system, &config.agent.identifier).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down secrets agent");

    restarts.abort();
    let canceled = agent.dispose();
    if canceled > 0 {
        info!(canceled, "Canceled outstanding requests");
    }
    if let Err(e) = secrets::dbus::unregister(&system).await {
        warn!(error = %e, "Failed to unregister secret agent");
    }

    Ok(())
}

async fn print_networks() -> Result<(), Box<dyn Error>> {
    let system = Connection::system().await?;
    let manager = NetworkManagerProxy::new(&system).await?;
    let store = DbusConnectionStore::new(system.clone());

    for path in manager.get_devices().await? {
        let device = match DeviceInfo::from_path(&system, path.clone()).await {
            Ok(device) => device,
            Err(e) => {
                warn!(device = %path, error = %e, "Skipping device");
                continue;
            }
        };
        if device.kind != NMDeviceType::Wifi {
            continue;
        }

        let menu = NetworkMenu::load(&system, path, &store as &dyn ConnectionStore).await?;
        println!("{} ({})", device.interface, device.path);

        for entry in menu.entries.get() {
            let profiles: Vec<&str> = entry.profiles().iter().filter_map(|p| p.id()).collect();
            println!(
                "  {:<32} {:>3}%  {:>2} AP(s)  {}  [{}]",
                entry.display_ssid(),
                entry.best_strength(),
                entry.members().len(),
                entry.fingerprint(),
                profiles.join(", ")
            );
        }
    }

    Ok(())
}
