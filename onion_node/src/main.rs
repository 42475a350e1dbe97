#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

mod node_config;

use std::future::Future;

use anyhow::{anyhow, Error};
use tokio::runtime;
use onion::core::network::{launch_network, Network};
#[cfg(unix)]
use syslog::Facility;

use crate::node_config::*;

/// Run a future with the runtime specified by config.
fn run<F>(future: F, threads: Threads) -> Result<(), Error>
    where F: Future<Output = Result<(), Error>>
{
    let runtime = if threads == Threads::N(1) {
        runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
    } else {
        let mut builder = runtime::Builder::new_multi_thread();
        match threads {
            Threads::N(n) => { builder.worker_threads(n as usize); },
            Threads::Auto => { }, // builder will detect number of cores automatically
        }
        builder
            .enable_all()
            .build()?
    };
    runtime.block_on(future)
}

fn init_logger(log_type: LogType) -> Result<(), Error> {
    match log_type {
        LogType::Stderr => {
            let env = env_logger::Env::default()
                .filter_or("RUST_LOG", "info");
            env_logger::Builder::from_env(env)
                .init();
        },
        LogType::Stdout => {
            let env = env_logger::Env::default()
                .filter_or("RUST_LOG", "info");
            env_logger::Builder::from_env(env)
                .target(env_logger::fmt::Target::Stdout)
                .init();
        },
        #[cfg(unix)]
        LogType::Syslog => {
            syslog::init(Facility::LOG_USER, log::LevelFilter::Info, None)
                .map_err(|e| anyhow!("Failed to initialize syslog backend: {}", e))?;
        },
        #[cfg(not(unix))]
        LogType::Syslog => {
            return Err(anyhow!("Syslog is not supported on this platform"));
        },
        LogType::None => { },
    }

    Ok(())
}

/// Send configured messages one after another.
async fn send_messages(network: &Network, messages: &[MessageConfig]) -> Result<(), Error> {
    for message in messages {
        let user = network.user(message.from)
            .ok_or_else(|| anyhow!("User {} doesn't exist", message.from))?;

        if let Err(err) = user.send_message(&message.text, message.to).await {
            warn!("User {} failed to send message to user {}: {}", message.from, message.to, err);
        }
    }

    Ok(())
}

async fn run_network(config: NodeConfig) -> Result<(), Error> {
    let network_config = config.network_config()?;
    let network = launch_network(&network_config).await?;

    for relay in network.relays() {
        info!("Relay {} public key: {}", relay.node_id(), relay.node().exported_public_key());
    }

    send_messages(&network, &config.messages).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}

fn main() -> Result<(), Error> {
    let config = cli_parse()?;

    init_logger(config.log_type)?;

    for key in config.unused.keys() {
        warn!("Unused configuration key: {:?}", key);
    }

    info!("Starting onion-node {}", onion::crate_version());

    let threads = config.threads;
    run(run_network(config), threads)
}
