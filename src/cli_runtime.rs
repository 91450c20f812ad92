use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use registry_gateway::config::ConfigSources;
use registry_gateway::dispatch::Dispatcher;
use registry_gateway::rpc::HttpRpcClient;
use registry_gateway::store::{KeyStore, STORE_DIR};
use registry_gateway::wallet::{Navigator, WalletConnection};

use crate::Commands;

#[derive(Parser)]
#[command(name = "registry-gateway")]
#[command(about = "Wallet-backed gateway to the registry contract", long_about = None)]
pub(crate) struct Cli {
    /// Config file (JSON); without it the network preset is used
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Network preset: mainnet|testnet|local|devnet (env GATEWAY_ENV)
    #[arg(long, global = true)]
    network: Option<String>,

    /// Contract account id (env CONTRACT_NAME)
    #[arg(long, global = true)]
    contract: Option<String>,

    #[arg(long, global = true)]
    node_url: Option<String>,

    #[arg(long, global = true)]
    wallet_url: Option<String>,

    /// Url the wallet sends the user back to
    #[arg(long, global = true)]
    app_url: Option<String>,

    /// Where the wallet connection is persisted
    #[arg(long, global = true, default_value = STORE_DIR)]
    state_dir: PathBuf,

    /// Url this load happens at, e.g. the wallet's return url
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Prints navigations instead of following them; the user opens the url
/// and comes back with `--url`.
pub(crate) struct ConsoleNavigator {
    location: RefCell<Url>,
}

impl ConsoleNavigator {
    fn new(location: Url) -> Self {
        Self {
            location: RefCell::new(location),
        }
    }

    pub(crate) fn location(&self) -> Url {
        self.location.borrow().clone()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, url: &Url) {
        println!("navigate: {}", url);
    }

    fn replace_url(&self, url: &Url) {
        *self.location.borrow_mut() = url.clone();
    }
}

pub(crate) type Gateway = Dispatcher<WalletConnection, HttpRpcClient>;

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    let sources = ConfigSources {
        config_path: cli.config,
        network: cli.network,
        contract: cli.contract,
        node_url: cli.node_url,
        wallet_url: cli.wallet_url,
        app_url: cli.app_url,
    };
    let cfg = sources.resolve().context("load configuration")?;

    let current_url = match &cli.url {
        Some(u) => Url::parse(u).with_context(|| format!("parse --url {}", u))?,
        None => cfg.app_url.clone(),
    };

    let nav = Rc::new(ConsoleNavigator::new(current_url.clone()));
    let navigator: Rc<dyn Navigator> = nav.clone();
    let store = KeyStore::open(&cli.state_dir)?;
    let rpc = HttpRpcClient::new(cfg.network.node_url.clone())?;
    let wallet = WalletConnection::new(&cfg, store, navigator.clone());
    let mut gateway: Gateway = Dispatcher::new(cfg, wallet, rpc, navigator);

    let load = gateway.resolve_on_load(&current_url);
    tracing::debug!(location = %nav.location(), "session resolved");

    crate::cli_exec::handle_command(&mut gateway, load, cli.command)
}
