use super::*;

#[derive(Parser)]
#[command(name = "gateway-devnet")]
#[command(about = "Local chain node and wallet for the registry contract (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Account the registry contract is deployed to
    #[arg(long, default_value = "registry.testnet")]
    contract: AccountId,

    /// Account the dev wallet signs in as
    #[arg(long, default_value = "alice.testnet")]
    dev_account: AccountId,

    /// Value returned by the contract's `get` view
    #[arg(long, default_value = "Hello")]
    greeting: String,

    /// Decline every sign-in and transaction approval
    #[arg(long)]
    reject: bool,
}

pub(super) async fn run() -> Result<()> {
    let args = Args::parse();

    let dev_key = AccessKey::generate().context("generate dev account key")?;
    let mut chain = Chain::new(RegistryContract::new(args.greeting.clone()));
    chain.add_key(
        &args.dev_account,
        dev_key.public_key(),
        AccessKeyPermission::FullAccess,
    );

    let state = Arc::new(AppState {
        contract_id: args.contract.clone(),
        dev_account: args.dev_account.clone(),
        dev_key,
        reject: args.reject,
        chain: Arc::new(RwLock::new(chain)),
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    tracing::info!(addr = %local_addr, contract = %args.contract, dev_account = %args.dev_account, "gateway-devnet listening");

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

pub(super) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/rpc", post(rpc))
        .route("/login/", get(wallet_login))
        .route("/sign", get(wallet_sign))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
