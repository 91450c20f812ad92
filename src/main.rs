use clap::Subcommand;

mod cli_exec;
mod cli_runtime;

#[derive(Subcommand)]
enum Commands {
    /// Show the session (sign-in prompt or signed-in account)
    Status {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in through the wallet
    Login,

    /// Sign out; no wallet round trip needed
    Logout,

    /// Call a view method (no signature, works signed out)
    View {
        method: String,
        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Call a change method (requires sign-in)
    Call {
        method: String,
        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
        /// Attached deposit in base units
        #[arg(long)]
        deposit: Option<u128>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List the contract methods this gateway can call
    Methods {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    registry_gateway::logging::init("warn");
    if let Err(err) = cli_runtime::run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
