use anyhow::{Context, Result};

use registry_gateway::dispatch::{LoadOutcome, Notice};
use registry_gateway::model::{CallOutcome, ContractCallRequest, ContractCallResult, Session};

use crate::Commands;
use crate::cli_runtime::Gateway;

pub(crate) fn handle_command(
    gateway: &mut Gateway,
    load: LoadOutcome,
    command: Commands,
) -> Result<()> {
    if !matches!(command, Commands::Status { json: true }) {
        render_notice(load.notice.as_ref());
    }

    match command {
        Commands::Status { json } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&load).context("serialize status json")?
                );
            } else {
                render_session(&load.session);
            }
        }
        Commands::Login => {
            if let Some(account) = load.session.account_id() {
                println!("Already signed in as {}", account);
            } else {
                gateway.sign_in();
                println!("Approve the sign-in in your wallet, then rerun with --url <return url>");
            }
        }
        Commands::Logout => {
            gateway.sign_out();
            println!("Signed out");
        }
        Commands::View { method, args, json } => {
            let args = ContractCallRequest::parse_args(args.as_deref())?;
            let result = gateway.invoke_view(&method, args);
            print_result(&result, json)?;
        }
        Commands::Call {
            method,
            args,
            deposit,
            json,
        } => {
            let args = ContractCallRequest::parse_args(args.as_deref())?;
            match gateway.invoke_change(&method, args, deposit) {
                CallOutcome::Completed(result) => print_result(&result, json)?,
                CallOutcome::AwaitingApproval { .. } => {
                    println!(
                        "Approve the transaction in your wallet, then rerun with --url <return url>"
                    );
                }
            }
        }
        Commands::Methods { json } => {
            let schema = &gateway.config().schema;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(schema).context("serialize schema json")?
                );
            } else {
                for (kind, methods) in [
                    ("view", &schema.view_methods),
                    ("change", &schema.change_methods),
                ] {
                    for m in methods {
                        let args: Vec<String> = m
                            .args
                            .iter()
                            .map(|a| {
                                format!("{}{}", a.name, if a.optional { "?" } else { "" })
                            })
                            .collect();
                        println!("{:<6} {}({})", kind, m.name, args.join(", "));
                    }
                }
            }
        }
    }

    Ok(())
}

fn render_session(session: &Session) {
    match session.account_id() {
        None => {
            println!("Welcome! You are not signed in.");
            println!(
                "The registry contract on {} can be read by anyone; changing it needs a wallet sign-in.",
                session.network_id()
            );
            println!("Run `registry-gateway login` to sign in.");
        }
        Some(account) => {
            println!("Signed in as {} ({})", account, session.network_id());
        }
    }
}

fn render_notice(notice: Option<&Notice>) {
    match notice {
        None => {}
        Some(Notice::SignInFailed { error }) => eprintln!("sign-in failed: {}", error),
        Some(Notice::ChangeResult { result }) => match result.error() {
            None => println!(
                "transaction approved: {}",
                result.value().cloned().unwrap_or_default()
            ),
            Some(err) => eprintln!("transaction failed: {}", err),
        },
    }
}

fn print_result(result: &ContractCallResult, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(result).context("serialize result json")?
        );
    } else if let Some(value) = result.value() {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("serialize value")?
        );
    }
    if let Some(err) = result.error() {
        anyhow::bail!("{}", err);
    }
    Ok(())
}
