#![forbid(unsafe_code)]
//! Inspect a host session from the command line.

use clap::{Parser, Subcommand};
use colored::*;
use clarity_harness::chain::Chain;
use clarity_harness::config::{load_config, DEFAULT_CONFIG_PATH};
use clarity_harness::host::StdioHost;
use clarity_harness::logging;
use clarity_harness::runner::{open_script_session, ScriptSession};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the harness configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Deployment plan to load instead of the configured one
    #[arg(long)]
    deployment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the session accounts and their balances
    Accounts,
    /// Lists the deployed contracts
    Contracts,
    /// Shows asset balances per owner
    Assets,
    /// Calls a read-only function and prints its result
    Call {
        /// Contract name or full contract id
        contract: String,
        /// Function to call
        method: String,
        /// Arguments as canonical value text, e.g. u1 or 'ST1...
        args: Vec<String>,
        /// Account name or address of the caller
        #[arg(long, default_value = "deployer")]
        sender: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init(&config.logging.filter);

    let deployment = cli.deployment.or(config.deployment.path);
    let mut host = StdioHost::spawn(&config.host)?;
    let session = open_script_session(&mut host, deployment.as_deref())?;
    if let Some(url) = &session.node.url {
        println!("{} {}", "Node:".dimmed(), url.bright_cyan());
    }

    match cli.command {
        Commands::Accounts => print_accounts(&session),
        Commands::Contracts => print_contracts(&session),
        Commands::Assets => {
            let mut chain = Chain::new(&mut host, session.session_id);
            let maps = chain.get_assets_maps()?;
            for (asset, owners) in &maps.assets {
                println!("{}", asset.bright_magenta().bold());
                for (owner, balance) in owners {
                    println!("  {:<50} {}", owner, balance.to_string().bright_green());
                }
            }
        }
        Commands::Call {
            contract,
            method,
            args,
            sender,
        } => {
            let sender = session
                .accounts
                .get(&sender)
                .map(|account| account.address.clone())
                .unwrap_or(sender);
            let mut chain = Chain::new(&mut host, session.session_id);
            let call = chain.call_read_only_fn(&contract, &method, args, &sender)?;
            println!("{} {}", "Result:".bright_cyan().bold(), call.result);
            for event in &call.events {
                println!("  {} {}", "event".dimmed(), serde_json::to_string(event)?);
            }
        }
    }

    Ok(())
}

fn print_accounts(session: &ScriptSession) {
    println!("{}", "Accounts".bright_cyan().bold());
    for account in session.accounts.values() {
        println!(
            "  {:<10} {:<42} {}",
            account.name.bright_yellow(),
            account.address,
            account.balance.to_string().bright_green()
        );
    }
}

fn print_contracts(session: &ScriptSession) {
    println!("{}", "Contracts".bright_cyan().bold());
    if session.contracts.is_empty() {
        println!("  {}", "(none deployed)".dimmed());
    }
    for id in session.contracts.keys() {
        println!("  {}", id.bright_yellow());
    }
}
