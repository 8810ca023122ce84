//! `loadopt` command-line client.

mod commands;
mod render;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use loadopt_client::{ClientConfig, ENV_BASE_URL};
use loadopt_core::SyncError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(u64))
        .help(help)
}

fn text_arg(name: &'static str, default: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).default_value(default).help(help)
}

fn cli() -> Command {
    Command::new("loadopt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load Optimizer client")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .env(ENV_BASE_URL)
                .help("Backend origin, e.g. http://192.168.1.20:3000"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(Command::new("dashboard").about("Fleet and receivables totals"))
        .subcommand(Command::new("fleet").about("List own trucks and carrier fleets"))
        .subcommand(Command::new("items").about("List cargo items"))
        .subcommand(
            Command::new("add-item")
                .about("Add a cargo item")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Item name"),
                )
                .arg(text_arg("length", "4", "Length in ft"))
                .arg(text_arg("width", "4", "Width in ft"))
                .arg(text_arg("height", "4", "Height in ft"))
                .arg(text_arg("weight", "500", "Weight in lbs"))
                .arg(text_arg("packaging-weight", "0", "Packaging weight in lbs"))
                .arg(text_arg("qty", "1", "Number of units"))
                .arg(
                    Arg::new("customer")
                        .long("customer")
                        .value_parser(value_parser!(u64))
                        .help("Owning customer id"),
                ),
        )
        .subcommand(
            Command::new("remove-item")
                .about("Remove a cargo item")
                .arg(id_arg("Item id"))
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
        .subcommand(Command::new("customers").about("List customers and payment status"))
        .subcommand(
            Command::new("status")
                .about("Change a customer's payment status")
                .arg(id_arg("Customer id"))
                .arg(
                    Arg::new("status")
                        .value_parser(["paid", "pending", "overdue", "cycle"])
                        .default_value("cycle")
                        .help("New status, or cycle to advance"),
                ),
        )
        .subcommand(
            Command::new("optimize")
                .about("Run the load optimizer")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the raw load plan as JSON"),
                ),
        )
        .subcommand(
            Command::new("pay-url")
                .about("Print the checkout page URL for a customer")
                .arg(id_arg("Customer id")),
        )
        .subcommand(
            Command::new("checkout")
                .about("Relay checkout page messages read from stdin")
                .arg(id_arg("Customer id")),
        )
}

fn config(matches: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let config = ClientConfig::load(path.map(PathBuf::as_path))?;
    Ok(config.with_base_url_override(matches.get_one::<String>("base-url").cloned()))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let matches = cli().get_matches();
    let result = match config(&matches).and_then(commands::App::new) {
        Ok(app) => app.run(&matches).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // session errors were already shown as notices
            if err.downcast_ref::<SyncError>().is_none() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flag_overrides_default_base_url() {
        let matches = cli()
            .try_get_matches_from(["loadopt", "--base-url", "http://10.0.0.9:3000", "items"])
            .unwrap();
        assert_eq!(config(&matches).unwrap().base_url, "http://10.0.0.9:3000");
    }

    #[test]
    fn status_defaults_to_cycle() {
        let matches = cli().try_get_matches_from(["loadopt", "status", "3"]).unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<u64>("id"), Some(&3));
        assert_eq!(args.get_one::<String>("status").map(String::as_str), Some("cycle"));
        assert!(cli()
            .try_get_matches_from(["loadopt", "status", "3", "settled"])
            .is_err());
    }
}
