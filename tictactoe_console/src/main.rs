// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod http_server_state;
mod identity;
mod network;
mod server_config;
mod server_main;

use clap::{Command, arg};
use server_config::ServerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .filter_module("tide", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let matches = Command::new("Tic-tac-toe")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Tic-tac-toe session server")
        .subcommand_required(true)
        .subcommand(Command::new("server").about("Run as server").arg(
            arg!(<config_file> "Path to the configuration file: yaml-serialized ServerConfig."),
        ))
        .subcommand(
            Command::new("check-config")
                .about("Parses a configuration file and prints the result.")
                .arg(arg!(<config_file> "Path to the configuration file")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            server_main::run(read_config_file(sub_matches)?)
        }
        Some(("check-config", sub_matches)) => {
            println!("{:#?}", read_config_file(sub_matches)?);
            Ok(())
        }
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}

fn read_config_file(sub_matches: &clap::ArgMatches) -> anyhow::Result<ServerConfig> {
    let filename = sub_matches
        .get_one::<String>("config_file")
        .ok_or_else(|| anyhow::anyhow!("Config file not specified"))?;
    ServerConfig::read_file(filename)
}
