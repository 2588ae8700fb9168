//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod db;
pub mod devices;
pub mod groups;

use meshherd_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Db(args) => db::handle(controller, &args, global),
        Command::Devices(args) => devices::handle(controller, &args, global),
        Command::Groups(args) => groups::handle(controller, args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
    }
}
