//! Config subcommand handlers.

use std::fmt::Write as _;

use meshherd_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn format_config(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "log_level = \"{}\"", cfg.log_level);
    let _ = writeln!(out);
    let _ = writeln!(out, "[database]");
    let _ = writeln!(out, "path = \"{}\"", cfg.database_path().display());
    if let Some(ref backup) = cfg.database.backup_path {
        let _ = writeln!(out, "backup_path = \"{}\"", backup.display());
    }
    let _ = writeln!(out);
    let _ = write!(out, "[network]");
    if let Some(endpoint) = cfg.network.default_source_endpoint {
        let _ = write!(out, "\ndefault_source_endpoint = {endpoint}");
    }
    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = global.config.clone().unwrap_or_else(config::config_path);

    match args.command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default(), Some(&path))?;
            output::status(&format!("Wrote {}", written.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            // Shows defaults when the file is missing or unreadable
            let cfg = config::load_config_or_default(Some(&path));
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.database_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
