//! Device listing.

use std::sync::Arc;

use tabled::Tabled;

use meshherd_core::{Controller, Device};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "IEEE")]
    ieee: String,
    #[tabled(rename = "NWK")]
    nwk: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Endpoints")]
    endpoints: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            ieee: d.ieee_addr.to_string(),
            nwk: format!("{:#06x}", d.network_address),
            kind: d.kind.to_string(),
            model: d.model_id.clone().unwrap_or_default(),
            endpoints: d
                .endpoints
                .iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(controller: &Controller, args: &DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let devices = controller.devices().all();
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.ieee_addr.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
