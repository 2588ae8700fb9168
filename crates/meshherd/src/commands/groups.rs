//! Group command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;

use meshherd_core::{
    Controller, DeviceDirectory, EndpointRef, Group, GroupSummary, IeeeAddr,
};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand, MemberArgs};
use crate::error::{CliError, list_hint};
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Address")]
    address: u16,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Members")]
    members: usize,
    #[tabled(rename = "Name")]
    name: String,
}

fn display_name(summary: &GroupSummary) -> String {
    ["friendlyName", "name"]
        .iter()
        .find_map(|key| summary.meta.get(*key).and_then(|v| v.as_str()))
        .unwrap_or_default()
        .to_owned()
}

impl From<&GroupSummary> for GroupRow {
    fn from(g: &GroupSummary) -> Self {
        Self {
            address: g.group_address,
            id: g.id,
            members: g.members.len(),
            name: display_name(g),
        }
    }
}

fn detail(g: &GroupSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Group {} (record {})", g.group_address, g.id);
    let name = display_name(g);
    if !name.is_empty() {
        let _ = writeln!(out, "Name:    {name}");
    }
    if g.members.is_empty() {
        let _ = write!(out, "Members: none");
    } else {
        let _ = write!(out, "Members:");
        for member in &g.members {
            let _ = write!(out, "\n  {member}");
        }
    }
    out
}

// ── Helpers ─────────────────────────────────────────────────────────

fn find_group(controller: &Controller, address: u16) -> Result<Arc<Group>, CliError> {
    controller
        .groups()
        .by_group_address(address)?
        .ok_or_else(|| CliError::NotFound {
            resource_type: "Group".into(),
            identifier: address.to_string(),
            hint: list_hint("groups list"),
        })
}

fn member_ref(args: &MemberArgs) -> Result<EndpointRef, CliError> {
    Ok(EndpointRef::new(IeeeAddr::parse(&args.ieee)?, args.endpoint))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::List => {
            let groups: Vec<GroupSummary> = controller
                .groups()
                .all()?
                .iter()
                .map(|g| GroupSummary::from(g.as_ref()))
                .collect();
            let out = output::render_list(
                &global.output,
                &groups,
                |g| GroupRow::from(g),
                |g| g.group_address.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Show { address } => {
            let group = find_group(controller, address)?;
            let summary = GroupSummary::from(group.as_ref());
            let out = output::render_single(&global.output, &summary, detail, |g| {
                g.members
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Create { address } => {
            let group = controller.groups().create(address).await?;
            output::status(
                &format!("Group {} created (record {})", group.group_address(), group.store_id()),
                global.quiet,
            );
            Ok(())
        }

        GroupsCommand::Delete { address } => {
            let group = find_group(controller, address)?;
            let report = controller.groups().remove_from_network(&group).await?;
            for failure in &report.failures {
                output::status(
                    &format!("warning: {} did not leave the group: {}", failure.member, failure.error),
                    global.quiet,
                );
            }
            output::status(
                &format!(
                    "Group {address} deleted ({} of {} members detached)",
                    report.detached.len(),
                    report.detached.len() + report.failures.len()
                ),
                global.quiet,
            );
            Ok(())
        }

        GroupsCommand::AddMember(member) => {
            let group = find_group(controller, member.address)?;
            let reference = member_ref(&member)?;
            let endpoint = controller
                .devices()
                .resolve_endpoint(&reference)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "Endpoint".into(),
                    identifier: reference.to_string(),
                    hint: list_hint("devices list"),
                })?;
            group.add_member(endpoint).await?;
            output::status(&format!("Added {reference} to group {}", member.address), global.quiet);
            Ok(())
        }

        GroupsCommand::RemoveMember(member) => {
            let group = find_group(controller, member.address)?;
            let reference = member_ref(&member)?;
            if !group.has_member(&reference) {
                return Err(CliError::NotFound {
                    resource_type: "Member".into(),
                    identifier: reference.to_string(),
                    hint: list_hint(&format!("groups show {}", member.address)),
                });
            }
            group.remove_member(&reference).await?;
            output::status(
                &format!("Removed {reference} from group {}", member.address),
                global.quiet,
            );
            Ok(())
        }
    }
}
