// ── Group command dispatch ──
//
// Read, write and cluster-command requests addressed to a whole group.
// Each call resolves symbolic names through the context's cluster
// catalog, merges options over the defaults, builds one frame and hands
// it to the adapter. Adapter failures come back as `CoreError::Dispatch`
// carrying a summary of the attempt; nothing is retried here.

mod options;
pub(crate) mod requests;

use meshherd_api::{Frame, FrameType, GlobalCommand, Key, Payload};
use serde_json::{Map, Value};
use tracing::debug;

pub use options::CommandOptions;
use options::ResolvedOptions;

use crate::error::CoreError;
use crate::model::Group;

impl Group {
    /// Write attribute values on every member of the group.
    pub async fn write(
        &self,
        cluster: impl Into<Key>,
        attributes: &Map<String, Value>,
        options: Option<CommandOptions>,
    ) -> Result<(), CoreError> {
        let options = self.resolve_options(options);
        let cluster = self.ctx.catalog().cluster(&cluster.into())?;
        let records = requests::write_records(cluster, attributes)?;

        let summary = format!(
            "Write {} {}({}, {})",
            self.group_address(),
            cluster.name,
            Value::Object(attributes.clone()),
            options_json(&options),
        );
        let frame = self.frame(
            FrameType::Global,
            GlobalCommand::Write.id(),
            cluster.id,
            Payload::Write(records),
            &options,
        );
        self.send(summary, &frame, &options).await
    }

    /// Ask every member of the group to report attribute values.
    pub async fn read(
        &self,
        cluster: impl Into<Key>,
        attributes: &[Key],
        options: Option<CommandOptions>,
    ) -> Result<(), CoreError> {
        let options = self.resolve_options(options);
        let cluster = self.ctx.catalog().cluster(&cluster.into())?;
        let ids = requests::read_ids(cluster, attributes)?;

        let summary = format!(
            "Read {} {}({}, {})",
            self.group_address(),
            cluster.name,
            serde_json::to_string(attributes)?,
            options_json(&options),
        );
        let frame = self.frame(
            FrameType::Global,
            GlobalCommand::Read.id(),
            cluster.id,
            Payload::Read(ids),
            &options,
        );
        self.send(summary, &frame, &options).await
    }

    /// Invoke a cluster-specific command on every member of the group.
    pub async fn command(
        &self,
        cluster: impl Into<Key>,
        command: impl Into<Key>,
        payload: Map<String, Value>,
        options: Option<CommandOptions>,
    ) -> Result<(), CoreError> {
        let options = self.resolve_options(options);
        let cluster = self.ctx.catalog().cluster(&cluster.into())?;
        let command = cluster.command(&command.into())?;

        let summary = format!(
            "Command {} {}.{}({}, {})",
            self.group_address(),
            cluster.name,
            command.name,
            Value::Object(payload.clone()),
            options_json(&options),
        );
        let frame = self.frame(
            FrameType::Specific,
            command.id,
            cluster.id,
            Payload::Command(payload),
            &options,
        );
        self.send(summary, &frame, &options).await
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn resolve_options(&self, options: Option<CommandOptions>) -> ResolvedOptions {
        options
            .unwrap_or_default()
            .resolve(self.ctx.default_source_endpoint())
    }

    fn frame(
        &self,
        frame_type: FrameType,
        command_id: u8,
        cluster_id: u16,
        payload: Payload,
        options: &ResolvedOptions,
    ) -> Frame {
        let tsn = options
            .transaction_sequence_number
            .unwrap_or_else(|| self.ctx.sequence().next());
        Frame::create(
            frame_type,
            options.direction,
            true,
            options.manufacturer_code,
            tsn,
            command_id,
            cluster_id,
            payload,
            options.reserved_bits,
        )
    }

    async fn send(
        &self,
        summary: String,
        frame: &Frame,
        options: &ResolvedOptions,
    ) -> Result<(), CoreError> {
        debug!(group = self.group_address(), "{summary}");
        self.ctx
            .adapter()
            .send_frame_to_group(self.group_address(), frame, options.source_endpoint)
            .await
            .map_err(|source| {
                debug!(group = self.group_address(), error = %source, "{summary} failed");
                CoreError::Dispatch { summary, source }
            })
    }
}

fn options_json(options: &ResolvedOptions) -> String {
    serde_json::to_string(options).unwrap_or_default()
}
