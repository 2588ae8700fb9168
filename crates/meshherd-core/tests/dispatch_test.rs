#![allow(clippy::unwrap_used)]
// Integration tests for read/write/command dispatch to a group.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

use common::{GroupSend, Harness};
use meshherd_api::{DataType, Direction, FrameType, Key, Payload, WriteRecord};
use meshherd_core::{CommandOptions, CoreError, Group};

fn object(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

async fn group(harness: &Harness, address: i64) -> Arc<Group> {
    harness.coordinator().await.create(address).await.unwrap()
}

fn last_send(harness: &Harness) -> GroupSend {
    harness.adapter.group_sends.lock().last().cloned().unwrap()
}

// ── Frame construction ──────────────────────────────────────────────

#[tokio::test]
async fn test_write_named_attribute() {
    let harness = Harness::new(0);
    let group = group(&harness, 5).await;

    group
        .write("genOnOff", &object(json!({"onTime": 30})), None)
        .await
        .unwrap();

    let send = last_send(&harness);
    assert_eq!(send.group_address, 5);
    assert_eq!(send.source_endpoint, None);
    let frame = send.frame;
    assert_eq!(frame.cluster_id, 0x0006);
    assert_eq!(frame.header.control.frame_type, FrameType::Global);
    assert_eq!(frame.header.control.direction, Direction::ClientToServer);
    assert!(frame.header.control.disable_default_response);
    assert_eq!(frame.header.command_id, 0x02);
    assert_eq!(frame.header.transaction_sequence_number, 1);
    assert_eq!(
        frame.payload,
        Payload::Write(vec![WriteRecord {
            attr_id: 0x4001,
            data_type: DataType::Uint16,
            attr_data: json!(30),
        }])
    );
}

#[tokio::test]
async fn test_read_by_name_and_id() {
    let harness = Harness::new(0);
    let group = group(&harness, 5).await;

    group
        .read(0x0008_u16, &[Key::from("currentLevel"), Key::Id(0x0011)], None)
        .await
        .unwrap();

    let frame = last_send(&harness).frame;
    assert_eq!(frame.cluster_id, 0x0008);
    assert_eq!(frame.header.command_id, 0x00);
    assert_eq!(frame.payload, Payload::Read(vec![0x0000, 0x0011]));
}

#[tokio::test]
async fn test_command_by_name_is_cluster_specific() {
    let harness = Harness::new(0);
    let group = group(&harness, 12).await;
    let payload = object(json!({"level": 128, "transtime": 10}));

    group
        .command("genLevelCtrl", "moveToLevelWithOnOff", payload.clone(), None)
        .await
        .unwrap();

    let frame = last_send(&harness).frame;
    assert_eq!(frame.header.control.frame_type, FrameType::Specific);
    assert_eq!(frame.header.command_id, 0x04);
    assert_eq!(frame.payload, Payload::Command(payload));
}

// ── Options ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_caller_options_override_defaults() {
    let harness = Harness::new(0);
    let group = group(&harness, 3).await;
    let options = CommandOptions::default()
        .transaction_sequence_number(42)
        .source_endpoint(2)
        .manufacturer_code(0x115f)
        .reserved_bits(0b101);

    group
        .command("genOnOff", 1_u16, Map::new(), Some(options))
        .await
        .unwrap();

    let send = last_send(&harness);
    assert_eq!(send.source_endpoint, Some(2));
    let header = send.frame.header;
    assert_eq!(header.transaction_sequence_number, 42);
    assert_eq!(header.manufacturer_code, Some(0x115f));
    assert!(header.control.manufacturer_specific);
    assert_eq!(header.control.reserved_bits, 0b101);
    assert_eq!(header.control.direction, Direction::ClientToServer);
}

#[tokio::test]
async fn test_sequence_numbers_come_from_shared_generator() {
    let harness = Harness::new(0);
    let group = group(&harness, 3).await;

    let explicit = CommandOptions::default().transaction_sequence_number(200);
    group.command("genOnOff", "on", Map::new(), Some(explicit)).await.unwrap();
    group.command("genOnOff", "off", Map::new(), None).await.unwrap();
    group.command("genOnOff", "toggle", Map::new(), None).await.unwrap();

    let tsns: Vec<u8> = harness
        .adapter
        .group_sends
        .lock()
        .iter()
        .map(|s| s.frame.header.transaction_sequence_number)
        .collect();
    assert_eq!(tsns, vec![200, 1, 2]);
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_names_fail_before_sending() {
    let harness = Harness::new(0);
    let group = group(&harness, 3).await;

    let err = group
        .write("genOnOff", &object(json!({"sparkle": 1})), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownAttribute { .. }));

    let err = group
        .command("genOnOff", "blink", Map::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownCommand { ref command, .. } if command == "blink"));

    let err = group.read("genWeather", &[Key::Id(0)], None).await.unwrap_err();
    assert!(matches!(err, CoreError::UnknownCluster { .. }));

    assert!(harness.adapter.group_sends.lock().is_empty());
}

#[tokio::test]
async fn test_adapter_failure_carries_operation_summary() {
    let harness = Harness::new(0);
    let group = group(&harness, 7).await;
    *harness.adapter.fail_group_sends.lock() = Some("radio busy".into());

    let err = group
        .command("genOnOff", "on", Map::new(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Command 7 genOnOff.on({}, {"direction":"clientToServer","sourceEndpoint":null,"reservedBits":0,"manufacturerCode":null,"transactionSequenceNumber":null}) failed (Send failed: radio busy)"#
    );

    let err = group
        .write("genLevelCtrl", &object(json!({"onLevel": 254})), None)
        .await
        .unwrap_err();
    let CoreError::Dispatch { summary, source } = err else {
        panic!("expected dispatch error");
    };
    assert!(summary.starts_with(r#"Write 7 genLevelCtrl({"onLevel":254}, "#));
    assert!(!source.is_transient());
}
