// ── Request payload builders ──
//
// Turn caller-facing attribute maps and lists into the numeric records
// a global read/write frame carries.

use meshherd_api::{Cluster, DataType, Key, WriteRecord};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Resolve a write request.
///
/// Keys naming an attribute of the cluster take their id and type from
/// the definition. Numeric keys pass through and must carry
/// `{"value": …, "type": …}` where `type` is a type code or name.
pub(crate) fn write_records(
    cluster: &Cluster,
    attributes: &Map<String, Value>,
) -> Result<Vec<WriteRecord>, CoreError> {
    attributes
        .iter()
        .map(|(key, value)| {
            if cluster.has_attribute(key) {
                let attribute = cluster.attribute(&Key::Name(key.clone()))?;
                return Ok(WriteRecord {
                    attr_id: attribute.id,
                    data_type: attribute.data_type,
                    attr_data: value.clone(),
                });
            }
            match Key::parse(key) {
                Key::Id(attr_id) => raw_write_record(attr_id, value),
                Key::Name(_) => Err(CoreError::UnknownAttribute {
                    cluster: cluster.name.clone(),
                    attribute: key.clone(),
                }),
            }
        })
        .collect()
}

fn raw_write_record(attr_id: u16, value: &Value) -> Result<WriteRecord, CoreError> {
    let (Some(attr_data), Some(raw_type)) = (value.get("value"), value.get("type")) else {
        return Err(CoreError::invalid(format!(
            "attribute {attr_id} is not in the cluster definition, pass {{\"value\", \"type\"}}"
        )));
    };
    let data_type = match raw_type {
        Value::Number(code) => code
            .as_u64()
            .and_then(|c| u8::try_from(c).ok())
            .and_then(DataType::from_code),
        Value::String(name) => name.parse::<DataType>().ok(),
        _ => None,
    }
    .ok_or_else(|| CoreError::invalid(format!("attribute {attr_id} has unknown data type {raw_type}")))?;

    Ok(WriteRecord {
        attr_id,
        data_type,
        attr_data: attr_data.clone(),
    })
}

/// Resolve a read request to attribute ids.
pub(crate) fn read_ids(cluster: &Cluster, attributes: &[Key]) -> Result<Vec<u16>, CoreError> {
    attributes
        .iter()
        .map(|key| match key {
            Key::Id(id) => Ok(*id),
            Key::Name(_) => Ok(cluster.attribute(key)?.id),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use meshherd_api::ClusterCatalog;
    use serde_json::json;

    fn on_off() -> Cluster {
        ClusterCatalog::default()
            .cluster(&Key::from("genOnOff"))
            .unwrap()
            .clone()
    }

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn named_attribute_takes_definition_type() {
        let records = write_records(&on_off(), &attrs(json!({"onTime": 30}))).unwrap();
        assert_eq!(
            records,
            vec![WriteRecord {
                attr_id: 0x4001,
                data_type: DataType::Uint16,
                attr_data: json!(30),
            }]
        );
    }

    #[test]
    fn numeric_attribute_needs_value_and_type() {
        let records = write_records(
            &on_off(),
            &attrs(json!({"0x4003": {"value": 255, "type": 0x30}, "16387": {"value": 1, "type": "enum8"}})),
        )
        .unwrap();
        assert!(records.iter().all(|r| r.attr_id == 0x4003 && r.data_type == DataType::Enum8));

        let err = write_records(&on_off(), &attrs(json!({"0x4003": 1}))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = write_records(&on_off(), &attrs(json!({"brightness": 1}))).unwrap_err();
        assert!(matches!(err, CoreError::UnknownAttribute { ref attribute, .. } if attribute == "brightness"));
    }

    #[test]
    fn read_mixes_names_and_ids() {
        let ids = read_ids(&on_off(), &[Key::from("onOff"), Key::Id(0x4001)]).unwrap();
        assert_eq!(ids, vec![0x0000, 0x4001]);
        assert!(matches!(
            read_ids(&on_off(), &[Key::from("nope")]),
            Err(CoreError::UnknownAttribute { .. })
        ));
    }
}
