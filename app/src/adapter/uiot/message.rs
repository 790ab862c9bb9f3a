use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::id::DeviceId;
use crate::core::unit::DegreeCelsius;

pub const CLIMATE_DEVICE_TYPE: &str = "climate";

/// Snapshot of one device as delivered by the cloud device list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub device_id: DeviceId,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_mac: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub software_version: String,
    #[serde(default)]
    pub hardware_version: String,
    #[serde(default)]
    pub device_online_state: OnlineState,
    #[serde(default)]
    pub properties: Option<DeviceProperties>,
}

impl DeviceDescriptor {
    pub fn is_climate(&self) -> bool {
        self.device_type == CLIMATE_DEVICE_TYPE
    }
}

/// Vendor property bag. Empty strings and `null` are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProperties {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub power_switch: Option<String>,
    #[serde(default, deserialize_with = "lenient_temperature")]
    pub target_temperature: Option<DegreeCelsius>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub thermostat_mode: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub wind_speed: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

impl DeviceProperties {
    pub fn is_empty(&self) -> bool {
        self.power_switch.is_none()
            && self.target_temperature.is_none()
            && self.thermostat_mode.is_none()
            && self.wind_speed.is_none()
            && self.other.is_empty()
    }
}

/// Online flag as reported by the cloud. Only the sentinel `0` (or `false`) means offline;
/// anything else, including a missing value, counts as online.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct OnlineState(Option<Value>);

impl OnlineState {
    pub fn is_available(&self) -> bool {
        match &self.0 {
            None => true,
            Some(Value::Bool(online)) => *online,
            Some(value) => value.as_f64() != Some(0.0),
        }
    }
}

impl From<Value> for OnlineState {
    fn from(value: Value) -> Self {
        Self(Some(value))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetStateRecord {
    pub device_id: DeviceId,
    #[serde(default)]
    pub net_state: OnlineState,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    #[serde(default)]
    pub properties: Option<DeviceProperties>,
    #[serde(default)]
    pub device_online_state: OnlineState,
}

/// A notification from the state-report channel, parsed once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum UiotMessage {
    OnlineReport(Vec<NetStateRecord>),
    StateReport(StateReport),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OnlineReportData {
    #[serde(default)]
    device_list: Vec<Value>,
}

impl UiotMessage {
    pub fn parse(topic: &str, payload: &str, online_report_marker: &str) -> anyhow::Result<Self> {
        if topic.contains(online_report_marker) {
            let envelope: Envelope<OnlineReportData> =
                serde_json::from_str(payload).with_context(|| format!("Invalid online report on {}", topic))?;
            Ok(UiotMessage::OnlineReport(valid_entries(envelope.data.device_list, "online record")))
        } else {
            let envelope: Envelope<StateReport> =
                serde_json::from_str(payload).with_context(|| format!("Invalid state report on {}", topic))?;
            Ok(UiotMessage::StateReport(envelope.data))
        }
    }
}

/// Parses a device list. Entries that don't form a valid descriptor are skipped with a warning.
pub fn parse_descriptor_list(payload: &str) -> anyhow::Result<Vec<DeviceDescriptor>> {
    let entries: Vec<Value> = serde_json::from_str(payload).context("Device list is not a JSON array")?;
    Ok(valid_entries(entries, "device descriptor"))
}

fn valid_entries<T: DeserializeOwned>(entries: Vec<Value>, kind: &str) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping invalid {} {}: {}", kind, entry, e);
                None
            }
        })
        .collect()
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn lenient_temperature<'de, D>(deserializer: D) -> Result<Option<DegreeCelsius>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Number(f64),
        Text(String),
    }

    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawNumber::Number(n)) => Ok(Some(DegreeCelsius(n))),
        Some(RawNumber::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawNumber::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(|n| Some(DegreeCelsius(n)))
            .map_err(|_| serde::de::Error::custom(format!("invalid temperature {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MARKER: &str = "online_report";

    #[test]
    fn descriptor_with_properties() {
        let descriptor: DeviceDescriptor = serde_json::from_value(json!({
            "deviceId": 1,
            "deviceName": "AC1",
            "deviceMac": "aa:bb",
            "type": "climate",
            "roomName": "Bedroom",
            "properties": {
                "powerSwitch": "off",
                "targetTemperature": 20,
                "thermostatMode": "cool",
                "windSpeed": "high"
            }
        }))
        .unwrap();

        assert!(descriptor.is_climate());
        assert_eq!(descriptor.device_id, DeviceId::new("1"));
        assert_eq!(descriptor.room_name, "Bedroom");
        assert_eq!(descriptor.model, "");

        let props = descriptor.properties.unwrap();
        assert_eq!(props.power_switch.as_deref(), Some("off"));
        assert_eq!(props.target_temperature, Some(DegreeCelsius(20.0)));
        assert_eq!(props.wind_speed.as_deref(), Some("high"));
    }

    #[test]
    fn online_state_sentinel() {
        assert!(OnlineState::default().is_available());
        assert!(OnlineState::from(json!(1)).is_available());
        assert!(OnlineState::from(json!("0")).is_available());
        assert!(OnlineState::from(Value::Null).is_available());
        assert!(!OnlineState::from(json!(0)).is_available());
        assert!(!OnlineState::from(json!(0.0)).is_available());
        assert!(!OnlineState::from(json!(false)).is_available());
    }

    #[test]
    fn empty_strings_are_absent() {
        let props: DeviceProperties = serde_json::from_value(json!({
            "powerSwitch": "",
            "targetTemperature": "",
            "windSpeed": null
        }))
        .unwrap();

        assert!(props.is_empty());
    }

    #[test]
    fn temperature_as_text() {
        let props: DeviceProperties = serde_json::from_value(json!({"targetTemperature": "24"})).unwrap();
        assert_eq!(props.target_temperature, Some(DegreeCelsius(24.0)));

        assert!(serde_json::from_value::<DeviceProperties>(json!({"targetTemperature": "warm"})).is_err());
    }

    #[test]
    fn unknown_property_keys_are_kept() {
        let props: DeviceProperties = serde_json::from_value(json!({"swing": "on"})).unwrap();
        assert!(!props.is_empty());
    }

    #[test]
    fn parse_online_report_by_topic_marker() {
        let msg = UiotMessage::parse(
            "uiot/gw1/online_report",
            r#"{"data":{"deviceList":[{"deviceId":5,"netState":0},{"deviceId":"6","netState":1}]}}"#,
            MARKER,
        )
        .unwrap();

        let UiotMessage::OnlineReport(records) = msg else {
            panic!("expected online report");
        };

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_id, DeviceId::new("5"));
        assert!(!records[0].net_state.is_available());
        assert!(records[1].net_state.is_available());
    }

    #[test]
    fn online_report_skips_records_without_device_id() {
        let msg = UiotMessage::parse(
            "uiot/gw1/online_report",
            r#"{"data":{"deviceList":[{"netState":1},{"deviceId":3,"netState":0}]}}"#,
            MARKER,
        )
        .unwrap();

        assert_eq!(
            msg,
            UiotMessage::OnlineReport(vec![NetStateRecord {
                device_id: DeviceId::new("3"),
                net_state: OnlineState::from(json!(0)),
            }])
        );
    }

    #[test]
    fn parse_state_report() {
        let msg = UiotMessage::parse(
            "uiot/gw1/state_report",
            r#"{"data":{"deviceId":"5","properties":{"windSpeed":"low"}}}"#,
            MARKER,
        )
        .unwrap();

        let UiotMessage::StateReport(report) = msg else {
            panic!("expected state report");
        };

        assert_eq!(report.device_id, Some(DeviceId::new("5")));
        assert_eq!(report.properties.unwrap().wind_speed.as_deref(), Some("low"));
        assert!(report.device_online_state.is_available());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(UiotMessage::parse("uiot/gw1/state_report", "{not json", MARKER).is_err());
        assert!(UiotMessage::parse("uiot/gw1/online_report", r#"{"data": 3}"#, MARKER).is_err());
    }

    #[test]
    fn descriptor_list_skips_invalid_entries() {
        let list = parse_descriptor_list(
            r#"[{"deviceId": 1, "type": "climate"}, {"deviceName": "no id"}, {"deviceId": "2", "type": "switch"}]"#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[1].device_type, "switch");
    }

    #[test]
    fn descriptor_list_must_be_array() {
        assert!(parse_descriptor_list(r#"{"deviceId": 1}"#).is_err());
    }
}
