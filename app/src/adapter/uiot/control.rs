use infrastructure::MqttSender;
use serde::Serialize;
use serde_json::{Value, json};

use crate::climate::DeviceControl;
use crate::core::id::DeviceId;

/// Publishes device commands to the vendor control topic.
#[derive(Clone)]
pub struct MqttDeviceControl {
    control_topic: String,
    sender: MqttSender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ControlPayload<'a> {
    device_id: &'a DeviceId,
    properties: Value,
}

impl MqttDeviceControl {
    pub fn new(control_topic: String, sender: MqttSender) -> Self {
        Self { control_topic, sender }
    }
}

impl DeviceControl for MqttDeviceControl {
    #[tracing::instrument(name = "send_properties UIOT", skip(self))]
    async fn send_properties(&self, device_id: &DeviceId, properties: Value) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&ControlPayload { device_id, properties })?;
        self.sender.send_transient(self.control_topic.clone(), payload).await
    }

    async fn power_on(&self, device_id: &DeviceId) -> anyhow::Result<()> {
        self.send_properties(device_id, power_switch(true)).await
    }

    async fn power_off(&self, device_id: &DeviceId) -> anyhow::Result<()> {
        self.send_properties(device_id, power_switch(false)).await
    }
}

fn power_switch(on: bool) -> Value {
    json!({ "powerSwitch": if on { "on" } else { "off" } })
}
