mod control;
mod message;

pub use control::MqttDeviceControl;
pub use message::{DeviceDescriptor, DeviceProperties, OnlineState, UiotMessage, parse_descriptor_list};

#[cfg(test)]
pub use message::{NetStateRecord, StateReport};

use anyhow::Context;
use infrastructure::{Mqtt, MqttSubscription};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Uiot {
    pub state_topics: Vec<String>,
    pub network_topic: String,
    pub control_topic: String,
    #[serde(default = "default_online_report_marker")]
    pub online_report_marker: String,
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    pub devices_file: Option<String>,
}

fn default_online_report_marker() -> String {
    "online_report".to_string()
}

fn default_manufacturer() -> String {
    "UIOT".to_string()
}

impl Uiot {
    pub fn new_device_control(&self, mqtt: &Mqtt) -> MqttDeviceControl {
        MqttDeviceControl::new(self.control_topic.clone(), mqtt.sender())
    }

    pub async fn subscribe_state_reports(&self, mqtt: &mut Mqtt) -> anyhow::Result<MqttSubscription> {
        mqtt.subscribe_all(&self.state_topics).await
    }

    pub async fn subscribe_network_reports(&self, mqtt: &mut Mqtt) -> anyhow::Result<MqttSubscription> {
        mqtt.subscribe(self.network_topic.clone()).await
    }

    /// Device list known at startup. Without a configured file the service starts empty and
    /// waits for network reports.
    pub fn load_initial_devices(&self) -> anyhow::Result<Vec<DeviceDescriptor>> {
        let Some(path) = &self.devices_file else {
            return Ok(vec![]);
        };

        let content = std::fs::read_to_string(path).with_context(|| format!("Error reading device list {}", path))?;
        parse_descriptor_list(&content).with_context(|| format!("Error parsing device list {}", path))
    }
}
