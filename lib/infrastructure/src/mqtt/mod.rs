mod client;
mod receiver;
mod sender;

pub use client::Mqtt;
pub use receiver::{MqttInMessage, MqttSubscription};
pub use sender::MqttSender;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    host: String,
    port: u16,
    client_id: String,
    #[serde(default = "default_keep_alive_secs")]
    keep_alive_secs: u64,
    #[serde(default = "default_session_expiry_secs")]
    session_expiry_secs: u32,
}

fn default_keep_alive_secs() -> u64 {
    5
}

fn default_session_expiry_secs() -> u32 {
    60
}

impl MqttConfig {
    pub fn new_client(&self) -> Mqtt {
        Mqtt::connect(self)
    }
}
