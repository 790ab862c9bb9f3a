mod command;
mod runtime;

pub use command::parse_command;
pub use runtime::HostRunner;

use infrastructure::{EventListener, Mqtt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::climate::{ClimateEvent, CommandRequest};

#[derive(Clone, Deserialize, Debug)]
pub struct Host {
    #[serde(default = "default_base_topic")]
    pub base_topic: String,
}

fn default_base_topic() -> String {
    "uiot_climate".to_string()
}

impl Default for Host {
    fn default() -> Self {
        Self {
            base_topic: default_base_topic(),
        }
    }
}

impl Host {
    pub async fn new_runner(
        &self,
        mqtt: &mut Mqtt,
        events: EventListener<ClimateEvent>,
        commands: mpsc::Sender<CommandRequest>,
    ) -> anyhow::Result<HostRunner> {
        let command_messages = mqtt.subscribe(format!("{}/+/set", self.base_topic)).await?;

        Ok(HostRunner::new(
            self.base_topic.clone(),
            events,
            command_messages,
            commands,
            mqtt.sender(),
        ))
    }
}
