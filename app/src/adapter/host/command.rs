use serde::Deserialize;

use crate::climate::{ClimateCommand, CommandRequest, FanMode, HvacMode};
use crate::core::id::DeviceId;
use crate::core::unit::DegreeCelsius;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HostCommandError {
    #[display("{topic} is not a command topic")]
    UnexpectedTopic { topic: String },
    #[display("invalid command payload {payload:?}: {source}")]
    InvalidPayload { payload: String, source: serde_json::Error },
}

// example: {"hvac_mode": "cool"}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum HostCommand {
    HvacMode(HvacMode),
    Temperature(DegreeCelsius),
    FanMode(FanMode),
    Power(PowerSwitch),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PowerSwitch {
    On,
    Off,
}

impl From<HostCommand> for ClimateCommand {
    fn from(command: HostCommand) -> Self {
        match command {
            HostCommand::HvacMode(mode) => ClimateCommand::SetHvacMode(mode),
            HostCommand::Temperature(temperature) => ClimateCommand::SetTemperature(temperature),
            HostCommand::FanMode(fan_mode) => ClimateCommand::SetFanMode(fan_mode),
            HostCommand::Power(PowerSwitch::On) => ClimateCommand::TurnOn,
            HostCommand::Power(PowerSwitch::Off) => ClimateCommand::TurnOff,
        }
    }
}

/// Parses a message from `<base_topic>/<deviceId>/set` into a command for that device.
pub fn parse_command(base_topic: &str, topic: &str, payload: &str) -> Result<CommandRequest, HostCommandError> {
    let device_id = topic
        .strip_prefix(base_topic)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.strip_suffix("/set"))
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .ok_or_else(|| HostCommandError::UnexpectedTopic {
            topic: topic.to_string(),
        })?;

    let command: HostCommand =
        serde_json::from_str(payload).map_err(|source| HostCommandError::InvalidPayload {
            payload: payload.to_string(),
            source,
        })?;

    Ok(CommandRequest {
        device_id: DeviceId::new(device_id),
        command: command.into(),
    })
}
