use infrastructure::{EventListener, MqttInMessage, MqttSender, MqttSubscription};
use tokio::sync::mpsc;

use crate::climate::{ClimateEvent, CommandRequest};

use super::parse_command;

/// Mirrors entity registrations and state changes to retained host topics and forwards
/// host commands to the climate runner.
pub struct HostRunner {
    base_topic: String,
    events: EventListener<ClimateEvent>,
    command_messages: MqttSubscription,
    commands: mpsc::Sender<CommandRequest>,
    mqtt_sender: MqttSender,
}

impl HostRunner {
    pub fn new(
        base_topic: String,
        events: EventListener<ClimateEvent>,
        command_messages: MqttSubscription,
        commands: mpsc::Sender<CommandRequest>,
        mqtt_sender: MqttSender,
    ) -> Self {
        Self {
            base_topic,
            events,
            command_messages,
            commands,
            mqtt_sender,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => {
                    self.handle_event(event).await;
                }

                Some(msg) = self.command_messages.recv() => {
                    self.handle_command_message(msg).await;
                }

                else => break,
            }
        }

        tracing::warn!("Host runner stopped");
    }

    async fn handle_event(&self, event: ClimateEvent) {
        let (topic, payload) = match outgoing_message(&self.base_topic, &event) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("Error serializing host message for {:?}: {:?}", event, e);
                return;
            }
        };

        if let Err(e) = self.mqtt_sender.send_retained(topic.clone(), payload).await {
            tracing::error!("Error publishing host message to {}: {:?}", topic, e);
        }
    }

    async fn handle_command_message(&self, msg: MqttInMessage) {
        let request = match parse_command(&self.base_topic, &msg.topic, &msg.payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("Dropping host command: {}", e);
                return;
            }
        };

        tracing::info!("Received host command for {}: {:?}", request.device_id, request.command);

        if let Err(e) = self.commands.send(request).await {
            tracing::error!("Error forwarding host command: {:?}", e);
        }
    }
}

/// Retained topic and JSON payload announcing the event to the host.
fn outgoing_message(base_topic: &str, event: &ClimateEvent) -> anyhow::Result<(String, String)> {
    Ok(match event {
        ClimateEvent::Registered(info) => (
            format!("{}/{}/config", base_topic, info.device_id),
            serde_json::to_string(info)?,
        ),
        ClimateEvent::StateChanged(snapshot) => (
            format!("{}/{}/state", base_topic, snapshot.device_id),
            serde_json::to_string(&snapshot.state)?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::testing::{RecordingControl, announcements, descriptor};
    use crate::climate::{ClimateEntity, ClimateSnapshot, ClimateState, FanMode, HvacMode};
    use crate::core::id::DeviceId;
    use crate::core::unit::DegreeCelsius;
    use assert_json_diff::assert_json_eq;
    use serde_json::{Value, json};

    fn payload(payload: &str) -> Value {
        serde_json::from_str(payload).unwrap()
    }

    #[test]
    fn config_message() {
        let (bus, _listener) = announcements();
        let entity = ClimateEntity::new(
            &descriptor(json!({
                "deviceId": 7,
                "deviceName": "AC office",
                "deviceMac": "aa:bb:cc",
                "roomName": "Office",
                "model": "KFR-35",
                "softwareVersion": "1.2",
                "hardwareVersion": "A",
                "type": "climate"
            })),
            "UIOT",
            RecordingControl::default(),
            bus.emitter(),
        );

        let (topic, body) =
            outgoing_message("uiot_climate", &ClimateEvent::Registered(entity.info().clone())).unwrap();

        assert_eq!(topic, "uiot_climate/7/config");
        assert_json_eq!(
            payload(&body),
            json!({
                "device_id": "7",
                "unique_id": "7",
                "name": "AC office",
                "device": {
                    "identifiers": [["uiot", "aa:bb:cc_7"]],
                    "name": "AC office",
                    "manufacturer": "UIOT",
                    "suggested_area": "Office",
                    "model": "KFR-35",
                    "sw_version": "1.2",
                    "hw_version": "A"
                },
                "min_temp": 16.0,
                "max_temp": 32.0,
                "target_temperature_step": 1.0,
                "temperature_unit": "°C",
                "supported_features": ["target_temperature", "fan_mode"],
                "hvac_modes": ["cool", "heat", "fan_only", "dry", "off", "auto"],
                "fan_modes": ["low", "medium", "high"]
            })
        );
    }

    #[test]
    fn state_message() {
        let snapshot = ClimateSnapshot {
            device_id: DeviceId::new("7"),
            state: ClimateState {
                available: true,
                is_on: Some(true),
                hvac_mode: Some(HvacMode::FanOnly),
                fan_mode: Some(FanMode::Medium),
                target_temperature: Some(DegreeCelsius(24.0)),
                current_temperature: None,
            },
        };

        let (topic, body) = outgoing_message("uiot_climate", &ClimateEvent::StateChanged(snapshot)).unwrap();

        assert_eq!(topic, "uiot_climate/7/state");
        assert_json_eq!(
            payload(&body),
            json!({
                "available": true,
                "is_on": true,
                "hvac_mode": "fan_only",
                "fan_mode": "medium",
                "target_temperature": 24.0,
                "current_temperature": null
            })
        );
    }
}
