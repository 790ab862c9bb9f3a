use infrastructure::EventEmitter;
use serde::Serialize;
use serde_json::json;

use crate::adapter::uiot::{DeviceDescriptor, UiotMessage};
use crate::core::id::DeviceId;
use crate::core::unit::DegreeCelsius;

use super::{
    ClimateCommand, ClimateEvent, ClimateSnapshot, ClimateState, DeviceControl, FanMode, HvacMode, MAX_TEMPERATURE,
    MIN_TEMPERATURE, TEMPERATURE_STEP,
};

pub const INTEGRATION_DOMAIN: &str = "uiot";

/// Static description of an entity: identity, device metadata and capabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateEntityInfo {
    pub device_id: DeviceId,
    pub unique_id: String,
    pub name: String,
    pub device: DeviceInfo,
    pub min_temp: DegreeCelsius,
    pub max_temp: DegreeCelsius,
    pub target_temperature_step: f64,
    pub temperature_unit: &'static str,
    pub supported_features: Vec<&'static str>,
    pub hvac_modes: Vec<HvacMode>,
    pub fan_modes: Vec<FanMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub suggested_area: String,
    pub model: String,
    pub sw_version: String,
    pub hw_version: String,
}

impl ClimateEntityInfo {
    fn new(descriptor: &DeviceDescriptor, manufacturer: &str) -> Self {
        let unique_id = descriptor.device_id.to_string();

        Self {
            device_id: descriptor.device_id.clone(),
            unique_id: unique_id.clone(),
            name: descriptor.device_name.clone(),
            device: DeviceInfo {
                identifiers: vec![(
                    INTEGRATION_DOMAIN.to_string(),
                    format!("{}_{}", descriptor.device_mac, unique_id),
                )],
                name: descriptor.device_name.clone(),
                manufacturer: manufacturer.to_string(),
                suggested_area: descriptor.room_name.clone(),
                model: descriptor.model.clone(),
                sw_version: descriptor.software_version.clone(),
                hw_version: descriptor.hardware_version.clone(),
            },
            min_temp: MIN_TEMPERATURE,
            max_temp: MAX_TEMPERATURE,
            target_temperature_step: TEMPERATURE_STEP,
            temperature_unit: "°C",
            supported_features: vec!["target_temperature", "fan_mode"],
            hvac_modes: HvacMode::ALL.to_vec(),
            fan_modes: FanMode::ALL.to_vec(),
        }
    }
}

/// Host-side representation of one air conditioner.
///
/// Owns the device state exclusively. Inbound reports replace the whole state record in one
/// assignment; host commands update it locally and forward to the device cloud.
pub struct ClimateEntity<C: DeviceControl> {
    info: ClimateEntityInfo,
    state: ClimateState,
    control: C,
    announcer: EventEmitter<ClimateEvent>,
}

impl<C: DeviceControl> ClimateEntity<C> {
    pub fn new(descriptor: &DeviceDescriptor, manufacturer: &str, control: C, announcer: EventEmitter<ClimateEvent>) -> Self {
        let state = ClimateState::from_descriptor(descriptor);

        tracing::debug!(
            "Initializing climate entity {} (deviceId={}, mac={}, available={})",
            descriptor.device_name,
            descriptor.device_id,
            descriptor.device_mac,
            state.available
        );

        Self {
            info: ClimateEntityInfo::new(descriptor, manufacturer),
            state,
            control,
            announcer,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.info.device_id
    }

    pub fn info(&self) -> &ClimateEntityInfo {
        &self.info
    }

    #[cfg(test)]
    pub fn state(&self) -> &ClimateState {
        &self.state
    }

    pub fn snapshot(&self) -> ClimateSnapshot {
        ClimateSnapshot {
            device_id: self.device_id().clone(),
            state: self.state.clone(),
        }
    }

    /// Applies a notification from the state-report channel. Returns true if the state was
    /// updated and announced. Messages for other devices are ignored.
    pub fn apply(&mut self, msg: &UiotMessage) -> bool {
        match msg {
            UiotMessage::OnlineReport(records) => {
                let Some(record) = records.iter().find(|r| &r.device_id == self.device_id()) else {
                    return false;
                };

                let available = record.net_state.is_available();
                tracing::debug!("Online state of {} changed: available={}", self.device_id(), available);

                self.state = self.state.with_availability(available);
            }

            UiotMessage::StateReport(report) => {
                if report.device_id.as_ref() != Some(self.device_id()) {
                    return false;
                }

                let Some(props) = report.properties.as_ref().filter(|p| !p.is_empty()) else {
                    tracing::warn!("Received state report without properties for {}", self.device_id());
                    return false;
                };

                tracing::debug!("Received state update for {}: {:?}", self.device_id(), props);

                self.state = self.state.merge(props, &report.device_online_state);
            }
        }

        self.announce();
        true
    }

    pub async fn execute(&mut self, command: ClimateCommand) {
        match command {
            ClimateCommand::SetHvacMode(mode) => self.set_hvac_mode(mode).await,
            ClimateCommand::SetTemperature(temperature) => self.set_temperature(temperature).await,
            ClimateCommand::SetFanMode(fan_mode) => self.set_fan_mode(fan_mode).await,
            ClimateCommand::TurnOn => self.turn_on().await,
            ClimateCommand::TurnOff => self.turn_off().await,
        }
    }

    #[tracing::instrument(skip(self), fields(device_id = %self.info.device_id))]
    pub async fn set_hvac_mode(&mut self, mode: HvacMode) {
        self.state = ClimateState {
            hvac_mode: Some(mode),
            ..self.state.clone()
        };

        if mode == HvacMode::Off {
            self.turn_off().await;
            return;
        }

        if !self.state.is_powered() {
            self.power_on().await;
        }

        self.send(json!({ "thermostatMode": mode.to_string() })).await;
        self.announce();
    }

    #[tracing::instrument(skip(self), fields(device_id = %self.info.device_id))]
    pub async fn set_temperature(&mut self, temperature: DegreeCelsius) {
        let target = temperature
            .clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
            .round_to_step(TEMPERATURE_STEP);

        self.state = ClimateState {
            target_temperature: Some(target),
            ..self.state.clone()
        };

        self.send(json!({ "targetTemperature": target.0 as i64 })).await;
        self.announce();
    }

    #[tracing::instrument(skip(self), fields(device_id = %self.info.device_id))]
    pub async fn set_fan_mode(&mut self, fan_mode: FanMode) {
        self.state = ClimateState {
            fan_mode: Some(fan_mode),
            ..self.state.clone()
        };

        self.send(json!({ "windSpeed": fan_mode.vendor_token() })).await;
        self.announce();
    }

    #[tracing::instrument(skip(self), fields(device_id = %self.info.device_id))]
    pub async fn turn_on(&mut self) {
        self.power_on().await;
        self.announce();
    }

    #[tracing::instrument(skip(self), fields(device_id = %self.info.device_id))]
    pub async fn turn_off(&mut self) {
        if let Err(e) = self.control.power_off(self.device_id()).await {
            tracing::error!("Error powering off {}: {:?}", self.device_id(), e);
        }

        self.state = ClimateState {
            is_on: Some(false),
            hvac_mode: Some(HvacMode::Off),
            ..self.state.clone()
        };
        self.announce();
    }

    async fn power_on(&mut self) {
        if let Err(e) = self.control.power_on(self.device_id()).await {
            tracing::error!("Error powering on {}: {:?}", self.device_id(), e);
        }

        self.state = ClimateState {
            is_on: Some(true),
            ..self.state.clone()
        };
    }

    async fn send(&self, properties: serde_json::Value) {
        tracing::debug!("Sending properties to {}: {}", self.device_id(), properties);

        if let Err(e) = self.control.send_properties(self.device_id(), properties).await {
            tracing::error!("Error sending properties to {}: {:?}", self.device_id(), e);
        }
    }

    fn announce(&self) {
        self.announcer.send(ClimateEvent::StateChanged(self.snapshot()));
    }
}
