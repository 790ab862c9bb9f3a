use serde::Serialize;

use crate::adapter::uiot::{DeviceDescriptor, DeviceProperties, OnlineState};
use crate::core::id::DeviceId;
use crate::core::unit::DegreeCelsius;

use super::{DEFAULT_TARGET_TEMPERATURE, FanMode, HvacMode, fan_mode_of, hvac_mode_of};

/// Last known state of one device. `None` means the value was never reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClimateState {
    pub available: bool,
    pub is_on: Option<bool>,
    pub hvac_mode: Option<HvacMode>,
    pub fan_mode: Option<FanMode>,
    pub target_temperature: Option<DegreeCelsius>,
    pub current_temperature: Option<DegreeCelsius>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateSnapshot {
    pub device_id: DeviceId,
    #[serde(flatten)]
    pub state: ClimateState,
}

impl ClimateState {
    pub fn from_descriptor(descriptor: &DeviceDescriptor) -> Self {
        let mut state = ClimateState {
            available: descriptor.device_online_state.is_available(),
            ..Default::default()
        };

        if let Some(props) = descriptor.properties.as_ref().filter(|p| !p.is_empty()) {
            let is_on = props.power_switch.as_deref() != Some("off");

            state.is_on = Some(is_on);
            state.target_temperature = Some(props.target_temperature.unwrap_or(DEFAULT_TARGET_TEMPERATURE));
            state.hvac_mode = Some(hvac_mode_of(props.thermostat_mode.as_deref().unwrap_or(""), is_on));
            state.fan_mode = Some(fan_mode_of(props.wind_speed.as_deref().unwrap_or("")));
        }

        state
    }

    /// Unset power counts as off.
    pub fn is_powered(&self) -> bool {
        self.is_on.unwrap_or(false)
    }

    /// Sparse merge of a state report. Only reported keys overwrite stored values; the mode is
    /// derived with the power value of this same report.
    pub fn merge(&self, props: &DeviceProperties, online_state: &OnlineState) -> ClimateState {
        let mut next = self.clone();

        if let Some(power) = &props.power_switch {
            next.is_on = Some(power == "on");
        }

        if let Some(temperature) = props.target_temperature {
            next.current_temperature = Some(temperature);
        }

        if let Some(wind_speed) = &props.wind_speed {
            next.fan_mode = Some(fan_mode_of(wind_speed));
        }

        if let Some(mode) = &props.thermostat_mode {
            next.hvac_mode = Some(hvac_mode_of(mode, next.is_powered()));
        }

        next.available = online_state.is_available();
        next
    }

    pub fn with_availability(&self, available: bool) -> ClimateState {
        ClimateState {
            available,
            ..self.clone()
        }
    }
}
