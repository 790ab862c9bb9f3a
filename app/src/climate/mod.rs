mod entity;
mod mode;
mod registrar;
mod runner;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use entity::{ClimateEntity, ClimateEntityInfo};
pub use mode::{FanMode, HvacMode, fan_mode_of, hvac_mode_of};
pub use registrar::Registrar;
pub use runner::ClimateRunner;
pub use state::{ClimateSnapshot, ClimateState};

use crate::core::id::DeviceId;
use crate::core::unit::DegreeCelsius;

pub const MIN_TEMPERATURE: DegreeCelsius = DegreeCelsius(16.0);
pub const MAX_TEMPERATURE: DegreeCelsius = DegreeCelsius(32.0);
pub const TEMPERATURE_STEP: f64 = 1.0;
pub const DEFAULT_TARGET_TEMPERATURE: DegreeCelsius = DegreeCelsius(22.0);

const ANNOUNCEMENT_HEADROOM: usize = 512;

/// Capacity of the announcement bus. Startup registration emits two events per device before
/// the host runner starts consuming, so the buffer must hold all of them.
pub fn announcement_capacity(initial_devices: usize) -> usize {
    initial_devices * 2 + ANNOUNCEMENT_HEADROOM
}

/// Outbound side of the vendor cloud. Implementations are fire-and-forget: no retries and
/// no waiting for the device to confirm.
pub trait DeviceControl {
    async fn send_properties(&self, device_id: &DeviceId, properties: serde_json::Value) -> anyhow::Result<()>;
    async fn power_on(&self, device_id: &DeviceId) -> anyhow::Result<()>;
    async fn power_off(&self, device_id: &DeviceId) -> anyhow::Result<()>;
}

/// Announcements to the host.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum ClimateEvent {
    Registered(ClimateEntityInfo),
    StateChanged(ClimateSnapshot),
}

/// Operations the host can invoke on an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ClimateCommand {
    SetHvacMode(HvacMode),
    SetTemperature(DegreeCelsius),
    SetFanMode(FanMode),
    TurnOn,
    TurnOff,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub device_id: DeviceId,
    pub command: ClimateCommand,
}
