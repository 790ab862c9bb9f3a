use std::sync::{Arc, Mutex};

use infrastructure::{EventBus, EventListener};
use serde_json::Value;

use crate::adapter::uiot::DeviceDescriptor;
use crate::core::id::DeviceId;

use super::{ClimateEvent, DeviceControl};

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCall {
    SendProperties(DeviceId, Value),
    PowerOn(DeviceId),
    PowerOff(DeviceId),
}

#[derive(Clone, Default)]
pub struct RecordingControl {
    calls: Arc<Mutex<Vec<ControlCall>>>,
    failing: bool,
}

impl RecordingControl {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ControlCall) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            anyhow::bail!("device cloud unreachable");
        }
        Ok(())
    }
}

impl DeviceControl for RecordingControl {
    async fn send_properties(&self, device_id: &DeviceId, properties: Value) -> anyhow::Result<()> {
        self.record(ControlCall::SendProperties(device_id.clone(), properties))
    }

    async fn power_on(&self, device_id: &DeviceId) -> anyhow::Result<()> {
        self.record(ControlCall::PowerOn(device_id.clone()))
    }

    async fn power_off(&self, device_id: &DeviceId) -> anyhow::Result<()> {
        self.record(ControlCall::PowerOff(device_id.clone()))
    }
}

pub fn descriptor(value: Value) -> DeviceDescriptor {
    serde_json::from_value(value).unwrap()
}

pub fn announcements() -> (EventBus<ClimateEvent>, EventListener<ClimateEvent>) {
    let bus = EventBus::new(64);
    let listener = bus.subscribe();
    (bus, listener)
}

pub fn drain(listener: &mut EventListener<ClimateEvent>) -> Vec<ClimateEvent> {
    let mut events = vec![];
    while let Some(event) = listener.try_recv() {
        events.push(event);
    }
    events
}
