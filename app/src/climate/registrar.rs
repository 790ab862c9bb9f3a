use std::collections::HashMap;

use infrastructure::{EventEmitter, MqttInMessage};

use crate::adapter::uiot::{DeviceDescriptor, UiotMessage, parse_descriptor_list};
use crate::core::id::DeviceId;

use super::{ClimateCommand, ClimateEntity, ClimateEvent, DeviceControl};

/// Keeps one entity per climate device id and routes notifications and commands to it.
pub struct Registrar<C: DeviceControl + Clone> {
    entities: HashMap<DeviceId, ClimateEntity<C>>,
    control: C,
    manufacturer: String,
    online_report_marker: String,
    events: EventEmitter<ClimateEvent>,
}

impl<C: DeviceControl + Clone> Registrar<C> {
    pub fn new(
        control: C,
        manufacturer: impl Into<String>,
        online_report_marker: impl Into<String>,
        events: EventEmitter<ClimateEvent>,
    ) -> Self {
        Self {
            entities: HashMap::new(),
            control,
            manufacturer: manufacturer.into(),
            online_report_marker: online_report_marker.into(),
            events,
        }
    }

    pub fn contains(&self, device_id: &DeviceId) -> bool {
        self.entities.contains_key(device_id)
    }

    #[cfg(test)]
    pub fn get(&self, device_id: &DeviceId) -> Option<&ClimateEntity<C>> {
        self.entities.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registers the climate devices known at startup.
    pub fn register_initial(&mut self, descriptors: &[DeviceDescriptor]) -> Vec<DeviceId> {
        let added = self.register(descriptors);
        tracing::info!("Registered {} climate devices at startup", added.len());
        added
    }

    /// Registers every climate device not seen before and announces it to the host.
    /// Returns the ids of the newly registered devices.
    fn register(&mut self, descriptors: &[DeviceDescriptor]) -> Vec<DeviceId> {
        let mut added = vec![];

        for descriptor in descriptors.iter().filter(|d| d.is_climate()) {
            if self.contains(&descriptor.device_id) {
                tracing::debug!("Climate device {} already registered", descriptor.device_id);
                continue;
            }

            let entity = ClimateEntity::new(descriptor, &self.manufacturer, self.control.clone(), self.events.clone());

            tracing::info!("Registering climate device {} ({})", descriptor.device_id, descriptor.device_name);

            self.events.send(ClimateEvent::Registered(entity.info().clone()));
            self.events.send(ClimateEvent::StateChanged(entity.snapshot()));

            added.push(descriptor.device_id.clone());
            self.entities.insert(descriptor.device_id.clone(), entity);
        }

        added
    }

    pub fn handle_network_report(&mut self, msg: &MqttInMessage) -> Vec<DeviceId> {
        let descriptors = match parse_descriptor_list(&msg.payload) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                tracing::error!("Error processing device list update on {}: {:?}", msg.topic, e);
                return vec![];
            }
        };

        let added = self.register(&descriptors);
        if !added.is_empty() {
            tracing::info!("Added {} climate devices from device list update", added.len());
        }

        added
    }

    /// Parses a state-report channel message once and hands it to the entities it concerns.
    /// Returns the number of entities that updated their state.
    pub fn handle_state_message(&mut self, msg: &MqttInMessage) -> usize {
        let parsed = match UiotMessage::parse(&msg.topic, &msg.payload, &self.online_report_marker) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Error parsing UIOT message on {}: {:?}", msg.topic, e);
                return 0;
            }
        };

        match &parsed {
            UiotMessage::OnlineReport(_) => self
                .entities
                .values_mut()
                .map(|entity| entity.apply(&parsed))
                .filter(|updated| *updated)
                .count(),

            UiotMessage::StateReport(report) => {
                let entity = report.device_id.as_ref().and_then(|id| self.entities.get_mut(id));

                match entity {
                    Some(entity) => usize::from(entity.apply(&parsed)),
                    None => 0,
                }
            }
        }
    }

    pub async fn handle_command(&mut self, device_id: &DeviceId, command: ClimateCommand) {
        match self.entities.get_mut(device_id) {
            Some(entity) => {
                tracing::debug!("Executing {:?} on {}", command, device_id);
                entity.execute(command).await
            }
            None => tracing::warn!("Received {:?} for unknown climate device {}", command, device_id),
        }
    }
}
