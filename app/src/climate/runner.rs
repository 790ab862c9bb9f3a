use infrastructure::MqttSubscription;
use tokio::sync::mpsc;

use super::{CommandRequest, DeviceControl, Registrar};

/// Single owner of all climate entities. Vendor notifications and host commands are
/// processed one at a time, so entity state needs no locking.
pub struct ClimateRunner<C: DeviceControl + Clone> {
    registrar: Registrar<C>,
    state_reports: MqttSubscription,
    network_reports: MqttSubscription,
    commands: mpsc::Receiver<CommandRequest>,
}

impl<C: DeviceControl + Clone> ClimateRunner<C> {
    pub fn new(
        registrar: Registrar<C>,
        state_reports: MqttSubscription,
        network_reports: MqttSubscription,
        commands: mpsc::Receiver<CommandRequest>,
    ) -> Self {
        Self {
            registrar,
            state_reports,
            network_reports,
            commands,
        }
    }

    pub async fn run(mut self) {
        if self.registrar.is_empty() {
            tracing::info!("Climate runner started without devices, waiting for network reports");
        } else {
            tracing::info!("Climate runner started with {} devices", self.registrar.len());
        }

        loop {
            tokio::select! {
                Some(msg) = self.state_reports.recv() => {
                    self.registrar.handle_state_message(&msg);
                }

                Some(msg) = self.network_reports.recv() => {
                    self.registrar.handle_network_report(&msg);
                }

                Some(request) = self.commands.recv() => {
                    self.registrar.handle_command(&request.device_id, request.command).await;
                }

                else => break,
            }
        }

        tracing::warn!("Climate runner stopped, all input channels closed");
    }
}
