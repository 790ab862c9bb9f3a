use infrastructure::EventBus;
use settings::Settings;
use tokio::sync::mpsc;

use crate::climate::{ClimateRunner, Registrar};

mod adapter;
mod climate;
mod core;
mod settings;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings.monitoring.init().expect("Error initializing monitoring");

    let mut mqtt_client = settings.mqtt.new_client();

    let state_reports = settings
        .uiot
        .subscribe_state_reports(&mut mqtt_client)
        .await
        .expect("Error subscribing to UIOT state reports");
    let network_reports = settings
        .uiot
        .subscribe_network_reports(&mut mqtt_client)
        .await
        .expect("Error subscribing to UIOT network reports");

    let initial_devices = settings
        .uiot
        .load_initial_devices()
        .expect("Error loading initial device list");

    let climate_events = EventBus::new(climate::announcement_capacity(initial_devices.len()));
    let (command_tx, command_rx) = mpsc::channel(64);

    let host_runner = settings
        .host
        .new_runner(&mut mqtt_client, climate_events.subscribe(), command_tx)
        .await
        .expect("Error subscribing to host commands");

    let mut registrar = Registrar::new(
        settings.uiot.new_device_control(&mqtt_client),
        settings.uiot.manufacturer.clone(),
        settings.uiot.online_report_marker.clone(),
        climate_events.emitter(),
    );

    registrar.register_initial(&initial_devices);

    let climate_runner = ClimateRunner::new(registrar, state_reports, network_reports, command_rx);

    tracing::info!("Starting main loop");

    tokio::select!(
        _ = mqtt_client.run() => {},
        _ = climate_runner.run() => {},
        _ = host_runner.run() => {},
    );
}
