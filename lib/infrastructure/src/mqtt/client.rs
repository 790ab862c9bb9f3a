use std::sync::Arc;

use rumqttc::v5::{
    AsyncClient, EventLoop, MqttOptions,
    mqttbytes::{
        QoS,
        v5::{ConnectProperties, SubscribeProperties},
    },
};

use rumqttc::v5::Event::Incoming;
use tokio::sync::mpsc;

use super::*;

pub struct Mqtt {
    client: Arc<AsyncClient>,
    event_loop: EventLoop,
    subscriptions: Vec<MqttSubscriptionHandle>,
}

struct MqttSubscriptionHandle {
    filter: String,
    txs: Vec<mpsc::Sender<MqttInMessage>>,
}

impl Mqtt {
    pub fn connect(config: &MqttConfig) -> Self {
        let mut mqttoptions = MqttOptions::new(&config.client_id, &config.host, config.port);
        mqttoptions.set_keep_alive(::std::time::Duration::from_secs(config.keep_alive_secs));
        mqttoptions.set_clean_start(false);

        let mut connect_props = ConnectProperties::new();
        connect_props.session_expiry_interval = config.session_expiry_secs.into();
        connect_props.max_packet_size = Some(1024 * 1024);
        mqttoptions.set_connect_properties(connect_props);

        let (client, event_loop) = AsyncClient::new(mqttoptions, 10);

        Mqtt {
            client: Arc::new(client),
            event_loop,
            subscriptions: vec![],
        }
    }

    pub async fn subscribe(&mut self, topic: impl Into<String>) -> anyhow::Result<MqttSubscription> {
        self.subscribe_all(&[topic.into()]).await
    }

    /// All filters share one receiving channel, so a message is delivered once per matching filter.
    /// Incoming messages are routed by the subscription identifier the broker attaches.
    pub async fn subscribe_all(&mut self, filters: &[String]) -> anyhow::Result<MqttSubscription> {
        let (tx, rx) = mpsc::channel::<MqttInMessage>(32);

        for filter in filters {
            if let Some(subscription) = self.subscriptions.iter_mut().find(|s| s.filter == *filter) {
                tracing::info!("Adding receiver to existing subscription: {:?}", &filter);

                subscription.txs.push(tx.clone());
                continue;
            };

            tracing::info!("Creating new subscription for topic filter: {:?}", &filter);

            self.subscriptions.push(MqttSubscriptionHandle {
                filter: filter.clone(),
                txs: vec![tx.clone()],
            });

            self.client
                .subscribe_with_properties(
                    filter,
                    QoS::AtLeastOnce,
                    SubscribeProperties {
                        id: Some(self.subscriptions.len()), //must be > 0
                        user_properties: vec![],
                    },
                )
                .await?;
        }

        Ok(MqttSubscription::new(rx))
    }

    pub fn sender(&self) -> MqttSender {
        MqttSender::new(self.client.clone())
    }

    pub async fn run(mut self) {
        loop {
            match self.event_loop.poll().await {
                Ok(Incoming(rumqttc::v5::mqttbytes::v5::Packet::Publish(publish))) => {
                    self.handle_publish(publish).await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("MQTT error: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn handle_publish(&self, msg: rumqttc::v5::mqttbytes::v5::Publish) {
        let mqtt_in_message: MqttInMessage = match (&msg).try_into() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("Error parsing MQTT message: {}", e);
                return;
            }
        };

        tracing::trace!("Received MQTT message on topic {}", mqtt_in_message.topic);

        let subscription_ids = match msg.properties {
            Some(p) => p.subscription_identifiers,
            None => {
                tracing::error!("No subscription identifiers in MQTT message on {}", mqtt_in_message.topic);
                return;
            }
        };

        self.forward(&mqtt_in_message, subscription_ids).await;
    }

    async fn forward(&self, msg: &MqttInMessage, subscription_ids: Vec<usize>) {
        for id in subscription_ids {
            let Some(sub) = id.checked_sub(1).and_then(|index| self.subscriptions.get(index)) else {
                tracing::error!("No subscription for id: {}", id);
                continue;
            };

            for tx in sub.txs.iter() {
                if let Err(e) = tx
                    .send_timeout(msg.clone(), tokio::time::Duration::from_secs(5))
                    .await
                {
                    tracing::error!("Failed to forward MQTT message to subscriber {}: {}", sub.filter, e);
                }
            }
        }
    }
}
