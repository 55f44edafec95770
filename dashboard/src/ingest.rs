use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use roomsense_core::{payload, Reading};
use rumqttc::{Client, Connection, Event, Incoming, MqttOptions, QoS};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::store::PartitionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Subscribed,
}

/// Process-wide ingestion service. Constructed once in `main` and shared by
/// handle; `start` is idempotent so the render loop may call it every cycle.
///
/// The transport loop runs on its own thread and talks to the renderer only
/// through the latest-reading slot (last write wins) and the delivery queue
/// (FIFO, popped without blocking).
pub struct IngestService {
    options: MqttOptions,
    topic: String,
    state: Mutex<LinkState>,
    started: AtomicBool,
    latest: Mutex<Option<Reading>>,
    queue_tx: UnboundedSender<Reading>,
    queue_rx: Mutex<UnboundedReceiver<Reading>>,
}

impl IngestService {
    pub fn new(options: MqttOptions, topic: String) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        Self {
            options,
            topic,
            state: Mutex::new(LinkState::Disconnected),
            started: AtomicBool::new(false),
            latest: Mutex::new(None),
            queue_tx,
            queue_rx: Mutex::new(queue_rx),
        }
    }

    /// Spawns the transport thread on the first call; later calls are no-ops.
    pub fn start(self: &Arc<Self>, store: Arc<PartitionStore>) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        log::info!(
            "Connecting to the MQTT broker at '{}:{}'...",
            self.options.broker_address().0,
            self.options.broker_address().1
        );
        self.set_state(LinkState::Connecting);

        let (client, connection) = Client::new(self.options.clone(), 16);
        let service = Arc::clone(self);
        thread::spawn(move || service.network_loop(client, connection, store));
    }

    fn network_loop(&self, mut client: Client, mut connection: Connection, store: Arc<PartitionStore>) {
        loop {
            for event in connection.iter() {
                match event {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                        log::info!("Connected, subscribing to '{}'", self.topic);
                        self.set_state(LinkState::Connected);
                        // Subscribing here instead of once at startup keeps
                        // the subscription alive across reconnects.
                        if let Err(e) = client.subscribe(self.topic.as_str(), QoS::AtLeastOnce) {
                            log::error!("Could not subscribe: {e}");
                        }
                    }
                    Ok(Event::Incoming(Incoming::SubAck(_))) => {
                        log::info!("Subscribed to '{}'", self.topic);
                        self.set_state(LinkState::Subscribed);
                    }
                    Ok(Event::Incoming(Incoming::Publish(message))) => {
                        self.handle_payload(&message.payload, &store);
                    }
                    Ok(x) => {
                        log::trace!("{x:?}");
                    }
                    Err(e) => {
                        log::error!("Mqtt connection error: {e}");
                        self.set_state(LinkState::Disconnected);
                        // The client retries on its own as iteration
                        // continues; just pace the attempts.
                        thread::sleep(Duration::from_secs(1));
                    }
                }
            }
        }
    }

    fn handle_payload(&self, payload: &[u8], store: &PartitionStore) {
        match payload::decode(payload) {
            Ok(reading) => {
                log::debug!(
                    "Received reading: temperature={} humidity={} light={}",
                    reading.temperature,
                    reading.humidity,
                    reading.light_status
                );

                *self.latest.lock().unwrap() = Some(reading.clone());
                let _ = self.queue_tx.send(reading.clone());
                store.append(&reading);
            }
            Err(e) => {
                log::error!("Error decoding reading: {e}");
            }
        }
    }

    pub fn latest(&self) -> Option<Reading> {
        self.latest.lock().unwrap().clone()
    }

    /// Non-blocking pop of the oldest queued reading.
    pub fn pop_queued(&self) -> Option<Reading> {
        self.queue_rx.lock().unwrap().try_recv().ok()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), LinkState::Connected | LinkState::Subscribed)
    }

    pub fn state(&self) -> LinkState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: LinkState) {
        *self.state.lock().unwrap() = state;
    }
}
