use std::{error::Error, sync::Arc, time::Duration};

use roomsense_core::config::Config;
use rumqttc::MqttOptions;

use crate::{ingest::IngestService, store::PartitionStore};

mod history;
mod ingest;
mod render;
mod store;

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let config = Config::load(None)?;
    log::info!(
        "Storing readings under '{}'",
        config.storage_dir.display()
    );

    // The `MQTT` environment variable takes a full broker url and overrides
    // the configured host and port.
    let mut mqttoptions = match std::env::var("MQTT") {
        Ok(url) => MqttOptions::parse_url(url)?,
        Err(_) => MqttOptions::new("roomsense-dashboard", &config.broker_host, config.broker_port),
    };
    mqttoptions.set_keep_alive(Duration::from_secs(5));

    let store = Arc::new(PartitionStore::new(
        config.storage_dir.clone(),
        config.file_prefix.clone(),
        config.file_extension.clone(),
    ));
    let ingest = Arc::new(IngestService::new(mqttoptions, config.topic.clone()));
    ingest.start(Arc::clone(&store));

    render::run(
        ingest,
        store,
        Duration::from_secs(config.refresh_interval_secs),
    )
}
