use std::{process, thread, time::Duration};

use rand::Rng;
use roomsense_core::{config::Config, now_timestamp};
use rumqttc::{Client, MqttOptions, QoS};

/// Publishes a synthetic smart-home reading every second so the dashboard
/// can be exercised without any sensor hardware on the topic.
fn main() {
    pretty_env_logger::init();

    let config = Config::load(None).unwrap_or_else(|err| {
        eprintln!("Error loading the configuration: {err:?}");
        process::exit(1);
    });

    let mut mqttoptions = match std::env::var("MQTT") {
        Ok(url) => MqttOptions::parse_url(url).unwrap_or_else(|err| {
            eprintln!("Error parsing the MQTT url: {err:?}");
            process::exit(1);
        }),
        Err(_) => MqttOptions::new("roomsense-fake-sensor", &config.broker_host, config.broker_port),
    };
    mqttoptions.set_keep_alive(Duration::from_secs(20));

    let (mut client, mut connection) = Client::new(mqttoptions, 10);

    // Drive the network loop; acks and connection errors surface here.
    thread::spawn(move || loop {
        for event in connection.iter() {
            if let Err(e) = event {
                log::error!("Mqtt connection error: {e}");
                thread::sleep(Duration::from_secs(1));
            }
        }
    });

    let mut rng = rand::thread_rng();
    let mut temperature: f64 = 24.0;
    let mut humidity: f64 = 55.0;
    let mut light_on = false;

    log::info!("Publishing fake readings to '{}'", config.topic);

    loop {
        temperature = (temperature + rng.gen_range(-0.4..0.4)).clamp(15.0, 35.0);
        humidity = (humidity + rng.gen_range(-1.0..1.0)).clamp(20.0, 90.0);
        if rng.gen_bool(0.05) {
            light_on = !light_on;
        }

        let payload = serde_json::json!({
            "timestamp": now_timestamp(),
            "light_status": if light_on { "on" } else { "off" },
            "temperature": (temperature * 10.0).round() / 10.0,
            "humidity": (humidity * 10.0).round() / 10.0,
        });

        match client.publish(config.topic.as_str(), QoS::AtLeastOnce, false, payload.to_string()) {
            Ok(()) => log::debug!("Published {payload}"),
            Err(e) => log::error!("Error sending message: {e}"),
        }

        thread::sleep(Duration::from_secs(1));
    }
}
