pub mod config;
pub mod payload;

/// Timestamp format shared by the wire payload and the partition files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One normalized sensor reading. Field order is the partition column order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reading {
    pub timestamp: String,
    pub light_status: String,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    On,
    Off,
    Unrecognized,
}

impl Reading {
    pub fn light_state(&self) -> LightState {
        match self.light_status.as_str() {
            "on" => LightState::On,
            "off" => LightState::Off,
            _ => LightState::Unrecognized,
        }
    }
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading_with_light(light_status: &str) -> Reading {
        Reading {
            timestamp: "2026-08-07 12:00:00".to_string(),
            light_status: light_status.to_string(),
            temperature: 23.5,
            humidity: 55.0,
        }
    }

    #[test]
    fn light_state_classification() {
        assert_eq!(reading_with_light("on").light_state(), LightState::On);
        assert_eq!(reading_with_light("off").light_state(), LightState::Off);
        assert_eq!(reading_with_light("開").light_state(), LightState::Unrecognized);
        assert_eq!(reading_with_light("unknown").light_state(), LightState::Unrecognized);
    }

    #[test]
    fn now_timestamp_is_canonical() {
        let timestamp = now_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).is_ok());
    }
}
