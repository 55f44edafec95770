use std::{
    error::Error,
    path::{Path, PathBuf},
};

pub const CONFIG_FILE_NAME: &str = "roomsense.toml";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    pub storage_dir: PathBuf,
    pub file_prefix: String,
    pub file_extension: String,
    pub refresh_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            topic: "living-room/sensor".to_string(),
            storage_dir: PathBuf::from("data"),
            file_prefix: "sensor_data_".to_string(),
            file_extension: ".csv".to_string(),
            refresh_interval_secs: 2,
        }
    }
}

impl Config {
    /// Loads the config from the given path, or from the first
    /// `roomsense.toml` found walking up from the current directory.
    /// Without a file the built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        if let Some(path) = path {
            return Ok(toml::from_str(&std::fs::read_to_string(path)?)?);
        }

        for path in std::env::current_dir()?
            .ancestors()
            .map(|path| path.join(CONFIG_FILE_NAME))
        {
            match std::fs::read_to_string(&path) {
                Ok(config_string) => return Ok(toml::from_str(&config_string)?),
                Err(_) => continue,
            }
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_surface() {
        let config = Config::default();
        assert_eq!(config.broker_host, "localhost");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.topic, "living-room/sensor");
        assert_eq!(config.storage_dir, PathBuf::from("data"));
        assert_eq!(config.file_prefix, "sensor_data_");
        assert_eq!(config.file_extension, ".csv");
        assert_eq!(config.refresh_interval_secs, 2);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config: Config =
            toml::from_str("broker_host = \"broker.lan\"\nrefresh_interval_secs = 5\n").unwrap();
        assert_eq!(config.broker_host, "broker.lan");
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.topic, "living-room/sensor");
    }
}
