use config::{Config, ConfigError};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub base_url: String,
    pub output_directory: String,
    pub concurrency: usize,
    pub floor: u32,
    pub timeout_seconds: u64,
}

impl Settings {
    /// Built-in defaults, overridden by the config file when one exists.
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("base_url", "https://xkcd.com/")?
            .set_default("output_directory", "comics")?
            .set_default("concurrency", 5)?
            .set_default("floor", 0)?
            .set_default("timeout_seconds", 30)?
            .add_source(config::File::with_name(config_file).required(false))
            .build()?;
        builder.try_deserialize()
    }
}
