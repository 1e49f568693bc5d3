use std::{fs, path::Path};

use serde::Deserialize;

use crate::Result;

pub const DEFAULT_MESSAGES_URL: &str = "https://api.nexmo.com/v0.1/messages";
pub const DEFAULT_MOBILEX_AUTH_URL: &str = "https://api.mobilex.tech/api/external/auth";
pub const DEFAULT_MOBILEX_PUSH_URL: &str = "https://api.mobilex.tech/api/manager/messenger/message";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// number of async worker threads, range [1, 32768), defaults to 4
    pub async_worker_thread_number: u16,
    /// delay before a terminal node status is cleared, in milliseconds
    pub status_clear_delay_ms: u64,
    /// whatsapp-style messaging endpoint
    pub whatsapp: WhatsappConfig,
    /// mobilex push endpoints
    pub mobilex: MobilexConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhatsappConfig {
    pub messages_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MobilexConfig {
    pub auth_url: String,
    pub push_url: String,
    /// json shape of `targets.addressState` in the push body
    pub address_state: AddressStateShape,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AddressStateShape {
    #[default]
    List,
    Object,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            async_worker_thread_number: 4,
            status_clear_delay_ms: 7000,
            whatsapp: WhatsappConfig::default(),
            mobilex: MobilexConfig::default(),
        }
    }
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            messages_url: DEFAULT_MESSAGES_URL.to_string(),
        }
    }
}

impl Default for MobilexConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_MOBILEX_AUTH_URL.to_string(),
            push_url: DEFAULT_MOBILEX_PUSH_URL.to_string(),
            address_state: AddressStateShape::default(),
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}
