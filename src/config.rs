use serde::{Deserialize, Serialize, Serializer};
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::constants::{DEFAULT_PORT, SITE_DIR};
use crate::errors::ConfigError;
use crate::settings::SettingsInput;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IpArray(pub [u8; 4]);

impl IpArray {
    pub fn parse(host: &str) -> Result<Self, ConfigError> {
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => Ok(IpArray(v4.octets())),
            _ => Err(ConfigError::InvalidHost {
                host: host.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for IpArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl<'de> Deserialize<'de> for IpArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ip_str = String::deserialize(deserializer)?;
        let ip: IpAddr = ip_str.parse().map_err(serde::de::Error::custom)?;

        match ip {
            IpAddr::V4(v4) => Ok(IpArray(v4.octets())),
            IpAddr::V6(_) => Err(serde::de::Error::custom("IPv6 addresses are not supported")),
        }
    }
}

impl Serialize for IpArray {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ip = std::net::Ipv4Addr::from(self.0);
        serializer.serialize_str(&ip.to_string())
    }
}

/// Application configuration.
///
/// Layered, lowest priority first: built-in defaults, `READTIME_*`
/// environment variables, then `<root>/.readtime/config.toml`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub host: IpArray,
    pub port: u16,
    /// File extensions treated as content items.
    pub content_extensions: Vec<String>,
    /// Where edited settings are saved. Relative paths are under `root_dir`.
    pub settings_file: PathBuf,
    /// Settings used until some are saved, and for any field a save leaves out.
    #[serde(default)]
    pub reading: SettingsInput,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            host: IpArray([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            content_extensions: ["md", "markdown", "html"]
                .into_iter()
                .map(|x| x.to_string())
                .collect(),
            settings_file: PathBuf::from(SITE_DIR).join("settings.json"),
            reading: SettingsInput::default(),
        }
    }
}

impl Config {
    pub fn read(search_config_from: &Path) -> Result<Self, ConfigError> {
        let root_dir = Self::find_root_dir(search_config_from);
        let mut config = Self::figment(&root_dir).extract::<Config>()?;
        tracing::debug!("Loaded config: {:?}", &config);
        config.root_dir = root_dir;
        config.validate()?;
        Ok(config)
    }

    fn figment(root_dir: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("READTIME_"))
            .merge(Toml::file(root_dir.join(SITE_DIR).join("config.toml")))
    }

    /// Validates the configuration values.
    ///
    /// Only server settings are checked here. Reading settings are never
    /// rejected; they are normalized when resolved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Port 0 means "let OS pick a port" which isn't useful for a server URL
        if self.port == 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }
        Ok(())
    }

    pub fn settings_path(&self) -> PathBuf {
        if self.settings_file.is_absolute() {
            self.settings_file.clone()
        } else {
            self.root_dir.join(&self.settings_file)
        }
    }

    fn find_root_dir(start_dir: &Path) -> PathBuf {
        const DIR_MARKERS: &[&str] = &[SITE_DIR, ".git"];

        for marker in DIR_MARKERS {
            if let Some(root) = Self::search_folder_in_ancestors(start_dir, marker) {
                return root;
            }
        }

        let dir = if start_dir.is_dir() {
            Some(start_dir)
        } else {
            start_dir.parent()
        };
        dir.unwrap_or(start_dir).to_path_buf()
    }

    fn search_folder_in_ancestors<P: AsRef<Path>>(
        start_path: &Path,
        search_folder: P,
    ) -> Option<PathBuf> {
        let search_folder = search_folder.as_ref();
        let dir = if start_path.is_dir() {
            start_path
        } else {
            start_path.parent()?
        };
        // ancestors() yields `dir`, then its parent, then its parent, … until root.
        dir.ancestors()
            .map(|ancestor| ancestor.join(search_folder))
            .find(|candidate| candidate.as_path().is_dir())
            .and_then(|marker_dir| marker_dir.parent().map(|p| p.to_path_buf()))
    }
}
