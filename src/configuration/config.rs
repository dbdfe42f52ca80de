#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::SpeechName;
use crate::domain::services::DEFAULT_THEME;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

/// Held by tests that load or override config values.
#[cfg(test)]
pub static TEST_LOCK: Lazy<tokio::sync::Mutex<()>> =
    Lazy::new(|| return tokio::sync::Mutex::new(()));

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    #[strum(serialize = "api-url")]
    ApiURL,
    BackendHealthCheckTimeout,
    ConfigFile,
    DictationCommand,
    Speech,
    SpeechRate,
    Theme,
    Username,
    Voice,
}

pub struct Config {}

fn default_config_path() -> path::PathBuf {
    #[cfg(not(target_os = "macos"))]
    let config_dir = dirs::config_dir();
    #[cfg(target_os = "macos")]
    let config_dir = dirs::home_dir().map(|e| return e.join(".config"));

    return config_dir
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("natter/config.toml");
}

fn default_username() -> String {
    let user = env::var("USER").unwrap_or_default();
    if user.is_empty() {
        return "User".to_string();
    }

    return user;
}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        return match key {
            ConfigKey::ApiURL => "http://localhost:7860".to_string(),
            ConfigKey::BackendHealthCheckTimeout => "1000".to_string(),
            ConfigKey::ConfigFile => default_config_path().to_string_lossy().to_string(),
            ConfigKey::DictationCommand => "".to_string(),
            ConfigKey::Speech => SpeechName::platform_default().to_string(),
            ConfigKey::SpeechRate => "0.9".to_string(),
            ConfigKey::Theme => DEFAULT_THEME.to_string(),
            ConfigKey::Username => default_username(),
            ConfigKey::Voice => "".to_string(),
        };
    }

    /// Parses `speech-rate`, falling back to the default for values that
    /// aren't a positive number.
    pub fn speech_rate() -> f32 {
        let fallback = Config::default(ConfigKey::SpeechRate)
            .parse::<f32>()
            .unwrap_or(1.0);

        return match Config::get(ConfigKey::SpeechRate).parse::<f32>() {
            Ok(rate) if rate > 0.0 => rate,
            _ => fallback,
        };
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                let key_str = key.to_string();
                let val = match doc.get(&key_str) {
                    Some(val) => val,
                    None => continue,
                };

                // Use clap value parsers to do validation.
                let possible_values = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key_str.as_str()))
                    .map(|arg| {
                        return arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    })
                    .unwrap_or_default();

                if let Some(val_int) = val.as_integer() {
                    Config::set(key, &val_int.to_string());
                } else if let Some(val_float) = val.as_float() {
                    Config::set(key, &val_float.to_string());
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if !possible_values.is_empty()
                        && !possible_values.contains(&val_str.to_string())
                    {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                    }
                    Config::set(key, val_str);
                } else {
                    bail!(format!("config.toml has an invalid type for key '{key}'"));
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiURL),
            username = Config::get(ConfigKey::Username),
            speech = Config::get(ConfigKey::Speech),
            speech_rate = Config::get(ConfigKey::SpeechRate),
            voice = Config::get(ConfigKey::Voice),
            theme = Config::get(ConfigKey::Theme),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::Username {
                    return Some(
                        "# Your user name displayed in chat bubbles.\n# username = \"\""
                            .to_string(),
                    );
                }

                let key_str = key.to_string();
                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key_str.as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|e| return e.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<f64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
