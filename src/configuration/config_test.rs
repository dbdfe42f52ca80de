use std::env;
use std::fs;
use std::path;

use anyhow::Result;
use uuid::Uuid;

use super::Config;
use super::ConfigKey;
use super::TEST_LOCK;
use crate::application::cli;

fn write_config(contents: &str) -> Result<path::PathBuf> {
    let config_path = env::temp_dir().join(format!("natter-config-{}.toml", Uuid::new_v4()));
    fs::write(&config_path, contents)?;
    return Ok(config_path);
}

async fn load_from(config_path: &path::Path, extra_args: Vec<&str>) -> Result<()> {
    let mut args = vec!["natter", "-c", config_path.to_str().unwrap_or_default()];
    args.extend(extra_args);

    let matches = cli::build().try_get_matches_from(args)?;
    return Config::load(cli::build(), vec![&matches]).await;
}

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>().unwrap();

    assert_eq!(doc["api-url"].as_str(), Some("http://localhost:7860"));
    assert_eq!(doc["backend-health-check-timeout"].as_integer(), Some(1000));
    assert_eq!(doc["speech-rate"].as_float(), Some(0.9));
    assert_eq!(doc["theme"].as_str(), Some("base16-ocean.dark"));
    assert!(doc.get("config-file").is_none());
    assert!(doc.get("username").is_none());
    assert!(res.contains("# dictation-command = \"\""));
    assert!(res.contains("[possible values: say, espeak, none]"));
}

#[tokio::test]
async fn it_round_trips_the_default_config() -> Result<()> {
    let _lock = TEST_LOCK.lock().await;
    let config_path = write_config(&Config::serialize_default(cli::build()))?;

    load_from(&config_path, vec![]).await?;
    fs::remove_file(&config_path)?;

    for key in [
        ConfigKey::ApiURL,
        ConfigKey::BackendHealthCheckTimeout,
        ConfigKey::Speech,
        ConfigKey::SpeechRate,
        ConfigKey::Theme,
        ConfigKey::Voice,
    ] {
        assert_eq!(Config::get(key), Config::default(key), "{key}");
    }

    return Ok(());
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let _lock = TEST_LOCK.lock().await;
    let config_path = write_config(
        r#"
api-url = "http://chatbot.local:9000"
speech = "none"
speech-rate = 1.25
dictation-command = "whisper-dictate"
"#,
    )?;

    load_from(&config_path, vec![]).await?;
    fs::remove_file(&config_path)?;

    assert_eq!(Config::get(ConfigKey::ApiURL), "http://chatbot.local:9000");
    assert_eq!(Config::get(ConfigKey::Speech), "none");
    assert_eq!(Config::get(ConfigKey::SpeechRate), "1.25");
    assert_eq!(Config::speech_rate(), 1.25);
    assert_eq!(Config::get(ConfigKey::DictationCommand), "whisper-dictate");
    assert_eq!(Config::get(ConfigKey::BackendHealthCheckTimeout), "1000");

    return Ok(());
}

#[tokio::test]
async fn it_prefers_args_over_the_config_file() -> Result<()> {
    let _lock = TEST_LOCK.lock().await;
    let config_path = write_config("api-url = \"http://from-file:1\"\n")?;

    load_from(&config_path, vec!["--api-url", "http://from-args:2"]).await?;
    fs::remove_file(&config_path)?;

    assert_eq!(Config::get(ConfigKey::ApiURL), "http://from-args:2");

    return Ok(());
}

#[tokio::test]
async fn it_fails_to_load_invalid_values() -> Result<()> {
    let _lock = TEST_LOCK.lock().await;
    let config_path = write_config("speech = \"festival\"\n")?;

    let res = load_from(&config_path, vec![]).await;
    fs::remove_file(&config_path)?;

    assert!(res.is_err());
    assert!(res
        .unwrap_err()
        .to_string()
        .contains("invalid value for key 'speech'"));

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_on_bad_speech_rates() {
    let _lock = TEST_LOCK.lock().await;

    Config::set(ConfigKey::SpeechRate, "fast");
    assert_eq!(Config::speech_rate(), 0.9);

    Config::set(ConfigKey::SpeechRate, "-1");
    assert_eq!(Config::speech_rate(), 0.9);

    Config::set(ConfigKey::SpeechRate, "0.9");
}
