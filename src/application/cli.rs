use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use dialoguer::Select;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::SessionName;
use crate::domain::models::SpeechName;
use crate::domain::services::actions::help_text;
use crate::domain::services::Themes;
use crate::domain::services::DEFAULT_CLEANUP_DAYS;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::speech::SpeechManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

pub fn log_path() -> path::PathBuf {
    if let Ok(log_dir) = std::env::var("NATTER_LOG_DIR") {
        return path::PathBuf::from(log_dir).join("debug.log");
    }

    return dirs::cache_dir()
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("natter/debug.log");
}

fn format_session(idx: usize, session: &SessionName) -> String {
    let mut res = format!("{}. {} (ID: {})", idx + 1, session.chat_name, session.session_id);
    if let Some(created_at) = &session.created_at {
        res = format!("{res}, {created_at}");
    }

    return res;
}

async fn print_sessions_list() -> Result<()> {
    let sessions = BackendManager::get().session_names().await?;
    if sessions.is_empty() {
        println!("There are no sessions yet. You should start your first chat!");
        return Ok(());
    }

    let lines = sessions
        .iter()
        .enumerate()
        .map(|(idx, session)| return format_session(idx, session))
        .collect::<Vec<String>>();
    println!("{}", lines.join("\n"));

    return Ok(());
}

async fn print_session_stats() -> Result<()> {
    let stats = BackendManager::get().session_stats().await?;
    println!("{}", stats.format());
    return Ok(());
}

async fn select_session_interactive() -> Result<Option<String>> {
    let sessions = BackendManager::get().session_names().await?;
    if sessions.is_empty() {
        println!("There are no sessions yet. You should start your first chat!");
        return Ok(None);
    }

    let session_options = sessions
        .iter()
        .enumerate()
        .map(|(idx, session)| return format_session(idx, session))
        .collect::<Vec<String>>();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which session would you like to read?")
        .default(0)
        .items(&session_options)
        .interact_opt()?;

    return Ok(idx.map(|idx| return sessions[idx].session_id.to_string()));
}

async fn print_session_history(session_id: Option<&String>) -> Result<()> {
    let session_id = match session_id {
        Some(session_id) => session_id.to_string(),
        None => match select_session_interactive().await? {
            Some(session_id) => session_id,
            None => return Ok(()),
        },
    };

    let entries = BackendManager::get().history(&session_id).await?;
    if entries.is_empty() {
        println!("No messages found.");
        return Ok(());
    }

    let lines = entries
        .iter()
        .map(|entry| return format!("{}: {}", entry.label(), entry.text))
        .collect::<Vec<String>>();
    println!("{}", lines.join("\n"));

    return Ok(());
}

fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }

    let res = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact_opt()?;

    return Ok(res.unwrap_or(false));
}

async fn delete_session(session_id: &str, skip_confirm: bool) -> Result<()> {
    if !confirm(
        &format!("Delete session {session_id}? This action cannot be undone."),
        skip_confirm,
    )? {
        println!("Cancelled.");
        return Ok(());
    }

    BackendManager::get().delete_session(session_id).await?;
    println!("Deleted session {session_id}");
    return Ok(());
}

async fn cleanup_sessions(days: u32, skip_confirm: bool) -> Result<()> {
    if !confirm(
        &format!("This will delete all sessions older than {days} days. This action cannot be undone. Continue?"),
        skip_confirm,
    )? {
        println!("Cancelled.");
        return Ok(());
    }

    let count = BackendManager::get().cleanup_sessions(days).await?;
    println!("Successfully cleaned up {count} old sessions.");
    return Ok(());
}

async fn print_voices() -> Result<()> {
    let name = match SpeechName::parse(Config::get(ConfigKey::Speech)) {
        Some(name) => name,
        None => bail!(format!("Unknown speech engine {}", Config::get(ConfigKey::Speech))),
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut engine = match SpeechManager::get(name, tx) {
        Some(engine) => engine,
        None => {
            println!("Speech is turned off.");
            return Ok(());
        }
    };

    engine.health_check().await?;
    engine.request_voices()?;

    while let Some(event) = rx.recv().await {
        if let Event::SpeechVoicesLoaded(voices) = event {
            let lines = voices
                .iter()
                .map(|voice| return format!("{} ({})", voice.name, voice.lang))
                .collect::<Vec<String>>();
            println!("{}", lines.join("\n"));
            break;
        }
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Natter")
        .hide(true)
        .subcommand(
            Command::new("themes").about("List all supported code highlighting themes.")
        )
        .subcommand(
            Command::new("voices").about("List the voices offered by the configured speech engine.")
        )
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Natter with environment variable RUST_LOG=natter")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_yes() -> Arg {
    return Arg::new("yes")
        .short('y')
        .long("yes")
        .help("Skip the confirmation prompt.")
        .action(ArgAction::SetTrue);
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage chat sessions stored by the chatbot API.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all sessions with their ids and names."))
        .subcommand(Command::new("stats").about("Show session statistics."))
        .subcommand(
            Command::new("history")
                .about("Print the messages of a session. Omit passing any session ID to load an interactive selection.")
                .arg(
                    clap::Arg::new("session-id")
                        .short('i')
                        .long("id")
                        .help("Session ID")
                        .required(false),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a session.")
                .arg(
                    clap::Arg::new("session-id")
                        .short('i')
                        .long("id")
                        .help("Session ID")
                        .required(true),
                )
                .arg(arg_yes()),
        )
        .subcommand(
            Command::new("cleanup")
                .about("Delete every session older than a number of days.")
                .arg(
                    clap::Arg::new("days")
                        .short('d')
                        .long("days")
                        .help(format!("Age in days. [default: {DEFAULT_CLEANUP_DAYS}]"))
                        .value_parser(value_parser!(u32))
                        .num_args(1),
                )
                .arg(arg_yes()),
        );
}

fn arg_api_url() -> Arg {
    return Arg::new(ConfigKey::ApiURL.to_string())
        .short('u')
        .long(ConfigKey::ApiURL.to_string())
        .env("NATTER_API_URL")
        .num_args(1)
        .help(format!(
            "Base URL of the chatbot API. [default: {}]",
            Config::default(ConfigKey::ApiURL)
        ))
        .global(true);
}

fn arg_backend_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
        .long(ConfigKey::BackendHealthCheckTimeout.to_string())
        .env("NATTER_BACKEND_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for the chatbot API. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)),
        )
        .global(true);
}

fn arg_speech() -> Arg {
    return Arg::new(ConfigKey::Speech.to_string())
        .long(ConfigKey::Speech.to_string())
        .env("NATTER_SPEECH")
        .num_args(1)
        .help(format!(
            "Speech engine used to read replies aloud. [default: {}]",
            Config::default(ConfigKey::Speech)
        ))
        .value_parser(PossibleValuesParser::new(SpeechName::VARIANTS))
        .global(true);
}

fn arg_speech_rate() -> Arg {
    return Arg::new(ConfigKey::SpeechRate.to_string())
        .long(ConfigKey::SpeechRate.to_string())
        .env("NATTER_SPEECH_RATE")
        .num_args(1)
        .help(format!(
            "Speaking rate, where 1.0 is the engine's normal speed. [default: {}]",
            Config::default(ConfigKey::SpeechRate)
        ))
        .global(true);
}

fn arg_voice() -> Arg {
    return Arg::new(ConfigKey::Voice.to_string())
        .long(ConfigKey::Voice.to_string())
        .env("NATTER_VOICE")
        .num_args(1)
        .help("Preferred voice name. Falls back to the first voice the speech engine offers.")
        .global(true);
}

fn arg_dictation_command() -> Arg {
    return Arg::new(ConfigKey::DictationCommand.to_string())
        .long(ConfigKey::DictationCommand.to_string())
        .env("NATTER_DICTATION_COMMAND")
        .num_args(1)
        .help("Shell command that records from the microphone and prints a transcript to stdout. Voice input is disabled when unset.")
        .global(true);
}

fn arg_theme() -> Arg {
    return Arg::new(ConfigKey::Theme.to_string())
        .short('t')
        .long(ConfigKey::Theme.to_string())
        .env("NATTER_THEME")
        .num_args(1)
        .help(format!(
            "Sets code syntax highlighting theme. [default: {}]",
            Config::default(ConfigKey::Theme)
        ))
        .value_parser(PossibleValuesParser::new(Themes::list()))
        .global(true);
}

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("NATTER_CONFIG_FILE")
        .num_args(1)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("natter")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start chatting. This is the default command."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_sessions())
        .arg(arg_api_url())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_config_file())
        .arg(arg_dictation_command())
        .arg(arg_speech())
        .arg(arg_speech_rate())
        .arg(arg_theme())
        .arg(arg_voice());
}

async fn parse_sessions(matches: &ArgMatches, subcmd_matches: &ArgMatches) -> Result<()> {
    match subcmd_matches.subcommand() {
        Some((_, action_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches, action_matches]).await?;
        }
        None => {
            subcommand_sessions().print_long_help()?;
            return Ok(());
        }
    }

    match subcmd_matches.subcommand() {
        Some(("list", _)) => {
            print_sessions_list().await?;
        }
        Some(("stats", _)) => {
            print_session_stats().await?;
        }
        Some(("history", history_matches)) => {
            print_session_history(history_matches.get_one::<String>("session-id")).await?;
        }
        Some(("delete", delete_matches)) => {
            if let Some(session_id) = delete_matches.get_one::<String>("session-id") {
                delete_session(session_id, delete_matches.get_flag("yes")).await?;
            }
        }
        Some(("cleanup", cleanup_matches)) => {
            let days = cleanup_matches
                .get_one::<u32>("days")
                .copied()
                .unwrap_or(DEFAULT_CLEANUP_DAYS);
            cleanup_sessions(days, cleanup_matches.get_flag("yes")).await?;
        }
        _ => {
            subcommand_sessions().print_long_help()?;
        }
    }

    return Ok(());
}

/// Parses the command line and runs any one-shot subcommand. Returns true when
/// the chat UI should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("themes", _)) => {
                    println!("{}", Themes::list().join("\n"));
                }
                Some(("voices", voices_matches)) => {
                    Config::load(build(), vec![&matches, debug_matches, voices_matches]).await?;
                    print_voices().await?;
                }
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("sessions", subcmd_matches)) => {
            parse_sessions(&matches, subcmd_matches).await?;
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
