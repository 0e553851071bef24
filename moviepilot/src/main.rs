//! Entry point for the moviepilot monitor. Parses args, resolves the profile and
//! runs the refresh loop (or a one-shot command).

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moviepilot::consts::{DEFAULT_PORT, DEFAULT_TIMEOUT, NOTIFY_DEFAULT_TITLE};
use moviepilot::profiles::{
    load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile,
};
use moviepilot::refresh::scan_interval;
use moviepilot::sensors::readings;
use moviepilot::{
    ClientConfig, Coordinator, MoviePilotClient, NotificationType, RefreshError, Update,
};

#[derive(Debug, Parser)]
#[command(name = "moviepilot", version, about = "Monitor a MoviePilot server from the terminal")]
struct Cli {
    /// MoviePilot host name or URL (http:// or https:// prefix optional)
    #[arg(short = 'H', long, global = true)]
    host: Option<String>,

    /// MoviePilot port [default: 3000]
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// API token
    #[arg(short, long, env = "MOVIEPILOT_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Named connection profile
    #[arg(short = 'P', long, global = true)]
    profile: Option<String>,

    /// Overwrite the named profile with the given connection settings
    #[arg(long, global = true)]
    save: bool,

    /// Refresh interval in seconds (10-300) [default: 30]
    #[arg(short, long)]
    interval: Option<u64>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print one snapshot and exit
    #[arg(long)]
    once: bool,

    /// Print snapshots and events as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a notification through MoviePilot
    Notify {
        #[arg(long, default_value = NOTIFY_DEFAULT_TITLE)]
        title: String,
        #[arg(short, long)]
        message: String,
        /// Manual, System, Download, Transfer, Subscribe, Media or Plugin
        #[arg(long = "type", default_value = "Manual", value_parser = parse_type)]
        kind: NotificationType,
    },
    /// Validate the connection and token, then print server info
    Check,
}

fn parse_type(raw: &str) -> Result<NotificationType, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let entry = resolve_entry(&cli)?;
    let timeout = cli
        .timeout
        .or(entry.timeout)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let mut config = ClientConfig::new(&entry.host, entry.port, &entry.token).with_timeout(timeout);
    config.verify_tls = entry.verify_tls;
    let client = MoviePilotClient::new(&config)?;

    match cli.command {
        Some(Command::Notify {
            ref title,
            ref message,
            kind,
        }) => {
            if client.send_notification(title, message, kind).await? {
                println!("notification sent");
                Ok(())
            } else {
                bail!("MoviePilot declined the notification")
            }
        }
        Some(Command::Check) => {
            let info = client.test_connection().await?;
            let system = client.system_info().await;
            if cli.json {
                println!("{}", serde_json::json!({ "connection": info, "system": system }));
            } else {
                println!("{} at {}: {}", info.name, client.base_url(), info.status);
                println!("version: {}", system.version);
            }
            Ok(())
        }
        None => {
            let interval = scan_interval(cli.interval.or(entry.scan_interval))?;
            monitor(client, interval, cli.once, cli.json).await
        }
    }
}

/// Resolve connection settings from flags and profiles, persisting new or
/// changed profiles the way `--profile NAME --host ...` asks for.
fn resolve_entry(cli: &Cli) -> Result<ProfileEntry> {
    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: cli.profile.clone(),
        host: cli.host.clone(),
        port: cli.port,
        token: cli.token.clone(),
    };

    match req.resolve(&profiles_file) {
        ResolveProfile::Direct(mut entry) => {
            if let Some(secs) = cli.interval {
                // never persist an interval the refresh driver would reject
                scan_interval(Some(secs))?;
                entry.scan_interval = Some(secs);
            }
            if let Some(name) = cli.profile.as_ref() {
                let mut profiles_mut = profiles_file.clone();
                let write = match profiles_mut.profiles.get(name) {
                    // New profile: auto-save immediately
                    None => true,
                    Some(existing) if existing != &entry => {
                        cli.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "))
                    }
                    Some(_) => false,
                };
                if write {
                    profiles_mut.profiles.insert(name.clone(), entry.clone());
                    save_profiles(&profiles_mut).context("failed to save profiles")?;
                }
            }
            Ok(entry)
        }
        ResolveProfile::Loaded(entry) => Ok(entry),
        ResolveProfile::Missing(name) => Err(anyhow!(
            "profile '{name}' does not exist; pass --host (and --token) to create it"
        )),
        ResolveProfile::None => {
            let port = cli.port.unwrap_or(DEFAULT_PORT);
            Err(anyhow!(
                "no MoviePilot host given (use --host HOST [--port {port}]) and no single stored profile"
            ))
        }
    }
}

async fn monitor(client: MoviePilotClient, interval: Duration, once: bool, json: bool) -> Result<()> {
    let mut coordinator = Coordinator::new(client, interval);
    let (info, first) = match coordinator.first_refresh().await {
        Ok(v) => v,
        Err(RefreshError::Auth(err)) => bail!("{err}"),
        Err(err) => return Err(err.into()),
    };
    if !json {
        println!("connected to {} at {}", info.name, coordinator.client().base_url());
    }
    print_update(&first, true, json);
    if once {
        return Ok(());
    }

    let mut events = coordinator.subscribe_events();
    let mut state = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                ev = events.recv() => match ev {
                    Ok(ev) => print_event(&ev, json),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "event printer lagging");
                    }
                    Err(_) => break,
                },
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let s = state.borrow_and_update().clone();
                    match (&s.latest, s.last_update_success) {
                        (Some(update), true) => print_update(update, true, json),
                        _ => eprintln!(
                            "update failed: {}",
                            s.last_error.as_deref().unwrap_or("unknown error")
                        ),
                    }
                }
            }
        }
    });

    coordinator
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    printer.abort();
    Ok(())
}

fn print_update(update: &Update, online: bool, json: bool) {
    let rs = readings(&update.snapshot, online, update.previous);
    if json {
        println!(
            "{}",
            serde_json::json!({ "snapshot": update.snapshot, "readings": rs })
        );
        return;
    }
    println!("--- {} ---", update.snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S"));
    for r in rs {
        match r.unit {
            Some(unit) => println!("{:<12} {} {}", r.name, r.value, unit),
            None => println!("{:<12} {}", r.name, r.value),
        }
    }
}

fn print_event(ev: &moviepilot::TransitionEvent, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "event": ev.event_name(), "data": ev.to_notification() })
        );
    } else {
        println!("[{}] {}: {}", ev.event_name(), ev.title, ev.message);
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}
