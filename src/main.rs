//! jobwatch
//!
//! Watches the job portal's realtime feeds from the terminal.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use jobwatch::{
    app_init::{AppComponents, initialize_app},
    client::RealtimeOptions,
    config::{WatchConfig, default_config_path, load_config, save_config},
    dispatcher::Dispatcher,
    event::RealtimeEvent,
    id::NotificationId,
    stores::{NotificationInbox, RecentJobs, log_event},
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "jobwatch")]
#[command(version, about = "Watch new jobs, applications and notifications", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Portal base URL, overrides the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session cookie as `name=value`, overrides the config file
    #[arg(long, global = true)]
    session_cookie: Option<String>,

    /// Log raw response bodies to files
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the feeds until Ctrl-C (default)
    Watch(WatchArgs),
    /// Mark notifications as read
    MarkRead {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Mark every notification as read
    MarkAllRead,
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Default, Args)]
struct WatchArgs {
    /// Polling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Mark new notifications as read once shown
    #[arg(long)]
    auto_ack: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut WatchConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.as_str().into();
        }
        if let Some(cookie) = &self.session_cookie {
            config.session_cookie = Some(cookie.as_str().into());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if let Some(Command::InitConfig { force }) = &cli.command {
        return init_config(&config_path, *force);
    }

    let mut config = load_config(&config_path)?;
    cli.apply_overrides(&mut config);

    let components = initialize_app(&config, cli.debug)?;

    match cli.command {
        Some(Command::Watch(args)) => watch(components, args).await,
        None => watch(components, WatchArgs::default()).await,
        Some(Command::MarkRead { ids }) => {
            let ids: Vec<NotificationId> = ids.into_iter().map(NotificationId::from).collect();
            if !components.poller.mark_notifications_as_read(&ids).await {
                bail!("failed to mark notifications as read");
            }
            println!("Marked {} notification(s) as read", ids.len());
            Ok(())
        },
        Some(Command::MarkAllRead) => {
            if !components.poller.mark_all_notifications_as_read().await {
                bail!("failed to mark all notifications as read");
            }
            println!("Marked all notifications as read");
            Ok(())
        },
        Some(Command::InitConfig { .. }) => Ok(()),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(eyre!(
            "{} already exists, pass --force to overwrite",
            path.display()
        ));
    }

    save_config(path, &WatchConfig::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn watch(components: AppComponents, args: WatchArgs) -> Result<()> {
    let AppComponents { mut poller, sender, mut events, _log_guard } = components;

    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| poller.default_interval());
    let options = RealtimeOptions::dispatching(interval, sender.clone())
        .wrap_err("invalid polling options")?;

    let mut inbox = NotificationInbox::new();
    let mut recent = RecentJobs::default();

    poller.start(options);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Received Ctrl-C, shutting down");
                break;
            }
            Some(event) = events.recv() => {
                log_event(&event);
                inbox.apply(&event);
                recent.apply(&event);
                print_event(&event);

                if args.auto_ack && matches!(event, RealtimeEvent::NotificationsReceived(_)) {
                    let ids = inbox.unread_ids();
                    if !ids.is_empty() && poller.mark_notifications_as_read(&ids).await {
                        sender.dispatch(RealtimeEvent::NotificationsRead(ids));
                    }
                }
            }
        }
    }

    poller.stop();
    if let Some(unread) = poller.unread_count() {
        info!(unread, "Last reported unread notifications");
    }
    info!(cursors = ?poller.cursors(), recent_jobs = ?recent.ids(), "Stopped watching");
    Ok(())
}

fn print_event(event: &RealtimeEvent) {
    match event {
        RealtimeEvent::JobsReceived(jobs) => {
            for job in jobs.iter().filter(|j| j.is_listed()) {
                println!(
                    "[job #{}] {} ({}), {}",
                    job.id,
                    job.headline(),
                    job.company,
                    job.salary_label()
                );
            }
        },
        RealtimeEvent::ApplicationsReceived(applications) => {
            for application in applications {
                let title = application
                    .job
                    .as_ref()
                    .map(|j| j.title.as_str())
                    .unwrap_or("unknown job");
                println!(
                    "[application #{}] {} for job #{} ({}), status {:?}",
                    application.id,
                    application.job_seeker_id,
                    application.job_id,
                    title,
                    application.status
                );
            }
        },
        RealtimeEvent::NotificationsReceived(notifications) => {
            for notification in notifications {
                let marker = if notification.read { " " } else { "*" };
                println!("[notification #{}]{marker} {}", notification.id, notification.message);
            }
        },
        RealtimeEvent::NotificationsRead(_) | RealtimeEvent::AllNotificationsRead => {},
    }
}
