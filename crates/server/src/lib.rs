// SPDX-License-Identifier: AGPL-3.0-only

pub mod inbox;
pub mod listener;
pub mod telemetry;
pub mod version;

use std::env;
use std::fs;

use crate::inbox::{ArrivalNotices, Inbox};
use crate::listener::{ObjectListener, TextListener};
use crate::version::{GIT_BRANCH_NAME, GIT_COMMIT_HASH, VERSION};

use serde_derive::{Deserialize, Serialize};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Config {
  #[serde(default)]
  telemetry: telemetry::Config,

  #[serde(rename = "text-listener", default)]
  text_listener: listener::ListenerConfig,

  #[serde(rename = "object-listener", default = "default_object_listener")]
  object_listener: listener::ListenerConfig,
}

// The two listeners cannot share a port; the object listener defaults
// to the port right above the text one.
fn default_object_listener() -> listener::ListenerConfig {
  listener::ListenerConfig { port: courier_protocol::DEFAULT_PORT + 1, ..Default::default() }
}

/// Runs the courier server until a stop signal arrives.
///
/// This is the main entry point for the courier server. It brings up
/// one listener per wire format (text and object), each feeding its own
/// inbox, and drains both inboxes to the log.
///
/// # Arguments
///
/// * `config_file` - The TOML configuration file to load, if any
/// * `worker_threads` - The number of worker threads the runtime was built with
///
/// # Returns
///
/// Returns `Ok(())` on successful shutdown, or an error if any step fails during
/// startup or shutdown.
pub async fn run(config_file: Option<String>, worker_threads: usize) -> anyhow::Result<()> {
  // Parse the configuration file.
  let cfg = load_config(config_file)?;

  // Initialize the telemetry subscriber.
  telemetry::init(cfg.telemetry)?;

  info!(
    version = VERSION,
    worker_threads = worker_threads,
    branch = GIT_BRANCH_NAME,
    commit = GIT_COMMIT_HASH,
    "🚀 courier server is starting..."
  );

  let (text_inbox, text_notices) = Inbox::new();
  let (object_inbox, object_notices) = Inbox::new();

  let mut text_ln = TextListener::new(cfg.text_listener, text_inbox.clone());
  let mut object_ln = ObjectListener::new(cfg.object_listener, object_inbox.clone());

  text_ln.bootstrap().await?;
  object_ln.bootstrap().await?;

  let text_drain = spawn_drain_task("text", text_inbox, text_notices);
  let object_drain = spawn_drain_task("object", object_inbox, object_notices);

  // Wait for stop signal.
  info!("waiting for stop signal... (press Ctrl+C to stop the server)");
  wait_for_stop_signal().await?;
  info!("received stop signal... gracefully shutting down...");

  text_ln.shutdown().await?;
  object_ln.shutdown().await?;

  // With both listeners gone no further notices can arrive.
  text_drain.abort();
  object_drain.abort();

  info!("👋 hasta la vista, baby");

  Ok(())
}

/// Spawns a task that pops each arriving message and logs it.
fn spawn_drain_task<T>(kind: &'static str, inbox: Inbox<T>, mut notices: ArrivalNotices) -> JoinHandle<()>
where
  T: std::fmt::Display + Send + 'static,
{
  tokio::spawn(async move {
    while notices.recv().await.is_some() {
      if let Some(message) = inbox.pop() {
        info!(kind, queued = inbox.len(), %message, "message arrived");
      }

      telemetry::metrics::set_messages_queued(kind, inbox.len() as f64);
    }
  })
}

/// Sets up a custom panic hook that provides helpful debugging information when the server panics.
///
/// This should be called early in the application's initialization to ensure
/// all panics are caught and reported with the enhanced debugging information.
pub fn setup_panic_hook() {
  let orig_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |panic_info| {
    eprintln!("\n===========================================================");
    eprintln!("                😱 Oops! something went wrong                ");
    eprintln!("===========================================================\n");
    eprintln!("Courier server has panicked. This is a bug. Please report this");
    eprintln!("at https://github.com/courier-io/courier/issues/new.");
    eprintln!("If you can reliably reproduce this panic, include the");
    eprintln!("reproduction steps and re-run with the RUST_BACKTRACE=1 env");
    eprintln!("var set and include the backtrace in your report.");
    eprintln!();
    eprintln!("Platform: {} {}", env::consts::OS, env::consts::ARCH);
    eprintln!("Version: {}", version::VERSION);
    eprintln!("Branch: {}", version::GIT_BRANCH_NAME);
    eprintln!("Commit: {}", version::GIT_COMMIT_HASH);
    eprintln!("Args: {:?}", env::args().collect::<Vec<_>>());
    eprintln!();

    orig_hook(panic_info);

    std::process::exit(1);
  }));
}

fn load_config(config_file: Option<String>) -> anyhow::Result<Config> {
  let toml_file = config_file.unwrap_or("config.toml".to_string());

  // Read and parse the TOML file
  let config: Config = match fs::read_to_string(&toml_file) {
    Ok(config_content) => toml::from_str(&config_content)
      .map_err(|err| anyhow::anyhow!("failed to parse config file: {}, {}", toml_file, err))?,
    Err(_) => Config::default(),
  };

  Ok(config)
}

async fn wait_for_stop_signal() -> anyhow::Result<()> {
  let mut sig_term = signal::unix::signal(signal::unix::SignalKind::terminate())?;

  tokio::select! {
    _ = signal::ctrl_c() => Ok(()),
    _ = sig_term.recv() => {
      Ok(())
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_defaults() {
    let config: Config = toml::from_str("").unwrap();

    assert_eq!(config.text_listener.port, courier_protocol::DEFAULT_PORT);
    assert_eq!(config.object_listener.port, courier_protocol::DEFAULT_PORT + 1);
    assert!(config.text_listener.keep_running);
    assert!(!config.text_listener.concurrent);
  }

  #[test]
  fn test_config_overrides() {
    let config: Config = toml::from_str(
      r#"
        [text-listener]
        bind_address = "127.0.0.1"
        port = 7001
        keep_running = false

        [object-listener]
        port = 7002
        read_timeout = "30s"
        concurrent = true
      "#,
    )
    .unwrap();

    assert_eq!(config.text_listener.bind_address, "127.0.0.1");
    assert_eq!(config.text_listener.port, 7001);
    assert!(!config.text_listener.keep_running);
    assert_eq!(config.object_listener.port, 7002);
    assert_eq!(config.object_listener.read_timeout, std::time::Duration::from_secs(30));
    assert!(config.object_listener.concurrent);
  }
}
