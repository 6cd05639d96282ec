// SPDX-License-Identifier: AGPL-3.0-only

use std::time::Duration;

use serde_derive::{Deserialize, Serialize};

/// Configuration for a listener.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListenerConfig {
  /// The address to bind to.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,

  /// The port to bind to. Port 0 binds an ephemeral port.
  #[serde(default = "default_port")]
  pub port: u16,

  /// The timeout for reading one inbound message to completion.
  #[serde(default = "default_read_timeout", with = "humantime_serde")]
  pub read_timeout: Duration,

  /// Whether the accept loop keeps running after the first connection.
  /// When false, the listener performs exactly one accept-decode-enqueue
  /// cycle and then stops accepting.
  #[serde(default = "default_keep_running")]
  pub keep_running: bool,

  /// Whether each accepted connection is handled on its own task.
  ///
  /// The default is the sequential loop, which guarantees that enqueue
  /// order matches accept order; enabling this trades that guarantee
  /// for throughput under slow peers.
  #[serde(default)]
  pub concurrent: bool,
}

impl Default for ListenerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
      port: default_port(),
      read_timeout: default_read_timeout(),
      keep_running: default_keep_running(),
      concurrent: false,
    }
  }
}

fn default_bind_address() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  courier_protocol::DEFAULT_PORT
}

fn default_read_timeout() -> Duration {
  Duration::from_secs(10)
}

fn default_keep_running() -> bool {
  true
}
