// SPDX-License-Identifier: AGPL-3.0-only

use std::time::Duration;

use anyhow::anyhow;
use tokio::time::timeout;

use courier_server::inbox::{ArrivalNotices, Inbox};
use courier_server::listener::{Decode, Listener, ListenerConfig, ObjectDecoder, TextDecoder};

/// How long a test waits for an arrival notice before giving up.
const ARRIVAL_TIMEOUT: Duration = Duration::from_secs(5);

/// A test suite wrapping one listener and its inbox.
///
/// The suite binds to an ephemeral localhost port so tests never race
/// over port numbers.
pub struct Suite<D: Decode> {
  /// The listener under test.
  ln: Listener<D>,

  /// The inbox the listener feeds.
  inbox: Inbox<D::Item>,

  /// The arrival-notice stream of the inbox.
  notices: ArrivalNotices,
}

/// A suite for the text listener.
pub type TextSuite = Suite<TextDecoder>;

/// A suite for the object listener.
pub type ObjectSuite = Suite<ObjectDecoder>;

// ===== impl Suite =====

impl<D: Decode + Default> Default for Suite<D> {
  fn default() -> Self {
    Self::new(ListenerConfig::default())
  }
}

impl<D: Decode + Default> Suite<D> {
  /// Creates a suite with the given listener configuration.
  ///
  /// The bind address and port are always overridden to localhost and
  /// an ephemeral port; everything else is taken from `config`.
  pub fn new(config: ListenerConfig) -> Self {
    let config = ListenerConfig { bind_address: "127.0.0.1".to_string(), port: 0, ..config };

    let (inbox, notices) = Inbox::new();
    let ln = Listener::new(config, inbox.clone());

    Self { ln, inbox, notices }
  }
}

impl<D: Decode> Suite<D> {
  pub async fn setup(&mut self) -> anyhow::Result<()> {
    self.ln.bootstrap().await?;
    Ok(())
  }

  pub async fn teardown(&mut self) -> anyhow::Result<()> {
    self.ln.shutdown().await?;
    Ok(())
  }

  /// Returns the ephemeral port the listener is bound to.
  pub fn port(&self) -> u16 {
    self.ln.local_port().expect("suite not set up")
  }

  /// Returns the inbox the listener feeds.
  pub fn inbox(&self) -> &Inbox<D::Item> {
    &self.inbox
  }

  /// Waits for the next arrival notice, bounded by [`ARRIVAL_TIMEOUT`].
  pub async fn wait_for_arrival(&mut self) -> anyhow::Result<()> {
    timeout(ARRIVAL_TIMEOUT, self.notices.recv())
      .await
      .map_err(|_| anyhow!("timed out waiting for an arrival notice"))?
      .ok_or_else(|| anyhow!("arrival notice stream ended"))
  }

  /// Returns a pending arrival notice without waiting, if any.
  pub fn try_arrival(&mut self) -> Option<()> {
    self.notices.try_recv()
  }
}
