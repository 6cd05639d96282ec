// SPDX-License-Identifier: AGPL-3.0-only

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::inbox::Inbox;
use crate::listener::config::ListenerConfig;
use crate::listener::decode::Decode;
use crate::telemetry::metrics;

/// A TCP listener that materializes inbound connections into messages.
///
/// The listener accepts connections on a dedicated task. Each accepted
/// connection is read to completion, decoded with `D`, and the result
/// pushed to the shared [`Inbox`] (which raises the arrival notice).
/// A connection whose bytes fail to decode is abandoned without
/// enqueuing anything; the loop carries on with the next accept.
///
/// By default connections are handled strictly one at a time, in
/// arrival order; see [`ListenerConfig::concurrent`] for the per-task
/// alternative.
pub struct Listener<D: Decode> {
  /// The listener configuration.
  config: ListenerConfig,

  /// The decoder applied to every accepted connection.
  decoder: D,

  /// The inbox receiving decoded messages.
  inbox: Inbox<D::Item>,

  /// The token used to stop the accept loop.
  cancel: Option<CancellationToken>,

  /// The accept loop task.
  loop_task: Option<JoinHandle<()>>,

  /// The local address of the listener.
  local_address: Option<SocketAddr>,
}

// ===== impl Listener =====

impl<D: Decode + Default> Listener<D> {
  /// Creates a new listener feeding the given inbox.
  pub fn new(config: ListenerConfig, inbox: Inbox<D::Item>) -> Self {
    Self { config, decoder: D::default(), inbox, cancel: None, loop_task: None, local_address: None }
  }
}

impl<D: Decode> Listener<D> {
  /// Binds the socket and starts the accept loop.
  ///
  /// Returns once the loop is running; from that point every accepted
  /// connection is decoded and enqueued until the listener is shut
  /// down (or, with `keep_running` disabled, after one cycle).
  ///
  /// # Errors
  ///
  /// Returns an error if the socket cannot be bound (such as the port
  /// already being in use). Startup errors always surface here, before
  /// any connection is accepted.
  pub async fn bootstrap(&mut self) -> anyhow::Result<()> {
    assert!(self.cancel.is_none());

    let socket = tokio::net::TcpListener::bind((self.config.bind_address.as_str(), self.config.port)).await?;

    self.local_address = Some(socket.local_addr()?);

    let token = CancellationToken::new();
    self.cancel = Some(token.clone());

    let config = self.config.clone();
    let decoder = self.decoder.clone();
    let inbox = self.inbox.clone();

    let (running_tx, running_rx) = oneshot::channel();

    self.loop_task = Some(tokio::spawn(async move {
      let _ = running_tx.send(());

      accept_loop::<D>(socket, config, decoder, inbox, token).await;
    }));

    // Wait for the accept loop to start.
    running_rx.await?;

    info!(address = %self.local_address.unwrap(), kind = D::KIND, "accepting socket connections");
    Ok(())
  }

  /// Stops the accept loop and waits for it to finish.
  ///
  /// Cancellation also interrupts a blocked `accept`, so shutdown does
  /// not wait for a further connection to arrive.
  ///
  /// # Errors
  ///
  /// Returns an error if the accept loop task panicked.
  pub async fn shutdown(&mut self) -> anyhow::Result<()> {
    assert!(self.cancel.is_some());

    self.cancel.take().unwrap().cancel();

    if let Some(task) = self.loop_task.take() {
      task.await?;
    }

    info!(kind = D::KIND, "stopped accepting socket connections");
    Ok(())
  }

  /// Returns the local address the listener is bound to.
  ///
  /// Returns `None` before `bootstrap()`. With port 0 this is how the
  /// actual ephemeral port is discovered.
  pub fn local_address(&self) -> Option<SocketAddr> {
    self.local_address
  }

  /// Returns the local port the listener is bound to.
  pub fn local_port(&self) -> Option<u16> {
    self.local_address.map(|addr| addr.port())
  }
}

async fn accept_loop<D: Decode>(
  socket: tokio::net::TcpListener,
  config: ListenerConfig,
  decoder: D,
  inbox: Inbox<D::Item>,
  token: CancellationToken,
) {
  loop {
    tokio::select! {
      accepted = socket.accept() => match accepted {
        Ok((stream, peer)) => {
          debug!(peer = %peer, kind = D::KIND, "accepted connection");
          metrics::connection_accepted(D::KIND);

          if config.concurrent {
            let decoder = decoder.clone();
            let inbox = inbox.clone();
            let read_timeout = config.read_timeout;

            tokio::spawn(async move {
              handle_connection::<D>(decoder, inbox, read_timeout, stream).await;
            });
          } else {
            handle_connection::<D>(decoder.clone(), inbox.clone(), config.read_timeout, stream).await;
          }

          if !config.keep_running {
            break;
          }
        },
        Err(err) => {
          // Accept failures are transient (e.g. the peer reset before
          // the handshake finished); keep the loop alive.
          warn!(error = ?err, kind = D::KIND, "failed to accept connection");
        },
      },
      _ = token.cancelled() => break,
    }
  }
}

/// Reads one message from the connection and enqueues it.
///
/// The connection is closed when this returns, whatever the outcome.
async fn handle_connection<D: Decode>(decoder: D, inbox: Inbox<D::Item>, read_timeout: Duration, mut stream: TcpStream) {
  match timeout(read_timeout, decoder.decode(&mut stream)).await {
    Ok(Ok(item)) => {
      inbox.push(item);
      metrics::message_received(D::KIND);
    },
    Ok(Err(err)) => {
      warn!(error = ?err, kind = D::KIND, "rejected inbound message");
      metrics::message_rejected(D::KIND);
    },
    Err(_) => {
      warn!(kind = D::KIND, "timed out reading inbound message");
      metrics::message_rejected(D::KIND);
    },
  }
}
