// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// A thread-safe FIFO queue of decoded inbound messages, paired with an
/// arrival-notice stream.
///
/// The listener task pushes at the tail; consumer tasks pop at the head.
/// Every push emits exactly one notice on the paired [`ArrivalNotices`]
/// stream, and always *after* the item is visible in the queue, so a
/// consumer woken by a notice is guaranteed to find the message present.
///
/// Enqueue order matches the accept order of the underlying connections;
/// no ordering is promised across independent senders.
#[derive(Debug)]
pub struct Inbox<T> {
  /// The queued messages.
  queue: Arc<Mutex<VecDeque<T>>>,

  /// The channel used to emit one notice per enqueued message.
  notice_tx: mpsc::UnboundedSender<()>,
}

// Manual impl: `T` itself does not need to be `Clone`.
impl<T> Clone for Inbox<T> {
  fn clone(&self) -> Self {
    Self { queue: self.queue.clone(), notice_tx: self.notice_tx.clone() }
  }
}

// ===== impl Inbox =====

impl<T> Inbox<T> {
  /// Creates a new inbox along with its arrival-notice stream.
  pub fn new() -> (Self, ArrivalNotices) {
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    (Self { queue: Arc::new(Mutex::new(VecDeque::new())), notice_tx }, ArrivalNotices { rx: notice_rx })
  }

  /// Appends a message at the tail of the queue and raises one notice.
  pub fn push(&self, item: T) {
    self.queue.lock().push_back(item);

    // The notice must trail the enqueue. A send failure only means the
    // notice stream was dropped; the queue itself stays usable.
    let _ = self.notice_tx.send(());
  }

  /// Removes and returns the message at the head of the queue.
  pub fn pop(&self) -> Option<T> {
    self.queue.lock().pop_front()
  }

  /// Returns the number of queued messages.
  pub fn len(&self) -> usize {
    self.queue.lock().len()
  }

  /// Tells whether the queue is empty.
  pub fn is_empty(&self) -> bool {
    self.queue.lock().is_empty()
  }
}

/// The consumer side of an inbox's notification stream.
///
/// One notice is delivered per enqueued message. Consumers are expected
/// to dequeue from the [`Inbox`] in response to a notice; the notice
/// itself carries no value.
#[derive(Debug)]
pub struct ArrivalNotices {
  rx: mpsc::UnboundedReceiver<()>,
}

// ===== impl ArrivalNotices =====

impl ArrivalNotices {
  /// Waits for the next arrival notice.
  ///
  /// Returns `None` once the inbox and all of its clones are gone.
  pub async fn recv(&mut self) -> Option<()> {
    self.rx.recv().await
  }

  /// Returns a pending notice without waiting, if one is available.
  pub fn try_recv(&mut self) -> Option<()> {
    self.rx.try_recv().ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fifo_order() {
    let (inbox, _notices) = Inbox::new();

    inbox.push("first");
    inbox.push("second");
    inbox.push("third");

    assert_eq!(inbox.len(), 3);
    assert_eq!(inbox.pop(), Some("first"));
    assert_eq!(inbox.pop(), Some("second"));
    assert_eq!(inbox.pop(), Some("third"));
    assert_eq!(inbox.pop(), None);
    assert!(inbox.is_empty());
  }

  #[tokio::test]
  async fn test_one_notice_per_push() {
    let (inbox, mut notices) = Inbox::new();

    for i in 0..5 {
      inbox.push(i);
    }

    for _ in 0..5 {
      assert!(notices.try_recv().is_some());
    }
    assert!(notices.try_recv().is_none());
  }

  #[tokio::test]
  async fn test_notice_trails_enqueue() {
    let (inbox, mut notices) = Inbox::new();
    let producer = inbox.clone();

    let handle = tokio::spawn(async move {
      producer.push("payload");
    });

    // A consumer woken by the notice must always find the message
    // already present in the queue.
    notices.recv().await.unwrap();
    assert_eq!(inbox.pop(), Some("payload"));

    handle.await.unwrap();
  }

  #[tokio::test]
  async fn test_notices_end_when_inbox_dropped() {
    let (inbox, mut notices) = Inbox::<u8>::new();
    drop(inbox);

    assert_eq!(notices.recv().await, None);
  }
}
