// SPDX-License-Identifier: AGPL-3.0-only

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Metric names used throughout the server
pub mod names {
  /// Total number of connections accepted
  pub const CONNECTIONS_ACCEPTED: &str = "courier_connections_accepted_total";

  /// Total number of messages decoded and enqueued
  pub const MESSAGES_RECEIVED: &str = "courier_messages_received_total";

  /// Total number of inbound messages rejected
  pub const MESSAGES_REJECTED: &str = "courier_messages_rejected_total";

  /// Number of messages currently queued
  pub const MESSAGES_QUEUED: &str = "courier_messages_queued";
}

/// Increment the accepted connection counter
pub fn connection_accepted(kind: &'static str) {
  counter!(names::CONNECTIONS_ACCEPTED, "kind" => kind).increment(1);
}

/// Increment the received message counter
pub fn message_received(kind: &'static str) {
  counter!(names::MESSAGES_RECEIVED, "kind" => kind).increment(1);
}

/// Increment the rejected message counter
pub fn message_rejected(kind: &'static str) {
  counter!(names::MESSAGES_REJECTED, "kind" => kind).increment(1);
}

/// Set the number of messages currently queued
pub fn set_messages_queued(kind: &'static str, count: f64) {
  gauge!(names::MESSAGES_QUEUED, "kind" => kind).set(count);
}

/// Describes all metrics (should be called after installing the exporter)
pub fn describe_metrics() {
  describe_counter!(names::CONNECTIONS_ACCEPTED, "Total number of connections accepted");
  describe_counter!(names::MESSAGES_RECEIVED, "Total number of messages decoded and enqueued");
  describe_counter!(names::MESSAGES_REJECTED, "Total number of inbound messages rejected");
  describe_gauge!(names::MESSAGES_QUEUED, "Number of messages currently queued");
}
