// SPDX-License-Identifier: AGPL-3.0-only

mod config;
mod decode;
#[allow(clippy::module_inception)]
mod listener;

pub use config::ListenerConfig;
pub use decode::{Decode, ObjectDecoder, TextDecoder};
pub use listener::Listener;

/// A listener for EOF-delimited text messages.
pub type TextListener = Listener<TextDecoder>;

/// A listener for self-delimiting binary object frames.
pub type ObjectListener = Listener<ObjectDecoder>;
