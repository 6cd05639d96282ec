// SPDX-License-Identifier: AGPL-3.0-only

mod sender;

pub use sender::{SendHandle, Sender, SenderConfig};
