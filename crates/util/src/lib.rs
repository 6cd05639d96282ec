// SPDX-License-Identifier: AGPL-3.0-only

pub mod conn;
pub mod io;
