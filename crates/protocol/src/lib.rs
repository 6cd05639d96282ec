// SPDX-License-Identifier: AGPL-3.0-only

mod endpoint;
mod object;
mod stream;
mod text;

pub use endpoint::{DEFAULT_PORT, Endpoint, EndpointParsingError};
pub use object::{FRAME_HEADER_SIZE, FRAME_VERSION, MAX_BODY_SIZE, MAX_NAME_SIZE, ObjectMessage};
pub use stream::{read_object, read_text};
pub use text::{TIMESTAMP_FORMAT, TextMessage};
