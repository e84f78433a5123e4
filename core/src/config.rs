/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Telegrafo, a Telegram Bot API client.
 *
 * Telegrafo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Telegrafo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Telegrafo.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Client configuration and fixed capacities. All buffers are sized from
//! the constants below and never grow; the scratch buffer capacity is the
//! sum of every field a decoded update can carry, plus slack, which also
//! bounds the largest batch that can be decoded in one poll.

use std::time::Duration;

/// Default API host.
pub const DEFAULT_HOST: &str = "api.telegram.org";
/// Default API port (implicit TLS).
pub const DEFAULT_PORT: u16 = 443;

/// Maximum bot token length, bytes.
pub const TOKEN_LENGTH: usize = 46;
/// Maximum length of a timestamp field, bytes.
pub const MAX_DATE_LENGTH: usize = 64;
/// Maximum length of a chat or sender identifier, bytes.
pub const MAX_ID_LENGTH: usize = 255;
/// Maximum length of a command (method plus query string), bytes.
pub const MAX_CMD_LENGTH: usize = 512;
/// Maximum length of a display name or chat title, bytes.
pub const MAX_USER_NAME_LENGTH: usize = 256;
/// Maximum length of a message text body, bytes.
pub const MAX_MESSAGE_TEXT_LENGTH: usize = 4097;

/// Scratch response buffer capacity: one of every decodable field, plus slack.
pub const SCRATCH_CAPACITY: usize = TOKEN_LENGTH
    + MAX_DATE_LENGTH
    + MAX_MESSAGE_TEXT_LENGTH
    + MAX_ID_LENGTH
    + MAX_CMD_LENGTH
    + MAX_USER_NAME_LENGTH
    + 32;

/// Chunk size for streaming a multipart payload to the transport.
pub const STREAM_CHUNK_SIZE: usize = 512;

/// Connection parameters and timing knobs for [`crate::BotClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host name.
    pub host: String,
    /// API port.
    pub port: u16,
    /// Connect with TLS. Disabled only when talking to a local test server.
    pub use_tls: bool,
    /// Base deadline for collecting a response after a request is written.
    pub wait_for_response: Duration,
    /// Long-poll hold time in seconds, appended to the getUpdates query and
    /// added to the read deadline. Zero disables long polling.
    pub long_poll: u16,
    /// Wall-clock budget for blind send retries.
    pub send_retry_budget: Duration,
    /// Number of update record slots filled per poll.
    pub update_slots: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            use_tls: true,
            wait_for_response: Duration::from_millis(1500),
            long_poll: 0,
            send_retry_budget: Duration::from_secs(8),
            update_slots: 1,
        }
    }
}

impl ClientConfig {
    /// Read deadline for a getUpdates request: base wait plus the long-poll
    /// hold time the server was asked to keep the connection open for.
    pub fn poll_deadline(&self) -> Duration {
        self.wait_for_response + Duration::from_secs(u64::from(self.long_poll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_capacity_is_sum_of_fields_plus_slack() {
        assert_eq!(SCRATCH_CAPACITY, 46 + 64 + 4097 + 255 + 512 + 256 + 32);
    }

    #[test]
    fn poll_deadline_adds_long_poll_seconds() {
        let mut config = ClientConfig::default();
        config.long_poll = 10;
        assert_eq!(
            config.poll_deadline(),
            Duration::from_millis(1500) + Duration::from_secs(10)
        );
    }
}
