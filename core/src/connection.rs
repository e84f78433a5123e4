/*
 * connection.rs
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

//! Connection manager: one lazily-opened transport stream to the fixed
//! host and port. A connect failure is non-fatal; the caller observes the
//! Disconnected state and gets an empty response. GET/POST cycles leave
//! the connection open for a follow-up response check, so the caller must
//! close it explicitly when the operation resolves; multipart closes
//! unconditionally.

use tokio::io::AsyncWriteExt;

use crate::net::{self, Stream};

/// Holds the transport handle and the endpoint it points at.
pub struct Connection {
    host: String,
    port: u16,
    use_tls: bool,
    stream: Option<Stream>,
}

impl Connection {
    pub fn new(host: &str, port: u16, use_tls: bool) -> Self {
        Self {
            host: host.to_string(),
            port,
            use_tls,
            stream: None,
        }
    }

    /// Open the transport if it is not already open. Returns the connected
    /// state afterwards; a failed attempt leaves the state Disconnected and
    /// is reported only on stderr. At most one attempt per call.
    pub async fn ensure_connected(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }
        match net::connect(&self.host, self.port, self.use_tls).await {
            Ok(stream) => {
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                eprintln!("[telegram] connect to {}:{} failed: {}", self.host, self.port, e);
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn stream_mut(&mut self) -> Option<&mut Stream> {
        self.stream.as_mut()
    }

    /// Release the transport. Idempotent; a shutdown error only means the
    /// peer is already gone.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
