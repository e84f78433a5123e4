/*
 * request.rs
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

//! Request framer. Two shapes, both written straight onto the transport:
//! a bare `GET /<command>` line (the service tolerates the missing version
//! token on this path), and a full `POST /<command> HTTP/1.1` with Host,
//! JSON content type, computed Content-Length, and the serialized body.
//! Commands are clipped to [`MAX_CMD_LENGTH`]; the framer never reads.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::MAX_CMD_LENGTH;

/// Clip a command to the command capacity, at a char boundary.
pub fn bound_command(command: &str) -> &str {
    if command.len() <= MAX_CMD_LENGTH {
        return command;
    }
    let mut end = MAX_CMD_LENGTH;
    while end > 0 && !command.is_char_boundary(end) {
        end -= 1;
    }
    &command[..end]
}

/// Write the GET form: one request line, no headers, no body.
pub async fn write_get<W: AsyncWrite + Unpin>(w: &mut W, command: &str) -> io::Result<()> {
    let line = format!("GET /{}\r\n", bound_command(command));
    w.write_all(line.as_bytes()).await?;
    w.flush().await
}

/// Write the POST form: request line, headers, blank line, JSON body.
/// Content-Length is the byte length of the already-serialized body.
pub async fn write_post<W: AsyncWrite + Unpin>(
    w: &mut W,
    host: &str,
    command: &str,
    body: &[u8],
) -> io::Result<()> {
    let head = format!(
        "POST /{} HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         \r\n",
        bound_command(command),
        host,
        body.len()
    );
    w.write_all(head.as_bytes()).await?;
    w.write_all(body).await?;
    w.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_is_a_single_bare_line() {
        let mut out = Vec::new();
        write_get(&mut out, "botTOKEN/getMe").await.unwrap();
        assert_eq!(out, b"GET /botTOKEN/getMe\r\n");
    }

    #[tokio::test]
    async fn post_carries_headers_and_body() {
        let mut out = Vec::new();
        let body = br#"{"chat_id":"7","text":"hi"}"#;
        write_post(&mut out, "api.telegram.org", "botTOKEN/sendMessage", body)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("POST /botTOKEN/sendMessage HTTP/1.1\r\n"));
        assert!(text.contains("Host: api.telegram.org\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", body.len())));
        assert!(text.ends_with(&format!("\r\n\r\n{}", std::str::from_utf8(body).unwrap())));
    }

    #[test]
    fn oversized_command_is_clipped() {
        let long = "x".repeat(MAX_CMD_LENGTH + 50);
        assert_eq!(bound_command(&long).len(), MAX_CMD_LENGTH);
        let short = "bot/getMe";
        assert_eq!(bound_command(short), short);
    }
}
