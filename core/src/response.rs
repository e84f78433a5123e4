/*
 * response.rs
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

//! Response reader. Collects a reply into the scratch buffer under a
//! deadline measured from request submission. The GET path treats the
//! whole reply as body (a bare request line gets a bare response); the
//! POST and multipart paths discard the header block first, recognizing
//! the boundary as a blank line. Body bytes past scratch capacity are
//! read and dropped. There is no partial-result API: the caller sees
//! either the collected body or, on deadline expiry with nothing
//! received, an empty buffer.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{timeout, Instant};

use crate::buffer::ScratchBuffer;

/// Once data has started arriving, keep reading until the stream has been
/// quiet this long; the reply is then taken as complete.
const DRAIN_WINDOW: Duration = Duration::from_millis(50);

/// Read a reply into `scratch`. With `split_headers` the header block is
/// consumed and discarded up to the blank line; without it every received
/// byte is body. The deadline is monotonic-clock based, so timer
/// wraparound cannot extend it.
pub async fn read_response<R: AsyncRead + Unpin>(
    stream: &mut R,
    scratch: &mut ScratchBuffer,
    deadline: Duration,
    split_headers: bool,
) {
    let start = Instant::now();
    let mut buf = BytesMut::with_capacity(4096);
    let mut received_any = false;
    let mut finished_headers = !split_headers;
    let mut line_blank = true;

    loop {
        let wait = if received_any {
            DRAIN_WINDOW
        } else {
            match deadline.checked_sub(start.elapsed()) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            }
        };
        buf.clear();
        match timeout(wait, stream.read_buf(&mut buf)).await {
            // Deadline elapsed with nothing, or the stream went quiet after
            // the reply: either way the response is as complete as it gets.
            Err(_) => break,
            Ok(Err(_)) => break,
            Ok(Ok(0)) => break,
            Ok(Ok(_)) => {
                received_any = true;
                for &c in buf.iter() {
                    if !finished_headers {
                        if line_blank && c == b'\n' {
                            finished_headers = true;
                        }
                    } else {
                        let _ = scratch.push(c);
                    }
                    if c == b'\n' {
                        line_blank = true;
                    } else if c != b'\r' {
                        line_blank = false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::AsyncWriteExt;

    use crate::config::SCRATCH_CAPACITY;

    #[tokio::test]
    async fn raw_reply_is_all_body() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let mut scratch = ScratchBuffer::new(SCRATCH_CAPACITY);
        server.write_all(b"{\"ok\":true,\"result\":[]}").await.unwrap();
        drop(server);
        read_response(&mut client, &mut scratch, Duration::from_millis(500), false).await;
        assert_eq!(scratch.as_slice(), b"{\"ok\":true,\"result\":[]}");
    }

    #[tokio::test]
    async fn headers_are_discarded_up_to_blank_line() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let mut scratch = ScratchBuffer::new(SCRATCH_CAPACITY);
        server
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"ok\":true}",
            )
            .await
            .unwrap();
        drop(server);
        read_response(&mut client, &mut scratch, Duration::from_millis(500), true).await;
        assert_eq!(scratch.as_slice(), b"{\"ok\":true}");
    }

    #[tokio::test]
    async fn deadline_expiry_with_no_bytes_yields_empty_body() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut scratch = ScratchBuffer::new(SCRATCH_CAPACITY);
        // Writer stays open but silent.
        read_response(&mut client, &mut scratch, Duration::from_millis(50), false).await;
        assert!(scratch.is_empty());
        drop(server);
    }

    #[tokio::test]
    async fn oversized_body_is_clipped_to_scratch_capacity() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let mut scratch = ScratchBuffer::new(4);
        server.write_all(b"abcdef").await.unwrap();
        drop(server);
        read_response(&mut client, &mut scratch, Duration::from_millis(500), false).await;
        assert_eq!(scratch.as_slice(), b"abcd");
    }

    #[tokio::test]
    async fn reply_split_across_writes_is_reassembled() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let mut scratch = ScratchBuffer::new(SCRATCH_CAPACITY);
        let writer = tokio::spawn(async move {
            server.write_all(b"HTTP/1.1 200 OK\r\n\r\n{\"ok\"").await.unwrap();
            server.write_all(b":true}").await.unwrap();
            drop(server);
        });
        read_response(&mut client, &mut scratch, Duration::from_millis(500), true).await;
        writer.await.unwrap();
        assert_eq!(scratch.as_slice(), b"{\"ok\":true}");
    }
}
