/*
 * multipart.rs
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

//! Multipart/form-data envelope around a binary payload of known size.
//! The payload is pulled from a [`PayloadSource`] and copied through one
//! fixed chunk buffer, so peak memory stays at one chunk no matter how
//! large the upload is. Content-Length for the whole envelope is computed
//! from the part lengths, never by buffering the body.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::STREAM_CHUNK_SIZE;

/// Fixed part boundary. The value only has to never occur in the payload
/// headers; the remote accepts any token here.
pub const BOUNDARY: &str = "------------------------b8f610217e83e29b";

/// Pull-based byte source for the payload. Decouples the envelope from
/// the storage medium: a camera frame buffer, a file handle, a slice.
pub trait PayloadSource {
    /// True while at least one more byte can be produced.
    fn has_more(&mut self) -> bool;
    /// Produce the next byte. Only called after `has_more` returned true.
    fn next_byte(&mut self) -> u8;
}

/// PayloadSource over an in-memory slice.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl PayloadSource for SliceSource<'_> {
    fn has_more(&mut self) -> bool {
        self.pos < self.data.len()
    }

    fn next_byte(&mut self) -> u8 {
        let b = self.data[self.pos];
        self.pos += 1;
        b
    }
}

/// Preamble: chat_id form field part, then the opening of the binary part
/// (field name, file name, content type), up to and including the blank
/// line after which payload bytes follow.
pub fn preamble(chat_id: &str, field_name: &str, file_name: &str, content_type: &str) -> String {
    format!(
        "--{boundary}\r\n\
         content-disposition: form-data; name=\"chat_id\"\r\n\
         \r\n\
         {chat_id}\r\n\
         --{boundary}\r\n\
         content-disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\
         \r\n",
        boundary = BOUNDARY,
        chat_id = chat_id,
        field_name = field_name,
        file_name = file_name,
        content_type = content_type,
    )
}

/// Closing boundary marker.
pub fn trailer() -> String {
    format!("\r\n--{}--\r\n", BOUNDARY)
}

/// Envelope Content-Length: payload size plus the exact preamble and
/// trailer lengths. Must never be derived by assembling the body, since
/// the payload can exceed available memory.
pub fn envelope_content_length(payload_size: usize, preamble: &str, trailer: &str) -> usize {
    payload_size + preamble.len() + trailer.len()
}

/// Pump the payload through a fixed chunk buffer: fill from the source,
/// flush to the transport when the chunk fills, then flush the remainder
/// when the source is exhausted.
pub async fn stream_payload<W, S>(w: &mut W, source: &mut S) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    S: PayloadSource + ?Sized,
{
    let mut chunk = [0u8; STREAM_CHUNK_SIZE];
    let mut filled = 0usize;
    while source.has_more() {
        chunk[filled] = source.next_byte();
        filled += 1;
        if filled == STREAM_CHUNK_SIZE {
            w.write_all(&chunk).await?;
            filled = 0;
        }
    }
    if filled > 0 {
        w.write_all(&chunk[..filled]).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_length_is_exact_sum() {
        let pre = preamble("42", "photo", "img.jpg", "image/jpeg");
        let tail = trailer();
        let file_size = 100_000;
        assert_eq!(
            envelope_content_length(file_size, &pre, &tail),
            file_size + pre.len() + tail.len()
        );
    }

    #[test]
    fn preamble_names_both_parts() {
        let pre = preamble("42", "photo", "img.jpg", "image/jpeg");
        assert!(pre.starts_with(&format!("--{}\r\n", BOUNDARY)));
        assert!(pre.contains("name=\"chat_id\"\r\n\r\n42\r\n"));
        assert!(pre.contains("name=\"photo\"; filename=\"img.jpg\"\r\n"));
        assert!(pre.contains("Content-Type: image/jpeg\r\n"));
        assert!(pre.ends_with("\r\n\r\n"));
    }

    #[test]
    fn trailer_closes_the_boundary() {
        assert_eq!(trailer(), format!("\r\n--{}--\r\n", BOUNDARY));
    }

    #[tokio::test]
    async fn payload_larger_than_one_chunk_streams_completely() {
        let data: Vec<u8> = (0..(STREAM_CHUNK_SIZE * 2 + 37) as u32)
            .map(|i| (i % 251) as u8)
            .collect();
        let mut source = SliceSource::new(&data);
        let mut out = Vec::new();
        stream_payload(&mut out, &mut source).await.unwrap();
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn empty_payload_writes_nothing() {
        let mut source = SliceSource::new(b"");
        let mut out = Vec::new();
        stream_payload(&mut out, &mut source).await.unwrap();
        assert!(out.is_empty());
    }
}
