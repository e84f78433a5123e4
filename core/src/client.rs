/*
 * client.rs
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

//! Bot client: one connection, one scratch buffer, one set of update
//! record slots. Every public operation frames a request, collects the
//! reply, and interprets it with the verifier (sends) or the update
//! decoder (polls). Failures of any flavor resolve to `false` or a zero
//! count at this boundary; nothing structured escapes.
//!
//! GET and POST cycles leave the connection open so a follow-up response
//! check can reuse it; the operation closes it when it resolves. The
//! multipart path closes unconditionally. One request is in flight at a
//! time by construction (`&mut self` everywhere); do not share a client
//! across tasks without external synchronization.

use std::io;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::buffer::ScratchBuffer;
use crate::config::{ClientConfig, MAX_USER_NAME_LENGTH, SCRATCH_CAPACITY, TOKEN_LENGTH};
use crate::connection::Connection;
use crate::multipart::{self, PayloadSource};
use crate::request;
use crate::requests;
use crate::response;
use crate::retry::RetryPolicy;
use crate::types::{copy_bounded, Identity, UpdateRecord};
use crate::updates;
use crate::verify;

/// Bytes escaped in query-string values: controls plus the characters that
/// would terminate the value or the request line.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'?');

fn encode_query(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Telegram Bot API client. Owns the transport connection and every
/// fixed-size buffer; create once and reuse for the process lifetime.
pub struct BotClient {
    config: ClientConfig,
    token: String,
    conn: Connection,
    scratch: ScratchBuffer,
    records: Vec<UpdateRecord>,
    /// Dedup cursor: the last accepted update id. A scalar, not a seen-set.
    last_update_id: i64,
    retry: RetryPolicy,
    identity: Identity,
}

impl BotClient {
    pub fn new(token: &str, config: ClientConfig) -> Self {
        let mut bounded_token = String::new();
        copy_bounded(&mut bounded_token, token, TOKEN_LENGTH);
        let conn = Connection::new(&config.host, config.port, config.use_tls);
        let slots = config.update_slots.max(1);
        let records = (0..slots).map(|_| UpdateRecord::new()).collect();
        let retry = RetryPolicy::new(config.send_retry_budget);
        Self {
            token: bounded_token,
            conn,
            scratch: ScratchBuffer::new(SCRATCH_CAPACITY),
            records,
            last_update_id: 0,
            retry,
            identity: Identity::default(),
            config,
        }
    }

    /// Update records populated by the most recent poll. Only the first
    /// `n` are meaningful, where `n` is what [`get_updates`] returned.
    ///
    /// [`get_updates`]: BotClient::get_updates
    pub fn updates(&self) -> &[UpdateRecord] {
        &self.records
    }

    /// The bot's own identity, filled in by [`get_me`](BotClient::get_me).
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn last_update_id(&self) -> i64 {
        self.last_update_id
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Release the connection. Needed after a poll that returned updates,
    /// which deliberately keeps the connection open for a reply.
    pub async fn close(&mut self) {
        self.conn.close().await;
    }

    // ── Public operations ────────────────────────────────────────────

    /// Fetch the bot's display name and handle. Closes the connection.
    pub async fn get_me(&mut self) -> bool {
        let command = format!("bot{}/getMe", self.token);
        self.send_get(&command, self.config.wait_for_response).await;
        let ok = self.decode_identity();
        self.conn.close().await;
        ok
    }

    /// Poll for updates past `offset`. Returns the number of records
    /// populated. An empty or unparseable reply closes the connection so
    /// the next poll starts fresh; a reply with new updates keeps it open
    /// because there may be a response to send back.
    pub async fn get_updates(&mut self, offset: i64) -> usize {
        let command = self.poll_command(offset);
        self.send_get(&command, self.config.poll_deadline()).await;

        if self.scratch.is_empty() {
            self.conn.close().await;
            return 0;
        }
        let count =
            updates::decode_updates(self.scratch.as_slice(), &mut self.records, &mut self.last_update_id);
        if count > 0 {
            return count;
        }
        self.conn.close().await;
        0
    }

    /// Send a text message as a JSON POST. Retries blindly within the
    /// send budget until the reply verifies.
    pub async fn send_message(&mut self, chat_id: &str, text: &str, parse_mode: &str) -> bool {
        let body = requests::build_message_body(chat_id, text, parse_mode);
        self.post_with_retry("sendMessage", &body).await
    }

    /// Send a text message as a single GET with the text in the query
    /// string. Smaller on the wire than the POST form, but length-bounded.
    pub async fn send_simple_message(&mut self, chat_id: &str, text: &str, parse_mode: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let command = format!(
            "bot{}/sendMessage?chat_id={}&text={}&parse_mode={}",
            self.token,
            encode_query(chat_id),
            encode_query(text),
            encode_query(parse_mode)
        );
        self.get_with_retry(&command).await
    }

    /// Send a message with a reply keyboard (JSON array of button rows).
    pub async fn send_message_with_reply_keyboard(
        &mut self,
        chat_id: &str,
        text: &str,
        parse_mode: &str,
        keyboard: &str,
        resize: bool,
        one_time: bool,
        selective: bool,
    ) -> bool {
        let body = requests::build_reply_keyboard_body(
            chat_id, text, parse_mode, keyboard, resize, one_time, selective,
        );
        self.post_with_retry("sendMessage", &body).await
    }

    /// Send a message with an inline keyboard (JSON array of button rows).
    pub async fn send_message_with_inline_keyboard(
        &mut self,
        chat_id: &str,
        text: &str,
        parse_mode: &str,
        keyboard: &str,
    ) -> bool {
        let body = requests::build_inline_keyboard_body(chat_id, text, parse_mode, keyboard);
        self.post_with_retry("sendMessage", &body).await
    }

    /// Broadcast a chat action ("typing", "upload_photo", ...).
    pub async fn send_chat_action(&mut self, chat_id: &str, action: &str) -> bool {
        if action.is_empty() {
            return false;
        }
        let command = format!(
            "bot{}/sendChatAction?chat_id={}&action={}",
            self.token,
            encode_query(chat_id),
            encode_query(action)
        );
        self.get_with_retry(&command).await
    }

    /// Send a photo referenced by URL or file id, with optional caption,
    /// notification suppression, reply target and keyboard.
    pub async fn send_photo(
        &mut self,
        chat_id: &str,
        photo: &str,
        caption: &str,
        disable_notification: bool,
        reply_to_message_id: i64,
        keyboard: &str,
    ) -> bool {
        let body = requests::build_photo_body(
            chat_id,
            photo,
            caption,
            disable_notification,
            reply_to_message_id,
            keyboard,
        );
        self.post_with_retry("sendPhoto", &body).await
    }

    /// Upload a photo as multipart/form-data, streaming the bytes from
    /// `source` in bounded chunks. Not retried: the source is consumed by
    /// the attempt. Always closes the connection.
    pub async fn send_photo_by_binary<S: PayloadSource + ?Sized>(
        &mut self,
        chat_id: &str,
        content_type: &str,
        payload_size: usize,
        source: &mut S,
    ) -> bool {
        self.send_multipart("sendPhoto", "photo", "img.jpg", content_type, chat_id, payload_size, source)
            .await;
        verify::check_ok_response(self.scratch.as_slice())
    }

    // ── Command construction ─────────────────────────────────────────

    fn poll_command(&self, offset: i64) -> String {
        let mut command = format!(
            "bot{}/getUpdates?offset={}&limit={}",
            self.token,
            offset,
            self.records.len()
        );
        if self.config.long_poll > 0 {
            command.push_str(&format!("&timeout={}", self.config.long_poll));
        }
        command
    }

    fn decode_identity(&mut self) -> bool {
        let root: Value = match serde_json::from_slice(self.scratch.as_slice()) {
            Ok(v) => v,
            Err(_) => return false,
        };
        let result = match root.get("result") {
            Some(r) => r,
            None => return false,
        };
        if let Some(name) = result.get("first_name").and_then(Value::as_str) {
            copy_bounded(&mut self.identity.name, name, MAX_USER_NAME_LENGTH);
        }
        if let Some(username) = result.get("username").and_then(Value::as_str) {
            copy_bounded(&mut self.identity.username, username, MAX_USER_NAME_LENGTH);
        }
        true
    }

    // ── Request/response cycles ──────────────────────────────────────

    /// One GET cycle: clear scratch, connect if needed, frame the request,
    /// collect the raw reply. A connect or write failure leaves the
    /// scratch empty, which callers treat as "no response".
    async fn send_get(&mut self, command: &str, deadline: std::time::Duration) {
        self.scratch.clear();
        if !self.conn.ensure_connected().await {
            return;
        }
        let stream = match self.conn.stream_mut() {
            Some(s) => s,
            None => return,
        };
        if request::write_get(stream, command).await.is_err() {
            return;
        }
        response::read_response(stream, &mut self.scratch, deadline, false).await;
    }

    /// One POST cycle: same as [`send_get`](Self::send_get) but with full
    /// headers on the way out and the header block discarded on the way in.
    async fn send_post(&mut self, command: &str, body: &[u8]) {
        self.scratch.clear();
        if !self.conn.ensure_connected().await {
            return;
        }
        let stream = match self.conn.stream_mut() {
            Some(s) => s,
            None => return,
        };
        if request::write_post(stream, &self.config.host, command, body).await.is_err() {
            return;
        }
        response::read_response(stream, &mut self.scratch, self.config.wait_for_response, true).await;
    }

    /// One multipart cycle. Content-Length is computed from the part
    /// lengths before anything is written; the payload never exists in
    /// memory as a whole. Closes the connection unconditionally.
    async fn send_multipart<S: PayloadSource + ?Sized>(
        &mut self,
        command: &str,
        field_name: &str,
        file_name: &str,
        content_type: &str,
        chat_id: &str,
        payload_size: usize,
        source: &mut S,
    ) {
        self.scratch.clear();
        if self.conn.ensure_connected().await {
            let preamble = multipart::preamble(chat_id, field_name, file_name, content_type);
            let trailer = multipart::trailer();
            let content_length = multipart::envelope_content_length(payload_size, &preamble, &trailer);
            let head = format!(
                "POST /bot{}/{} HTTP/1.1\r\n\
                 Host: {}\r\n\
                 User-Agent: telegrafo/0.1\r\n\
                 Accept: */*\r\n\
                 Content-Length: {}\r\n\
                 Content-Type: multipart/form-data; boundary={}\r\n\
                 \r\n",
                self.token,
                request::bound_command(command),
                self.config.host,
                content_length,
                multipart::BOUNDARY
            );
            if let Some(stream) = self.conn.stream_mut() {
                if write_envelope(stream, &head, &preamble, source, &trailer).await.is_ok() {
                    response::read_response(
                        stream,
                        &mut self.scratch,
                        self.config.wait_for_response,
                        true,
                    )
                    .await;
                }
            }
        }
        self.conn.close().await;
    }

    // ── Retry loops ──────────────────────────────────────────────────

    /// Re-send the same POST until the reply verifies or the wall-clock
    /// budget runs out. Blind: no backoff, no failure classification.
    async fn post_with_retry(&mut self, method: &str, body: &[u8]) -> bool {
        let command = format!("bot{}/{}", self.token, method);
        let window = self.retry.start();
        let mut sent = false;
        while !window.expired() {
            self.send_post(&command, body).await;
            sent = verify::check_ok_response(self.scratch.as_slice());
            if sent {
                break;
            }
        }
        self.conn.close().await;
        sent
    }

    /// GET-form counterpart of [`post_with_retry`](Self::post_with_retry).
    async fn get_with_retry(&mut self, command: &str) -> bool {
        let window = self.retry.start();
        let mut sent = false;
        while !window.expired() {
            self.send_get(command, self.config.wait_for_response).await;
            sent = verify::check_ok_response(self.scratch.as_slice());
            if sent {
                break;
            }
        }
        self.conn.close().await;
        sent
    }
}

async fn write_envelope<W, S>(
    w: &mut W,
    head: &str,
    preamble: &str,
    source: &mut S,
    trailer: &str,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    S: PayloadSource + ?Sized,
{
    w.write_all(head.as_bytes()).await?;
    w.write_all(preamble.as_bytes()).await?;
    multipart::stream_payload(w, source).await?;
    w.write_all(trailer.as_bytes()).await?;
    w.flush().await
}
