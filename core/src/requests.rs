/*
 * requests.rs
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

//! JSON request body builders for Bot API calls. One builder per body,
//! returning the serialized bytes whose length becomes Content-Length.
//! Optional fields default on the remote side, so they are only emitted
//! when set; that keeps the payloads small.

use serde_json::{json, Value};

/// sendMessage body: `{"chat_id":"...","text":"..."}` plus optional parse_mode.
pub fn build_message_body(chat_id: &str, text: &str, parse_mode: &str) -> Vec<u8> {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": text,
    });
    if !parse_mode.is_empty() {
        payload["parse_mode"] = json!(parse_mode);
    }
    serde_json::to_vec(&payload).unwrap_or_default()
}

/// sendMessage body with a reply keyboard. `keyboard` is the JSON array of
/// button rows as text; if it does not parse, an empty keyboard is sent.
pub fn build_reply_keyboard_body(
    chat_id: &str,
    text: &str,
    parse_mode: &str,
    keyboard: &str,
    resize: bool,
    one_time: bool,
    selective: bool,
) -> Vec<u8> {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": text,
    });
    if !parse_mode.is_empty() {
        payload["parse_mode"] = json!(parse_mode);
    }
    let rows: Value = serde_json::from_str(keyboard).unwrap_or_else(|_| json!([]));
    let mut markup = json!({ "keyboard": rows });
    if resize {
        markup["resize_keyboard"] = json!(true);
    }
    if one_time {
        markup["one_time_keyboard"] = json!(true);
    }
    if selective {
        markup["selective"] = json!(true);
    }
    payload["reply_markup"] = markup;
    serde_json::to_vec(&payload).unwrap_or_default()
}

/// sendMessage body with an inline keyboard (JSON array of button rows as text).
pub fn build_inline_keyboard_body(
    chat_id: &str,
    text: &str,
    parse_mode: &str,
    keyboard: &str,
) -> Vec<u8> {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": text,
    });
    if !parse_mode.is_empty() {
        payload["parse_mode"] = json!(parse_mode);
    }
    let rows: Value = serde_json::from_str(keyboard).unwrap_or_else(|_| json!([]));
    payload["reply_markup"] = json!({ "inline_keyboard": rows });
    serde_json::to_vec(&payload).unwrap_or_default()
}

/// sendPhoto body for a photo referenced by URL or file id.
pub fn build_photo_body(
    chat_id: &str,
    photo: &str,
    caption: &str,
    disable_notification: bool,
    reply_to_message_id: i64,
    keyboard: &str,
) -> Vec<u8> {
    let mut payload = json!({
        "chat_id": chat_id,
        "photo": photo,
    });
    if !caption.is_empty() {
        payload["caption"] = json!(caption);
    }
    if disable_notification {
        payload["disable_notification"] = json!(true);
    }
    if reply_to_message_id != 0 {
        payload["reply_to_message_id"] = json!(reply_to_message_id);
    }
    if !keyboard.is_empty() {
        let rows: Value = serde_json::from_str(keyboard).unwrap_or_else(|_| json!([]));
        payload["reply_markup"] = json!({ "keyboard": rows });
    }
    serde_json::to_vec(&payload).unwrap_or_default()
}
