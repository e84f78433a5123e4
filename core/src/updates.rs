/*
 * updates.rs
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

//! Update batch decoder. Parses a fetched getUpdates body with serde_json,
//! classifies each result element by update kind, and copies the selected
//! fields into the pre-allocated record slots. Deduplication is a single
//! last-seen id: an element whose update_id equals the cursor is dropped
//! silently. The cursor is a scalar, not a seen-set, so ids delivered out
//! of increasing order would be re-accepted; acknowledgment offsets
//! depend on this, so the limitation stays.
//!
//! Writes are bounded twice over: each text copy is clipped to the field
//! capacity, and decoding stops outright when every slot is taken.

use serde_json::Value;

use crate::config::{MAX_DATE_LENGTH, MAX_ID_LENGTH, MAX_MESSAGE_TEXT_LENGTH, MAX_USER_NAME_LENGTH};
use crate::types::{copy_bounded, UpdateKind, UpdateRecord};

/// Decode a fetched batch into `slots`, advancing `cursor` for every
/// accepted element. Returns the number of newly populated records.
pub fn decode_updates(body: &[u8], slots: &mut [UpdateRecord], cursor: &mut i64) -> usize {
    let root: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => {
            // Distinguish a dropped/empty reply from a batch the scratch
            // buffer clipped; only the diagnostics differ.
            if body.len() < 2 {
                eprintln!("[telegram] update parse failed: response too short, likely a connection problem");
            } else {
                eprintln!("[telegram] update parse failed: batch may exceed the response buffer");
            }
            return 0;
        }
    };

    let results = match root.get("result").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list,
        _ => return 0,
    };

    let mut count = 0usize;
    for result in results {
        let update_id = result.get("update_id").and_then(Value::as_i64).unwrap_or(0);
        if update_id == *cursor {
            // Already handled on a previous poll; a repeat, not an error.
            continue;
        }
        if count >= slots.len() {
            // Out of record slots: stop decoding, leave the remaining
            // elements for the next poll rather than writing past the end.
            break;
        }
        *cursor = update_id;
        populate_record(&mut slots[count], result, update_id);
        count += 1;
    }
    count
}

fn populate_record(record: &mut UpdateRecord, result: &Value, update_id: i64) {
    record.clear();
    record.update_id = update_id;

    if let Some(message) = result.get("message") {
        record.kind = Some(UpdateKind::Message);
        fill_from_message(record, message);
    } else if let Some(post) = result.get("channel_post") {
        // Channel posts are attributed to the channel; there is no sender.
        record.kind = Some(UpdateKind::ChannelPost);
        copy_field(&mut record.text, post.get("text"), MAX_MESSAGE_TEXT_LENGTH);
        copy_field(&mut record.date, post.get("date"), MAX_DATE_LENGTH);
        copy_field(&mut record.chat_id, chat_field(post, "id"), MAX_ID_LENGTH);
        copy_field(&mut record.chat_title, chat_field(post, "title"), MAX_USER_NAME_LENGTH);
    } else if let Some(query) = result.get("callback_query") {
        record.kind = Some(UpdateKind::CallbackQuery);
        copy_field(&mut record.from_id, from_field(query, "id"), MAX_ID_LENGTH);
        copy_field(&mut record.from_name, from_field(query, "first_name"), MAX_USER_NAME_LENGTH);
        copy_field(&mut record.text, query.get("data"), MAX_MESSAGE_TEXT_LENGTH);
        // Date and chat come from the originating message, which the
        // server may no longer reference.
        if let Some(origin) = query.get("message") {
            copy_field(&mut record.date, origin.get("date"), MAX_DATE_LENGTH);
            copy_field(&mut record.chat_id, chat_field(origin, "id"), MAX_ID_LENGTH);
        }
    } else if let Some(edited) = result.get("edited_message") {
        record.kind = Some(UpdateKind::EditedMessage);
        fill_from_message(record, edited);
    }
}

/// Common shape of `message` and `edited_message`: sender, chat, date,
/// then either a text body or a location.
fn fill_from_message(record: &mut UpdateRecord, message: &Value) {
    copy_field(&mut record.from_id, from_field(message, "id"), MAX_ID_LENGTH);
    copy_field(&mut record.from_name, from_field(message, "first_name"), MAX_USER_NAME_LENGTH);
    copy_field(&mut record.date, message.get("date"), MAX_DATE_LENGTH);
    copy_field(&mut record.chat_id, chat_field(message, "id"), MAX_ID_LENGTH);
    // Private chats have no title; the field stays empty.
    copy_field(&mut record.chat_title, chat_field(message, "title"), MAX_USER_NAME_LENGTH);

    if message.get("text").is_some() {
        copy_field(&mut record.text, message.get("text"), MAX_MESSAGE_TEXT_LENGTH);
    } else if let Some(location) = message.get("location") {
        record.longitude = location.get("longitude").and_then(Value::as_f64).unwrap_or(0.0) as f32;
        record.latitude = location.get("latitude").and_then(Value::as_f64).unwrap_or(0.0) as f32;
    }
}

fn chat_field<'a>(message: &'a Value, key: &str) -> Option<&'a Value> {
    message.get("chat").and_then(|chat| chat.get(key))
}

fn from_field<'a>(message: &'a Value, key: &str) -> Option<&'a Value> {
    message.get("from").and_then(|from| from.get(key))
}

/// Render a string or numeric field into `dst`, clipped to `cap` bytes.
/// Identifiers and dates arrive as JSON numbers but are stored as text.
fn copy_field(dst: &mut String, value: Option<&Value>, cap: usize) {
    match value {
        Some(Value::String(s)) => copy_bounded(dst, s, cap),
        Some(Value::Number(n)) => copy_bounded(dst, &n.to_string(), cap),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(n: usize) -> Vec<UpdateRecord> {
        (0..n).map(|_| UpdateRecord::new()).collect()
    }

    fn message_update(update_id: i64, text: &str) -> String {
        format!(
            r#"{{"update_id":{},"message":{{"from":{{"id":11,"first_name":"Ada"}},"chat":{{"id":-5,"title":"lab"}},"date":1700000000,"text":"{}"}}}}"#,
            update_id, text
        )
    }

    #[test]
    fn well_formed_batch_fills_slots_and_advances_cursor() {
        let body = format!(
            r#"{{"ok":true,"result":[{},{}]}}"#,
            message_update(100, "one"),
            message_update(101, "two")
        );
        let mut records = slots(2);
        let mut cursor = 0i64;
        let n = decode_updates(body.as_bytes(), &mut records, &mut cursor);
        assert_eq!(n, 2);
        assert_eq!(cursor, 101);
        assert_eq!(records[0].text, "one");
        assert_eq!(records[1].text, "two");
        assert_eq!(records[0].kind, Some(UpdateKind::Message));
    }

    #[test]
    fn element_matching_cursor_is_dropped() {
        let body = format!(
            r#"{{"ok":true,"result":[{},{}]}}"#,
            message_update(100, "seen"),
            message_update(101, "new")
        );
        let mut records = slots(2);
        let mut cursor = 100i64;
        let n = decode_updates(body.as_bytes(), &mut records, &mut cursor);
        assert_eq!(n, 1);
        assert_eq!(cursor, 101);
        assert_eq!(records[0].text, "new");
    }

    #[test]
    fn decoding_stops_when_slots_are_exhausted() {
        let body = format!(
            r#"{{"ok":true,"result":[{},{},{}]}}"#,
            message_update(1, "a"),
            message_update(2, "b"),
            message_update(3, "c")
        );
        let mut records = slots(1);
        let mut cursor = 0i64;
        let n = decode_updates(body.as_bytes(), &mut records, &mut cursor);
        assert_eq!(n, 1);
        // Unprocessed elements stay unacknowledged for the next poll.
        assert_eq!(cursor, 1);
        assert_eq!(records[0].text, "a");
    }

    #[test]
    fn empty_result_list_reports_zero() {
        let mut records = slots(1);
        let mut cursor = 0i64;
        assert_eq!(decode_updates(br#"{"ok":true,"result":[]}"#, &mut records, &mut cursor), 0);
        assert_eq!(decode_updates(br#"{"ok":true}"#, &mut records, &mut cursor), 0);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn unparseable_body_reports_zero() {
        let mut records = slots(1);
        let mut cursor = 0i64;
        assert_eq!(decode_updates(b"", &mut records, &mut cursor), 0);
        assert_eq!(decode_updates(b"{\"ok\":true,\"resu", &mut records, &mut cursor), 0);
    }

    #[test]
    fn numeric_ids_and_dates_are_rendered_as_text() {
        let body = format!(r#"{{"result":[{}]}}"#, message_update(7, "x"));
        let mut records = slots(1);
        let mut cursor = 0i64;
        decode_updates(body.as_bytes(), &mut records, &mut cursor);
        assert_eq!(records[0].from_id, "11");
        assert_eq!(records[0].chat_id, "-5");
        assert_eq!(records[0].date, "1700000000");
    }

    #[test]
    fn location_message_sets_coordinates_and_leaves_text_empty() {
        let body = r#"{"result":[{"update_id":8,"message":{"from":{"id":1,"first_name":"Ada"},"chat":{"id":2},"date":3,"location":{"longitude":13.5,"latitude":52.25}}}]}"#;
        let mut records = slots(1);
        let mut cursor = 0i64;
        assert_eq!(decode_updates(body.as_bytes(), &mut records, &mut cursor), 1);
        assert!(records[0].text.is_empty());
        assert_eq!(records[0].longitude, 13.5);
        assert_eq!(records[0].latitude, 52.25);
        // Private chat: no title.
        assert!(records[0].chat_title.is_empty());
    }

    #[test]
    fn channel_post_has_no_sender_identity() {
        let body = r#"{"result":[{"update_id":9,"channel_post":{"chat":{"id":-100,"title":"news"},"date":4,"text":"bulletin"}}]}"#;
        let mut records = slots(1);
        let mut cursor = 0i64;
        assert_eq!(decode_updates(body.as_bytes(), &mut records, &mut cursor), 1);
        let r = &records[0];
        assert_eq!(r.kind, Some(UpdateKind::ChannelPost));
        assert_eq!(r.text, "bulletin");
        assert_eq!(r.chat_title, "news");
        assert!(r.from_id.is_empty());
        assert!(r.from_name.is_empty());
    }

    #[test]
    fn callback_query_takes_body_from_data_and_context_from_origin() {
        let body = r#"{"result":[{"update_id":10,"callback_query":{"from":{"id":5,"first_name":"Eve"},"data":"ledon","message":{"date":99,"chat":{"id":42}}}}]}"#;
        let mut records = slots(1);
        let mut cursor = 0i64;
        assert_eq!(decode_updates(body.as_bytes(), &mut records, &mut cursor), 1);
        let r = &records[0];
        assert_eq!(r.kind, Some(UpdateKind::CallbackQuery));
        assert_eq!(r.text, "ledon");
        assert_eq!(r.from_name, "Eve");
        assert_eq!(r.date, "99");
        assert_eq!(r.chat_id, "42");
        assert!(r.chat_title.is_empty());
    }

    #[test]
    fn callback_query_without_origin_message_has_no_context() {
        let body = r#"{"result":[{"update_id":11,"callback_query":{"from":{"id":5,"first_name":"Eve"},"data":"x"}}]}"#;
        let mut records = slots(1);
        let mut cursor = 0i64;
        assert_eq!(decode_updates(body.as_bytes(), &mut records, &mut cursor), 1);
        assert!(records[0].date.is_empty());
        assert!(records[0].chat_id.is_empty());
    }

    #[test]
    fn stale_fields_are_cleared_before_repopulation() {
        let mut records = slots(1);
        let mut cursor = 0i64;
        let first = r#"{"result":[{"update_id":1,"message":{"from":{"id":1,"first_name":"Ada"},"chat":{"id":2,"title":"lab"},"date":3,"text":"hello"}}]}"#;
        decode_updates(first.as_bytes(), &mut records, &mut cursor);
        assert_eq!(records[0].chat_title, "lab");
        let second = r#"{"result":[{"update_id":2,"channel_post":{"chat":{"id":-1,"title":"wire"},"date":4,"text":"post"}}]}"#;
        decode_updates(second.as_bytes(), &mut records, &mut cursor);
        let r = &records[0];
        assert_eq!(r.kind, Some(UpdateKind::ChannelPost));
        assert!(r.from_name.is_empty());
        assert_eq!(r.chat_title, "wire");
    }
}
