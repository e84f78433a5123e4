/*
 * types.rs
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

//! Update records, update kinds, and the bot's own identity. Record text
//! fields are bounded by the capacities in [`crate::config`]; copies are
//! truncated at a char boundary, never grown past the field capacity.

/// Kind of a decoded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    ChannelPost,
    CallbackQuery,
    EditedMessage,
}

impl UpdateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::Message => "message",
            UpdateKind::ChannelPost => "channel_post",
            UpdateKind::CallbackQuery => "callback_query",
            UpdateKind::EditedMessage => "edited_message",
        }
    }
}

/// One decoded update. Slots are allocated up front and overwritten in
/// place on each poll; absent optional fields are empty strings or zero
/// coordinates.
#[derive(Debug, Clone)]
pub struct UpdateRecord {
    pub text: String,
    pub chat_id: String,
    pub chat_title: String,
    pub from_id: String,
    pub from_name: String,
    pub date: String,
    pub kind: Option<UpdateKind>,
    pub longitude: f32,
    pub latitude: f32,
    pub update_id: i64,
}

impl UpdateRecord {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            chat_id: String::new(),
            chat_title: String::new(),
            from_id: String::new(),
            from_name: String::new(),
            date: String::new(),
            kind: None,
            longitude: 0.0,
            latitude: 0.0,
            update_id: 0,
        }
    }

    /// Reset every field before the slot is repopulated, so nothing from a
    /// previous poll can leak through.
    pub fn clear(&mut self) {
        self.text.clear();
        self.chat_id.clear();
        self.chat_title.clear();
        self.from_id.clear();
        self.from_name.clear();
        self.date.clear();
        self.kind = None;
        self.longitude = 0.0;
        self.latitude = 0.0;
        self.update_id = 0;
    }
}

impl Default for UpdateRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// The bot's own display name and handle, populated by the identity fetch.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub name: String,
    pub username: String,
}

/// Replace `dst` with at most `cap` bytes of `src`, truncating at a char
/// boundary so the result stays valid UTF-8.
pub fn copy_bounded(dst: &mut String, src: &str, cap: usize) {
    dst.clear();
    if src.len() <= cap {
        dst.push_str(src);
        return;
    }
    let mut end = cap;
    while end > 0 && !src.is_char_boundary(end) {
        end -= 1;
    }
    dst.push_str(&src[..end]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_bounded_fits() {
        let mut s = String::from("stale");
        copy_bounded(&mut s, "hello", 10);
        assert_eq!(s, "hello");
    }

    #[test]
    fn copy_bounded_truncates_to_capacity() {
        let mut s = String::new();
        copy_bounded(&mut s, "abcdef", 4);
        assert_eq!(s, "abcd");
    }

    #[test]
    fn copy_bounded_respects_char_boundaries() {
        let mut s = String::new();
        // 'é' is two bytes; a 3-byte cap must not split it.
        copy_bounded(&mut s, "aéé", 3);
        assert_eq!(s, "aé");
    }

    #[test]
    fn record_clear_resets_all_fields() {
        let mut r = UpdateRecord::new();
        r.text = "hi".into();
        r.kind = Some(UpdateKind::Message);
        r.longitude = 1.5;
        r.update_id = 42;
        r.clear();
        assert!(r.text.is_empty());
        assert!(r.kind.is_none());
        assert_eq!(r.longitude, 0.0);
        assert_eq!(r.update_id, 0);
    }
}
