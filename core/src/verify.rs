/*
 * verify.rs
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

//! Send verification: a response counts as success when the body contains
//! the literal API success marker. The body is scanned with a sliding
//! window rather than parsed; the marker may sit anywhere in the reply.

const OK_MARKER: &[u8] = b"{\"ok\":true";

/// True if `body` contains `{"ok":true` anywhere. A body shorter than the
/// marker can never match.
pub fn check_ok_response(body: &[u8]) -> bool {
    if body.len() < OK_MARKER.len() {
        return false;
    }
    body.windows(OK_MARKER.len()).any(|w| w == OK_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_is_never_ok() {
        assert!(!check_ok_response(b""));
        assert!(!check_ok_response(b"{\"ok\":tru"));
    }

    #[test]
    fn exact_ok_body_matches() {
        assert!(check_ok_response(b"{\"ok\":true,\"result\":{}}"));
    }

    #[test]
    fn marker_found_mid_body() {
        assert!(check_ok_response(b"garbage prefix {\"ok\":true}"));
    }

    #[test]
    fn ok_false_does_not_match() {
        assert!(!check_ok_response(b"{\"ok\":false,\"error_code\":400}"));
    }
}
