/*
 * lib.rs
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

//! Telegrafo core: a Telegram Bot API client for hosts with one connection
//! and fixed memory. Requests are framed directly onto the stream, file
//! uploads are streamed through a bounded chunk buffer, and long-polled
//! update batches are decoded into pre-allocated record slots.
//!
//! The transport (TCP/TLS via tokio + rustls) and the JSON tree
//! (serde_json) are collaborators; everything else - framing, multipart
//! envelopes, deadline reads, update decoding, send verification - lives
//! here.

pub mod buffer;
pub mod client;
pub mod config;
pub mod connection;
pub mod multipart;
pub mod net;
pub mod request;
pub mod requests;
pub mod response;
pub mod retry;
pub mod types;
pub mod updates;
pub mod verify;

pub use buffer::ScratchBuffer;
pub use client::BotClient;
pub use config::ClientConfig;
pub use multipart::{PayloadSource, SliceSource};
pub use retry::RetryPolicy;
pub use types::{Identity, UpdateKind, UpdateRecord};
