//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `event`: push-channel event DTOs (WebSocket and SSE share them)
//! - `http`: HTTP API request/response DTOs

pub mod conversion;
pub mod event;
pub mod http;
