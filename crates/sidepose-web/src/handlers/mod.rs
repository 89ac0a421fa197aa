//! HTTP / WebSocket 핸들러.

pub mod side;
pub mod ws;
