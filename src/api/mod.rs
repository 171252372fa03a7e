//! API module for HTTP and WebSocket endpoints
//!
//! This module provides the poll REST API and WebSocket real-time updates.

pub mod http;
pub mod rest;
pub mod websocket;
