//! ovis-server: web layer for the ovis demo service
//!
//! Serves the upload form, validates requests and routes them to the
//! track or segment pipeline, then maps the outcome back to the
//! (message, video) pair the form displays.

pub mod dispatch;
pub mod http;
pub mod ui;
