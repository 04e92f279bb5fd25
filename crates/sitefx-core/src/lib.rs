#![forbid(unsafe_code)]

//! Core: canonical input events, key sequence matching, interactive node
//! tags, and viewport reveal triggers.

pub mod event;
pub mod geometry;
pub mod interactive;
pub mod key_sequence;
pub mod visibility;
