//! MediTrack
//!
//! The `meditrack` CLI lives in `main.rs`; this library exposes the pieces
//! shared with the `meditrack-server` binary.

pub mod server;
