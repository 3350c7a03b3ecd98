//! Essentials Player Library Crate
//!
//! Configuration, application state and the native audio backend for the
//! `essentials` binary, which is a thin wrapper around this library.

pub mod audio;
pub mod config;
pub mod state;
