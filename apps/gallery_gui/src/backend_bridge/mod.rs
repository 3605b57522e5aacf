//! Backend bridge: command queue from the UI, tokio worker, and event intake.

pub mod commands;
pub mod runtime;
