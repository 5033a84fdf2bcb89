//! bucket-notify-cli - Operator commands for the bucket-notify demo
//!
//! This crate provides the `bucket-notify` binary, which provisions the two
//! buckets, deploys the handler function, wires the bucket notification,
//! runs the handler locally, and tears everything down again.

pub mod aws;
pub mod config;
pub mod deploy;
pub mod local;
pub mod provision;
pub mod registrar;
pub mod teardown;
