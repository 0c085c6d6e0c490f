// Lost & Found: notification fan-out and subscription management.
//
// This is the library root. Each module corresponds to one collaborator
// or handler of the notification core; `runtime` wires handlers to the
// invocation environment and `main.rs` exposes the same operations as a CLI.

pub mod aws;
pub mod config;
pub mod error;
pub mod identity;
pub mod items;
pub mod notify;
pub mod pipeline;
pub mod pubsub;
pub mod runtime;
