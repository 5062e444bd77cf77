//! # Core Application Logic
//!
//! Wires the pure adapter to its collaborators. Knows nothing about the CLI.
//!
//! ```text
//!            ┌──────────────┐
//!            │   CLI/main   │
//!            └──────┬───────┘
//!                   ▼
//!            ┌──────────────┐      ┌────────────────────┐
//!            │ ChatService  │─────▶│ inference::adapter │  (pure)
//!            └──┬────────┬──┘      └────────────────────┘
//!               ▼        ▼
//!      ┌────────────┐ ┌───────────────┐
//!      │ Transport  │ │ DocumentStore │
//!      │ (Bedrock)  │ │ (file/memory) │
//!      └────────────┘ └───────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: layered settings (defaults → file → env → CLI)
//! - [`chat`]: the `ChatService` request/response cycle

pub mod chat;
pub mod config;

pub use chat::{ChatError, ChatService};
