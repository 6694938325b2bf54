//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → init logging → init TracerService → bind listener → serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or Shutdown::trigger → stop accepting → drain → TracerService::shutdown
//! ```
//!
//! # Design Decisions
//! - The tracer is created before the listener binds, so no request is
//!   ever served without it
//! - The tracer is shut down after the server drains, so in-flight spans
//!   are exported

pub mod shutdown;

pub use shutdown::Shutdown;
