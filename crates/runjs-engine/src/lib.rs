//! runjs engine
//!
//! Evaluates a loaded `user_code.js` inside an embedded QuickJS runtime.
//! Scripts see only what the host context grants them: `console`, timers,
//! `queueMicrotask` and a read-only `process.env`/`process.argv`.

mod config;
mod describe;
mod engine;
mod host;
mod runner;

pub use config::EngineConfig;
pub use describe::describe;
pub use engine::Engine;
pub use host::{Capture, HostContext, Sink, Stream};
pub use runner::Runner;
