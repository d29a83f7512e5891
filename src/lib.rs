//! runjs
//!
//! Facade over the workspace crates: load `user_code.js` from a code
//! directory and run it once in an embedded JavaScript engine.
//!
//! ```no_run
//! use runjs::{EngineConfig, HostContext, Job, Runner};
//!
//! let runner = Runner::new(EngineConfig::new(), HostContext::inherit());
//! let outcome = runner.run(&Job::new("/srv/functions/hello"));
//! std::process::exit(outcome.exit_code());
//! ```

pub use runjs_core::{ExecutionOutcome, Job, RunError, SOURCE_FILE_NAME, SourceUnit, Stage};
pub use runjs_engine::{Capture, Engine, EngineConfig, HostContext, Runner, Sink, Stream, describe};
pub use runjs_loader as loader;
