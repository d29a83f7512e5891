//! Embedded QuickJS engine with a fixed set of host capabilities

use crate::config::EngineConfig;
use crate::describe::{caught, describe};
use crate::host::{HostContext, Stream};
use rquickjs::context::EvalOptions;
use rquickjs::FromJs;
use rquickjs::{Context, Ctx, Function, Object, Runtime, Value};
use runjs_core::{RunError, SourceUnit};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const PRELUDE: &str = include_str!("js/prelude.js");
const LOOP_GLOBAL: &str = "__runjs_loop";

/// One-shot evaluator for a single source unit
///
/// `evaluate` consumes the engine, so a runtime never sees a second script.
pub struct Engine {
    runtime: Runtime,
    context: Context,
    config: EngineConfig,
    host: HostContext,
    timed_out: Arc<AtomicBool>,
}

impl Engine {
    /// Create a runtime and context with the configured limits
    ///
    /// # Errors
    ///
    /// Returns `RunError::Engine` if QuickJS cannot allocate the runtime
    pub fn new(config: EngineConfig, host: HostContext) -> Result<Self, RunError> {
        let runtime = Runtime::new().map_err(RunError::engine)?;
        if let Some(bytes) = config.memory_limit {
            runtime.set_memory_limit(bytes);
        }
        if let Some(bytes) = config.max_stack_size {
            runtime.set_max_stack_size(bytes);
        }

        runtime.set_host_promise_rejection_tracker(Some(Box::new(track_rejection)));

        let context = Context::full(&runtime).map_err(RunError::engine)?;

        Ok(Self {
            runtime,
            context,
            config,
            host,
            timed_out: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Evaluate the unit as a script, then drain promise jobs and timers
    ///
    /// # Errors
    ///
    /// Returns `RunError::Execution` for syntax errors, uncaught exceptions
    /// and unhandled rejections, and `RunError::Timeout` when the configured
    /// time budget runs out
    pub fn evaluate(self, unit: &SourceUnit) -> Result<(), RunError> {
        let deadline = self.arm_deadline();
        self.install_prelude(unit)?;

        log::debug!("evaluating {}", unit.path().display());
        self.context
            .with(|ctx| {
                let mut options = EvalOptions::default();
                options.strict = false;
                ctx.eval_with_options::<(), _>(unit.text(), options)
                    .map_err(|e| caught(&ctx, e))
            })
            .map_err(|description| self.classify(description))?;

        self.drain(deadline)
    }

    fn arm_deadline(&self) -> Option<Instant> {
        let timeout = self.config.timeout?;
        let deadline = Instant::now() + timeout;
        let timed_out = Arc::clone(&self.timed_out);
        self.runtime.set_interrupt_handler(Some(Box::new(move || {
            let expired = Instant::now() >= deadline;
            if expired {
                timed_out.store(true, Ordering::SeqCst);
            }
            expired
        })));
        Some(deadline)
    }

    fn install_prelude(&self, unit: &SourceUnit) -> Result<(), RunError> {
        let argv = vec!["runjs".to_string(), unit.path().display().to_string()];
        self.context
            .with(|ctx| install_bindings(&ctx, &self.host, argv).map_err(|e| caught(&ctx, e)))
            .map_err(RunError::engine)
    }

    /// Run queued work until nothing is left: microtasks first, then the
    /// earliest timer, repeated
    fn drain(&self, deadline: Option<Instant>) -> Result<(), RunError> {
        let mut jobs = 0;
        let mut timers = 0;

        loop {
            jobs += self.run_pending_jobs()?;
            self.check_rejections()?;

            let delay: f64 = self.call_loop("nextDelay")?;
            if delay < 0.0 {
                break;
            }
            self.wait(Duration::from_millis(delay.ceil() as u64), deadline)?;

            if self.call_loop::<bool>("fireNext")? {
                timers += 1;
            }
        }

        log::debug!("drained {jobs} promise jobs and {timers} timers");
        Ok(())
    }

    fn run_pending_jobs(&self) -> Result<usize, RunError> {
        let mut executed = 0;
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => executed += 1,
                Ok(false) => return Ok(executed),
                Err(job) => {
                    let description = job.0.with(|ctx| describe(&ctx.catch()));
                    return Err(self.classify(description));
                }
            }
        }
    }

    fn check_rejections(&self) -> Result<(), RunError> {
        let unhandled = self
            .context
            .with(|ctx| -> Result<Option<String>, String> {
                let reason = loop_function(&ctx, "takeRejection")
                    .and_then(|take| take.call::<_, Option<Object>>(()))
                    .and_then(|entry| entry.map(|e| e.get::<_, Value>("reason")).transpose())
                    .map_err(|e| caught(&ctx, e))?;
                Ok(reason.as_ref().map(describe))
            })
            .map_err(|description| self.classify(description))?;

        match unhandled {
            Some(reason) => Err(RunError::execution(format!("Uncaught (in promise) {reason}"))),
            None => Ok(()),
        }
    }

    fn call_loop<T>(&self, method: &str) -> Result<T, RunError>
    where
        T: for<'js> FromJs<'js>,
    {
        self.context
            .with(|ctx| {
                let result = loop_function(&ctx, method).and_then(|f| f.call::<_, T>(()));
                result.map_err(|e| caught(&ctx, e))
            })
            .map_err(|description| self.classify(description))
    }

    fn wait(&self, delay: Duration, deadline: Option<Instant>) -> Result<(), RunError> {
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now + delay >= deadline {
                thread::sleep(deadline.saturating_duration_since(now));
                self.timed_out.store(true, Ordering::SeqCst);
                return Err(self.timeout_error());
            }
        }
        thread::sleep(delay);
        Ok(())
    }

    fn classify(&self, description: String) -> RunError {
        if self.timed_out.load(Ordering::SeqCst) {
            self.timeout_error()
        } else {
            RunError::execution(description)
        }
    }

    fn timeout_error(&self) -> RunError {
        RunError::Timeout {
            limit_ms: self.config.timeout_ms().unwrap_or_default(),
        }
    }
}

fn loop_function<'js>(ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Function<'js>> {
    ctx.globals()
        .get::<_, Object>(LOOP_GLOBAL)?
        .get::<_, Function>(name)
}

/// Forward promise rejection events to the prelude's rejection map, keyed
/// by the promise itself
fn track_rejection<'js>(ctx: Ctx<'js>, promise: Value<'js>, reason: Value<'js>, is_handled: bool) {
    let tracked = loop_function(&ctx, "trackRejection")
        .and_then(|track| track.call::<_, ()>((promise, reason, is_handled)));
    if let Err(e) = tracked {
        log::warn!("failed to track promise rejection: {}", caught(&ctx, e));
    }
}

fn install_bindings<'js>(
    ctx: &Ctx<'js>,
    host: &HostContext,
    argv: Vec<String>,
) -> rquickjs::Result<()> {
    let sink = host.clone();
    let write = Function::new(ctx.clone(), move |fd: i32, message: String| {
        sink.write_line(Stream::from_fd(fd), &message);
    })?;

    let env = Object::new(ctx.clone())?;
    for (name, value) in host.env() {
        env.set(name.as_str(), value.as_str())?;
    }

    let prelude: Function = ctx.eval(PRELUDE)?;
    prelude.call::<_, ()>((write, env, argv))
}
