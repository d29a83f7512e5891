//! Host context handed to user code
//!
//! Everything a script can observe about the outside world goes through
//! here: two output sinks and an environment map.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared output sink
pub type Sink = Arc<Mutex<dyn Write + Send>>;

/// Output stream selected by a console call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// Map the descriptor number used by the prelude
    #[must_use]
    pub const fn from_fd(fd: i32) -> Self {
        if fd == 2 { Self::Stderr } else { Self::Stdout }
    }
}

#[derive(Clone)]
pub struct HostContext {
    stdout: Sink,
    stderr: Sink,
    env: BTreeMap<String, String>,
}

impl HostContext {
    /// Context with the given sinks and an empty environment
    #[must_use]
    pub fn new(stdout: Sink, stderr: Sink) -> Self {
        Self {
            stdout,
            stderr,
            env: BTreeMap::new(),
        }
    }

    /// Process stdout/stderr and the current environment
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn inherit() -> Self {
        let env = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::new(Arc::new(Mutex::new(io::stdout())), Arc::new(Mutex::new(io::stderr())))
            .with_env(env)
    }

    /// Context writing into in-memory buffers, with a handle to read them
    #[must_use]
    pub fn captured() -> (Self, Capture) {
        let capture = Capture::default();
        let host = Self::new(capture.stdout.clone(), capture.stderr.clone());
        (host, capture)
    }

    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.env.clear();
        self
    }

    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Write one console line; sink failures are logged, not raised into JS
    pub fn write_line(&self, stream: Stream, message: &str) {
        let sink = match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        };
        let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
        let result = sink
            .write_all(message.as_bytes())
            .and_then(|()| sink.write_all(b"\n"))
            .and_then(|()| sink.flush());
        if let Err(e) = result {
            log::warn!("dropping console output for {stream:?}: {e}");
        }
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Read side of a captured host context
#[derive(Clone, Default)]
pub struct Capture {
    stdout: Arc<Mutex<Vec<u8>>>,
    stderr: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    #[must_use]
    pub fn stdout(&self) -> String {
        Self::read(&self.stdout)
    }

    #[must_use]
    pub fn stderr(&self) -> String {
        Self::read(&self.stderr)
    }

    fn read(buffer: &Mutex<Vec<u8>>) -> String {
        let buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
