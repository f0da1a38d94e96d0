use std::io::Write;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

#[async_trait]
/// Trait contract for `CliRuntime` behavior.
///
/// Capability bundle standing in for the process streams and exit code.
/// Command logic only ever talks to this bundle; `main()` is the single
/// place the real process-backed implementation is constructed.
pub trait CliRuntime: Send + Sync {
    /// Reads the whole input stream into one string. Commands read the
    /// stream at most once per invocation.
    async fn read_input_to_string(&self) -> std::io::Result<String>;

    fn write_out(&self, text: &str);

    fn write_err(&self, text: &str);

    /// Stores the exit code for the invocation. Last write wins.
    fn set_exit_code(&self, code: i32);

    fn exit_code(&self) -> i32;
}

#[derive(Debug, Default)]
/// Runtime bound to the real process streams.
pub struct ProcessRuntime {
    exit_code: AtomicI32,
}

#[async_trait]
impl CliRuntime for ProcessRuntime {
    async fn read_input_to_string(&self) -> std::io::Result<String> {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        Ok(buffer)
    }

    fn write_out(&self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn write_err(&self, text: &str) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(text.as_bytes());
        let _ = stderr.flush();
    }

    fn set_exit_code(&self, code: i32) {
        self.exit_code.store(code, Ordering::Relaxed);
    }

    fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
/// In-memory runtime double used by dispatch tests.
pub struct MemoryRuntime {
    input: Mutex<Option<String>>,
    out: Mutex<String>,
    err: Mutex<String>,
    exit_code: AtomicI32,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loads the string one stdin read will return.
    pub fn with_input(input: impl Into<String>) -> Self {
        let runtime = Self::default();
        *lock_or_recover(&runtime.input) = Some(input.into());
        runtime
    }

    pub fn out(&self) -> String {
        lock_or_recover(&self.out).clone()
    }

    pub fn err(&self) -> String {
        lock_or_recover(&self.err).clone()
    }
}

#[async_trait]
impl CliRuntime for MemoryRuntime {
    async fn read_input_to_string(&self) -> std::io::Result<String> {
        lock_or_recover(&self.input).take().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no input bound to the runtime",
            )
        })
    }

    fn write_out(&self, text: &str) {
        lock_or_recover(&self.out).push_str(text);
    }

    fn write_err(&self, text: &str) {
        lock_or_recover(&self.err).push_str(text);
    }

    fn set_exit_code(&self, code: i32) {
        self.exit_code.store(code, Ordering::Relaxed);
    }

    fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::Relaxed)
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
