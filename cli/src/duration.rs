use std::time::Instant;

/// Logs how long a scope took when dropped.
pub struct LogDuration {
    operation: String,
    start: Instant,
}

impl LogDuration {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        tracing::info!(
            operation = %self.operation,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            "operation finished"
        );
    }
}
