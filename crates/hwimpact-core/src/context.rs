//! Per-call compute context

/// Identity of one compute call, carried on its tracing span
#[derive(Debug, Clone)]
pub struct ComputeContext {
    pub trace_id: String,
    /// What is being computed, e.g. `server` or `cpu`
    pub subject: String,
}

impl ComputeContext {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            subject: subject.into(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }
}
