//! Loading flag and last error shared by the stores

use serde::Serialize;

use crate::error::LearningResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

impl LoadState {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Clear the loading flag and keep the failure message, if any
    pub fn finish<T>(&mut self, result: LearningResult<T>, operation: &str) -> LearningResult<T> {
        self.loading = false;
        if let Err(e) = &result {
            tracing::warn!(operation, error = %e, "Learning store operation failed");
            self.error = Some(e.to_string());
        }
        result
    }
}
