//! Collects features the rendering backend can only approximate.

use crate::error::SetupError;
use crate::keypath::AnimationKeypath;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

/// Whether a soft incompatibility is recorded or escalated into a [`SetupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatibilityMode {
    #[default]
    Track,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityIssue {
    pub keypath: AnimationKeypath,
    pub message: String,
}

impl fmt::Display for CompatibilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keypath.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "[{}] {}", self.keypath, self.message)
        }
    }
}

/// Append-only log shared by reference across one setup pass.
///
/// Writes go through a `RefCell`; the setup traversal is strictly sequential.
#[derive(Debug, Default)]
pub struct CompatibilityTracker {
    mode: CompatibilityMode,
    issues: RefCell<Vec<CompatibilityIssue>>,
}

impl CompatibilityTracker {
    pub fn new(mode: CompatibilityMode) -> Self {
        Self {
            mode,
            issues: RefCell::new(Vec::new()),
        }
    }

    pub fn mode(&self) -> CompatibilityMode {
        self.mode
    }

    /// Records `message` when `condition` is false.
    ///
    /// In [`CompatibilityMode::Abort`] the issue is returned as
    /// [`SetupError::Incompatible`] instead of being recorded.
    pub fn assert(
        &self,
        condition: bool,
        keypath: &AnimationKeypath,
        message: impl Into<String>,
    ) -> Result<(), SetupError> {
        if condition {
            return Ok(());
        }

        let issue = CompatibilityIssue {
            keypath: keypath.clone(),
            message: message.into(),
        };

        match self.mode {
            CompatibilityMode::Track => {
                tracing::warn!(keypath = %issue.keypath, "{}", issue.message);
                self.issues.borrow_mut().push(issue);
                Ok(())
            }
            CompatibilityMode::Abort => Err(SetupError::Incompatible(issue)),
        }
    }

    /// Runs `f`, discarding any issue it recorded if it fails.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce() -> Result<T, SetupError>,
    ) -> Result<T, SetupError> {
        let checkpoint = self.issues.borrow().len();
        let result = f();
        if result.is_err() {
            self.issues.borrow_mut().truncate(checkpoint);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.issues.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.borrow().is_empty()
    }

    pub fn issues(&self) -> Vec<CompatibilityIssue> {
        self.issues.borrow().clone()
    }

    pub fn into_issues(self) -> Vec<CompatibilityIssue> {
        self.issues.into_inner()
    }

    /// Human readable summary, one issue per line.
    pub fn report(&self) -> String {
        let issues = self.issues.borrow();
        if issues.is_empty() {
            return "No compatibility issues".to_string();
        }
        let mut out = format!("{} compatibility issue(s):", issues.len());
        for issue in issues.iter() {
            out.push_str("\n - ");
            out.push_str(&issue.to_string());
        }
        out
    }
}
