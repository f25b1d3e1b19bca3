//! Task orchestrator.
//!
//! Named primitive tasks plus composite macros. Composites expand to an
//! ordered list of primitives by pure textual substitution before anything
//! executes, so unknown names and cycles are caught while the output tree is
//! still untouched. Execution is strictly sequential and fail-fast: a later
//! task may assume every earlier task's files are fully on disk.

mod builtin;

pub use builtin::task_names;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::config::SiteConfig;
use crate::{debug, log};

/// Orchestrator errors.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task name resolves to neither a primitive nor a composite.
    /// Raised at expansion time, before any side effect.
    #[error("unknown task `{0}`")]
    Unknown(String),

    /// A composite expands through itself.
    /// Raised at expansion time, before any side effect.
    #[error("cyclic task reference through `{0}`")]
    Cycle(String),

    /// A primitive task's collaborator failed. Remaining tasks do not run;
    /// completed tasks' output stays on disk.
    #[error("task `{task}` failed")]
    Failed {
        task: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Cooperative cancellation flag, observed between primitive tasks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Expand task names into an ordered list of primitives.
///
/// Pure: touches nothing on disk. Duplicates are preserved (a task listed
/// twice runs twice); the watch dispatcher deduplicates its own union lists
/// before calling in.
pub fn expand<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static str>, TaskError> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    for name in names {
        expand_into(name.as_ref(), &mut out, &mut stack)?;
    }
    Ok(out)
}

fn expand_into(
    name: &str,
    out: &mut Vec<&'static str>,
    stack: &mut Vec<&'static str>,
) -> Result<(), TaskError> {
    if let Some(primitive) = builtin::primitive(name) {
        out.push(primitive.name);
        return Ok(());
    }

    let Some((composite, deps)) = builtin::composite(name) else {
        return Err(TaskError::Unknown(name.to_string()));
    };

    if stack.contains(&composite) {
        return Err(TaskError::Cycle(composite.to_string()));
    }
    stack.push(composite);
    for dep in deps {
        expand_into(dep, out, stack)?;
    }
    stack.pop();
    Ok(())
}

/// Run a list of task names to completion.
pub fn run<S: AsRef<str>>(names: &[S], config: &SiteConfig) -> Result<(), TaskError> {
    run_with_cancel(names, config, &CancelToken::new())
}

/// Run a list of task names, checking the cancel token between primitives.
///
/// Returns `Ok(())` when cancelled: an abandoned run's partial output is
/// acceptable, the next run fully reproduces the affected subset.
pub fn run_with_cancel<S: AsRef<str>>(
    names: &[S],
    config: &SiteConfig,
    cancel: &CancelToken,
) -> Result<(), TaskError> {
    let primitives = expand(names)?;
    debug!("task"; "running: {}", primitives.join(", "));

    for name in primitives {
        if cancel.is_cancelled() || crate::core::is_shutdown() {
            debug!("task"; "cancelled before `{name}`");
            return Ok(());
        }

        let primitive = builtin::primitive(name).expect("expanded names are primitives");
        if let Err(source) = (primitive.run)(config) {
            log!("error"; "task `{name}` failed: {source:#}");
            return Err(TaskError::Failed { task: name, source });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_primitive() {
        let tasks = expand(&["clean"]).unwrap();
        assert_eq!(tasks, vec!["clean"]);
    }

    #[test]
    fn test_expand_build_composite() {
        let tasks = expand(&["build"]).unwrap();
        // clean + compile(7) + min(3) + organize(2)
        assert_eq!(tasks[0], "clean");
        assert!(tasks.contains(&"sass"));
        assert!(tasks.contains(&"rewrite-min"));
        assert_eq!(*tasks.last().unwrap(), "rewrite-organized");
        assert_eq!(tasks.len(), 13);
    }

    #[test]
    fn test_expand_test_composite() {
        assert_eq!(expand(&["test"]).unwrap(), vec!["clean", "babel"]);
    }

    #[test]
    fn test_expand_default_is_start() {
        assert_eq!(expand(&["default"]).unwrap(), expand(&["start"]).unwrap());
    }

    #[test]
    fn test_expand_unknown() {
        let err = expand(&["no-such-task"]).unwrap_err();
        assert!(matches!(err, TaskError::Unknown(name) if name == "no-such-task"));
    }

    #[test]
    fn test_expand_preserves_order_and_duplicates() {
        let tasks = expand(&["clean", "test"]).unwrap();
        assert_eq!(tasks, vec!["clean", "clean", "babel"]);
    }

    #[test]
    fn test_ordering_within_compile() {
        let tasks = expand(&["compile"]).unwrap();
        let pos = |name| tasks.iter().position(|t| *t == name).unwrap();
        // Rewrites run only after every compiler has written its output
        assert!(pos("rewrite-html") > pos("html"));
        assert!(pos("rewrite-html") > pos("sass"));
        assert!(pos("rewrite-css") > pos("sass"));
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_run_unknown_task_fails_before_side_effects() {
        let config = SiteConfig::default();
        let err = run(&["clean", "no-such-task"], &config).unwrap_err();
        // Expansion error: clean must not have run (no output dir to remove
        // here, but the error kind proves expansion happened first)
        assert!(matches!(err, TaskError::Unknown(_)));
    }

    #[test]
    fn test_cancelled_run_is_ok() {
        let config = SiteConfig::default();
        let token = CancelToken::new();
        token.cancel();
        assert!(run_with_cancel(&["clean"], &config, &token).is_ok());
    }
}
