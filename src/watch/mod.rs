//! Watch dispatcher: a two-state (idle/running) supervisor over debounced
//! filesystem events.
//!
//! Change events are debounced, matched against the watch rules, and the
//! union task list is executed on a worker thread. In interrupt mode a new
//! matching event abandons the in-flight run (its cancel token is set, the
//! worker is not awaited) and a fresh run starts for the latest event -
//! last-write-wins, not a queue. A failed dispatch is reported and the
//! supervisor returns to idle; watching has no terminal state of its own and
//! runs until externally stopped.

mod debouncer;
mod rules;

pub use rules::WatchRuleSet;

use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, RecvTimeoutError};
use notify::{RecursiveMode, Watcher};

use crate::config::SiteConfig;
use crate::core::is_shutdown;
use crate::task::{self, CancelToken};
use crate::{log, logger};

use debouncer::Debouncer;

/// Poll interval cap so the loop notices shutdown promptly.
const POLL_CAP: Duration = Duration::from_millis(200);

/// Watch the source tree and dispatch rebuilds until externally stopped.
pub fn run(config: &SiteConfig) -> Result<()> {
    let rule_set = WatchRuleSet::from_config(config)?;

    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |event| {
        tx.send(event).ok();
    })
    .context("failed to create filesystem watcher")?;

    let source = &config.build.source;
    watcher
        .watch(source, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", source.display()))?;
    log!("watch"; "watching {}", source.display());

    let mut debouncer = Debouncer::new(Duration::from_millis(config.watch.debounce_ms));
    let mut supervisor = Supervisor::new(config.clone());

    loop {
        if is_shutdown() {
            log!("watch"; "stopped");
            return Ok(());
        }

        let timeout = debouncer.sleep_duration().min(POLL_CAP);
        match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(err)) => log!("watch"; "watcher error: {err}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        if let Some(changes) = debouncer.take_if_ready() {
            let paths: Vec<PathBuf> = changes.into_keys().collect();
            let tasks = rule_set.tasks_for_all(paths.iter().map(PathBuf::as_path));
            if tasks.is_empty() {
                continue;
            }

            let summary = dispatch_summary(&paths, &tasks);
            supervisor.dispatch(tasks, summary);
        }
    }
}

/// One-line description of what triggered a dispatch.
fn dispatch_summary(paths: &[PathBuf], tasks: &[String]) -> String {
    let shown = paths
        .first()
        .map(|p| crate::utils::path::file_name(p).to_string())
        .unwrap_or_default();
    let extra = paths.len().saturating_sub(1);
    if extra > 0 {
        format!("{shown} (+{extra} more) → {}", tasks.join(", "))
    } else {
        format!("{shown} → {}", tasks.join(", "))
    }
}

// ============================================================================
// Supervisor
// ============================================================================

/// An in-flight dispatch.
struct InFlight {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

/// Two-state supervisor: idle when `running` is `None`.
struct Supervisor {
    config: SiteConfig,
    interrupt: bool,
    running: Option<InFlight>,
}

impl Supervisor {
    fn new(config: SiteConfig) -> Self {
        let interrupt = config.watch.interrupt;
        Self {
            config,
            interrupt,
            running: None,
        }
    }

    /// Dispatch a task list, applying the interrupt policy to any run still
    /// in flight.
    fn dispatch(&mut self, tasks: Vec<String>, summary: String) {
        // A finished worker means the supervisor is idle again
        if self
            .running
            .as_ref()
            .is_some_and(|r| r.handle.is_finished())
        {
            let finished = self.running.take().unwrap();
            finished.handle.join().ok();
        }

        if let Some(in_flight) = self.running.take() {
            if self.interrupt {
                // Abandon: cancel and do not await - last write wins
                crate::debug!("watch"; "interrupting in-flight run");
                in_flight.cancel.cancel();
            } else {
                // Interrupt disabled: let the current run finish first
                in_flight.handle.join().ok();
            }
        }

        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let config = self.config.clone();
        let handle = std::thread::spawn(move || {
            logger::status_unchanged(&summary);
            match task::run_with_cancel(&tasks, &config, &worker_cancel) {
                Ok(()) if worker_cancel.is_cancelled() => {}
                Ok(()) => logger::status_success(&summary),
                // Dispatch errors are reported; the watch session survives
                Err(err) => logger::status_error(&summary, &format!("{err:#}")),
            }
        });

        self.running = Some(InFlight { cancel, handle });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_summary_single() {
        let paths = vec![PathBuf::from("src/styles/home.scss")];
        let tasks = vec!["sass".to_string(), "rewrite-css".to_string()];
        assert_eq!(
            dispatch_summary(&paths, &tasks),
            "home.scss → sass, rewrite-css"
        );
    }

    #[test]
    fn test_dispatch_summary_many() {
        let paths = vec![
            PathBuf::from("src/styles/a.scss"),
            PathBuf::from("src/styles/b.scss"),
        ];
        let tasks = vec!["sass".to_string()];
        assert_eq!(dispatch_summary(&paths, &tasks), "a.scss (+1 more) → sass");
    }

    #[test]
    fn test_supervisor_starts_idle() {
        let supervisor = Supervisor::new(SiteConfig::default());
        assert!(supervisor.running.is_none());
        assert!(supervisor.interrupt);
    }

    #[test]
    fn test_supervisor_interrupt_cancels_previous() {
        let mut config = SiteConfig::default();
        // Point at a throwaway output so `clean` is a cheap no-op
        config.build.output = std::env::temp_dir().join("sitefab-watch-test-none");
        let mut supervisor = Supervisor::new(config);

        // Simulate an in-flight run that is still working
        let first_cancel = CancelToken::new();
        let handle = std::thread::spawn(|| {
            std::thread::sleep(Duration::from_millis(300));
        });
        supervisor.running = Some(InFlight {
            cancel: first_cancel.clone(),
            handle,
        });

        supervisor.dispatch(vec!["clean".into()], "second".into());
        // The in-flight run's token was cancelled when the new event arrived
        assert!(first_cancel.is_cancelled());

        // Drain the second worker
        let in_flight = supervisor.running.take().unwrap();
        in_flight.handle.join().unwrap();
    }

    #[test]
    fn test_supervisor_no_interrupt_awaits_previous() {
        let mut config = SiteConfig::default();
        config.build.output = std::env::temp_dir().join("sitefab-watch-test-none");
        config.watch.interrupt = false;
        let mut supervisor = Supervisor::new(config);

        let first_cancel = CancelToken::new();
        let handle = std::thread::spawn(|| {
            std::thread::sleep(Duration::from_millis(50));
        });
        supervisor.running = Some(InFlight {
            cancel: first_cancel.clone(),
            handle,
        });

        supervisor.dispatch(vec!["clean".into()], "second".into());
        // Interrupt disabled: the previous run was awaited, never cancelled
        assert!(!first_cancel.is_cancelled());

        let in_flight = supervisor.running.take().unwrap();
        in_flight.handle.join().unwrap();
    }
}
