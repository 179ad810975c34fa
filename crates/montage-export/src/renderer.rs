//! Export execution — managed FFmpeg process with progress and
//! cancellation.
//!
//! The renderer owns at most one encoder subprocess at a time. Every
//! export terminates through exactly one of `Complete`, `Error`, or
//! `Canceled`, and the subprocess handle is always reaped.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use montage_core::{MontageError, Result};
use montage_media::{probe, MediaRegistry};
use montage_timeline::Project;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::plan::{synthesize, ExportPlan};
use crate::preflight::preflight;
use crate::progress::{ExportProgress, ProgressParser};
use crate::settings::ExportSettings;

/// Notification to the UI layer. `Complete`, `Error`, and `Canceled` are
/// terminal; exactly one of them ends every export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Progress(ExportProgress),
    Complete { output_path: PathBuf },
    Error { message: String },
    Canceled,
}

/// Cancellation control for an in-flight export.
///
/// Killing the encoder is an explicit user action, not a failure: the
/// export resolves as [`ExportEvent::Canceled`], never `Error`.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    child: Arc<Mutex<Option<Child>>>,
}

impl CancelHandle {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            child: Arc::new(Mutex::new(None)),
        }
    }

    /// Forcibly terminate the encoder.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        if let Some(child) = self.child.lock().as_mut() {
            let _ = child.kill();
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A running export: its event stream plus cancellation.
pub struct ExportJob {
    events: Receiver<ExportEvent>,
    cancel: CancelHandle,
    worker: Option<JoinHandle<()>>,
}

impl ExportJob {
    /// Event stream; ends after the terminal event.
    pub fn events(&self) -> &Receiver<ExportEvent> {
        &self.events
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cancellation of the running encode.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the export worker has finished.
    pub fn wait(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Drives exports for one host. At most one export is in flight per
/// renderer instance.
pub struct ExportRenderer {
    registry: Arc<dyn MediaRegistry>,
    in_flight: Arc<AtomicBool>,
}

impl ExportRenderer {
    pub fn new(registry: Arc<dyn MediaRegistry>) -> Self {
        Self {
            registry,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Compile and start an export. Synthesis errors (registry misses,
    /// malformed programs) fail synchronously; everything after that is
    /// reported through the job's event stream.
    pub fn export(&self, project: &Project, settings: ExportSettings) -> Result<ExportJob> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(MontageError::Validation(
                "an export is already running on this renderer".into(),
            ));
        }

        let plan = match synthesize(project, self.registry.as_ref(), &settings) {
            Ok(plan) => plan,
            Err(e) => {
                self.in_flight.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let (tx, rx) = unbounded();
        let cancel = CancelHandle::new();
        let worker_cancel = cancel.clone();
        let in_flight = Arc::clone(&self.in_flight);

        let worker = thread::spawn(move || {
            let outcome = run_encode(&plan, &tx, &worker_cancel);
            let _ = tx.send(outcome);
            in_flight.store(false, Ordering::SeqCst);
        });

        Ok(ExportJob {
            events: rx,
            cancel,
            worker: Some(worker),
        })
    }
}

/// Run the full encode and return the single terminal event.
fn run_encode(
    plan: &ExportPlan,
    progress: &Sender<ExportEvent>,
    cancel: &CancelHandle,
) -> ExportEvent {
    if let Err(e) = preflight(plan) {
        return ExportEvent::Error {
            message: e.to_string(),
        };
    }

    let args = plan.ffmpeg_args();
    debug!(?args, "spawning encoder");

    let mut child = match Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return ExportEvent::Error {
                message: format!("failed to spawn ffmpeg: {e}"),
            }
        }
    };

    let Some(stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return ExportEvent::Error {
            message: "failed to open encoder progress stream".into(),
        };
    };
    let stderr = child.stderr.take();

    // Collect diagnostics off the main loop so a chatty encoder can't
    // deadlock against a full stderr pipe.
    let diagnostics = thread::spawn(move || {
        let mut tail: Vec<String> = Vec::new();
        if let Some(stderr) = stderr {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                tail.push(line);
                if tail.len() > 40 {
                    tail.remove(0);
                }
            }
        }
        tail
    });

    // Hand the child to the cancel handle; cancel() kills it from here on.
    *cancel.child.lock() = Some(child);

    let started = Instant::now();
    let mut parser = ProgressParser::new(plan.duration);
    for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
        if let Some(update) = parser.parse_line(&line, started.elapsed().as_secs_f64()) {
            let _ = progress.send(ExportEvent::Progress(update));
        }
    }

    let captured = diagnostics.join().unwrap_or_default().join("\n");
    let status = cancel.child.lock().take().map(|mut child| child.wait());

    if cancel.is_canceled() {
        info!("export canceled by user");
        remove_partial(&plan.output_path);
        return ExportEvent::Canceled;
    }

    match status {
        Some(Ok(status)) if status.success() => match postflight(plan) {
            Ok(()) => {
                info!(output = %plan.output_path.display(), "export complete");
                ExportEvent::Complete {
                    output_path: plan.output_path.clone(),
                }
            }
            Err(e) => {
                remove_partial(&plan.output_path);
                ExportEvent::Error {
                    message: e.to_string(),
                }
            }
        },
        Some(Ok(status)) => {
            remove_partial(&plan.output_path);
            ExportEvent::Error {
                message: format!("encoder exited with {status}: {captured}"),
            }
        }
        Some(Err(e)) => {
            remove_partial(&plan.output_path);
            ExportEvent::Error {
                message: format!("failed to wait for encoder: {e}"),
            }
        }
        None => {
            remove_partial(&plan.output_path);
            ExportEvent::Error {
                message: "encoder process handle was lost".into(),
            }
        }
    }
}

/// Post-flight: the output must exist, be non-empty, and probe to a
/// duration near the project's. A mismatch beyond one second is logged
/// but not fatal; an unprobeable file is.
fn postflight(plan: &ExportPlan) -> Result<()> {
    let metadata = fs::metadata(&plan.output_path).map_err(|_| {
        MontageError::Probe(format!(
            "encoder produced no output at {}",
            plan.output_path.display()
        ))
    })?;
    if metadata.len() == 0 {
        return Err(MontageError::Probe("encoder produced an empty file".into()));
    }

    let probed = probe(&plan.output_path)?;
    let drift = (probed.duration - plan.duration).abs();
    if drift > 1.0 {
        warn!(
            expected = plan.duration,
            probed = probed.duration,
            "output duration differs from project duration"
        );
    }
    Ok(())
}

fn remove_partial(path: &std::path::Path) {
    if fs::remove_file(path).is_ok() {
        debug!(path = %path.display(), "removed partial output");
    }
}
