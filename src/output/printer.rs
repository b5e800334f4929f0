//! Background output worker
//!
//! All user-visible output is submitted as [`RenderJob`]s to a single worker
//! thread that writes them in submission order. The command loop calls
//! [`Printer::wait_drained`] before redrawing the prompt so that output and
//! prompt never interleave.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use super::table::format_table;
use super::terminal::{error_marker, status_marker, success_marker};

/// Queue depth before `submit` blocks
const QUEUE_CAPACITY: usize = 256;

/// Kind of message, decides the line prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Status,
    Success,
    Error,
}

impl Tone {
    fn marker(self) -> Option<String> {
        match self {
            Tone::Plain => None,
            Tone::Status => Some(status_marker()),
            Tone::Success => Some(success_marker()),
            Tone::Error => Some(error_marker()),
        }
    }
}

/// Where a job is written, fixed at submission time
#[derive(Debug, Clone)]
pub enum Destination {
    Stdout,
    Capture(Capture),
}

/// In-memory sink collecting rendered jobs
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<RenderJob>>>);

impl Capture {
    fn lock(&self) -> MutexGuard<'_, Vec<RenderJob>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every job rendered so far
    pub fn jobs(&self) -> Vec<RenderJob> {
        self.lock().clone()
    }

    /// Number of jobs with the given tone
    pub fn count(&self, tone: Tone) -> usize {
        self.lock().iter().filter(|job| job.tone == tone).count()
    }

    /// All output as it would have appeared on the terminal
    pub fn text(&self) -> String {
        self.lock().iter().map(RenderJob::rendered).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// One unit of output
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub parts: Vec<String>,
    pub sep: String,
    pub end: String,
    pub tone: Tone,
    pub destination: Destination,
}

impl RenderJob {
    /// Final text including the tone marker and terminator
    pub fn rendered(&self) -> String {
        let mut parts: Vec<String> = self.tone.marker().into_iter().collect();
        parts.extend(self.parts.iter().cloned());
        format!("{}{}", parts.join(&self.sep), self.end)
    }
}

/// What travels over the queue
enum Message {
    Render(RenderJob),
    /// Acknowledged once every job queued before it has been written
    Flush(Sender<()>),
}

/// Handle for submitting output to the worker
#[derive(Debug, Clone)]
pub struct Printer {
    tx: Sender<Message>,
    destination: Destination,
}

impl Printer {
    /// Start a worker writing to stdout
    pub fn spawn() -> Self {
        Self::spawn_with(Destination::Stdout)
    }

    /// Start a worker whose output is kept in memory
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        (Self::spawn_with(Destination::Capture(capture.clone())), capture)
    }

    pub fn spawn_with(destination: Destination) -> Self {
        let (tx, rx) = bounded(QUEUE_CAPACITY);
        thread::Builder::new()
            .name("curly-printer".to_string())
            .spawn(move || render_loop(rx))
            .map_err(|e| tracing::error!(error = %e, "failed to start printer thread"))
            .ok();
        Self { tx, destination }
    }

    /// Enqueue a job with this printer's destination
    pub fn submit(&self, parts: Vec<String>, sep: &str, end: &str, tone: Tone) {
        let job = RenderJob {
            parts,
            sep: sep.to_string(),
            end: end.to_string(),
            tone,
            destination: self.destination.clone(),
        };
        if let Err(err) = self.tx.send(Message::Render(job)) {
            // Worker is gone: render inline so nothing is lost
            if let Message::Render(job) = err.into_inner() {
                write_job(&job);
            }
        }
    }

    pub fn info(&self, msg: impl Display) {
        self.submit(vec![msg.to_string()], " ", "\n", Tone::Plain);
    }

    pub fn status(&self, msg: impl Display) {
        self.submit(vec![msg.to_string()], " ", "\n", Tone::Status);
    }

    pub fn success(&self, msg: impl Display) {
        self.submit(vec![msg.to_string()], " ", "\n", Tone::Success);
    }

    pub fn error(&self, msg: impl Display) {
        self.submit(vec![msg.to_string()], " ", "\n", Tone::Error);
    }

    /// Empty line
    pub fn blank(&self) {
        self.submit(Vec::new(), " ", "\n", Tone::Plain);
    }

    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        self.info(format_table(headers, rows));
    }

    /// Block until every job submitted so far has been rendered
    pub fn wait_drained(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.tx.send(Message::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

fn render_loop(rx: Receiver<Message>) {
    for message in rx.iter() {
        match message {
            Message::Render(job) => write_job(&job),
            Message::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn write_job(job: &RenderJob) {
    let text = job.rendered();
    match &job.destination {
        Destination::Stdout => {
            let mut out = io::stdout().lock();
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
        Destination::Capture(capture) => capture.lock().push(job.clone()),
    }
}
