// src/exec/capture.rs

//! Background draining of a child's stdout / stderr.
//!
//! Pipes are read continuously while the child runs (otherwise a chatty
//! tool blocks on a full pipe buffer and looks hung). Bytes land in a
//! shared buffer, so whatever was read before a stop or an IO error is
//! still available afterwards.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct CaptureBuffer {
    data: Vec<u8>,
    truncated: bool,
    error: Option<String>,
}

/// Text drained from one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub text: String,
    /// Reached EOF (as opposed to giving up after the drain timeout).
    pub complete: bool,
    /// Output exceeded the byte cap; the excess was discarded.
    pub truncated: bool,
    /// Read error that ended the capture early.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct OutputCapture {
    stream: &'static str,
    buffer: Arc<Mutex<CaptureBuffer>>,
    task: Option<JoinHandle<()>>,
}

impl OutputCapture {
    /// Start draining `reader`. `None` produces an empty, complete capture.
    pub fn spawn<R>(reader: Option<R>, stream: &'static str, max_bytes: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(CaptureBuffer::default()));
        let task = reader.map(|reader| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(drain(reader, buffer, max_bytes))
        });
        Self {
            stream,
            buffer,
            task,
        }
    }

    /// Wait up to `wait` for EOF, then hand back whatever was read.
    ///
    /// Never fails: a stuck pipe (e.g. a detached grandchild still holding
    /// it) or a read error yields partial output.
    pub async fn finish(mut self, wait: Duration) -> CapturedOutput {
        let mut complete = true;
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(wait, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(stream = self.stream, error = %e, "output capture task failed");
                }
                Err(_) => {
                    debug!(stream = self.stream, "pipe still open after drain timeout");
                    task.abort();
                    complete = false;
                }
            }
        }

        let mut buf = lock(&self.buffer);
        let data = std::mem::take(&mut buf.data);
        if buf.truncated {
            warn!(stream = self.stream, kept = data.len(), "output truncated");
        }
        if let Some(ref e) = buf.error {
            warn!(stream = self.stream, error = %e, "error reading output; keeping partial data");
        }

        CapturedOutput {
            text: String::from_utf8_lossy(&data).into_owned(),
            complete,
            truncated: buf.truncated,
            error: buf.error.take(),
        }
    }
}

async fn drain<R>(mut reader: R, buffer: Arc<Mutex<CaptureBuffer>>, max_bytes: usize)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let mut buf = lock(&buffer);
                let room = max_bytes.saturating_sub(buf.data.len());
                let take = n.min(room);
                buf.data.extend_from_slice(&chunk[..take]);
                if take < n {
                    buf.truncated = true;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                lock(&buffer).error = Some(e.to_string());
                break;
            }
        }
    }
}

fn lock(buffer: &Mutex<CaptureBuffer>) -> std::sync::MutexGuard<'_, CaptureBuffer> {
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
