//! Wire log - append-only transcript of the engine pipe
//!
//! Records are handed to a background task over an unbounded channel so the
//! request/response path never waits on the file.
//!
//! ```text
//! > 0          action id written
//! < 3 15 -1    line read
//! # note       session event
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::types::ActionId;

#[derive(Debug, Clone)]
pub enum WireRecord {
    Sent(ActionId),
    Received(String),
    Note(String),
}

pub struct WireLog {
    tx: mpsc::UnboundedSender<WireRecord>,
    task: JoinHandle<()>,
}

impl WireLog {
    /// Start the writer task. Must be called inside a tokio runtime.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<WireRecord>();
        let task = tokio::spawn(async move {
            if let Err(e) = write_records(&path, rx).await {
                eprintln!("[Engine] wire log {} error: {:#}", path.display(), e);
            }
        });
        Self { tx, task }
    }

    pub fn record(&self, record: WireRecord) {
        let _ = self.tx.send(record);
    }

    /// Flush everything recorded so far and stop the writer.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn write_records(
    path: &Path,
    mut rx: mpsc::UnboundedReceiver<WireRecord>,
) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("open {}", path.display()))?;

    let mut buf: Vec<u8> = Vec::with_capacity(4096);
    while let Some(record) = rx.recv().await {
        buf.clear();
        match record {
            WireRecord::Sent(id) => writeln!(buf, "> {}", id)?,
            WireRecord::Received(line) => writeln!(buf, "< {}", line)?,
            WireRecord::Note(note) => writeln!(buf, "# {}", note)?,
        }
        file.write_all(&buf).await.context("write record")?;
    }

    file.flush().await.context("flush")?;
    Ok(())
}
