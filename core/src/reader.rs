//! Log following: replay what is already in the file, then poll for appends.
//!
//! The tail keeps a single handle open for the whole session, so there is no
//! seek between the historical pass and the live pass: the same buffered
//! reader simply keeps reading past what used to be end-of-file. Bytes of a
//! line that is still being written are held back until its newline arrives.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::time::sleep;

use crate::error::LogSourceError;
use crate::power_log::LogLine;

/// Where a new tail starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPosition {
    /// Deliver every existing line, then follow.
    #[default]
    Beginning,
    /// Skip existing content and only deliver lines appended from now on.
    End,
}

pub struct LogTail {
    path: PathBuf,
    reader: BufReader<File>,
    /// Bytes consumed so far, including any held-back partial line.
    offset: u64,
    pending: Vec<u8>,
    seq: u64,
    poll_interval: Duration,
    live: bool,
}

impl LogTail {
    /// Open `path` for following. Failing to open is fatal and reported
    /// before any line is produced.
    pub async fn open<P: AsRef<Path>>(
        path: P,
        start: StartPosition,
        poll_interval: Duration,
    ) -> Result<Self, LogSourceError> {
        let path = path.as_ref().to_path_buf();
        let mut file = open_file(&path).await?;

        let offset = match start {
            StartPosition::Beginning => 0,
            StartPosition::End => file
                .seek(SeekFrom::End(0))
                .await
                .map_err(|source| LogSourceError::Read {
                    path: path.clone(),
                    source,
                })?,
        };

        tracing::info!(path = %path.display(), ?start, "[TAIL] Opened log file");

        Ok(Self {
            path,
            reader: BufReader::new(file),
            offset,
            pending: Vec::new(),
            seq: 0,
            poll_interval,
            live: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence number of the last delivered line (0 before the first).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// True once the historical content has been exhausted.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Next complete line, waiting for appends if the file is exhausted.
    ///
    /// Cancel safe: bytes read before a cancellation stay in the pending buffer.
    pub async fn next_line(&mut self) -> Result<LogLine, LogSourceError> {
        loop {
            let n = self
                .reader
                .read_until(b'\n', &mut self.pending)
                .await
                .map_err(|source| LogSourceError::Read {
                    path: self.path.clone(),
                    source,
                })?;

            if n == 0 {
                if !self.live {
                    self.live = true;
                    tracing::info!(lines = self.seq, "[TAIL] History replayed, following appends");
                }
                self.recover_if_truncated().await?;
                sleep(self.poll_interval).await;
                continue;
            }

            self.offset += n as u64;
            if self.pending.last() != Some(&b'\n') {
                // Partial line; the rest is still being written.
                continue;
            }

            let text = decode_line(&self.pending);
            self.pending.clear();
            self.seq += 1;
            return Ok(LogLine {
                seq: self.seq,
                text,
            });
        }
    }

    /// Reopen from the start if the file shrank below what was already read.
    async fn recover_if_truncated(&mut self) -> Result<(), LogSourceError> {
        let len = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            // Gone or unreadable; keep polling the handle we have.
            Err(_) => return Ok(()),
        };

        if len >= self.offset {
            return Ok(());
        }

        tracing::warn!(
            path = %self.path.display(),
            len,
            offset = self.offset,
            "[TAIL] Log file truncated or rotated, reopening"
        );

        self.reader = BufReader::new(open_file(&self.path).await?);
        self.offset = 0;
        self.pending.clear();
        Ok(())
    }
}

async fn open_file(path: &Path) -> Result<File, LogSourceError> {
    File::open(path).await.map_err(|source| match source.kind() {
        ErrorKind::NotFound => LogSourceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LogSourceError::Open {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
