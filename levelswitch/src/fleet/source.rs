//! Newline-delimited JSON fleet-state source.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::model::{FleetSnapshot, FleetStateMessage};
use crate::switch::SwitchHandle;

/// Errors raised while reading fleet states.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying reader failed.
    #[error("I/O error reading fleet states: {0}")]
    Io(#[from] std::io::Error),

    /// The switch daemon stopped accepting snapshots.
    #[error("Switch daemon is no longer running")]
    DaemonStopped,
}

/// Reads [`FleetSnapshot`]s from a stream of JSON lines.
///
/// Blank lines are skipped. Lines that fail to parse are logged and skipped
/// so one bad message does not stop the stream.
pub struct SnapshotReader<R> {
    lines: Lines<R>,
    line_number: u64,
    malformed: u64,
}

impl<R> SnapshotReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Create a reader over the given buffered input.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            malformed: 0,
        }
    }

    /// Number of lines skipped because they could not be parsed.
    pub fn malformed_lines(&self) -> u64 {
        self.malformed
    }

    /// Read the next snapshot.
    ///
    /// Returns `Ok(None)` at end of input.
    pub async fn next_snapshot(&mut self) -> Result<Option<FleetSnapshot>, SourceError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<FleetStateMessage>(trimmed) {
                Ok(message) => return Ok(Some(FleetSnapshot::from(message))),
                Err(e) => {
                    self.malformed += 1;
                    warn!(
                        line = self.line_number,
                        error = %e,
                        "Skipping malformed fleet state"
                    );
                }
            }
        }
        Ok(None)
    }

    /// Forward every snapshot to the switch daemon until end of input or
    /// shutdown.
    ///
    /// Returns the number of snapshots forwarded.
    pub async fn forward(
        mut self,
        handle: SwitchHandle,
        shutdown: CancellationToken,
    ) -> Result<u64, SourceError> {
        let mut forwarded = 0u64;

        loop {
            let next = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("Fleet state source cancelled");
                    break;
                }

                next = self.next_snapshot() => next?,
            };

            let Some(snapshot) = next else {
                info!(
                    forwarded,
                    malformed = self.malformed,
                    "Fleet state input exhausted"
                );
                break;
            };

            if handle.submit(snapshot).await.is_err() {
                return Err(SourceError::DaemonStopped);
            }
            forwarded += 1;
        }

        Ok(forwarded)
    }
}
