//! Replay of a JSON-lines action feed through a session.
//!
//! Each non-blank line is one action envelope. The clock is sampled once
//! per line and passed to the engine as `now`, and once more for each
//! settlement acknowledgement. Rejected actions are logged by the engine
//! and skipped. Accepted ones are persisted immediately and any withdrawal
//! they created is offered to the settlement bridge.

use std::path::Path;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use homestead_core::Session;
use homestead_types::{FarmId, Timestamp};

use crate::error::HostError;
use crate::settlement::{SettlementBridge, settle};
use crate::store::SnapshotStore;

/// What happened over one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    /// Non-blank lines read.
    pub lines: u64,
    /// Actions the engine accepted.
    pub committed: u64,
    /// Actions the engine refused, including undecodable lines.
    pub rejected: u64,
    /// Withdrawals the bridge settled.
    pub settled: u64,
}

/// Where the feed comes from and where its results go.
pub struct Replay<'a, S, B> {
    /// Farm being replayed.
    pub farm: FarmId,
    /// Snapshot destination.
    pub store: &'a S,
    /// Settlement destination.
    pub bridge: &'a mut B,
}

impl<S: SnapshotStore, B: SettlementBridge> Replay<'_, S, B> {
    /// Feed every line of `reader` to `session`, reading `now` from `clock`.
    ///
    /// Only storage and read failures abort the replay.
    pub async fn run<R>(
        &mut self,
        session: &mut Session,
        reader: R,
        source: &Path,
        clock: impl Fn() -> Timestamp,
    ) -> Result<FeedSummary, HostError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = FeedSummary::default();
        let mut lines = reader.lines();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|err| HostError::io(source, err))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            summary.lines = summary.lines.saturating_add(1);

            if session.submit_json(line, clock()).is_err() {
                summary.rejected = summary.rejected.saturating_add(1);
                continue;
            }
            summary.committed = summary.committed.saturating_add(1);

            let settled = settle(session, &mut *self.bridge, self.farm, &clock);
            summary.settled = summary.settled.saturating_add(settled);
            self.store.save(self.farm, session.state()).await?;
        }

        tracing::info!(
            source = %source.display(),
            lines = summary.lines,
            committed = summary.committed,
            rejected = summary.rejected,
            settled = summary.settled,
            "Feed finished"
        );
        Ok(summary)
    }
}
