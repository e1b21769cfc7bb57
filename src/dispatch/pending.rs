use std::collections::HashMap;

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::core::{CorrelationId, RankError};
use crate::rank::{ErrorInfo, QueryRequest, RankReport, ReportRecord};

pub(crate) type Outcome = Result<RankReport, RankError>;
pub(crate) type Reply = oneshot::Sender<Outcome>;

/// The waiting side of a submitted query.
///
/// Resolves exactly once: with the report when the terminal response arrives,
/// or with the error that ended the request.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
}

impl Completion {
    pub(crate) fn channel() -> (Reply, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Waits for the outcome.
    ///
    /// Returns [`RankError::Cancelled`] if the handler was dropped without
    /// resolving this request.
    pub async fn wait(self) -> Outcome {
        self.rx.await.unwrap_or(Err(RankError::Cancelled))
    }

    /// Takes the outcome if it is already available, without waiting.
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(RankError::Cancelled)),
        }
    }
}

/// A query waiting for the service to open (or for a free slot).
pub(crate) struct Queued {
    pub(crate) request: QueryRequest,
    pub(crate) reply: Reply,
}

struct PendingRequest {
    records: Vec<ReportRecord>,
    error: Option<ErrorInfo>,
    reply: Reply,
}

/// Sent requests keyed by the correlation id they were sent with.
#[derive(Default)]
pub(crate) struct PendingRequests {
    map: HashMap<CorrelationId, PendingRequest>,
}

impl PendingRequests {
    pub(crate) fn insert(&mut self, cid: CorrelationId, reply: Reply) {
        self.map.insert(
            cid,
            PendingRequest {
                records: Vec::new(),
                error: None,
                reply,
            },
        );
    }

    pub(crate) fn contains(&self, cid: &CorrelationId) -> bool {
        self.map.contains_key(cid)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn append(&mut self, cid: CorrelationId, records: Vec<ReportRecord>) {
        if let Some(p) = self.map.get_mut(&cid) {
            p.records.extend(records);
        }
    }

    pub(crate) fn set_error(&mut self, cid: CorrelationId, info: ErrorInfo) {
        if let Some(p) = self.map.get_mut(&cid) {
            p.error = Some(info);
        }
    }

    /// Resolves `cid` with what has been collected so far. Returns false if it
    /// was not pending.
    pub(crate) fn complete(&mut self, cid: CorrelationId) -> bool {
        let Some(p) = self.map.remove(&cid) else {
            return false;
        };
        let outcome = match p.error {
            Some(info) => Err(info.into()),
            None => Ok(RankReport {
                correlation_id: cid,
                records: p.records,
            }),
        };
        // the caller may have stopped waiting
        let _ = p.reply.send(outcome);
        true
    }

    pub(crate) fn fail(&mut self, cid: CorrelationId, err: RankError) -> bool {
        let Some(p) = self.map.remove(&cid) else {
            return false;
        };
        let _ = p.reply.send(Err(err));
        true
    }

    pub(crate) fn fail_all(&mut self, mut make_err: impl FnMut() -> RankError) {
        for (_, p) in self.map.drain() {
            let _ = p.reply.send(Err(make_err()));
        }
    }
}
