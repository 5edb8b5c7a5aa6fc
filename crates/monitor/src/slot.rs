//! Single in-flight request slot.
//!
//! A slot holds at most one outstanding detector request. Submitting while
//! a request is pending is refused, which keeps results in submission
//! order. Completed results are picked up without blocking by [`InFlight::poll`]
//! or awaited with [`InFlight::wait`].

use tokio::sync::oneshot::{self, error::TryRecvError};

use sanitrack_common::error::{SanitrackError, SanitrackResult};

use crate::{BoxFuture, Frame};

struct Pending<T> {
    frame: Frame,
    rx: oneshot::Receiver<SanitrackResult<T>>,
}

/// State of a slot after a non-blocking poll.
#[derive(Debug)]
pub enum SlotPoll<T> {
    /// Nothing was submitted.
    Idle,
    /// A request is still running.
    Busy,
    /// A request finished; the slot is idle again.
    Done {
        frame: Frame,
        result: SanitrackResult<T>,
    },
}

pub struct InFlight<T> {
    name: &'static str,
    pending: Option<Pending<T>>,
}

impl<T: Send + 'static> InFlight<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Frame of the outstanding request, if any.
    pub fn pending_frame(&self) -> Option<Frame> {
        self.pending.as_ref().map(|p| p.frame)
    }

    /// Start `request` for `frame` on the runtime. Returns `false` and drops
    /// the request if one is already outstanding.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, frame: Frame, request: BoxFuture<T>) -> bool {
        if let Some(pending) = &self.pending {
            tracing::trace!(
                slot = self.name,
                pending = pending.frame.index,
                skipped = frame.index,
                "Request still in flight, skipping"
            );
            return false;
        }

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            // Receiver gone means the monitor was dropped.
            let _ = tx.send(request.await);
        });
        self.pending = Some(Pending { frame, rx });
        true
    }

    /// Pick up a finished result without waiting.
    pub fn poll(&mut self) -> SlotPoll<T> {
        let name = self.name;
        let Some(pending) = self.pending.as_mut() else {
            return SlotPoll::Idle;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return SlotPoll::Busy,
            Err(TryRecvError::Closed) => Err(abandoned(name)),
        };
        let frame = pending.frame;
        self.pending = None;
        SlotPoll::Done { frame, result }
    }

    /// Wait for the outstanding request, if any.
    pub async fn wait(&mut self) -> Option<(Frame, SanitrackResult<T>)> {
        let pending = self.pending.take()?;
        let result = match pending.rx.await {
            Ok(result) => result,
            Err(_) => Err(abandoned(self.name)),
        };
        Some((pending.frame, result))
    }
}

fn abandoned(name: &str) -> SanitrackError {
    SanitrackError::detection(format!("{name} request ended without a result"))
}
