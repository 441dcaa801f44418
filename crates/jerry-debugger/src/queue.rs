//! Outgoing request queue.
//!
//! At most one *tracked* request (one whose completion is signaled by a
//! specific inbound frame: backtrace, eval) is in flight at a time; later
//! submissions wait in FIFO order. Fire-and-forget commands resolve as soon
//! as the transport accepts their bytes. A request's packets are sent
//! back-to-back by a single submission, so the fragments of an `EVAL` or
//! `CLIENT_SOURCE` never interleave with another command.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::delegate::BacktraceFrame;
use crate::transport::Transport;
use crate::types::{DebuggerError, EvalResult, Result};

/// Completion handle for a submitted command.
///
/// Resolves when the transport accepts the bytes (fire-and-forget) or when
/// the matching terminating frame arrives (tracked). Dropping the handle
/// merely discards the result; the command still runs.
#[derive(Debug)]
pub struct PendingRequest<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> PendingRequest<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T>>) -> Self {
        Self { rx }
    }

    /// Non-blocking probe; `None` while the request is still outstanding.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(DebuggerError::ConnectionClosed)),
        }
    }
}

impl<T> Future for PendingRequest<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(DebuggerError::ConnectionClosed)))
    }
}

#[derive(Debug)]
pub(crate) enum Completion {
    Simple(oneshot::Sender<Result<()>>),
    Backtrace(oneshot::Sender<Result<Vec<BacktraceFrame>>>),
    Eval(oneshot::Sender<Result<EvalResult>>),
}

impl Completion {
    fn fail(self, err: DebuggerError) {
        match self {
            Completion::Simple(tx) => drop(tx.send(Err(err))),
            Completion::Backtrace(tx) => drop(tx.send(Err(err))),
            Completion::Eval(tx) => drop(tx.send(Err(err))),
        }
    }
}

#[derive(Debug)]
struct QueuedRequest {
    packets: Vec<Vec<u8>>,
    completion: Completion,
}

#[derive(Debug, Default)]
pub(crate) struct RequestQueue {
    in_flight: Option<Completion>,
    pending: VecDeque<QueuedRequest>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sends the request now, or parks it behind the in-flight tracked
    /// request.
    pub(crate) fn submit(
        &mut self,
        transport: &mut dyn Transport,
        packets: Vec<Vec<u8>>,
        completion: Completion,
    ) {
        let request = QueuedRequest {
            packets,
            completion,
        };
        if self.in_flight.is_some() {
            self.pending.push_back(request);
        } else {
            self.send_now(transport, request);
        }
    }

    /// Returns false when the transport rejected a packet; the request has
    /// already been failed in that case.
    fn send_now(&mut self, transport: &mut dyn Transport, request: QueuedRequest) -> bool {
        for packet in &request.packets {
            if !transport.send(packet) {
                request.completion.fail(DebuggerError::TransportSubmitFailed);
                return false;
            }
        }
        match request.completion {
            Completion::Simple(tx) => drop(tx.send(Ok(()))),
            tracked => self.in_flight = Some(tracked),
        }
        true
    }

    /// Advances the FIFO after a tracked request completed. A submit failure
    /// fails that queued request and stops; the caller decides whether to
    /// retry.
    fn advance(&mut self, transport: &mut dyn Transport) {
        while self.in_flight.is_none() {
            let Some(request) = self.pending.pop_front() else {
                break;
            };
            if !self.send_now(transport, request) {
                break;
            }
        }
    }

    pub(crate) fn complete_backtrace(
        &mut self,
        transport: &mut dyn Transport,
        frames: Vec<BacktraceFrame>,
    ) {
        match self.in_flight.take() {
            Some(Completion::Backtrace(tx)) => {
                let _ = tx.send(Ok(frames));
                self.advance(transport);
            }
            other => {
                tracing::debug!(
                    target = "jerry.debugger",
                    "backtrace completed with no matching request"
                );
                self.in_flight = other;
            }
        }
    }

    pub(crate) fn complete_eval(&mut self, transport: &mut dyn Transport, result: EvalResult) {
        match self.in_flight.take() {
            Some(Completion::Eval(tx)) => {
                let _ = tx.send(Ok(result));
                self.advance(transport);
            }
            other => {
                tracing::debug!(
                    target = "jerry.debugger",
                    "eval result arrived with no matching request"
                );
                self.in_flight = other;
            }
        }
    }

    /// Fails the in-flight request and everything queued behind it.
    pub(crate) fn fail_all(&mut self, err: impl Fn() -> DebuggerError) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.fail(err());
        }
        for request in self.pending.drain(..) {
            request.completion.fail(err());
        }
    }
}
