//! Waiting for rounds and following events.
//!
//! Rounds that are not produced yet are polled for at a fixed interval.
//! Every loop stops as soon as its cancellation signal fires, abandoning any
//! request in flight.

use crate::{
    events::{EventDecodeError, EventVisitor},
    Client, Error, RuntimeClient, TransportError,
};
use paratime_types::{event::RoundEvents, Round, ROUND_LATEST};
use std::future::Future;
use tokio::sync::watch;

/// Cancels the loops holding a matching [`Cancel`].
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

/// Signal that a loop should stop.
///
/// A signal whose [`CancelHandle`] was dropped never fires.
#[derive(Clone, Debug)]
pub struct Cancel(watch::Receiver<bool>);

/// Where [`Client::watch_events`] stopped.
#[derive(Debug)]
pub struct Watched {
    /// The first round not visited, to resume from.
    pub next_round: Round,
    /// Events that did not decode, in the order they were seen.
    pub decode_errors: Vec<EventDecodeError>,
}

/// A connected handle and signal.
pub fn cancel_pair() -> (CancelHandle, Cancel) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), Cancel(rx))
}

impl CancelHandle {
    /// Fire the signal.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl Cancel {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self(rx)
    }

    /// Whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the signal fires.
    pub async fn cancelled(&mut self) {
        if self.0.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl<C: RuntimeClient> Client<C> {
    /// Run `f` until it succeeds, sleeping the poll interval after each
    /// transient failure.
    async fn poll<T, F, Fut>(&self, cancel: &mut Cancel, mut f: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                result = f() => result,
            };
            match result {
                Ok(out) => return Ok(out),
                Err(e) if e.is_transient() => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("{e}, polling again");
                }
                Err(e) => return Err(e.into()),
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.config.poll_interval()) => (),
            }
        }
    }

    /// Wait until `round` has been produced.
    pub async fn wait_for_round(&self, round: Round, cancel: &mut Cancel) -> Result<(), Error> {
        self.poll(cancel, move || async move {
            match self.transport.latest_round().await? {
                latest if latest >= round => Ok(()),
                _ => Err(TransportError::RoundNotAvailable(round)),
            }
        })
        .await
    }

    /// The events of `round`, waiting for the round if needed.
    pub async fn round_events(&self, round: Round, cancel: &mut Cancel) -> Result<RoundEvents, Error> {
        let events = self.poll(cancel, move || self.transport.events(round)).await?;
        Ok(RoundEvents { round, events })
    }

    /// Feed the events of every round from `from` on to `visitor` until
    /// cancelled.
    ///
    /// Starting from [`ROUND_LATEST`] starts at the most recent round.
    /// Undecodable events are logged, skipped and collected in the returned
    /// [`Watched`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, visitor, cancel)))]
    pub async fn watch_events(
        &self,
        from: Round,
        visitor: &mut EventVisitor<'_>,
        cancel: &mut Cancel,
    ) -> Result<Watched, Error> {
        let mut watched = Watched {
            next_round: from,
            decode_errors: Vec::new(),
        };
        if from == ROUND_LATEST {
            match self.poll(cancel, move || self.transport.latest_round()).await {
                Ok(latest) => watched.next_round = latest,
                Err(Error::Cancelled) => return Ok(watched),
                Err(e) => return Err(e),
            }
        }
        loop {
            match self.round_events(watched.next_round, cancel).await {
                Ok(events) => {
                    watched.decode_errors.extend(visitor.visit_round(&events));
                    watched.next_round = watched
                        .next_round
                        .checked_add(1)
                        .filter(|round| *round != ROUND_LATEST)
                        .ok_or(Error::RoundOverflow)?;
                }
                Err(Error::Cancelled) => return Ok(watched),
                Err(e) => return Err(e),
            }
        }
    }
}
