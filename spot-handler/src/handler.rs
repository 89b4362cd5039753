use std::time::Duration;

use spot_handler_castai::{CloudEventRequest, CloudEventSender};
use spot_handler_kubeapi::NodeApi;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::k8s::NodeExt as _;
use crate::{Backoff, HandlerError, InterruptChecker, NodeMutator};

/// Where the handler is in its lifetime.
///
/// `Watching` turns into `Handled` exactly once, when the first interruption
/// is observed. Nothing leads back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterruptionState {
    #[default]
    Watching,
    Handled,
}

/// Polls for a spot interruption and reacts to the first one.
///
/// The reaction notifies CAST AI about the interruption, then marks the
/// node unschedulable.
#[derive(Debug)]
pub struct SpotHandler<C, N, E> {
    checker: C,
    mutator: NodeMutator<N>,
    events: E,
    node_name: String,
    poll_interval: Duration,
    state: InterruptionState,
}

impl<C, N, E> SpotHandler<C, N, E>
where
    C: InterruptChecker,
    N: NodeApi,
    E: CloudEventSender,
{
    pub fn new(
        checker: C,
        nodes: N,
        events: E,
        node_name: impl ToString,
        poll_interval: Duration,
    ) -> Self {
        Self {
            checker,
            mutator: NodeMutator::new(nodes),
            events,
            node_name: node_name.to_string(),
            poll_interval,
            state: InterruptionState::Watching,
        }
    }

    /// Overrides the retry policy used for node patches.
    pub fn with_backoff(self, backoff: Backoff) -> Self {
        Self {
            mutator: self.mutator.with_backoff(backoff),
            ..self
        }
    }

    pub fn state(&self) -> InterruptionState {
        self.state
    }

    /// Runs until `token` is cancelled or the reaction sequence fails.
    ///
    /// Failed checks are logged and retried on the next tick. Polling stops
    /// for good once an interruption is seen, whatever the outcome of the
    /// reaction. After a successful reaction the handler idles until
    /// cancellation. A reaction that fails is returned as an error.
    pub async fn run(&mut self, token: &CancellationToken) -> Result<(), HandlerError> {
        let mut ticker = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.state == InterruptionState::Watching {
            tokio::select! {
                biased;
                () = token.cancelled() => return Ok(()),
                _ = ticker.tick() => self.poll(token).await?,
            }
        }

        drop(ticker);
        token.cancelled().await;
        Ok(())
    }

    async fn poll(&mut self, token: &CancellationToken) -> Result<(), HandlerError> {
        match token.run_until_cancelled(self.checker.check()).await {
            Some(Ok(true)) => {}
            Some(Ok(false)) | None => return Ok(()),
            Some(Err(err)) => {
                tracing::error!(?err, "Checking for interruption");
                return Ok(());
            }
        }

        tracing::info!(node = %self.node_name, "Preemption notice received");
        match self.handle_interruption(token).await {
            Ok(()) => {
                tracing::info!(node = %self.node_name, "Interruption handled");
                Ok(())
            }
            Err(err) if err.is_canceled() => {
                tracing::warn!(node = %self.node_name, ?err, "Interruption handling canceled");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Reacts to an interruption, at most once per handler.
    ///
    /// Moves the handler to [`InterruptionState::Handled`] before reacting,
    /// so a failed reaction is not repeated either. Once handled, further
    /// calls return `Ok(())` without touching the node or CAST AI.
    pub async fn handle_interruption(
        &mut self,
        token: &CancellationToken,
    ) -> Result<(), HandlerError> {
        if self.state == InterruptionState::Handled {
            tracing::debug!(node = %self.node_name, "Interruption already handled");
            return Ok(());
        }
        self.state = InterruptionState::Handled;
        self.react(token).await
    }

    /// The reaction sequence: fetch the node, notify, then taint.
    ///
    /// The node is read fresh so the taint decision is never based on stale
    /// state. A failed notification is returned before the taint is tried.
    async fn react(&self, token: &CancellationToken) -> Result<(), HandlerError> {
        let node = token
            .run_until_cancelled(self.mutator.nodes().get_node(&self.node_name))
            .await
            .ok_or(HandlerError::Canceled)?
            .map_err(|source| HandlerError::GetNode {
                node: self.node_name.clone(),
                source,
            })?;

        let node_id = node.cast_node_id().unwrap_or_else(|| {
            tracing::warn!(node = %self.node_name, "Node has no CAST AI node id label");
            ""
        });

        let req = CloudEventRequest::interrupted(node_id);
        token
            .run_until_cancelled(self.events.send_cloud_event(&req))
            .await
            .ok_or(HandlerError::Canceled)?
            .map_err(HandlerError::SendEvent)?;
        tracing::info!(node_id, "Interrupted event sent");

        self.mutator.taint_node(token, &node).await?;
        Ok(())
    }
}
