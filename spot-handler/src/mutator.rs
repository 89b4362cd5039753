use kube::ResourceExt as _;
use spot_handler_kubeapi::NodeApi;
use tokio_util::sync::CancellationToken;

use crate::k8s::NodeExt as _;
use crate::k8s::corev1;
use crate::{Backoff, TaintError, merge_patch};

/// Read-modify-patch updates of a single Node.
///
/// Changes are sent as a merge patch computed from before and after
/// snapshots, so fields changed concurrently by other actors are kept.
/// Patch requests are retried under [`Backoff`].
#[derive(Debug)]
pub struct NodeMutator<N> {
    nodes: N,
    backoff: Backoff,
}

impl<N: NodeApi> NodeMutator<N> {
    pub fn new(nodes: N) -> Self {
        let backoff = Backoff::default();
        Self { nodes, backoff }
    }

    pub fn with_backoff(self, backoff: Backoff) -> Self {
        Self { backoff, ..self }
    }

    pub fn nodes(&self) -> &N {
        &self.nodes
    }

    /// Fetches the node `name` and marks it unschedulable.
    pub async fn taint(&self, token: &CancellationToken, name: &str) -> Result<(), TaintError> {
        let node = token
            .run_until_cancelled(self.nodes.get_node(name))
            .await
            .ok_or(TaintError::Canceled)?
            .map_err(|source| TaintError::GetNode {
                node: name.to_string(),
                source,
            })?;
        self.taint_node(token, &node).await
    }

    /// Marks `node` unschedulable. A node that already is one is left alone.
    pub async fn taint_node(
        &self,
        token: &CancellationToken,
        node: &corev1::Node,
    ) -> Result<(), TaintError> {
        if node.is_unschedulable() {
            tracing::info!(node = %node.name_any(), "Node already unschedulable");
            return Ok(());
        }

        self.patch_node(token, node, |node| node.set_unschedulable(true))
            .await?;
        tracing::info!(node = %node.name_any(), "Node marked unschedulable");
        Ok(())
    }

    /// Applies `change` to a copy of `node` and patches the difference.
    pub async fn patch_node<F>(
        &self,
        token: &CancellationToken,
        node: &corev1::Node,
        change: F,
    ) -> Result<(), TaintError>
    where
        F: FnOnce(&mut corev1::Node),
    {
        let old = serde_json::to_value(node)?;
        let mut changed = node.clone();
        change(&mut changed);
        let new = serde_json::to_value(&changed)?;

        let patch = merge_patch::diff(&old, &new);
        let name = node.name_any();
        if merge_patch::is_empty(&patch) {
            tracing::debug!(node = %name, "Nothing to patch");
            return Ok(());
        }

        self.backoff
            .retry(token, || self.nodes.patch_node(&name, &patch))
            .await
            .map_err(TaintError::Patch)?;
        Ok(())
    }
}
