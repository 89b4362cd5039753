//! In-memory collaborators for exercising the handler without a cluster.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use spot_handler_castai::{CastError, CloudEventRequest, CloudEventSender};
use spot_handler_kubeapi::NodeApi;
use tokio::time::Instant;

use crate::k8s::NodeExt as _;
use crate::k8s::corev1;
use crate::{CheckError, InterruptChecker};

/// Ordered record of calls across all fakes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn record(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// Answers checks from a script, then keeps answering `false`.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeChecker {
    script: Arc<Mutex<VecDeque<Result<bool, CheckError>>>>,
    checks: Arc<Mutex<usize>>,
    journal: Journal,
}

impl FakeChecker {
    pub(crate) fn new(
        script: impl IntoIterator<Item = Result<bool, CheckError>>,
        journal: &Journal,
    ) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            checks: Arc::default(),
            journal: journal.clone(),
        }
    }

    pub(crate) fn checks(&self) -> usize {
        *self.checks.lock().unwrap()
    }
}

#[async_trait]
impl InterruptChecker for FakeChecker {
    async fn check(&self) -> Result<bool, CheckError> {
        self.journal.record("check");
        *self.checks.lock().unwrap() += 1;
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(false))
    }
}

pub(crate) fn check_unavailable() -> Result<bool, CheckError> {
    Err(CheckError::Status(StatusCode::SERVICE_UNAVAILABLE))
}

/// A single Node that accepts merge patches of `spec.unschedulable`.
#[derive(Clone, Debug)]
pub(crate) struct FakeNodes {
    node: Arc<Mutex<corev1::Node>>,
    patch_failures: Arc<Mutex<usize>>,
    patches: Arc<Mutex<Vec<serde_json::Value>>>,
    attempts: Arc<Mutex<Vec<Instant>>>,
    journal: Journal,
}

impl FakeNodes {
    pub(crate) fn new(node: corev1::Node, journal: &Journal) -> Self {
        Self {
            node: Arc::new(Mutex::new(node)),
            patch_failures: Arc::default(),
            patches: Arc::default(),
            attempts: Arc::default(),
            journal: journal.clone(),
        }
    }

    /// Makes the next `count` patch requests fail.
    pub(crate) fn fail_patches(self, count: usize) -> Self {
        *self.patch_failures.lock().unwrap() = count;
        self
    }

    pub(crate) fn node(&self) -> corev1::Node {
        self.node.lock().unwrap().clone()
    }

    /// Patches that were accepted.
    pub(crate) fn patches(&self) -> Vec<serde_json::Value> {
        self.patches.lock().unwrap().clone()
    }

    /// Times of every patch request, failed ones included.
    pub(crate) fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeApi for FakeNodes {
    async fn get_node(&self, name: &str) -> kube::Result<corev1::Node> {
        self.journal.record("get");
        let node = self.node();
        if node.metadata.name.as_deref() == Some(name) {
            Ok(node)
        } else {
            Err(kube::Error::ReadEvents(io::Error::new(
                io::ErrorKind::NotFound,
                format!("node {name} not found"),
            )))
        }
    }

    async fn patch_node(
        &self,
        _name: &str,
        patch: &serde_json::Value,
    ) -> kube::Result<corev1::Node> {
        self.journal.record("patch");
        self.attempts.lock().unwrap().push(Instant::now());

        {
            let mut failures = self.patch_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(kube::Error::ReadEvents(io::Error::other(
                    "the object has been modified",
                )));
            }
        }

        self.patches.lock().unwrap().push(patch.clone());
        let mut node = self.node.lock().unwrap();
        if let Some(unschedulable) = patch
            .pointer("/spec/unschedulable")
            .and_then(serde_json::Value::as_bool)
        {
            node.set_unschedulable(unschedulable);
        }
        Ok(node.clone())
    }
}

/// Records sent events, optionally answering with an error status.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeEvents {
    sent: Arc<Mutex<Vec<CloudEventRequest>>>,
    fail_with: Option<StatusCode>,
    journal: Journal,
}

impl FakeEvents {
    pub(crate) fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn failing(status: StatusCode, journal: &Journal) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new(journal)
        }
    }

    pub(crate) fn sent(&self) -> Vec<CloudEventRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudEventSender for FakeEvents {
    async fn send_cloud_event(&self, req: &CloudEventRequest) -> Result<(), CastError> {
        self.journal.record("send");
        self.sent.lock().unwrap().push(req.clone());
        match self.fail_with {
            Some(status) => Err(CastError::Status {
                status,
                body: "internal error".to_string(),
            }),
            None => Ok(()),
        }
    }
}
