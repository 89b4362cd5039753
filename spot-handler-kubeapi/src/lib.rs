use std::fmt::Debug;

use async_trait::async_trait;
use kube::api;
use spot_handler_ext as k8s;

use k8s::corev1;
use k8s::openapi::apimachinery::pkg::version;

/// Access to the cluster Node store.
///
/// Only the operations the spot handler needs: read one Node by name and
/// apply a JSON merge patch to it. Errors are surfaced verbatim.
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn get_node(&self, name: &str) -> kube::Result<corev1::Node>;

    async fn patch_node(&self, name: &str, patch: &serde_json::Value)
    -> kube::Result<corev1::Node>;
}

pub struct KubeApi {
    patch_params: api::PatchParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with the inferred Kubernetes client.
    ///
    /// Uses the in-cluster service account when running inside a pod,
    /// falling back to the local kubeconfig otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = spot_handler_kubeapi::KubeApi::new().await?;
    /// // hand `api` to the spot handler
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    ///
    /// Patches are sent with default `PatchParams`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use spot_handler_kubeapi::KubeApi;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = kube::Client::try_default().await?;
    /// let api = KubeApi::with_client(client);
    /// // use `api` to read and patch Nodes
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            patch_params: api::PatchParams::default(),
            client,
        }
    }

    /// Version information reported by the API server.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use spot_handler_kubeapi::KubeApi;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = KubeApi::new().await?;
    /// let info = api.server_version().await?;
    /// println!("connected to Kubernetes {}", info.git_version);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn server_version(&self) -> kube::Result<version::Info> {
        self.client.apiserver_version().await
    }

    fn nodes(&self) -> api::Api<corev1::Node> {
        api::Api::all(self.client.clone())
    }

    fn patch_params(&self) -> &api::PatchParams {
        &self.patch_params
    }
}

#[async_trait]
impl NodeApi for KubeApi {
    async fn get_node(&self, name: &str) -> kube::Result<corev1::Node> {
        tracing::debug!(name, "Fetching node");
        self.nodes().get(name).await
    }

    async fn patch_node(
        &self,
        name: &str,
        patch: &serde_json::Value,
    ) -> kube::Result<corev1::Node> {
        tracing::debug!(name, %patch, "Patching node");
        let pp = self.patch_params();
        self.nodes().patch(name, pp, &api::Patch::Merge(patch)).await
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging, redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("patch_params", &self.patch_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
