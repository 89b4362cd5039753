use std::collections::BTreeMap;

use constcat::concat;

pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub const CAST_PROVISIONER_DOMAIN: &str = "provisioner.cast.ai";

/// Label carrying the CAST AI node identifier.
pub const CAST_NODE_ID_LABEL: &str = concat!(CAST_PROVISIONER_DOMAIN, "/node-id");

pub trait NodeExt {
    fn new(name: impl ToString) -> Self;

    /// Value of the label `key`, if the node carries it.
    fn label(&self, key: &str) -> Option<&str>;

    /// Whether the node is already marked unschedulable (cordoned).
    fn is_unschedulable(&self) -> bool;

    fn set_unschedulable(&mut self, unschedulable: bool);

    fn cast_node_id(&self) -> Option<&str> {
        self.label(CAST_NODE_ID_LABEL)
    }
}

impl NodeExt for corev1::Node {
    fn new(name: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::new(name);
        Self {
            metadata,
            ..default()
        }
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(key))
            .map(String::as_str)
    }

    fn is_unschedulable(&self) -> bool {
        self.spec
            .as_ref()
            .and_then(|spec| spec.unschedulable)
            .unwrap_or_default()
    }

    fn set_unschedulable(&mut self, unschedulable: bool) {
        self.spec.get_or_insert_with(default).unschedulable = Some(unschedulable);
    }
}

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_label(self, key: impl ToString, value: impl ToString) -> Self;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_label(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}
