//! Kubernetes-backed redirect tables
//!
//! Each table is a ConfigMap in one namespace; keys are hosts and values are
//! redirect locations.
pub mod configmap;

pub use configmap::ConfigMapStore;
