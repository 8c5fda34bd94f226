pub mod cli;
pub mod debug;
pub mod kubectl;
pub mod kubernetes;
pub mod run;
pub mod types;

pub use debug::{DebugDumper, DumpError};
pub use kubectl::{Kubectl, KubectlError, KubectlRunner, OutputLogging};
pub use kubernetes::{ClusterConnector, ClusterError, KubeconfigConnector, PodLister};
pub use types::{DebugArtifact, KubectlOptions, PodRef, TestRun};
