use crate::kubectl::{KubectlRunner, OutputLogging};
use crate::kubernetes::{ClusterConnector, ClusterError, Connection, PodLister};
use crate::types::{DebugArtifact, KubectlOptions, PodRef, TestRun};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    #[error("failed to create debug directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Collects `kubectl logs` and `kubectl describe` output for pods of a failed test.
pub struct DebugDumper<C, R> {
    connector: C,
    kubectl: R,
}

impl<C, R> DebugDumper<C, R>
where
    C: ClusterConnector,
    R: KubectlRunner,
{
    pub fn new(connector: C, kubectl: R) -> Self {
        Self { connector, kubectl }
    }

    #[cfg(test)]
    pub(crate) fn connector(&self) -> &C {
        &self.connector
    }

    #[cfg(test)]
    pub(crate) fn kubectl(&self) -> &R {
        &self.kubectl
    }

    /// Write `<pod>.log` and `<pod>.txt` for every pod matching `selector` into
    /// `debug_dir/<test name>/<context>/`. Does nothing unless the test failed.
    ///
    /// A failed `kubectl logs` or `kubectl describe` lands in the pod's file as
    /// text; only cluster access and filesystem errors abort the dump.
    pub async fn write_pods_debug_info_if_failed(
        &self,
        test: &TestRun,
        options: &KubectlOptions,
        debug_dir: &Path,
        selector: &str,
    ) -> Result<Option<Vec<DebugArtifact>>, DumpError> {
        if !test.failed {
            debug!(test = %test.name, "test passed, skipping debug dump");
            return Ok(None);
        }

        let Connection { context, pods } = self.connector.connect(options).await?;

        let test_dir = test_debug_directory(debug_dir, &test.name, &context);
        tokio::fs::create_dir_all(&test_dir)
            .await
            .map_err(|source| DumpError::CreateDir {
                path: test_dir.clone(),
                source,
            })?;

        info!(
            "dumping logs and pod info for {} to {}",
            selector,
            test_dir.display()
        );
        let pods = pods.list_pods(&options.namespace, selector).await?;

        let mut artifacts = Vec::with_capacity(pods.len());
        for pod in pods {
            artifacts.push(self.dump_pod(options, &test_dir, pod).await?);
        }
        Ok(Some(artifacts))
    }

    async fn dump_pod(
        &self,
        options: &KubectlOptions,
        test_dir: &Path,
        pod: PodRef,
    ) -> Result<DebugArtifact, DumpError> {
        let logs = self
            .kubectl
            .run(
                options,
                OutputLogging::Discard,
                &["logs", "--all-containers=true", pod.name.as_str()],
            )
            .await;
        let logs_ok = logs.is_ok();
        let logs = logs.unwrap_or_else(|err| {
            warn!(pod = %pod.name, error = %err, "failed to get pod logs");
            format!("Error getting logs: {}: {}", err, err.output())
        });
        let log_path = test_dir.join(format!("{}.log", pod.name));
        write_private(&log_path, &logs).await?;

        let desc = self
            .kubectl
            .run(
                options,
                OutputLogging::Discard,
                &["describe", "pod", pod.name.as_str()],
            )
            .await;
        let description_ok = desc.is_ok();
        let desc = desc.unwrap_or_else(|err| {
            warn!(pod = %pod.name, error = %err, "failed to describe pod");
            format!("Error describing pod: {}: {}", err, err.output())
        });
        let description_path = test_dir.join(format!("{}.txt", pod.name));
        write_private(&description_path, &desc).await?;

        debug!(pod = %pod.name, logs_ok, description_ok, "wrote pod debug info");
        Ok(DebugArtifact {
            pod,
            log_path,
            description_path,
            logs_ok,
            description_ok,
        })
    }
}

/// `debug_dir/<test name>/<context>`. Subtest names like `Parent/child` and
/// context names like `arn:aws:eks:...:cluster/name` nest; segments that would
/// climb out of `debug_dir` are dropped. A name with nothing left becomes
/// `unnamed` so it never shares the parent directory.
pub fn test_debug_directory(debug_dir: &Path, test_name: &str, context: &str) -> PathBuf {
    let mut dir = debug_dir.to_path_buf();
    push_segments(&mut dir, test_name);
    push_segments(&mut dir, context);
    dir
}

const UNNAMED_SEGMENT: &str = "unnamed";

fn push_segments(dir: &mut PathBuf, name: &str) {
    let mut pushed = false;
    for segment in name.split('/') {
        if let Some(Component::Normal(part)) = Path::new(segment).components().next() {
            dir.push(part);
            pushed = true;
        }
    }
    if !pushed {
        dir.push(UNNAMED_SEGMENT);
    }
}

async fn write_private(path: &Path, contents: &str) -> Result<(), DumpError> {
    let mut opts = tokio::fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    opts.mode(0o600);

    let write = async {
        let mut file = opts.open(path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    };
    write.await.map_err(|source| DumpError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
