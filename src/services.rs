//! Resolution of systemd service names to member PIDs via the cgroup tree.
//!
//! Thin I/O glue around one contract: given a list of service names, return
//! the PIDs of their member processes. A valid service with no running
//! processes contributes zero PIDs rather than failing the whole call.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

const CGROUP_ROOT: &str = "/sys/fs/cgroup/system.slice";

pub struct ServiceResolver {
    cgroup_root: PathBuf,
}

impl ServiceResolver {
    pub fn new() -> Self {
        Self::with_root(CGROUP_ROOT)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            cgroup_root: root.into(),
        }
    }

    /// PIDs of all member processes of the given services, concatenated in
    /// service order. A service that exists but is not started is skipped.
    pub fn list_pids(&self, services: &[String]) -> Result<Vec<i32>> {
        let mut pids = Vec::new();
        for service in services {
            match self.service_pids(service) {
                Ok(service_pids) => pids.extend(service_pids),
                Err(Error::ServiceNotStarted(name)) => {
                    debug!(service = %name, "service loaded but not started, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(pids)
    }

    fn service_pids(&self, service: &str) -> Result<Vec<i32>> {
        validate_service_name(service)?;
        let path = self
            .cgroup_root
            .join(format!("{service}.service"))
            .join("cgroup.procs");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                // The cgroup is absent both for unknown units and for known
                // units that are not running; ask systemd which it is.
                return if service_exists(service)? {
                    Err(Error::ServiceNotStarted(service.to_string()))
                } else {
                    Err(Error::NoSuchService(service.to_string()))
                };
            }
            Err(source) => return Err(Error::Io { path, source }),
        };

        content
            .lines()
            .map(|line| {
                line.parse().map_err(|_| Error::Parse {
                    what: "pid",
                    path: path.clone(),
                    text: line.to_string(),
                })
            })
            .collect()
    }
}

impl Default for ServiceResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_service_name(service: &str) -> Result<()> {
    if service.contains('/') || service == ".." {
        return Err(Error::InvalidServiceName(service.to_string()));
    }
    Ok(())
}

/// Asks systemd whether the unit exists at all. A unit that failed to load
/// with NoSuchUnit does not exist; any other LoadError value still counts
/// as existing.
fn service_exists(service: &str) -> Result<bool> {
    let command = format!("systemctl show --value --property=LoadError {service}");
    let output = Command::new("systemctl")
        .args(["show", "--value", "--property=LoadError", service])
        .output()
        .map_err(|source| Error::Command {
            command: command.clone(),
            source,
        })?;
    interpret_load_error(&command, &output)
}

/// A failing systemctl invocation produces no usable LoadError value, so it
/// must not be read as "unit exists".
fn interpret_load_error(command: &str, output: &std::process::Output) -> Result<bool> {
    const NO_SUCH_UNIT: &str = "org.freedesktop.systemd1.NoSuchUnit ";
    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: command.to_string(),
            status: output.status,
        });
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(!stdout.starts_with(NO_SUCH_UNIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_service(root: &std::path::Path, service: &str, pids: &str) {
        let dir = root.join(format!("{service}.service"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("cgroup.procs"), pids).unwrap();
    }

    #[test]
    fn test_list_pids_concatenates_in_service_order() {
        let dir = tempfile::tempdir().unwrap();
        write_service(dir.path(), "nginx", "10\n11\n");
        write_service(dir.path(), "sshd", "7\n");
        let resolver = ServiceResolver::with_root(dir.path());
        let pids = resolver
            .list_pids(&["nginx".to_string(), "sshd".to_string()])
            .unwrap();
        assert_eq!(pids, vec![10, 11, 7]);
    }

    #[test]
    fn test_empty_cgroup_contributes_zero_pids() {
        let dir = tempfile::tempdir().unwrap();
        write_service(dir.path(), "idle", "");
        let resolver = ServiceResolver::with_root(dir.path());
        assert!(resolver.list_pids(&["idle".to_string()]).unwrap().is_empty());
    }

    #[test]
    fn test_service_name_with_slash_is_rejected() {
        let resolver = ServiceResolver::with_root("/nonexistent");
        for bad in ["../etc", "a/b", ".."] {
            let err = resolver.list_pids(&[bad.to_string()]).unwrap_err();
            assert!(matches!(err, Error::InvalidServiceName(_)), "{bad:?}");
        }
    }

    fn command_output(raw_status: i32, stdout: &str) -> std::process::Output {
        use std::os::unix::process::ExitStatusExt;
        std::process::Output {
            status: std::process::ExitStatus::from_raw(raw_status),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn test_load_error_distinguishes_missing_unit() {
        let output = command_output(0, "org.freedesktop.systemd1.NoSuchUnit \"Unit x.service not found.\"\n");
        assert!(!interpret_load_error("systemctl show x", &output).unwrap());

        let output = command_output(0, "\n");
        assert!(interpret_load_error("systemctl show x", &output).unwrap());
    }

    #[test]
    fn test_failing_systemctl_is_an_error_not_existence() {
        // Raw wait status 256 is exit code 1.
        let output = command_output(256, "");
        let err = interpret_load_error("systemctl show x", &output).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[test]
    fn test_malformed_pid_line_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_service(dir.path(), "bad", "10\nnot-a-pid\n");
        let resolver = ServiceResolver::with_root(dir.path());
        let err = resolver.list_pids(&["bad".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Parse { what: "pid", .. }));
    }
}
