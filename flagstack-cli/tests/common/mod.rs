//! Common test utilities for CLI integration tests.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema used by most tests.
#[allow(dead_code)]
pub const SCHEMA: &str = r"
flags:
  - name: server.port
    type: uint
    default: 8080
    usage: Port to listen on
  - name: server.hosts
    type: string_list
    default: [localhost]
    usage: Hosts to bind
  - name: db.password
    type: string
    default: hunter2
    tags: [secret]
  - name: admins
    type: string_list
    default: [root]
    tags: [ignore-yaml]
  - name: backends
    type: record_list
    default:
      - host: primary
";

/// Test environment with an isolated temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// A command for the flagstack binary with the log mode pinned.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("flagstack").expect("Failed to find flagstack binary");
        cmd.env_remove("FLAGSTACK_LOG_MODE");
        cmd
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write `content` to `name` under the temp directory.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Write the shared schema and return its path.
    pub fn schema(&self) -> PathBuf {
        self.write_file("schema.yaml", SCHEMA)
    }
}
