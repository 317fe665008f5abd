//! Test server management.
//!
//! Spawns minircd binaries for integration testing.

#![allow(dead_code)]

use std::process::{Child, Command};
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::time::sleep;

/// A test server instance. Hostname lookups are disabled in the test
/// config so sessions register deterministically.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server on the given port with the default test config.
    pub async fn spawn(port: u16) -> anyhow::Result<TestServer> {
        TestServer::spawn_with(port, "").await
    }

    /// Spawn a server with extra TOML appended to the test config.
    pub async fn spawn_with(port: u16, extra_config: &str) -> anyhow::Result<TestServer> {
        let data_dir = TempDir::new()?;

        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
bind = "127.0.0.1:{}"
debug = true
network = "Test"
host = "srv"
dns = false
{}

[[oline]]
mask = "*!*@*"
name = "root"
password = "secret"
"#,
            port, extra_config
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_minircd"))
            .arg("-c")
            .arg(&config_path)
            .spawn()?;

        let server = TestServer {
            child,
            port,
            data_dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    pub fn data_dir(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Wait for the server to exit, returning its status.
    pub fn wait(&mut self) -> anyhow::Result<std::process::ExitStatus> {
        Ok(self.child.wait()?)
    }

    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        let address = self.address();
        for _ in 0..100 {
            if TcpStream::connect(&address).await.is_ok() {
                return Ok(());
            }
            sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server on {} never became ready", address)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
