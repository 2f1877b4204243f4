//! NatslyTest harness for end-to-end testing

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use natsly::{Config, Server};
use reqwest::Client;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Test harness that spawns a real natsly server on a random port
pub struct NatslyTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    static_dir: TempDir,
    _handle: JoinHandle<()>,
}

impl NatslyTest {
    /// Start a server with default configuration and no API keys
    pub async fn start() -> Result<Self> {
        Self::start_with(Config::default()).await
    }

    /// Start a server; host, port and static directory are overridden
    pub async fn start_with(config: Config) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let static_dir = tempfile::tempdir()?;
        let config = Config {
            host: addr.ip().to_string(),
            port: addr.port(),
            static_dir: static_dir.path().to_path_buf(),
            ..config
        };

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            static_dir,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Root of the server's static tree
    pub fn static_dir(&self) -> &Path {
        self.static_dir.path()
    }

    /// Place a line-art image into a category
    pub fn add_line_art(&self, category: &str, filename: &str, data: &[u8]) -> Result<()> {
        let dir = self.static_dir().join("line_art").join(category);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(filename), data)?;
        Ok(())
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Upload a file as multipart field `file`
    pub async fn upload(&self, filename: &str, data: Vec<u8>) -> Result<reqwest::Response> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        Ok(self
            .client
            .post(format!("{}/upload_artwork", self.base_url()))
            .multipart(form)
            .send()
            .await?)
    }

    /// Handler state of the running server
    pub fn state(&self) -> natsly::api::AppState {
        self.server.state()
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}

impl Drop for NatslyTest {
    fn drop(&mut self) {
        self.shutdown();
    }
}
