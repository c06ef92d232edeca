//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database.

use super::constants::*;
use super::fixtures::create_test_db;
use musicmedia_server::media_store::{MediaStore, SqliteMediaStore};
use musicmedia_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<SqliteMediaStore>,

    pub db_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary database with the fixture rows
    /// 2. Binds to a random port (127.0.0.1:0)
    /// 3. Spawns the server in a background task
    /// 4. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound
    /// or the server does not become ready within the timeout.
    pub async fn spawn() -> Self {
        let (temp_db_dir, db_path) = create_test_db().expect("Failed to create test database");

        let store =
            Arc::new(SqliteMediaStore::new(&db_path).expect("Failed to open media store"));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, store.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            db_path,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Rows of `table` whose `column` equals `key`.
    pub fn count_rows(&self, table: &str, column: &str, key: i64) -> usize {
        self.store
            .count_references(table, column, key)
            .expect("Failed to count rows")
    }

    /// Makes every delete on `table` abort, through a separate connection.
    pub fn block_deletes_on(&self, table: &str) {
        let conn = Connection::open(&self.db_path).expect("Failed to open database");
        conn.execute_batch(&format!(
            "CREATE TRIGGER block_{table}_delete BEFORE DELETE ON {table} \
             BEGIN SELECT RAISE(ABORT, '{table} rows are locked'); END;"
        ))
        .expect("Failed to create trigger");
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
