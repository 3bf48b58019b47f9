use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;

use crate::FolioError;
use crate::FolioResult;
use crate::error::ErrorKind;

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::Pal;

/* 📖 # Why does the MockPal clock advance on every reading?

Messages are listed newest first by their creation timestamp. A clock that ticks one
second per call gives every stored message a distinct, predictable timestamp, so
ordering tests do not depend on wall clock resolution. set_time pins the clock when
a test needs a specific instant.
*/

/// In-memory PAL implementation for testing.
///
/// Clones share state, so a test can keep one clone for assertions while the
/// code under test owns another through a [`PalHandle`](super::PalHandle).
///
/// ```
/// use folio_base::{FilePath, MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("data/messages.jsonl"), b"{}\n".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("data/messages.jsonl")).unwrap();
/// assert_eq!(content, "{}\n");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    directories: Arc<Mutex<HashSet<FilePath>>>,
    env: Arc<Mutex<HashMap<String, String>>>,
    clock: Arc<Mutex<DateTime<Utc>>>,
    failing_writes: Arc<Mutex<Option<String>>>,
    http_servers: Arc<Mutex<HashMap<u16, HttpServerInfo>>>,
    next_port: Arc<AtomicU16>,
}

/// Information about a registered HTTP server.
#[derive(Debug)]
struct HttpServerInfo {
    service: Box<dyn HttpService>,
    config: HttpServerConfig,
}

impl MockPal {
    /// Create a new empty MockPal. The clock starts at 2024-01-01T00:00:00Z.
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            directories: Arc::new(Mutex::new(HashSet::new())),
            env: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(Mutex::new(Self::epoch())),
            failing_writes: Arc::new(Mutex::new(None)),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
        }
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.files.lock().insert(path, content);
    }

    /// Get a copy of a file's content.
    pub fn file_content(&self, path: &FilePath) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    /// Check whether a directory was created.
    pub fn has_directory(&self, path: &FilePath) -> bool {
        self.directories.lock().contains(path)
    }

    /// Set an environment variable visible through [`Pal::env_var`].
    pub fn set_env(&self, key: impl Into<String>, value: impl Into<String>) {
        self.env.lock().insert(key.into(), value.into());
    }

    /// Pin the clock. Subsequent readings advance one second from this instant.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.clock.lock() = time;
    }

    /// Make every following file write fail with the given message.
    pub fn fail_writes(&self, message: impl Into<String>) {
        *self.failing_writes.lock() = Some(message.into());
    }

    /// Undo `fail_writes`.
    pub fn allow_writes(&self) {
        *self.failing_writes.lock() = None;
    }

    /// Simulate an HTTP request to a running server.
    ///
    /// Looks up the service registered for `port` and invokes it directly.
    /// An error escaping the service is answered with a 500, as RealPal does.
    pub fn simulate_request(&self, port: u16, request: HttpRequest) -> FolioResult<HttpResponse> {
        let servers = self.http_servers.lock();
        let server_info = servers.get(&port).ok_or_else(|| {
            Box::new(FolioError::message(format!(
                "No HTTP server registered on port {}",
                port
            )))
        })?;

        let response = server_info
            .service
            .handle_request(request)
            .unwrap_or_else(|_| HttpResponse::internal_error().with_body("Internal Server Error"));
        Ok(server_info.config.apply_default_headers(response))
    }

    /// Get the number of registered HTTP servers.
    pub fn http_server_count(&self) -> usize {
        self.http_servers.lock().len()
    }

    fn check_writable(&self, path: &FilePath) -> FolioResult<()> {
        match self.failing_writes.lock().as_ref() {
            Some(message) => Err(Box::new(FolioError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: std::io::Error::other(message.clone()),
            }))),
            None => Ok(()),
        }
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> FolioResult<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> FolioResult<Box<dyn Read + 'static>> {
        let content = self.files.lock().get(path).cloned().ok_or_else(|| {
            Box::new(FolioError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ),
            }))
        })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn append_to_file(&self, path: &FilePath, content: &[u8]) -> FolioResult<()> {
        self.check_writable(path)?;
        if let Some(parent) = path.parent() {
            if !self.directories.lock().contains(&parent) {
                return Err(Box::new(FolioError::new(ErrorKind::FileError {
                    path: path.as_path().to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("Directory not found: {}", parent),
                    ),
                })));
            }
        }
        self.files
            .lock()
            .entry(path.clone())
            .or_default()
            .extend_from_slice(content);
        Ok(())
    }

    fn create_directory_all(&self, path: &FilePath) -> FolioResult<()> {
        let mut directories = self.directories.lock();
        let mut current = Some(path.clone());
        while let Some(directory) = current {
            current = directory.parent();
            directories.insert(directory);
        }
        Ok(())
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.lock().get(key).cloned()
    }

    fn now(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock();
        let now = *clock;
        *clock = now + TimeDelta::seconds(1);
        now
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> FolioResult<HttpServerHandle> {
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };

        self.http_servers.lock().insert(
            port,
            HttpServerInfo {
                service,
                config,
            },
        );

        Ok(HttpServerHandle::new(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::http::{HttpMethod, HttpStatusCode};

    #[test]
    fn test_read_file() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("test.txt"), b"hello world".to_vec());

        let result = pal.read_file_to_string(&FilePath::from("test.txt")).unwrap();
        assert_eq!(result, "hello world");
        assert!(pal.file_exists(&FilePath::from("test.txt")).unwrap());
    }

    #[test]
    fn test_read_file_not_found() {
        let pal = MockPal::new();
        let result = pal.read_file(&FilePath::from("nonexistent.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_append_to_top_level_file() {
        let pal = MockPal::new();
        let path = FilePath::from("log.jsonl");

        pal.append_to_file(&path, b"a\n").unwrap();
        pal.append_to_file(&path, b"b\n").unwrap();

        assert_eq!(pal.file_content(&path), Some(b"a\nb\n".to_vec()));
    }

    #[test]
    fn test_append_requires_parent_directory() {
        let pal = MockPal::new();
        let path = FilePath::from("data/log.jsonl");

        assert!(pal.append_to_file(&path, b"a\n").is_err());

        pal.create_directory_all(&FilePath::from("data")).unwrap();
        pal.append_to_file(&path, b"a\n").unwrap();
        assert_eq!(pal.file_content(&path), Some(b"a\n".to_vec()));
    }

    #[test]
    fn test_create_directory_all_registers_parents() {
        let pal = MockPal::new();
        pal.create_directory_all(&FilePath::from("a/b/c")).unwrap();

        assert!(pal.has_directory(&FilePath::from("a")));
        assert!(pal.has_directory(&FilePath::from("a/b")));
        assert!(pal.has_directory(&FilePath::from("a/b/c")));
    }

    #[test]
    fn test_fail_writes() {
        let pal = MockPal::new();
        pal.fail_writes("disk full");

        let error = pal
            .append_to_file(&FilePath::from("log.jsonl"), b"a\n")
            .unwrap_err();
        assert!(error.to_string().contains("disk full"));
        assert_eq!(pal.file_content(&FilePath::from("log.jsonl")), None);

        pal.allow_writes();
        pal.append_to_file(&FilePath::from("log.jsonl"), b"a\n").unwrap();
        assert_eq!(pal.file_content(&FilePath::from("log.jsonl")), Some(b"a\n".to_vec()));
    }

    #[test]
    fn test_clock_advances_one_second_per_reading() {
        let pal = MockPal::new();
        let first = pal.now();
        let second = pal.now();

        assert_eq!(first.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(second - first, TimeDelta::seconds(1));

        let pinned = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        pal.set_time(pinned);
        assert_eq!(pal.now(), pinned);
    }

    #[test]
    fn test_env_var() {
        let pal = MockPal::new();
        assert_eq!(pal.env_var("PORT"), None);

        pal.set_env("PORT", "5000");
        assert_eq!(pal.env_var("PORT"), Some("5000".to_string()));
    }

    #[derive(Debug)]
    struct PingService;

    impl HttpService for PingService {
        fn handle_request(&self, request: HttpRequest) -> FolioResult<HttpResponse> {
            match request.route() {
                "/ping" => Ok(HttpResponse::text("pong")),
                _ => crate::bail!("no route"),
            }
        }
    }

    #[test]
    fn test_simulate_request() {
        let pal = MockPal::new();
        let handle = pal
            .start_http_server(Box::new(PingService), HttpServerConfig::default())
            .unwrap();
        assert_eq!(handle.port(), 10000);
        assert_eq!(pal.http_server_count(), 1);

        let response = pal
            .simulate_request(handle.port(), HttpRequest::new(HttpMethod::Get, "/ping"))
            .unwrap();
        assert_eq!(response.body().as_string(), Some("pong".to_string()));

        let response = pal
            .simulate_request(handle.port(), HttpRequest::new(HttpMethod::Get, "/other"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::InternalServerError);
    }

    #[test]
    fn test_simulate_request_applies_default_headers() {
        let pal = MockPal::new();
        let handle = pal
            .start_http_server(
                Box::new(PingService),
                HttpServerConfig::default().with_default_header("Access-Control-Allow-Origin", "*"),
            )
            .unwrap();

        for path in ["/ping", "/other"] {
            let response = pal
                .simulate_request(handle.port(), HttpRequest::new(HttpMethod::Get, path))
                .unwrap();
            assert_eq!(response.headers().get("access-control-allow-origin"), Some("*"));
        }
    }

    #[test]
    fn test_simulate_request_unknown_port() {
        let pal = MockPal::new();
        let result = pal.simulate_request(9999, HttpRequest::new(HttpMethod::Get, "/"));
        assert!(result.is_err());
    }
}
