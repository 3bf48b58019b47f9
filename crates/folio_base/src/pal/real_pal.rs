use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::{FolioError, FolioResult, error::ErrorKind};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle,
    HttpService, HttpStatusCode,
};
use super::traits::Pal;

/// Largest request body accepted, matching the usual JSON body limit of web frameworks.
pub const MAX_REQUEST_BODY_BYTES: usize = 100 * 1024;

/// Upper bound on the rest of an oversized chunked body read and discarded before answering.
const MAX_DRAINED_BODY_BYTES: u64 = 1024 * 1024;

/// How often the serving thread checks the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Concrete PAL implementation using the operating system.
///
/// All file paths are resolved relative to a configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve a FilePath to an absolute filesystem path.
    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        self.base_dir.join(path.as_path())
    }

    fn file_error(path: PathBuf, source: std::io::Error) -> Box<FolioError> {
        Box::new(FolioError::new(ErrorKind::FileError { path, source }))
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> FolioResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> FolioResult<Box<dyn Read + 'static>> {
        let resolved = self.resolve_path(path);
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Self::file_error(resolved, e)
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self, content), fields(path = %path, bytes = content.len()))]
    fn append_to_file(&self, path: &FilePath, content: &[u8]) -> FolioResult<()> {
        let resolved = self.resolve_path(path);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&resolved)
            .map_err(|e| Self::file_error(resolved.clone(), e))?;
        file.write_all(content)
            .and_then(|()| file.sync_data())
            .map_err(|e| {
                debug!(error = %e, "failed to append to file");
                Self::file_error(resolved, e)
            })
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory_all(&self, path: &FilePath) -> FolioResult<()> {
        let resolved = self.resolve_path(path);
        fs::create_dir_all(&resolved).map_err(|e| Self::file_error(resolved, e))
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> FolioResult<HttpServerHandle> {
        let server = tiny_http::Server::http(config.address()).map_err(|e| {
            crate::err!("Failed to bind HTTP server to {}: {}", config.address(), e)
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| crate::err!("HTTP server is not bound to an IP address"))?;

        let handle = HttpServerHandle::new(port);
        let shutdown = handle.shutdown_flag();
        let worker = std::thread::Builder::new()
            .name(format!("http-{port}"))
            .spawn(move || serve_requests(server, service, shutdown, config))
            .map_err(|e| crate::err!("Failed to spawn HTTP server thread: {}", e))?;

        info!(port, "HTTP server listening");
        Ok(handle.with_worker(worker))
    }
}

/* 📖 # Why serve requests on a single thread?

Each request is a validated insert plus at most two outbound mails. Handling them one
at a time on the listener thread keeps store writes ordered and needs no coordination
beyond the store's own lock. recv_timeout lets the loop notice the shutdown flag.

The config's default headers go on every response written here, including the ones
the service never sees (oversized body, unknown method, a service error), so a
browser can read those failures too.
*/
fn serve_requests(
    server: tiny_http::Server,
    service: Box<dyn HttpService>,
    shutdown: Arc<AtomicBool>,
    config: HttpServerConfig,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let mut request = match server.recv_timeout(SHUTDOWN_POLL_INTERVAL) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "failed to receive HTTP request");
                continue;
            }
        };

        let response = match convert_request(&mut request) {
            Ok(converted) => {
                let method = converted.method().clone();
                let path = converted.path().to_string();
                match service.handle_request(converted) {
                    Ok(response) => {
                        debug!(%method, %path, status = response.status().as_u16(), "request handled");
                        response
                    }
                    Err(e) => {
                        error!(%method, %path, error = ?e, "service failed to handle request");
                        HttpResponse::internal_error().with_body("Internal Server Error")
                    }
                }
            }
            Err(response) => response,
        };

        let response = config.apply_default_headers(response);
        if let Err(e) = request.respond(convert_response(response, &config.server_name)) {
            warn!(error = %e, "failed to write HTTP response");
        }
    }
    info!("HTTP server stopped");
}

fn convert_request(request: &mut tiny_http::Request) -> Result<HttpRequest, HttpResponse> {
    let Some(method) = HttpMethod::parse(request.method().as_str()) else {
        return Err(HttpResponse::new(HttpStatusCode::MethodNotAllowed));
    };
    if request
        .body_length()
        .is_some_and(|length| length > MAX_REQUEST_BODY_BYTES)
    {
        return Err(HttpResponse::new(HttpStatusCode::PayloadTooLarge));
    }

    let mut body = Vec::new();
    let limit = (MAX_REQUEST_BODY_BYTES + 1) as u64;
    if let Err(e) = request.as_reader().take(limit).read_to_end(&mut body) {
        warn!(error = %e, "failed to read request body");
        return Err(HttpResponse::new(HttpStatusCode::BadRequest));
    }
    if body.len() > MAX_REQUEST_BODY_BYTES {
        // tiny_http only drains unread Content-Length bodies; closing with chunked data
        // still unread resets the connection before the client sees the 413
        let _ = std::io::copy(
            &mut request.as_reader().take(MAX_DRAINED_BODY_BYTES),
            &mut std::io::sink(),
        );
        return Err(HttpResponse::new(HttpStatusCode::PayloadTooLarge));
    }

    let mut converted = HttpRequest::new(method, request.url()).with_body(body);
    for header in request.headers() {
        converted = converted.with_header(header.field.to_string(), header.value.to_string());
    }
    Ok(converted)
}

fn convert_response(
    response: HttpResponse,
    server_name: &str,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut converted =
        tiny_http::Response::from_data(response.into_body().into_bytes()).with_status_code(status);
    for (key, value) in headers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(std::iter::once(("server", server_name)))
    {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => converted.add_header(header),
            Err(()) => warn!(header = key, "dropping invalid response header"),
        }
    }
    converted
}
