/* 📖 # Why a single ApiService?

The backend exposes a handful of routes, all sharing the same CORS headers and the
same `{ success, message }` failure shape. One HttpService that routes internally keeps
that in one place and is the only thing the PAL needs to serve.

- `GET /` -> status strings
- `POST /api/contact` -> submit a contact message
- `GET /api/messages` -> all messages, newest first
- `GET /api/messages/count` -> number of stored messages
- `OPTIONS *` -> CORS preflight
*/

/* 📖 # Why are the failure messages fixed strings?

The browser shows the `message` field to the visitor as is. Internal details such as
file paths or SMTP replies stay in the server log; the wire only carries one of the
constants below.
*/

use serde::Serialize;
use tracing::{error, instrument, warn};

use folio_base::FolioResult;
use folio_base::pal::http::{HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode};

use crate::contact::{ContactService, SubmitError};
use crate::message::{ContactMessage, ContactSubmission};

pub const RUNNING_MESSAGE: &str = "Portfolio Backend API is running!";
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Message sent successfully!";
pub const MISSING_FIELDS_MESSAGE: &str = "All fields are required";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";
pub const LIST_FAILED_MESSAGE: &str = "Failed to fetch messages";
pub const NOT_FOUND_MESSAGE: &str = "Not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// CORS header sent on every response; the server also sets it on replies the PAL
/// produces itself.
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";
pub const ALLOW_ORIGIN: &str = "*";

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

#[derive(Serialize)]
struct StatusResponse {
    message: &'static str,
    database: String,
    email: String,
}

#[derive(Serialize)]
struct ResultResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct MessagesResponse {
    success: bool,
    count: usize,
    messages: Vec<ContactMessage>,
}

#[derive(Serialize)]
struct CountResponse {
    success: bool,
    count: usize,
}

/// HTTP service for the contact backend.
#[derive(Debug, Clone)]
pub struct ApiService {
    contact: ContactService,
}

impl ApiService {
    pub fn new(contact: ContactService) -> Self {
        Self { contact }
    }

    /// Serialize data to JSON and wrap it in a response with the given status.
    fn serialize_json_response<T: Serialize>(
        status: HttpStatusCode,
        data: &T,
    ) -> FolioResult<HttpResponse> {
        serde_json::to_string(data)
            .map(|json| HttpResponse::json(json).with_status(status))
            .map_err(|e| folio_base::err!("JSON serialization error: {}", e))
    }

    fn result_response(status: HttpStatusCode, message: &'static str) -> FolioResult<HttpResponse> {
        Self::serialize_json_response(
            status,
            &ResultResponse {
                success: status.is_success(),
                message,
            },
        )
    }

    fn handle_status(&self) -> FolioResult<HttpResponse> {
        let status = self.contact.status();
        Self::serialize_json_response(
            HttpStatusCode::Ok,
            &StatusResponse {
                message: RUNNING_MESSAGE,
                database: status.database,
                email: status.email,
            },
        )
    }

    fn handle_contact(&self, request: &HttpRequest) -> FolioResult<HttpResponse> {
        let body = request.body().as_bytes();
        let submission = if body.iter().all(u8::is_ascii_whitespace) {
            ContactSubmission::default()
        } else {
            match serde_json::from_slice::<ContactSubmission>(body) {
                Ok(submission) => submission,
                Err(e) => {
                    warn!(error = %e, "rejected malformed contact body");
                    return Self::result_response(HttpStatusCode::BadRequest, INVALID_BODY_MESSAGE);
                }
            }
        };

        match self.contact.submit(submission) {
            Ok(receipt) if receipt.is_complete() => {
                Self::result_response(HttpStatusCode::Ok, SUBMIT_SUCCESS_MESSAGE)
            }
            Ok(receipt) => {
                warn!(id = %receipt.id, "answering 500 although the message was stored");
                Self::result_response(HttpStatusCode::InternalServerError, SUBMIT_FAILED_MESSAGE)
            }
            Err(SubmitError::Invalid(_)) => {
                Self::result_response(HttpStatusCode::BadRequest, MISSING_FIELDS_MESSAGE)
            }
            Err(SubmitError::Storage(e)) => {
                error!(error = ?e, "failed to store contact message");
                Self::result_response(HttpStatusCode::InternalServerError, SUBMIT_FAILED_MESSAGE)
            }
        }
    }

    fn handle_messages(&self) -> FolioResult<HttpResponse> {
        match self.contact.list_messages() {
            Ok(messages) => Self::serialize_json_response(
                HttpStatusCode::Ok,
                &MessagesResponse {
                    success: true,
                    count: messages.len(),
                    messages,
                },
            ),
            Err(e) => {
                error!(error = ?e, "failed to list messages");
                Self::result_response(HttpStatusCode::InternalServerError, LIST_FAILED_MESSAGE)
            }
        }
    }

    fn handle_count(&self) -> FolioResult<HttpResponse> {
        match self.contact.message_count() {
            Ok(count) => Self::serialize_json_response(
                HttpStatusCode::Ok,
                &CountResponse {
                    success: true,
                    count,
                },
            ),
            Err(e) => {
                error!(error = ?e, "failed to count messages");
                Self::result_response(HttpStatusCode::InternalServerError, LIST_FAILED_MESSAGE)
            }
        }
    }

    fn route(&self, request: &HttpRequest) -> FolioResult<HttpResponse> {
        let method = request.method();
        if method == &HttpMethod::Options {
            return Ok(HttpResponse::no_content()
                .with_header("Access-Control-Allow-Methods", ALLOWED_METHODS)
                .with_header("Access-Control-Allow-Headers", ALLOWED_HEADERS));
        }

        let expected = match request.route() {
            "/" => HttpMethod::Get,
            "/api/contact" => HttpMethod::Post,
            "/api/messages" | "/api/messages/count" => HttpMethod::Get,
            _ => return Self::result_response(HttpStatusCode::NotFound, NOT_FOUND_MESSAGE),
        };
        if method != &expected {
            return Ok(Self::result_response(
                HttpStatusCode::MethodNotAllowed,
                METHOD_NOT_ALLOWED_MESSAGE,
            )?
            .with_header("Allow", format!("{}, OPTIONS", expected)));
        }

        match request.route() {
            "/" => self.handle_status(),
            "/api/contact" => self.handle_contact(request),
            "/api/messages" => self.handle_messages(),
            _ => self.handle_count(),
        }
    }
}

impl HttpService for ApiService {
    #[instrument(skip_all, fields(method = %request.method(), path = %request.route()))]
    fn handle_request(&self, request: HttpRequest) -> FolioResult<HttpResponse> {
        Ok(self
            .route(&request)?
            .with_header(ALLOW_ORIGIN_HEADER, ALLOW_ORIGIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{ContactNotifier, MailerHandle, RecordingMailer};
    use crate::store::{InMemoryStore, JsonLinesStore, StoreHandle};
    use expect_test::expect;
    use folio_base::pal::http::HttpServerConfig;
    use folio_base::{FilePath, MockPal, Pal, PalHandle};

    struct Fixture {
        mock: MockPal,
        store: StoreHandle,
        service: ApiService,
    }

    fn fixture(mailer: Option<&RecordingMailer>) -> Fixture {
        let mock = MockPal::new();
        let store = StoreHandle::new(InMemoryStore::new());
        let notifier = mailer.map(|mailer| {
            ContactNotifier::new(
                MailerHandle::new(mailer.clone()),
                "owner@example.com",
                "Jane Doe",
            )
        });
        let contact = ContactService::new(PalHandle::new(mock.clone()), store.clone(), notifier);
        Fixture {
            mock,
            store,
            service: ApiService::new(contact),
        }
    }

    fn post_contact(service: &ApiService, body: &str) -> HttpResponse {
        let request = HttpRequest::new(HttpMethod::Post, "/api/contact")
            .with_header("Content-Type", "application/json")
            .with_body(body);
        service.handle_request(request).unwrap()
    }

    fn get(service: &ApiService, path: &str) -> HttpResponse {
        service
            .handle_request(HttpRequest::new(HttpMethod::Get, path))
            .unwrap()
    }

    fn body(response: &HttpResponse) -> String {
        response.body().as_string().unwrap()
    }

    const VALID_BODY: &str = r#"{"name":"A","email":"a@x.com","subject":"Hi","message":"Hello"}"#;

    #[test]
    fn test_status_route() {
        let fixture = fixture(None);
        let response = get(&fixture.service, "/");

        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(response.headers().get("content-type"), Some("application/json"));
        expect![[r#"{"message":"Portfolio Backend API is running!","database":"Store ready: memory://","email":"Email not configured"}"#]]
            .assert_eq(&body(&response));
    }

    #[test]
    fn test_submit_then_list() {
        let fixture = fixture(None);

        let response = post_contact(&fixture.service, VALID_BODY);
        assert_eq!(response.status(), HttpStatusCode::Ok);
        expect![[r#"{"success":true,"message":"Message sent successfully!"}"#]]
            .assert_eq(&body(&response));

        let listed = get(&fixture.service, "/api/messages");
        assert_eq!(listed.status(), HttpStatusCode::Ok);
        let json: serde_json::Value = serde_json::from_str(&body(&listed)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        let message = &json["messages"][0];
        assert_eq!(message["name"], "A");
        assert_eq!(message["email"], "a@x.com");
        assert_eq!(message["subject"], "Hi");
        assert_eq!(message["message"], "Hello");
        assert_eq!(message["createdAt"], "2024-01-01T00:00:00Z");
        assert!(message["_id"].is_string());
    }

    #[test]
    fn test_list_is_newest_first() {
        let fixture = fixture(None);
        for name in ["First", "Second", "Third"] {
            let body = VALID_BODY.replace(r#""name":"A""#, &format!(r#""name":"{name}""#));
            assert_eq!(post_contact(&fixture.service, &body).status(), HttpStatusCode::Ok);
        }

        let json: serde_json::Value =
            serde_json::from_str(&body(&get(&fixture.service, "/api/messages"))).unwrap();
        let names: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Third", "Second", "First"]);
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let fixture = fixture(None);
        let response = post_contact(
            &fixture.service,
            r#"{"name":"","email":"a@x.com","subject":"Hi","message":"Hello"}"#,
        );

        assert_eq!(response.status(), HttpStatusCode::BadRequest);
        expect![[r#"{"success":false,"message":"All fields are required"}"#]]
            .assert_eq(&body(&response));
        assert!(fixture.store.is_empty().unwrap());
    }

    #[test]
    fn test_missing_body_is_rejected_as_missing_fields() {
        let fixture = fixture(None);
        let response = post_contact(&fixture.service, "");

        assert_eq!(response.status(), HttpStatusCode::BadRequest);
        assert!(body(&response).contains(MISSING_FIELDS_MESSAGE));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let fixture = fixture(None);
        for malformed in ["{not json", r#"{"name":42}"#, r#""text""#] {
            let response = post_contact(&fixture.service, malformed);
            assert_eq!(response.status(), HttpStatusCode::BadRequest);
            expect![[r#"{"success":false,"message":"Invalid request body"}"#]]
                .assert_eq(&body(&response));
        }
        assert!(fixture.store.is_empty().unwrap());
    }

    #[test]
    fn test_submit_without_email_still_stores() {
        let fixture = fixture(None);

        assert_eq!(post_contact(&fixture.service, VALID_BODY).status(), HttpStatusCode::Ok);
        assert_eq!(fixture.store.len().unwrap(), 1);
    }

    #[test]
    fn test_submit_with_email_sends_two_mails() {
        let mailer = RecordingMailer::new();
        let fixture = fixture(Some(&mailer));

        assert_eq!(post_contact(&fixture.service, VALID_BODY).status(), HttpStatusCode::Ok);

        let subjects: Vec<String> = mailer.sent().into_iter().map(|m| m.subject).collect();
        assert_eq!(
            subjects,
            ["Portfolio Contact: Hi", "Thank you for contacting Jane Doe"]
        );
    }

    #[test]
    fn test_failing_mail_answers_500_but_keeps_message() {
        let mailer = RecordingMailer::new();
        mailer.fail_with("relay unavailable");
        let fixture = fixture(Some(&mailer));

        let response = post_contact(&fixture.service, VALID_BODY);

        assert_eq!(response.status(), HttpStatusCode::InternalServerError);
        expect![[r#"{"success":false,"message":"Failed to send message. Please try again."}"#]]
            .assert_eq(&body(&response));
        assert_eq!(fixture.store.len().unwrap(), 1);
    }

    #[test]
    fn test_storage_failure_answers_500() {
        let mock = MockPal::new();
        let pal = PalHandle::new(mock.clone());
        let store = StoreHandle::new(
            JsonLinesStore::open(pal.clone(), FilePath::from("messages.jsonl")).unwrap(),
        );
        let service = ApiService::new(ContactService::new(pal, store.clone(), None));
        mock.fail_writes("disk full");

        let response = post_contact(&service, VALID_BODY);

        assert_eq!(response.status(), HttpStatusCode::InternalServerError);
        assert!(body(&response).contains(SUBMIT_FAILED_MESSAGE));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_count_route() {
        let fixture = fixture(None);
        post_contact(&fixture.service, VALID_BODY);
        post_contact(&fixture.service, VALID_BODY);

        let response = get(&fixture.service, "/api/messages/count");
        expect![[r#"{"success":true,"count":2}"#]].assert_eq(&body(&response));
    }

    #[test]
    fn test_every_response_allows_any_origin() {
        let fixture = fixture(None);
        for response in [
            get(&fixture.service, "/"),
            get(&fixture.service, "/missing"),
            post_contact(&fixture.service, "{"),
        ] {
            assert_eq!(
                response.headers().get("access-control-allow-origin"),
                Some("*")
            );
        }
    }

    #[test]
    fn test_preflight() {
        let fixture = fixture(None);
        let response = fixture
            .service
            .handle_request(HttpRequest::new(HttpMethod::Options, "/api/contact"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NoContent);
        assert_eq!(
            response.headers().get("access-control-allow-methods"),
            Some("GET, POST, OPTIONS")
        );
        assert_eq!(
            response.headers().get("access-control-allow-headers"),
            Some("Content-Type")
        );
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_unknown_route() {
        let fixture = fixture(None);
        let response = get(&fixture.service, "/api/other");

        assert_eq!(response.status(), HttpStatusCode::NotFound);
        expect![[r#"{"success":false,"message":"Not found"}"#]].assert_eq(&body(&response));
    }

    #[test]
    fn test_wrong_method() {
        let fixture = fixture(None);
        let response = fixture
            .service
            .handle_request(HttpRequest::new(HttpMethod::Get, "/api/contact"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed);
        assert_eq!(response.headers().get("allow"), Some("POST, OPTIONS"));
        assert!(body(&response).contains(METHOD_NOT_ALLOWED_MESSAGE));
    }

    #[test]
    fn test_query_string_is_ignored_for_routing() {
        let fixture = fixture(None);
        let response = get(&fixture.service, "/api/messages?limit=5");
        assert_eq!(response.status(), HttpStatusCode::Ok);
    }

    #[test]
    fn test_served_through_mock_pal() {
        let fixture = fixture(None);
        let handle = fixture
            .mock
            .start_http_server(Box::new(fixture.service.clone()), HttpServerConfig::default())
            .unwrap();

        let response = fixture
            .mock
            .simulate_request(
                handle.port(),
                HttpRequest::new(HttpMethod::Post, "/api/contact").with_body(VALID_BODY),
            )
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(fixture.store.len().unwrap(), 1);
    }
}
