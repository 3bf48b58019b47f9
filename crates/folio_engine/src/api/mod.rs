/* 📖 # Why an api module in folio_engine?

The api module exposes the contact workflow over HTTP. ApiService implements the
HttpService trait from folio_base, so the same service runs on RealPal's listener in
production and on MockPal's simulated requests in tests.
*/

mod service;

pub use service::{
    ALLOW_ORIGIN, ALLOW_ORIGIN_HEADER, ApiService, INVALID_BODY_MESSAGE, LIST_FAILED_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE,
    MISSING_FIELDS_MESSAGE, NOT_FOUND_MESSAGE, RUNNING_MESSAGE, SUBMIT_FAILED_MESSAGE,
    SUBMIT_SUCCESS_MESSAGE,
};
