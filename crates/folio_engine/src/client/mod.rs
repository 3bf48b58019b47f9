/* 📖 # Why does the engine carry a client?

The site's contact form is the only consumer of the API. Its request logic and state
rules live here so they are tested against the real routes, and so `folio send`
can drive the same form from the command line.
*/

mod api;
mod form;

pub use api::{
    ApiFailure, ApiReply, ContactApi, DEFAULT_API_URL, HttpContactApi, MessageListing,
    NETWORK_ERROR_MESSAGE,
};
pub use form::{
    ContactForm, DEFAULT_ERROR_MESSAGE, FormField, FormStatus, SUCCESS_DISMISS_AFTER_SECS,
    SUCCESS_MESSAGE,
};
