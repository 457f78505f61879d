//! Blocking HTTP plumbing shared by the service adapters

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use streetpoints_core::Error;

use crate::config::ServiceConfig;

/// # Errors
///
/// [`Error::CollaboratorUnavailable`] if the TLS backend cannot be initialised
pub fn client(services: &ServiceConfig) -> Result<Client, Error> {
    Client::builder()
        .timeout(Duration::from_secs(services.timeout_secs))
        .user_agent(services.user_agent.as_str())
        .build()
        .map_err(unavailable)
}

pub fn unavailable(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::CollaboratorUnavailable(format!("request timed out: {err}"))
    } else {
        Error::CollaboratorUnavailable(err.to_string())
    }
}

/// Sends `request` once and returns the body of a successful response
pub fn fetch_text(request: RequestBuilder) -> Result<String, Error> {
    let response = request.send().map_err(unavailable)?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::CollaboratorUnavailable(format!(
            "HTTP {status} from {}",
            response.url()
        )));
    }
    response.text().map_err(unavailable)
}
