// ============================================================================
// Collaborator Clients - HTTP calls to adjacent services
// ============================================================================
//
// - auth: resolves a bearer token into a caller identity
// - cart: clears the cart an order was placed from (best-effort)
// - notification: sends order emails (best-effort)
//
// Every client shares one `reqwest::Client` (per-call timeout) and owns a
// circuit breaker whose state is exported as a gauge.
//
// ============================================================================

mod auth;
mod cart;
mod error;
mod notification;

use std::time::Duration;

use crate::utils::CircuitBreakerError;

pub use auth::{AuthService, HttpAuthClient, Identity};
pub use cart::{CartService, HttpCartClient};
pub use error::ClientError;
pub use notification::{Email, HttpNotificationClient, NotificationService};

#[cfg(test)]
pub use auth::MockAuthService;
#[cfg(test)]
pub use cart::MockCartService;
#[cfg(test)]
pub use notification::MockNotificationService;

/// Build the HTTP client shared by every collaborator.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Join `collection/id` onto the base URL as path segments.
///
/// The id is percent-encoded as a single segment, so `/`, `?` and `#` in it
/// can never leave the collection. Bare dot segments are rejected.
fn resource_url(base_url: &str, collection: &str, id: &str) -> Result<reqwest::Url, ClientError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ClientError::InvalidUrl(format!("{collection}/{id}")));
    }

    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .push(collection)
        .push(id);
    Ok(url)
}

fn through_breaker<T>(
    service: &'static str,
    result: Result<T, CircuitBreakerError<ClientError>>,
) -> Result<T, ClientError> {
    match result {
        Ok(value) => Ok(value),
        Err(CircuitBreakerError::CircuitOpen) => {
            tracing::warn!(collaborator = service, "Circuit breaker open, call skipped");
            Err(ClientError::CircuitOpen(service))
        }
        Err(CircuitBreakerError::OperationFailed(e)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://cart:8080/", "/carts/c1"),
            "http://cart:8080/carts/c1"
        );
        assert_eq!(
            endpoint("http://auth", "/auth/verify"),
            "http://auth/auth/verify"
        );
    }

    #[test]
    fn test_resource_url_keeps_id_in_one_segment() {
        let url = resource_url("http://cart:8080/", "carts", "c1").unwrap();
        assert_eq!(url.as_str(), "http://cart:8080/carts/c1");

        let url = resource_url("http://cart:8080/api", "carts", "../users/42?all=true").unwrap();
        assert_eq!(url.path(), "/api/carts/..%2Fusers%2F42%3Fall=true");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_resource_url_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            assert!(matches!(
                resource_url("http://cart:8080", "carts", id),
                Err(ClientError::InvalidUrl(_))
            ));
        }
        assert!(matches!(
            resource_url("not a url", "carts", "c1"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_open_circuit_becomes_client_error() {
        let result: Result<(), _> = through_breaker("cart", Err(CircuitBreakerError::CircuitOpen));
        assert!(matches!(result, Err(ClientError::CircuitOpen("cart"))));
    }
}
