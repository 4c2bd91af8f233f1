use std::time::Instant;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::Error;
use tracing::Instrument;
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Allow-all CORS unless an origin list is configured.
pub fn cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }

    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .expose_headers([CORRELATION_ID_HEADER])
        .max_age(3600)
}

/// One log line per request, inside a span carrying the correlation id.
///
/// The id is taken from `X-Correlation-Id` when present, generated otherwise,
/// and always echoed on the response.
pub async fn request_logger(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let correlation_id = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation_id,
        method = %req.method(),
        path = %req.path(),
    );
    let started = Instant::now();

    let mut res = next.call(req).instrument(span.clone()).await?;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        res.headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
    }

    let status = res.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    span.in_scope(|| match status {
        500.. => tracing::error!(status, latency_ms, "Request failed"),
        400..=499 => tracing::warn!(status, latency_ms, "Request rejected"),
        _ => tracing::info!(status, latency_ms, "Request completed"),
    });

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{
        ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
    };
    use actix_web::http::{Method, StatusCode};
    use actix_web::middleware::from_fn;
    use actix_web::{test, web, App, HttpResponse};

    fn preflight(origin: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/orders")
            .insert_header((ORIGIN, origin))
            .insert_header((ACCESS_CONTROL_REQUEST_METHOD, "POST"))
    }

    macro_rules! cors_app {
        ($origins:expr) => {
            test::init_service(
                App::new()
                    .wrap(cors($origins))
                    .wrap(from_fn(request_logger))
                    .route("/orders", web::post().to(|| async { HttpResponse::Created().finish() })),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_correlation_id_is_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(request_logger))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Correlation-Id", "abc-123"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.headers().get(CORRELATION_ID_HEADER).unwrap(), "abc-123");
    }

    #[actix_web::test]
    async fn test_correlation_id_is_generated() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(request_logger))
                .route("/", web::get().to(|| async { HttpResponse::NotFound().finish() })),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let res = test::call_service(&app, req).await;

        let id = res.headers().get(CORRELATION_ID_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[actix_web::test]
    async fn test_preflight_allows_any_origin_by_default() {
        let app = cors_app!(&[]);

        let res = test::call_service(&app, preflight("https://shop.example").to_request()).await;

        assert!(res.status().is_success());
        assert_eq!(
            res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://shop.example"
        );
    }

    #[actix_web::test]
    async fn test_simple_request_carries_allow_origin() {
        let app = cors_app!(&[]);

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header((ORIGIN, "https://shop.example"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(
            res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://shop.example"
        );
    }

    #[actix_web::test]
    async fn test_configured_origins_restrict_preflight() {
        let origins = vec!["https://shop.example".to_string()];
        let app = cors_app!(&origins);

        let res = test::call_service(&app, preflight("https://shop.example").to_request()).await;
        assert_eq!(
            res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://shop.example"
        );

        match test::try_call_service(&app, preflight("https://evil.example").to_request()).await {
            Ok(res) => assert!(res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none()),
            Err(e) => assert!(!e.as_response_error().status_code().is_success()),
        }
    }
}
