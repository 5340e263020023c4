//! Mapping failed calls to `ApiError`.
//!
//! A 401 clears the session before the error is returned. Without that, a
//! stale token would keep every independent caller bouncing off 401s.
//! Redirecting to a login flow is left to whoever subscribes to the session.

use serde_json::Value;

use crate::error::{ApiError, ErrorKind};
use crate::session::Session;
use crate::transport::TransportFailure;

pub fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Auth,
        403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        400 | 422 => ErrorKind::Validation,
        s if s >= 500 => ErrorKind::Server,
        _ => ErrorKind::Unknown,
    }
}

/// `error`, then `message`, then `HTTP <status>`.
pub fn extract_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|body| field_text(body, "error").or_else(|| field_text(body, "message")))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn field_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Classify one failure, clearing `session` on 401.
pub fn classify(failure: TransportFailure, session: &Session) -> ApiError {
    match failure {
        TransportFailure::Network { message } => ApiError::network(message),
        TransportFailure::Encode { message } => ApiError::encode(message),
        TransportFailure::Http { status, body } => classify_http(status, &body, session),
    }
}

pub fn classify_http(status: u16, body: &str, session: &Session) -> ApiError {
    let kind = kind_for_status(status);
    let message = extract_message(status, body);
    if kind == ErrorKind::Auth {
        tracing::warn!(status, %message, "authentication rejected, clearing session");
        session.clear_token();
    }
    ApiError::new(kind, message, Some(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn http(status: u16, body: &str) -> TransportFailure {
        TransportFailure::Http {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn status_table() {
        assert_eq!(kind_for_status(401), ErrorKind::Auth);
        assert_eq!(kind_for_status(403), ErrorKind::Permission);
        assert_eq!(kind_for_status(404), ErrorKind::NotFound);
        assert_eq!(kind_for_status(400), ErrorKind::Validation);
        assert_eq!(kind_for_status(422), ErrorKind::Validation);
        assert_eq!(kind_for_status(500), ErrorKind::Server);
        assert_eq!(kind_for_status(503), ErrorKind::Server);
        assert_eq!(kind_for_status(409), ErrorKind::Unknown);
        assert_eq!(kind_for_status(302), ErrorKind::Unknown);
    }

    #[test]
    fn message_precedence() {
        assert_eq!(extract_message(400, r#"{"error":"bad","message":"m"}"#), "bad");
        assert_eq!(extract_message(400, r#"{"message":"Title is required"}"#), "Title is required");
        assert_eq!(extract_message(502, "<html>gateway</html>"), "HTTP 502");
        assert_eq!(extract_message(500, r#"{"error":""}"#), "HTTP 500");
        assert_eq!(extract_message(500, ""), "HTTP 500");
    }

    #[test]
    fn structured_error_field_is_rendered_as_json() {
        let msg = extract_message(422, r#"{"error":{"title":"required"}}"#);
        assert_eq!(msg, r#"{"title":"required"}"#);
    }

    #[test]
    fn unauthorized_clears_session_and_notifies_once() {
        let session = Session::ephemeral();
        session.set_token("T");
        let mut rx = session.subscribe();

        let err = classify(http(401, r#"{"message":"Token expired"}"#), &session);

        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(err.status_code, Some(401));
        assert_eq!(err.message, "Token expired");
        assert!(session.get_token().is_none());
        assert_eq!(rx.try_recv().unwrap(), None);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn a_second_401_does_not_notify_again() {
        let session = Session::ephemeral();
        session.set_token("T");
        let mut rx = session.subscribe();

        classify(http(401, "{}"), &session);
        classify(http(401, "{}"), &session);

        assert_eq!(rx.try_recv().unwrap(), None);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn other_failures_leave_the_session_alone() {
        let session = Session::ephemeral();
        session.set_token("T");

        for status in [400, 403, 404, 422, 500] {
            let err = classify(http(status, "{}"), &session);
            assert_eq!(err.status_code, Some(status));
        }
        let err = classify(
            TransportFailure::Network {
                message: "dns failure".to_string(),
            },
            &session,
        );
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.message, "dns failure");
        assert_eq!(session.get_token().as_deref(), Some("T"));
    }
}
