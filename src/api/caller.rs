//! Caller identity extractor.
//!
//! Authentication happens upstream; the gateway only reads the verified
//! party id forwarded in the [`CALLER_HEADER`] header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::PartyId;
use crate::error::EscrowError;

/// Header carrying the authenticated caller's party id.
pub const CALLER_HEADER: &str = "x-caller-id";

/// Identity of the party issuing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub PartyId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = EscrowError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or(EscrowError::MissingCaller)?;
        let raw = value
            .to_str()
            .map_err(|_| EscrowError::InvalidRequest(format!("{CALLER_HEADER} is not ASCII")))?;
        raw.trim()
            .parse::<PartyId>()
            .map(Self)
            .map_err(|e| EscrowError::InvalidRequest(format!("{CALLER_HEADER}: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<Caller, EscrowError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(CALLER_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("request build failed");
        };
        let (mut parts, ()) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_party_from_header() {
        let party = PartyId::new();
        let Ok(Caller(found)) = extract(Some(&party.to_string())).await else {
            panic!("expected caller");
        };
        assert_eq!(found, party);
    }

    #[tokio::test]
    async fn missing_header_is_missing_caller() {
        assert!(matches!(extract(None).await, Err(EscrowError::MissingCaller)));
    }

    #[tokio::test]
    async fn malformed_header_is_invalid_request() {
        assert!(matches!(
            extract(Some("alice")).await,
            Err(EscrowError::InvalidRequest(_))
        ));
    }
}
