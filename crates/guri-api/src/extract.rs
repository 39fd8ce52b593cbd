//! Body extractors whose rejections render as [`ApiError`] envelopes.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
};

use crate::error::ApiError;

/// JSON body; malformed or mistyped payloads become `400` envelopes.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Multipart body; a missing or broken boundary becomes a `400` envelope.
pub struct ApiMultipart(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Ok(ApiMultipart(multipart))
    }
}
