use crate::correlation_id::get_correlation_id;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpMessage, HttpResponse, ResponseError,
};
use error_types::{error_codes, ErrorResponse};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, errors::Error as JwtError, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// User ID extracted from JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Claims this middleware relies on. Tokens are issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies bearer tokens against a single configured key
#[derive(Clone)]
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Shared-secret validation (HS256)
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Public-key validation (RS256)
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, JwtError> {
        Ok(Self {
            key: DecodingKey::from_rsa_pem(pem)?,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn validate(&self, token: &str) -> Result<TokenData<Claims>, JwtError> {
        decode::<Claims>(token, &self.key, &self.validation)
    }

    /// Validate and parse the `sub` claim as a user id
    pub fn user_id(&self, token: &str) -> Result<Uuid, String> {
        let data = self.validate(token).map_err(|e| e.to_string())?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| "malformed user_id".to_string())
    }
}

/// Rejected authentication, rendered as the shared JSON error envelope
#[derive(Debug)]
pub struct AuthRejection {
    message: &'static str,
    trace_id: Option<String>,
}

impl AuthRejection {
    fn new(message: &'static str, trace_id: Option<String>) -> Self {
        Self { message, trace_id }
    }
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = ErrorResponse::new(
            "Unauthorized",
            self.message,
            StatusCode::UNAUTHORIZED.as_u16(),
            "authentication_error",
            error_codes::TOKEN_INVALID,
        );
        if let Some(trace_id) = &self.trace_id {
            body = body.with_trace_id(trace_id.clone());
        }
        HttpResponse::Unauthorized().json(body)
    }
}

/// JWT Authentication Middleware
pub struct JwtAuthMiddleware {
    validator: Arc<JwtValidator>,
}

impl JwtAuthMiddleware {
    pub fn new(validator: Arc<JwtValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<JwtValidator>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let validator = self.validator.clone();

        Box::pin(async move {
            let trace_id = get_correlation_id(req.request());

            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    AuthRejection::new("missing Authorization header", trace_id.clone())
                })?;

            let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
                AuthRejection::new("invalid Authorization header format", trace_id.clone())
            })?;

            let user_id = validator.user_id(token).map_err(|e| {
                tracing::warn!(error = %e, "JWT validation failed");
                AuthRejection::new("invalid token", trace_id.clone())
            })?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}

impl actix_web::FromRequest for UserId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<UserId>() {
            Some(user_id) => ready(Ok(*user_id)),
            None => ready(Err(AuthRejection::new(
                "user not authenticated",
                get_correlation_id(req),
            )
            .into())),
        }
    }
}
