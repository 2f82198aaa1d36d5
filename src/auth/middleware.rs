use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::rc::Rc;

use super::gate;
use super::jwt::JwtUtils;

pub const API_KEY_HEADER: &str = "X-API-Key";

enum Scheme {
    /// `Authorization: Bearer <jwt>`; the resolved `Identity` lands in request extensions.
    Bearer(JwtUtils),
    /// `X-API-Key: <static secret>`; no identity is attached.
    ApiKey(String),
}

#[derive(Clone)]
pub struct AuthMiddleware {
    scheme: Rc<Scheme>,
}

impl AuthMiddleware {
    pub fn bearer(jwt: JwtUtils) -> Self {
        Self { scheme: Rc::new(Scheme::Bearer(jwt)) }
    }

    pub fn api_key(expected: impl Into<String>) -> Self {
        Self { scheme: Rc::new(Scheme::ApiKey(expected.into())) }
    }
}

// 미들웨어 팩토리
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            scheme: Rc::clone(&self.scheme),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    scheme: Rc<Scheme>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth_result = match self.scheme.as_ref() {
            Scheme::Bearer(jwt) => {
                let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
                gate::authenticate(header, jwt).map(|identity| {
                    req.extensions_mut().insert(identity);
                })
            }
            Scheme::ApiKey(expected) => {
                let header = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
                gate::authenticate_service_key(header, expected)
            }
        };

        match auth_result {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                tracing::debug!(path = %req.path(), code = ?err.code(), "인증 실패");
                // 하위 서비스 호출 없이 에러 응답 반환
                let response = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
