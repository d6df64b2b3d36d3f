use crate::database::DocumentStore;
use crate::middleware::access::{self, AccessPolicy, AccessRequest};
use crate::services::auth_service::TokenService;
use crate::utils::AppError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Runs the access chain of a policy in front of a route. On success the
/// decoded `Claims` (and, for admin routes, the `User`) are placed in the
/// request extensions for `web::ReqData`.
pub struct AuthMiddleware {
    policy: AccessPolicy,
}

impl AuthMiddleware {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn authenticated() -> Self {
        Self::new(AccessPolicy::Authenticated)
    }

    pub fn admin() -> Self {
        Self::new(AccessPolicy::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            policy: self.policy,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    policy: AccessPolicy,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = self.policy;

        Box::pin(async move {
            if policy == AccessPolicy::Public {
                return service.call(req).await;
            }

            // A header that is not valid UTF-8 is present but unusable.
            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .map(|value| value.to_str().unwrap_or_default().to_string());

            let tokens = req
                .app_data::<web::Data<TokenService>>()
                .cloned()
                .ok_or_else(|| AppError::Configuration("TokenService is not registered".to_string()))?;
            let store = req
                .app_data::<web::Data<dyn DocumentStore>>()
                .cloned()
                .ok_or_else(|| AppError::Configuration("DocumentStore is not registered".to_string()))?;

            let request = AccessRequest {
                authorization: authorization.as_deref(),
                tokens: tokens.get_ref(),
                store: store.get_ref(),
            };

            let context = access::run_chain(policy, &request).await.map_err(|e| {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                e
            })?;

            if let Some(claims) = context.claims {
                req.extensions_mut().insert(claims);
            }
            if let Some(identity) = context.identity {
                req.extensions_mut().insert(identity);
            }

            service.call(req).await
        })
    }
}
