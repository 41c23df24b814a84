//! Request Dispatcher
//!
//! Stateless router: every request resolves the session, settings and
//! principal afresh, then dispatches on the path suffix. Errors surface
//! once, here, as a status-coded [`ResponseEnvelope`]; nothing a handler
//! does can take the dispatcher down.

mod request;
mod response;
mod types;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, error, warn};

pub use request::{normalize_path, parse_params, resolve_session_token, ProbeTarget, RawRequest, RequestEnvelope};
pub use response::{ResponseEnvelope, CONTENT_TYPE_JSON};
pub use types::{
    CapabilityBody, ConnectBody, DiagnosticsBody, DispatcherConfig, EndpointsBody, Operation,
    PingBody, RouteError, DEFAULT_APP, DEFAULT_MAX_CONCURRENT_PROBES,
};

use crate::access::{authorize, denial_reason, Principal};
use crate::broker::{ConnectDecision, ConnectionBroker};
use crate::config::value::parse_bool;
use crate::config::{AppSettings, ConfigStore};
use crate::endpoint::EndpointRegistry;
use crate::probe::{probe_all, Prober};

/// Everything resolved for one request before routing
struct CallContext<'a> {
    request: &'a RequestEnvelope,
    token: &'a str,
    settings: AppSettings,
    principal: Principal,
    has_access: bool,
}

pub struct Dispatcher {
    config: DispatcherConfig,
    store: Arc<dyn ConfigStore>,
    registry: EndpointRegistry,
    prober: Arc<dyn Prober>,
    broker: ConnectionBroker,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig, store: Arc<dyn ConfigStore>, prober: Arc<dyn Prober>) -> Self {
        Self {
            config,
            registry: EndpointRegistry::new(store.clone()),
            broker: ConnectionBroker::new(prober.clone()),
            store,
            prober,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Handle one raw JSON request
    pub async fn handle_json(&self, input: &str) -> ResponseEnvelope {
        match RawRequest::from_json(input) {
            Ok(raw) => self.dispatch(RequestEnvelope::from(&raw)).await,
            Err(e) => {
                warn!("Rejecting request: {}", e);
                e.into_response()
            }
        }
    }

    /// Route a normalized request. Never fails; errors become responses.
    pub async fn dispatch(&self, request: RequestEnvelope) -> ResponseEnvelope {
        debug!("Dispatch {} {}", request.method, request.path);

        match AssertUnwindSafe(self.route(&request)).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                match &e {
                    RouteError::Internal(msg) => {
                        error!("{} {} failed: {}", request.method, request.path, msg)
                    }
                    other => debug!("{} {} -> {}", request.method, request.path, other.status_code()),
                }
                e.into_response()
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                error!("{} {} panicked: {}", request.method, request.path, msg);
                RouteError::Internal(msg).into_response()
            }
        }
    }

    async fn route(&self, request: &RequestEnvelope) -> Result<ResponseEnvelope, RouteError> {
        let token = request
            .session_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(RouteError::AuthenticationRequired)?;

        let settings = self.load_settings(token).await;
        let principal = Principal::from(self.store.get_current_principal(token).await?);
        let has_access = authorize(&settings.required_capability, &principal.capabilities);

        let ctx = CallContext {
            request,
            token,
            settings,
            principal,
            has_access,
        };

        match Operation::from_path(&request.path) {
            Some(Operation::Ping) => Ok(ResponseEnvelope::ok(&PingBody {
                ok: true,
                path: &request.path,
                method: &request.method,
            })),
            Some(Operation::Diagnostics) => Ok(self.diagnostics(&ctx)),
            Some(Operation::Capability) => Ok(ResponseEnvelope::ok(&CapabilityBody::new(
                &ctx.principal,
                &ctx.settings.required_capability,
                ctx.has_access,
            ))),
            Some(Operation::Endpoints) => Ok(self.endpoints(&ctx).await),
            Some(Operation::Probe) => self.probe(&ctx).await,
            Some(Operation::Connect) => self.connect(&ctx).await,
            None => Err(RouteError::UnknownOperation(request.path.clone())),
        }
    }

    /// Settings fail soft to defaults
    async fn load_settings(&self, token: &str) -> AppSettings {
        match self.store.get_app_settings(token).await {
            Ok(raw) => AppSettings::from_raw(&raw),
            Err(e) => {
                warn!("Settings lookup failed, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    fn diagnostics(&self, ctx: &CallContext<'_>) -> ResponseEnvelope {
        ResponseEnvelope::ok(&DiagnosticsBody {
            ok: true,
            component: "app_access",
            app: &self.config.app,
            path: &ctx.request.path,
            method: &ctx.request.method,
            required_capability: &ctx.settings.required_capability,
            has_access: ctx.has_access,
            probe_timeout_seconds: ctx.settings.probe_timeout_seconds,
            launch_url_configured: !ctx.settings.launch_url_template.is_empty(),
            known_app_api_paths: &self.config.known_paths,
        })
    }

    async fn endpoints(&self, ctx: &CallContext<'_>) -> ResponseEnvelope {
        let endpoints = self.registry.list_endpoints(ctx.token).await;

        let probes = if parse_bool(ctx.request.param("probe"), false) {
            let targets = endpoints
                .iter()
                .map(|ep| (ep.id.clone(), ep.host.clone(), ep.port))
                .collect();
            Some(
                probe_all(
                    self.prober.as_ref(),
                    targets,
                    ctx.settings.probe_timeout_seconds,
                    self.config.max_concurrent_probes,
                )
                .await,
            )
        } else {
            None
        };

        ResponseEnvelope::ok(&EndpointsBody {
            ok: true,
            endpoints,
            probes,
        })
    }

    async fn probe(&self, ctx: &CallContext<'_>) -> Result<ResponseEnvelope, RouteError> {
        let target = ProbeTarget::from_params(&ctx.request.params)?;
        let result = self
            .prober
            .probe(&target.host, target.port, ctx.settings.probe_timeout_seconds)
            .await;
        Ok(ResponseEnvelope::ok(&result))
    }

    /// Authorization short-circuits before the target is validated or probed
    async fn connect(&self, ctx: &CallContext<'_>) -> Result<ResponseEnvelope, RouteError> {
        if !ctx.has_access {
            warn!(
                "Connect denied for '{}': missing capability {}",
                ctx.principal.username, ctx.settings.required_capability
            );
            return Err(RouteError::AuthorizationDenied {
                reason: denial_reason(&ctx.settings.required_capability),
            });
        }

        let target = ProbeTarget::from_params(&ctx.request.params)?;

        let decision = self
            .broker
            .connect(
                &target.host,
                target.port,
                &ctx.principal,
                &ctx.settings,
                ctx.has_access,
            )
            .await;

        match decision {
            ConnectDecision::Granted { connection, probe } => {
                Ok(ResponseEnvelope::ok(&ConnectBody::granted(connection, probe)))
            }
            ConnectDecision::Unauthorized { reason } => Err(RouteError::AuthorizationDenied { reason }),
            ConnectDecision::ProbeFailed { reason, probe } => Err(RouteError::ConnectionGateFailed {
                reason,
                probe: Box::new(probe),
            }),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}
