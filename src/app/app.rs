use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::{error, info, warn};

use crate::config::{AdminUserConfig, AppConfig, ConfigError, JwtConfig, MongoConfig, RedisConfig, SessionBackend, StoreBackend};
use crate::handler::health_handler::health_handler;
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::repository_error::RepositoryError;
use crate::repository::Repositories;
use crate::router::{
    client_router::client_router, job_router::job_router, payment_router::payment_router, quote_router::quote_router,
    report_router::report_router, staff_router::staff_router, user_router::user_router,
};
use crate::service::client_service::ClientServiceImpl;
use crate::service::job_service::JobServiceImpl;
use crate::service::payment_service::PaymentServiceImpl;
use crate::service::quote_service::QuoteServiceImpl;
use crate::service::report_service::ReportServiceImpl;
use crate::service::staff_service::StaffServiceImpl;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::ServiceResult;
use crate::util::invoicing::{InvoicingService, StubInvoicingService};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::redis::{RedisError, RedisService};
use crate::util::session::{InMemorySessionStore, RedisSessionStore, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct App {
    config: AppConfig,
    pub user_service: Arc<UserServiceImpl>,
    pub client_service: Arc<ClientServiceImpl>,
    pub quote_service: Arc<QuoteServiceImpl>,
    pub job_service: Arc<JobServiceImpl>,
    pub staff_service: Arc<StaffServiceImpl>,
    pub payment_service: Arc<PaymentServiceImpl>,
    pub report_service: Arc<ReportServiceImpl>,
}

impl App {
    /// Builds the application from environment configuration, connecting to
    /// the configured backends and seeding the first admin.
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;

        let repos = match config.store_backend {
            StoreBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                Repositories::mongo(&mongo_config).await?
            }
            StoreBackend::Memory => {
                warn!("Using the in-memory store; data is lost on restart");
                Repositories::in_memory()
            }
        };

        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Redis => {
                let redis_config = RedisConfig::from_env()?;
                let redis = RedisService::new(&redis_config).await?;
                Arc::new(RedisSessionStore::new(redis, redis_config.session_prefix.clone()))
            }
            SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
        };

        let app = App::with_backends(config, repos, sessions, jwt_config);
        match AdminUserConfig::from_env() {
            Ok(admin) => {
                if let Err(e) = app.seed_admin(&admin).await {
                    error!("Failed to create admin user: {}", e);
                }
            }
            Err(e) => warn!("Admin user config not loaded: {}", e),
        }
        Ok(app)
    }

    /// Wires every service onto the given store and session backends.
    pub fn with_backends(
        config: AppConfig,
        repos: Repositories,
        sessions: Arc<dyn SessionStore>,
        jwt_config: JwtConfig,
    ) -> Self {
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let invoicing: Arc<dyn InvoicingService> = Arc::new(StubInvoicingService);

        App {
            config,
            user_service: Arc::new(UserServiceImpl::new(repos.clone(), sessions, jwt_utils)),
            client_service: Arc::new(ClientServiceImpl::new(repos.clone(), invoicing.clone())),
            quote_service: Arc::new(QuoteServiceImpl::new(repos.clone())),
            job_service: Arc::new(JobServiceImpl::new(repos.clone())),
            staff_service: Arc::new(StaffServiceImpl::new(repos.clone())),
            payment_service: Arc::new(PaymentServiceImpl::new(repos.clone(), invoicing)),
            report_service: Arc::new(ReportServiceImpl::new(repos)),
        }
    }

    pub async fn seed_admin(&self, admin: &AdminUserConfig) -> ServiceResult<bool> {
        self.user_service.seed_admin(admin).await
    }

    pub fn router(&self) -> Router {
        let auth_state = Arc::new(AuthState { user_service: self.user_service.clone() });

        let api = Router::new()
            .route("/health", get(health_handler))
            .merge(user_router(self.user_service.clone(), auth_state.clone()))
            .merge(client_router(self.client_service.clone(), auth_state.clone()))
            .merge(quote_router(self.quote_service.clone(), auth_state.clone()))
            .merge(job_router(self.job_service.clone(), auth_state.clone()))
            .merge(staff_router(self.staff_service.clone(), auth_state.clone()))
            .merge(payment_router(self.payment_service.clone(), auth_state.clone()))
            .merge(report_router(self.report_service.clone(), self.job_service.clone(), auth_state));

        Router::new().nest("/api", api)
    }

    pub async fn start(self) -> Result<(), AppError> {
        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Server running at http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
