use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::jwt::TokenCodec;
use adapter::repository::auth::AuthRepositoryImpl;
use adapter::repository::game::GameRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::review::ReviewRepositoryImpl;
use adapter::repository::user::UserRepositoryImpl;
use kernel::permission::AuthorizationPolicy;
use kernel::repository::auth::AuthRepository;
use kernel::repository::game::GameRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::review::ReviewRepository;
use kernel::repository::user::UserRepository;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    user_repository: Arc<dyn UserRepository>,
    game_repository: Arc<dyn GameRepository>,
    review_repository: Arc<dyn ReviewRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    authorization_policy: Arc<AuthorizationPolicy>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: AppConfig) -> Self {
        let codec = TokenCodec::new(&app_config.auth.jwt_secret, app_config.auth.ttl);
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let game_repository = Arc::new(GameRepositoryImpl::new(pool.clone()));
        let review_repository = Arc::new(ReviewRepositoryImpl::new(pool.clone()));
        let auth_repository = Arc::new(AuthRepositoryImpl::new(pool.clone(), codec));
        // ロール階層と権限マトリクスは起動時に一度だけ構築する
        let authorization_policy = Arc::new(AuthorizationPolicy::default());
        Self {
            health_check_repository,
            user_repository,
            game_repository,
            review_repository,
            auth_repository,
            authorization_policy,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn game_repository(&self) -> Arc<dyn GameRepository> {
        self.game_repository.clone()
    }

    pub fn review_repository(&self) -> Arc<dyn ReviewRepository> {
        self.review_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn authorization_policy(&self) -> Arc<AuthorizationPolicy> {
        self.authorization_policy.clone()
    }
}
