#![allow(dead_code)] // Not every test file uses every knob

use axum::Router;
use chrono::Duration;
use std::sync::Arc;

use house_access::{
    build_router,
    house::repository::InMemoryHouseRepository,
    user::repository::InMemoryUserRepository,
    AppState, HouseModel, TokenConfig,
};

pub const TEST_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub user_repository: Arc<InMemoryUserRepository>,
    pub house_repository: Arc<InMemoryHouseRepository>,
    pub token_config: TokenConfig,
}

pub struct TestSetupBuilder {
    houses: Vec<HouseModel>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            houses: vec![],
            access_ttl: Duration::hours(24),
            refresh_ttl: Duration::days(7),
        }
    }

    pub fn with_house(mut self, name: &str, access_code: &str) -> Self {
        self.houses.push(HouseModel::new(
            name.to_string(),
            access_code.to_string(),
            String::new(),
        ));
        self
    }

    /// Issued tokens expire immediately
    pub fn with_expired_tokens(mut self) -> Self {
        self.access_ttl = Duration::seconds(-10);
        self.refresh_ttl = Duration::seconds(-10);
        self
    }

    pub fn build(self) -> TestSetup {
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let house_repository = Arc::new(InMemoryHouseRepository::with_houses(self.houses));
        let token_config = TokenConfig::new(TEST_SECRET, self.access_ttl, self.refresh_ttl);

        let app_state = AppState::new(
            user_repository.clone(),
            house_repository.clone(),
            token_config.clone(),
            std::time::Duration::from_secs(5),
        );

        TestSetup {
            app: build_router(app_state),
            user_repository,
            house_repository,
            token_config,
        }
    }
}
