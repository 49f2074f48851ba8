use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::store::Store;
use crate::token::TokenMaker;
use crate::worker::TaskDistributor;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub store: Store,
    pub distributor: Arc<dyn TaskDistributor>,
    pub token_maker: Arc<TokenMaker>,
    pub config: Arc<AppConfig>,
}
