use std::sync::Arc;

use super::auth::JwtVerifier;
use crate::account::AccountService;
use crate::db::Database;
use crate::hire::HireService;
use crate::listing::ListingService;
use crate::store::MarketStore;
use crate::sweep::SweepWorker;
use crate::trade::TradeService;
use crate::wanted::WantedService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub accounts: AccountService,
    pub listings: ListingService,
    pub trades: TradeService,
    pub hires: HireService,
    pub wanted: WantedService,
    /// On-demand sweeps share the background worker's configuration
    pub sweep: SweepWorker,
    pub jwt: JwtVerifier,
    /// Absent when running on the in-memory store
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn MarketStore>,
        accounts: AccountService,
        listings: ListingService,
        trades: TradeService,
        hires: HireService,
        wanted: WantedService,
        sweep: SweepWorker,
        jwt: JwtVerifier,
        pg_db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            store,
            accounts,
            listings,
            trades,
            hires,
            wanted,
            sweep,
            jwt,
            pg_db,
        }
    }
}
