//! Service wiring shared by the binary and the integration tests

use std::collections::HashMap;
use std::sync::Arc;

use crate::account::{AccountService, NewUser, Role};
use crate::clock::Clock;
use crate::config::{AppConfig, SeedConfig};
use crate::db::Database;
use crate::gateway::auth::JwtVerifier;
use crate::gateway::state::AppState;
use crate::hire::HireService;
use crate::listing::ListingService;
use crate::moderation::ModerationPipeline;
use crate::notify::{Mailer, Notifier};
use crate::store::{MarketStore, MemoryStore};
use crate::sweep::SweepWorker;
use crate::trade::TradeService;
use crate::wanted::WantedService;

/// Build every service on top of one store
pub fn assemble(
    config: &AppConfig,
    store: Arc<dyn MarketStore>,
    mailer: Arc<dyn Mailer>,
    pipeline: ModerationPipeline,
    clock: Arc<dyn Clock>,
    pg_db: Option<Arc<Database>>,
) -> Arc<AppState> {
    let notifier = Notifier::new(store.clone(), mailer);
    let accounts = AccountService::new(store.clone());
    let listings = ListingService::new(store.clone(), notifier.clone());
    let trades = TradeService::new(store.clone(), notifier.clone());
    let hires = HireService::new(store.clone(), notifier.clone(), clock.clone());
    let wanted = WantedService::new(store.clone(), notifier);
    let sweep = SweepWorker::new(
        store.clone(),
        listings.clone(),
        pipeline,
        clock,
        config.sweep.clone(),
    );

    Arc::new(AppState::new(
        store,
        accounts,
        listings,
        trades,
        hires,
        wanted,
        sweep,
        JwtVerifier::new(config.auth.jwt_secret.clone()),
        pg_db,
    ))
}

/// Create the configured groups and accounts in a fresh in-memory store
pub async fn seed_memory_store(store: &MemoryStore, seed: &SeedConfig) -> anyhow::Result<()> {
    let mut groups = HashMap::new();
    for name in &seed.groups {
        let group = store.create_group(name).await?;
        groups.insert(group.name.clone(), group.id);
    }

    for user in &seed.users {
        let group_id = match &user.group {
            Some(name) => Some(
                *groups
                    .get(name)
                    .ok_or_else(|| anyhow::anyhow!("seed user {} names unknown group {}", user.email, name))?,
            ),
            None => None,
        };
        let created = store
            .add_user(NewUser {
                name: user.name.clone(),
                email: user.email.clone(),
                contact_details: user.contact_details.clone(),
                role: Role::parse(&user.role),
                group_id,
            })
            .await;
        tracing::info!(user_id = created.id, email = %created.email, role = created.role.as_str(), "Seeded user");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedUser;

    #[tokio::test]
    async fn test_seed_links_groups() {
        let store = MemoryStore::new();
        let seed = SeedConfig {
            groups: vec!["East Hostel".into()],
            users: vec![SeedUser {
                name: "Asha".into(),
                email: "asha@campus.edu".into(),
                contact_details: "98450 12345".into(),
                role: "admin".into(),
                group: Some("East Hostel".into()),
            }],
        };
        seed_memory_store(&store, &seed).await.unwrap();

        let groups = store.list_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        let user = store.get_user(groups[0].id + 1).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.group_id, Some(groups[0].id));
    }

    #[tokio::test]
    async fn test_seed_unknown_group_fails() {
        let store = MemoryStore::new();
        let seed = SeedConfig {
            groups: vec![],
            users: vec![SeedUser {
                name: "Ravi".into(),
                email: "ravi@campus.edu".into(),
                contact_details: String::new(),
                role: String::new(),
                group: Some("Nowhere".into()),
            }],
        };
        assert!(seed_memory_store(&store, &seed).await.is_err());
    }
}
