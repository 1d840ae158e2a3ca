//! Shared fixture: in-memory store, manual clock, recording mailer

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use campus_exchange::account::{Group, NewUser, Role, User};
use campus_exchange::app::assemble;
use campus_exchange::clock::ManualClock;
use campus_exchange::config::AppConfig;
use campus_exchange::gateway::state::AppState;
use campus_exchange::moderation::ModerationPipeline;
use campus_exchange::notify::{RecordingMailer, SentMail};
use campus_exchange::store::{MarketStore, MemoryStore};
use chrono::{TimeZone, Utc};

pub const JWT_SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    AppConfig::from_yaml(&format!(
        r#"
log_level: debug
log_dir: ./logs
log_file: test.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 0
auth:
  jwt_secret: {}
"#,
        JWT_SECRET
    ))
    .expect("test config")
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub mailer: Arc<RecordingMailer>,
    pub state: Arc<AppState>,
    pub group: Group,
    pub admin: User,
    pub seller: User,
    pub buyer: User,
    /// Contact details hold an e-mail address instead of a phone number
    pub no_phone: User,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_pipeline(ModerationPipeline::text_only()).await
    }

    pub async fn with_pipeline(pipeline: ModerationPipeline) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 12, 10, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let group = store.create_group("Hostel A").await.expect("group");

        let admin = add_user(&store, "Admin", "admin@campus.edu", "90000 00000", Role::Admin, None).await;
        let seller = add_user(&store, "Sita", "sita@campus.edu", "90000 11111", Role::User, Some(group.id)).await;
        let buyer = add_user(&store, "Bala", "bala@campus.edu", "90000 22222", Role::User, Some(group.id)).await;
        let no_phone = add_user(&store, "Nila", "nila@campus.edu", "nila@campus.edu", Role::User, Some(group.id)).await;

        let mailer = Arc::new(RecordingMailer::default());
        let state = assemble(
            &test_config(),
            store.clone(),
            mailer.clone(),
            pipeline,
            clock.clone(),
            None,
        );

        Self {
            store,
            clock,
            mailer,
            state,
            group,
            admin,
            seller,
            buyer,
            no_phone,
        }
    }

    /// Mail arrives on detached tasks; poll until `count` messages were sent
    pub async fn wait_for_mail(&self, count: usize) -> Vec<SentMail> {
        for _ in 0..100 {
            let sent = self.mailer.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.mailer.sent()
    }
}

async fn add_user(
    store: &MemoryStore,
    name: &str,
    email: &str,
    contact: &str,
    role: Role,
    group_id: Option<i64>,
) -> User {
    store
        .add_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            contact_details: contact.to_string(),
            role,
            group_id,
        })
        .await
}
