//! Fire-and-forget notifications
//!
//! State machines hand a rendered [`Notice`] and a recipient user id to the
//! [`Notifier`], which resolves the address and sends on a detached task.
//! Delivery failures are logged and never reach the caller.

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core_types::UserId;
use crate::store::MarketStore;

pub use mailer::{
    HttpMailer, LogMailer, MailError, Mailer, RecordingMailer, SentMail, mailer_from_config,
};
pub use templates::Notice;

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn MarketStore>,
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(store: Arc<dyn MarketStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Send `notice` to the user's e-mail address in the background
    pub fn notify_user(&self, user_id: UserId, notice: Notice) -> JoinHandle<()> {
        let store = self.store.clone();
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            let user = match store.get_user(user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(user_id, subject = %notice.subject, "Notification recipient not found");
                    return;
                }
                Err(e) => {
                    warn!(user_id, error = %e, "Failed to resolve notification recipient");
                    return;
                }
            };

            match mailer.send(&user.email, &notice.subject, &notice.html).await {
                Ok(()) => debug!(user_id, subject = %notice.subject, "Notification sent"),
                Err(e) => warn!(user_id, error = %e, "Failed to send notification"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{NewUser, Role};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_notify_resolves_email() {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .add_user(NewUser {
                name: "Meera".into(),
                email: "meera@campus.edu".into(),
                contact_details: "12345".into(),
                role: Role::User,
                group_id: None,
            })
            .await;
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(store, mailer.clone());

        notifier
            .notify_user(
                user.id,
                Notice {
                    subject: "Hello".into(),
                    html: "<p/>".into(),
                },
            )
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "meera@campus.edu");
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_dropped() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(Arc::new(MemoryStore::new()), mailer.clone());
        notifier
            .notify_user(
                404,
                Notice {
                    subject: "x".into(),
                    html: String::new(),
                },
            )
            .await
            .unwrap();
        assert!(mailer.sent().is_empty());
    }
}
