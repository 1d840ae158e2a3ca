mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use campus_exchange::account::User;
use campus_exchange::listing::{Listing, ListingDraft, ListingKind, ListingStatus};
use campus_exchange::moderation::{ImageScorer, ImageScores, ModerationPipeline, ScorerError};
use campus_exchange::sweep::start_sweep_worker;
use chrono::Duration as ChronoDuration;
use common::Harness;
use rust_decimal::Decimal;

/// Scores by URL so one sweep can exercise every branch
struct UrlScorer;

#[async_trait]
impl ImageScorer for UrlScorer {
    async fn score(&self, image_ref: &str) -> Result<ImageScores, ScorerError> {
        let clean = ImageScores {
            nudity: 0.01,
            weapon: 0.02,
            alcohol: 0.01,
            drugs: 0.0,
            offensive: 0.03,
            violence: 0.01,
        };
        if image_ref.contains("knife") {
            Ok(ImageScores {
                weapon: 0.85,
                ..clean
            })
        } else if image_ref.contains("broken") {
            Err(ScorerError::Api("image could not be fetched".into()))
        } else {
            Ok(clean)
        }
    }
}

async fn harness() -> Harness {
    Harness::with_pipeline(ModerationPipeline::new(
        Some(Arc::new(UrlScorer)),
        Duration::from_secs(2),
    ))
    .await
}

async fn submit(h: &Harness, owner: &User, kind: ListingKind, title: &str, image: Option<&str>) -> Listing {
    h.state
        .listings
        .submit(
            owner,
            kind,
            ListingDraft {
                group_id: None,
                title: title.to_string(),
                description: "Pick up near the library".to_string(),
                price: Decimal::new(300, 0),
                image: image.map(str::to_string),
                listing_type: match kind {
                    ListingKind::Item => "sell".to_string(),
                    ListingKind::Service => "repairs".to_string(),
                },
                quantity: Some(1),
            },
        )
        .await
        .unwrap()
}

async fn status(h: &Harness, listing: &Listing) -> ListingStatus {
    h.state
        .listings
        .get(listing.kind, listing.id)
        .await
        .unwrap()
        .status
}

#[tokio::test]
async fn sweep_applies_moderation_verdicts() {
    let h = harness().await;
    let safe = submit(&h, &h.seller, ListingKind::Item, "Table lamp", Some("https://img/lamp.jpg")).await;
    let knife = submit(&h, &h.seller, ListingKind::Item, "Kitchen set", Some("https://img/knife.jpg")).await;
    let broken = submit(&h, &h.seller, ListingKind::Item, "Shoe rack", Some("https://img/broken.jpg")).await;
    let keyword = submit(&h, &h.buyer, ListingKind::Item, "Casino night tickets", None).await;
    // Services are never image-scored
    let service = submit(&h, &h.buyer, ListingKind::Service, "Laptop repair", Some("https://img/knife.jpg")).await;

    h.clock.advance(ChronoDuration::hours(30));
    let fresh = submit(&h, &h.seller, ListingKind::Item, "Desk organiser", None).await;

    let report = h.state.sweep.sweep_once().await;
    assert_eq!(report.scanned, 5);
    assert_eq!(report.approved, 3);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.failed, 0);

    assert_eq!(status(&h, &safe).await, ListingStatus::Approved);
    assert_eq!(status(&h, &knife).await, ListingStatus::Rejected);
    assert_eq!(status(&h, &broken).await, ListingStatus::Approved);
    assert_eq!(status(&h, &keyword).await, ListingStatus::Rejected);
    assert_eq!(status(&h, &service).await, ListingStatus::Approved);
    assert_eq!(status(&h, &fresh).await, ListingStatus::Pending);

    let sent = h.wait_for_mail(5).await;
    assert_eq!(sent.len(), 5);
    assert!(
        sent.iter()
            .any(|m| m.to == "bala@campus.edu" && m.subject.contains("Casino night tickets"))
    );
}

#[tokio::test]
async fn wait_period_boundary_is_exclusive() {
    let h = harness().await;
    let item = submit(&h, &h.seller, ListingKind::Item, "Notebook bundle", None).await;

    // Exactly the wait period: not yet stale
    h.clock.advance(ChronoDuration::hours(24));
    assert_eq!(h.state.sweep.sweep_once().await.scanned, 0);

    h.clock.advance(ChronoDuration::seconds(1));
    assert_eq!(h.state.sweep.sweep_once().await.approved, 1);
    assert_eq!(status(&h, &item).await, ListingStatus::Approved);
}

#[tokio::test]
async fn worker_sweeps_on_first_tick_and_stops() {
    let h = harness().await;
    let item = submit(&h, &h.seller, ListingKind::Item, "Water bottle", None).await;
    h.clock.advance(ChronoDuration::days(2));

    let handle = start_sweep_worker(h.state.sweep.clone());
    let mut decided = false;
    for _ in 0..100 {
        if status(&h, &item).await == ListingStatus::Approved {
            decided = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(decided);

    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("worker stops");
}
