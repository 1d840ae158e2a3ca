mod common;

use campus_exchange::account::{Actor, User};
use campus_exchange::error::MarketError;
use campus_exchange::listing::{Listing, ListingDraft, ListingKind, ListingStatus};
use campus_exchange::store::MarketStore;
use campus_exchange::trade::{TradeDraft, TradeRole, TradeStatus, TradeType};
use common::Harness;
use rust_decimal::Decimal;

async fn approved_item(h: &Harness, owner: &User, title: &str, quantity: i32) -> Listing {
    let draft = ListingDraft {
        group_id: None,
        title: title.to_string(),
        description: "Good condition".to_string(),
        price: Decimal::new(1200, 0),
        image: None,
        listing_type: "sell".to_string(),
        quantity: Some(quantity),
    };
    let item = h
        .state
        .listings
        .submit(owner, ListingKind::Item, draft)
        .await
        .unwrap();
    h.state
        .listings
        .approve(&Actor::Member(h.admin.clone()), ListingKind::Item, item.id)
        .await
        .unwrap()
}

fn buy(item_id: i64, quantity: i32) -> TradeDraft {
    TradeDraft {
        item_id,
        trade_type: TradeType::Buy,
        quantity,
        offered_item_id: None,
    }
}

#[tokio::test]
async fn approval_decrements_until_sold() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Cricket bat", 3).await;

    let first = h.state.trades.create(&h.buyer, buy(item.id, 2)).await.unwrap();
    let approval = h.state.trades.approve(&h.seller, first.id).await.unwrap();
    assert_eq!(approval.request.status, TradeStatus::Approved);
    assert_eq!(approval.item.quantity, Some(1));
    assert_eq!(approval.item.status, ListingStatus::Approved);
    assert_eq!(approval.buyer.as_ref().unwrap().phone, "90000 22222");
    assert_eq!(approval.seller.phone, "90000 11111");

    // More than what is left: nothing changes
    let too_many = h.state.trades.create(&h.buyer, buy(item.id, 2)).await.unwrap();
    let err = h.state.trades.approve(&h.seller, too_many.id).await.unwrap_err();
    assert_eq!(
        err,
        MarketError::InsufficientQuantity {
            requested: 2,
            available: 1
        }
    );
    let unchanged = h.state.listings.get(ListingKind::Item, item.id).await.unwrap();
    assert_eq!(unchanged.quantity, Some(1));

    let last = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();
    let approval = h.state.trades.approve(&h.seller, last.id).await.unwrap();
    assert_eq!(approval.item.quantity, Some(0));
    assert_eq!(approval.item.status, ListingStatus::Sold);

    // The stale request now fails against the sold item
    let err = h.state.trades.approve(&h.seller, too_many.id).await.unwrap_err();
    assert_eq!(
        err,
        MarketError::InsufficientQuantity {
            requested: 2,
            available: 0
        }
    );
}

#[tokio::test]
async fn sold_item_accepts_no_new_requests() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Calculator", 1).await;
    let req = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();
    h.state.trades.approve(&h.seller, req.id).await.unwrap();

    let err = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap_err();
    assert!(matches!(err, MarketError::InvalidRequest(_)));
}

#[tokio::test]
async fn decisions_are_single_shot() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Hostel fan", 2).await;
    let req = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();

    let err = h.state.trades.approve(&h.buyer, req.id).await.unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)));

    h.state.trades.reject(&h.seller, req.id).await.unwrap();
    assert_eq!(
        h.state.trades.approve(&h.seller, req.id).await.unwrap_err(),
        MarketError::AlreadyProcessed
    );
    assert_eq!(
        h.state.trades.reject(&h.seller, req.id).await.unwrap_err(),
        MarketError::AlreadyProcessed
    );

    // Rejection leaves inventory alone
    let item = h.state.listings.get(ListingKind::Item, item.id).await.unwrap();
    assert_eq!(item.quantity, Some(2));
}

#[tokio::test]
async fn create_preconditions() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Mattress", 1).await;

    assert_eq!(
        h.state.trades.create(&h.no_phone, buy(item.id, 1)).await.unwrap_err(),
        MarketError::ContactDetailsIncomplete
    );
    assert!(matches!(
        h.state.trades.create(&h.seller, buy(item.id, 1)).await.unwrap_err(),
        MarketError::InvalidRequest(_)
    ));
    assert_eq!(
        h.state.trades.create(&h.buyer, buy(9999, 1)).await.unwrap_err(),
        MarketError::NotFound("item")
    );
    assert!(matches!(
        h.state.trades.create(&h.buyer, buy(item.id, 0)).await.unwrap_err(),
        MarketError::Validation(_)
    ));

    // Fixing contact details unblocks the user
    let fixed = h
        .store
        .update_user_details(h.no_phone.id, "Nila", "90000 33333")
        .await
        .unwrap()
        .unwrap();
    assert!(h.state.trades.create(&fixed, buy(item.id, 1)).await.is_ok());
}

#[tokio::test]
async fn exchange_offer_must_be_own_item() {
    let h = Harness::new().await;
    let wanted = approved_item(&h, &h.seller, "Guitar", 1).await;
    let mine = approved_item(&h, &h.buyer, "Keyboard", 1).await;
    let theirs = approved_item(&h, &h.seller, "Amplifier", 1).await;

    let mut draft = TradeDraft {
        item_id: wanted.id,
        trade_type: TradeType::Exchange,
        quantity: 1,
        offered_item_id: Some(theirs.id),
    };
    assert!(matches!(
        h.state.trades.create(&h.buyer, draft.clone()).await.unwrap_err(),
        MarketError::InvalidRequest(_)
    ));

    draft.offered_item_id = Some(mine.id);
    let req = h.state.trades.create(&h.buyer, draft.clone()).await.unwrap();
    assert_eq!(req.offered_item_id, Some(mine.id));

    // Offers only make sense on exchanges
    draft.trade_type = TradeType::Buy;
    assert!(matches!(
        h.state.trades.create(&h.buyer, draft).await.unwrap_err(),
        MarketError::Validation(_)
    ));
}

#[tokio::test]
async fn contacts_revealed_only_after_approval() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Lab coat", 2).await;
    let req = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();

    let views = h.state.trades.list_for_user(&h.buyer).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].role, TradeRole::Buyer);
    assert!(views[0].seller.contact.is_none());

    h.state.trades.approve(&h.seller, req.id).await.unwrap();

    let views = h.state.trades.list_for_user(&h.seller).await.unwrap();
    assert_eq!(views[0].role, TradeRole::Seller);
    let buyer_contact = views[0].buyer.contact.as_ref().unwrap();
    assert_eq!(buyer_contact.phone, "90000 22222");
    assert_eq!(views[0].item.as_ref().unwrap().quantity, Some(1));
}

#[tokio::test]
async fn parties_are_notified() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Study table", 1).await;
    // Approval mail to the owner
    h.wait_for_mail(1).await;

    let req = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();
    h.state.trades.approve(&h.seller, req.id).await.unwrap();

    let sent = h.wait_for_mail(3).await;
    assert_eq!(sent.len(), 3);
    assert!(
        sent.iter()
            .any(|m| m.to == "sita@campus.edu" && m.subject.contains("Request: Study table"))
    );
    let approved = sent
        .iter()
        .find(|m| m.to == "bala@campus.edu")
        .expect("buyer mail");
    assert!(approved.subject.contains("has been approved"));
    assert!(approved.html.contains("90000 11111"));
}

#[tokio::test]
async fn concurrent_approvals_never_oversell() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Bicycle", 1).await;
    let a = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();
    let fixed = h
        .store
        .update_user_details(h.no_phone.id, "Nila", "90000 33333")
        .await
        .unwrap()
        .unwrap();
    let b = h.state.trades.create(&fixed, buy(item.id, 1)).await.unwrap();

    let (ra, rb) = tokio::join!(
        h.state.trades.approve(&h.seller, a.id),
        h.state.trades.approve(&h.seller, b.id)
    );
    assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);
    let loser = ra.err().or(rb.err()).unwrap();
    assert!(matches!(loser, MarketError::InsufficientQuantity { .. }));

    let item = h.state.listings.get(ListingKind::Item, item.id).await.unwrap();
    assert_eq!(item.quantity, Some(0));
    assert_eq!(item.status, ListingStatus::Sold);
}

#[tokio::test]
async fn concurrent_approvals_of_one_request_decrement_once() {
    let h = Harness::new().await;
    let item = approved_item(&h, &h.seller, "Study lamp", 3).await;
    let request = h.state.trades.create(&h.buyer, buy(item.id, 1)).await.unwrap();

    let (ra, rb) = tokio::join!(
        h.state.trades.approve(&h.seller, request.id),
        h.state.trades.approve(&h.seller, request.id)
    );
    assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);
    let loser = ra.as_ref().err().or(rb.as_ref().err()).unwrap();
    assert_eq!(*loser, MarketError::AlreadyProcessed);

    let item = h.state.listings.get(ListingKind::Item, item.id).await.unwrap();
    assert_eq!(item.quantity, Some(2));
    assert_eq!(item.status, ListingStatus::Approved);
    let stored = h.store.get_trade(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TradeStatus::Approved);
}
