//! Notification bodies

use rust_decimal::Decimal;

use crate::account::ContactCard;
use crate::hire::HireRequest;
use crate::listing::{Listing, ListingStatus};
use crate::trade::{TradeRequest, TradeType};
use crate::wanted::RequestedItem;

/// Rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub html: String,
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(heading: &str, rows: &[(&str, String)]) -> String {
    let mut html = format!("<html><body><h1>{}</h1><table>", escape(heading));
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
            escape(label),
            escape(value)
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn contact_rows(card: &ContactCard) -> Vec<(&'static str, String)> {
    vec![
        ("Name", card.name.clone()),
        ("Email", card.email.clone()),
        ("Phone", card.phone.clone()),
    ]
}

pub fn listing_decided(listing: &Listing) -> Notice {
    let verdict = match listing.status {
        ListingStatus::Approved => "approved",
        _ => "rejected",
    };
    Notice {
        subject: format!("Your {} \"{}\" was {}", listing.kind, listing.title, verdict),
        html: page(
            &format!("Listing {}", verdict),
            &[
                ("Title", listing.title.clone()),
                ("Status", verdict.to_string()),
            ],
        ),
    }
}

pub fn trade_requested(listing: &Listing, trade: &TradeRequest, buyer_name: &str) -> Notice {
    let kind = match trade.trade_type {
        TradeType::Buy => "Purchase",
        TradeType::Exchange => "Exchange",
    };
    let total = listing.price * Decimal::from(trade.quantity);
    Notice {
        subject: format!("New Item {} Request: {}", kind, listing.title),
        html: page(
            "New Item Request!",
            &[
                ("Item", listing.title.clone()),
                ("Requested by", buyer_name.to_string()),
                ("Quantity", trade.quantity.to_string()),
                ("Total price", total.to_string()),
            ],
        ),
    }
}

pub fn trade_approved(listing: &Listing, trade: &TradeRequest, seller: &ContactCard) -> Notice {
    let mut rows = vec![
        ("Item", listing.title.clone()),
        ("Quantity", trade.quantity.to_string()),
    ];
    rows.extend(contact_rows(seller));
    Notice {
        subject: format!("Your purchase request for {} has been approved!", listing.title),
        html: page("Purchase Request Approved!", &rows),
    }
}

pub fn wanted_fulfilled(wanted: &RequestedItem, item: &Listing, provider_name: &str) -> Notice {
    Notice {
        subject: format!("Your Request Has Been Fulfilled: {}", wanted.title),
        html: page(
            "Your Request Has Been Fulfilled!",
            &[
                ("Request", wanted.title.clone()),
                ("Offered by", provider_name.to_string()),
                ("Price", item.price.to_string()),
                ("Quantity", item.quantity.unwrap_or(1).to_string()),
            ],
        ),
    }
}

pub fn hire_accepted(hire: &HireRequest, provider: &ContactCard) -> Notice {
    let mut rows = vec![("Request", hire.title.clone())];
    rows.extend(contact_rows(provider));
    Notice {
        subject: format!("Your service request \"{}\" was accepted", hire.title),
        html: page("Service Request Accepted", &rows),
    }
}
