//! Shared fixtures for ledger integration tests.

#![allow(dead_code)]

use minimart_core::{LineRequest, Member, NewMember, NewProduct, NewSale, PaymentMethod, PaymentRequest, Product};
use minimart_ledger::{Ledger, LedgerConfig};

/// A ledger over a fresh in-memory database.
pub async fn ledger() -> Ledger {
    Ledger::open(LedgerConfig::in_memory())
        .await
        .expect("in-memory ledger")
}

/// Creates an active product with opening stock.
pub async fn product(ledger: &Ledger, name: &str, price_cents: i64, stock: i64) -> Product {
    ledger
        .create_product(
            NewProduct {
                barcode: None,
                name: name.to_string(),
                price_cents,
                cost_cents: None,
                stock,
                min_stock: Some(2),
            },
            Some("test".to_string()),
        )
        .await
        .expect("create product")
}

pub async fn member(ledger: &Ledger, phone: &str) -> Member {
    ledger
        .create_member(NewMember {
            phone: phone.to_string(),
            first_name: "Malee".to_string(),
            last_name: None,
            email: None,
        })
        .await
        .expect("create member")
}

/// A cash sale for `lines` of (product id, quantity).
pub fn cash_sale(lines: &[(&str, i64)], amount_cents: i64) -> NewSale {
    NewSale::cash(
        lines
            .iter()
            .map(|(id, qty)| LineRequest::new(*id, *qty))
            .collect(),
        amount_cents,
    )
}

/// A card sale linked to a member.
pub fn member_sale(lines: &[(&str, i64)], amount_cents: i64, member_id: &str) -> NewSale {
    let mut sale = cash_sale(lines, amount_cents);
    sale.payment = PaymentRequest {
        method: PaymentMethod::Card,
        amount_cents,
    };
    sale.member_id = Some(member_id.to_string());
    sale
}

pub async fn stock_of(ledger: &Ledger, product_id: &str) -> i64 {
    ledger.get_product(product_id).await.expect("product").stock
}
