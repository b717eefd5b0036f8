//! # Sale Transaction Processor
//!
//! Turns a cart and a payment into a COMPLETED sale, its stock deductions and
//! the member's earned points, all in one unit of work.
//!
//! ## Flow
//! ```text
//! NewSale
//!   │
//!   ├── shape checks (lines, quantities, tendered amount)   no unit yet
//!   │
//!   └── with_atomic_unit
//!         ├── load products (missing / inactive → ProductNotFound)
//!         ├── pre-check aggregated quantity per product
//!         ├── price lines at current prices, total, change, points
//!         ├── load member (missing / inactive)
//!         ├── INSERT sale, items, payment
//!         ├── SALE movement per item  (re-checked at write time)
//!         └── member spend + EARN points (when points > 0)
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use minimart_core::pricing::{price_sale, PricedLine};
use minimart_core::validation::{validate_line_count, validate_payment_amount, validate_quantity};
use minimart_core::{
    CoreError, LineRequest, Money, MovementContext, NewSale, Payment, PointTransaction,
    PointTransactionType, Product, Sale, SaleDetail, SaleItem, SaleStatus, StockMovement,
    SALE_REASON,
};
use minimart_db::repository::{member, product, sale};
use minimart_db::{with_atomic_unit, Database};

use crate::error::LedgerResult;
use crate::stock_ledger::apply_movement;

/// Creates a sale.
///
/// ## Errors
/// - `ProductNotFound` for an unknown or inactive product
/// - `InsufficientStock` when the cart asks for more than is on hand
/// - `PaymentInsufficient` when the tendered amount is below the total
/// - `MemberNotFound` / `MemberInactive` for a bad member link
/// - `Validation` for an empty cart, bad quantity or discount
pub async fn create_sale(
    db: &Database,
    request: NewSale,
    point_value_cents: i64,
) -> LedgerResult<SaleDetail> {
    validate_line_count("items", request.items.len())?;
    for line in &request.items {
        validate_quantity(line.quantity)?;
    }
    validate_payment_amount(request.payment.amount_cents)?;

    let demand = aggregate_demand(&request.items);

    let result: LedgerResult<SaleDetail> = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            let mut products: HashMap<String, Product> = HashMap::with_capacity(demand.len());
            for (product_id, quantity) in &demand {
                let product = product::find_by_id(unit.conn(), product_id)
                    .await?
                    .filter(|p| p.is_active)
                    .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;

                if !product.can_supply(*quantity) {
                    return Err(CoreError::InsufficientStock {
                        product_id: product.id,
                        name: product.name,
                        available: product.stock,
                        requested: *quantity,
                    }
                    .into());
                }
                products.insert(product_id.clone(), product);
            }

            let lines = request
                .items
                .iter()
                .map(|line| {
                    products
                        .get(&line.product_id)
                        .map(|p| PricedLine::from_product(p, line.quantity))
                        .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let totals = price_sale(
                &lines,
                Money::from_cents(request.discount_cents),
                Money::from_cents(request.payment.amount_cents),
                point_value_cents,
            )?;

            if let Some(member_id) = &request.member_id {
                let member = member::find_by_id(unit.conn(), member_id)
                    .await?
                    .ok_or_else(|| CoreError::MemberNotFound(member_id.clone()))?;
                if !member.is_active {
                    return Err(CoreError::MemberInactive(member_id.clone()).into());
                }
            }

            let now = Utc::now();
            let points_earned = if request.member_id.is_some() {
                totals.points_earned
            } else {
                0
            };

            let record = Sale {
                id: Uuid::new_v4().to_string(),
                sale_number: sale_number(now),
                status: SaleStatus::Completed,
                subtotal_cents: totals.subtotal.cents(),
                discount_cents: totals.discount.cents(),
                total_cents: totals.total.cents(),
                member_id: request.member_id.clone(),
                points_earned,
                notes: request.notes.clone(),
                cashier: request.cashier.clone(),
                created_at: now,
                updated_at: now,
            };
            sale::insert_sale(unit.conn(), &record).await?;

            let mut items = Vec::with_capacity(lines.len());
            for line in &lines {
                let item = SaleItem {
                    id: Uuid::new_v4().to_string(),
                    sale_id: record.id.clone(),
                    product_id: line.product_id.clone(),
                    name_snapshot: line.name.clone(),
                    barcode_snapshot: line.barcode.clone(),
                    unit_price_cents: line.unit_price_cents,
                    quantity: line.quantity,
                    line_total_cents: line.line_total().cents(),
                    created_at: now,
                };
                sale::insert_item(unit.conn(), &item).await?;
                items.push(item);
            }

            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                sale_id: record.id.clone(),
                method: request.payment.method,
                amount_cents: totals.paid.cents(),
                change_cents: totals.change.cents(),
                created_at: now,
            };
            sale::insert_payment(unit.conn(), &payment).await?;

            let context = MovementContext::with_reference(record.sale_number.clone())
                .reason(SALE_REASON)
                .actor(record.cashier.clone());
            for item in &items {
                apply_movement(
                    unit.conn(),
                    &item.product_id,
                    StockMovement::sale(item.quantity),
                    &context,
                )
                .await?;
            }

            // Spend and points move together, only when the sale earns points.
            if let Some(member_id) = record.member_id.as_ref().filter(|_| points_earned > 0) {
                let balance_before = member::apply_points(
                    unit.conn(),
                    member_id,
                    points_earned,
                    record.total_cents,
                    now,
                )
                .await?
                .ok_or_else(|| CoreError::MemberNotFound(member_id.clone()))?;

                let earned = PointTransaction {
                    id: Uuid::new_v4().to_string(),
                    member_id: member_id.clone(),
                    sale_id: Some(record.id.clone()),
                    kind: PointTransactionType::Earn,
                    points: points_earned,
                    balance_before,
                    balance_after: balance_before + points_earned,
                    description: Some(format!("Earned from sale {}", record.sale_number)),
                    created_by: record.cashier.clone(),
                    created_at: now,
                };
                member::insert_point_transaction(unit.conn(), &earned).await?;
            }

            Ok(SaleDetail {
                sale: record,
                items,
                payment,
            })
        })
    })
    .await;

    match &result {
        Ok(detail) => info!(
            sale_number = %detail.sale.sale_number,
            total_cents = detail.sale.total_cents,
            items = detail.items.len(),
            points_earned = detail.sale.points_earned,
            "Sale completed"
        ),
        Err(err) => warn!(error = %err, kind = ?err.kind(), "Sale rejected"),
    }

    result
}

/// Total requested quantity per product, in first-seen order.
fn aggregate_demand(items: &[LineRequest]) -> Vec<(String, i64)> {
    let mut demand: Vec<(String, i64)> = Vec::new();
    for line in items {
        match demand.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, quantity)) => *quantity += line.quantity,
            None => demand.push((line.product_id.clone(), line.quantity)),
        }
    }
    demand
}

/// Business number printed on receipts: `TXN-YYYYMMDD-XXXXXXXX`.
fn sale_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();
    format!("TXN-{}-{}", now.format("%Y%m%d"), suffix.to_uppercase())
}
