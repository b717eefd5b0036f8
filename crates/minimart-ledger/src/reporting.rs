//! # Reporting
//!
//! Read-only views over the ledger and stock levels. Nothing here opens a
//! unit of work.

use tracing::{debug, warn};

use minimart_core::{ChainReport, CoreError, LedgerEntry, LedgerQuery, Product, StockOverview};
use minimart_db::Database;

use crate::catalog::get_product;
use crate::error::LedgerResult;

const DEFAULT_ENTRY_LIMIT: i64 = 50;

/// A product's most recent entries, newest first.
pub async fn entries_for_product(
    db: &Database,
    product_id: &str,
    limit: Option<i64>,
) -> LedgerResult<Vec<LedgerEntry>> {
    get_product(db, product_id).await?;

    let entries = db
        .ledger()
        .for_product(product_id, limit.unwrap_or(DEFAULT_ENTRY_LIMIT))
        .await?;
    Ok(entries)
}

/// Entries matching a product / kind / date-range filter, newest first.
pub async fn entries(db: &Database, filter: &LedgerQuery) -> LedgerResult<Vec<LedgerEntry>> {
    Ok(db.ledger().query(filter).await?)
}

/// Entries written under one reference (a sale number, `SC-{id}`, a PO).
pub async fn entries_by_reference(db: &Database, reference: &str) -> LedgerResult<Vec<LedgerEntry>> {
    Ok(db.ledger().by_reference(reference).await?)
}

pub async fn stock_overview(db: &Database) -> LedgerResult<StockOverview> {
    Ok(db.products().overview().await?)
}

/// Active products at or below their threshold, lowest stock first.
pub async fn low_stock_products(db: &Database) -> LedgerResult<Vec<Product>> {
    Ok(db.products().low_stock().await?)
}

/// Replays a product's entries and reports the first place they stop
/// explaining its stock. Stock and chain come from one read transaction, so
/// a commit landing mid-check can't show up as a break.
pub async fn verify_product_chain(db: &Database, product_id: &str) -> LedgerResult<ChainReport> {
    let (stock, chain) = db
        .ledger()
        .chain_snapshot(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let report = verify_chain(&chain, stock);
    if report.is_consistent() {
        debug!(product_id = %product_id, entries = chain.len(), "Ledger chain consistent");
    } else {
        warn!(product_id = %product_id, report = ?report, "Ledger chain inconsistent");
    }

    Ok(report)
}

/// Checks entries in commit order against a product that started at zero.
fn verify_chain(chain: &[LedgerEntry], stock: i64) -> ChainReport {
    let mut expected_previous = 0;

    for entry in chain {
        if entry.previous_stock != expected_previous || !entry.is_balanced() {
            return ChainReport::BrokenLink {
                entry_id: entry.id,
                expected_previous,
                found_previous: entry.previous_stock,
            };
        }
        expected_previous = entry.current_stock;
    }

    if expected_previous != stock {
        return ChainReport::StockMismatch {
            last_snapshot: expected_previous,
            stock,
        };
    }

    ChainReport::Consistent {
        entries: chain.len() as i64,
        stock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use minimart_core::MovementKind;

    fn entry(id: i64, quantity: i64, previous: i64) -> LedgerEntry {
        LedgerEntry {
            id,
            product_id: "p-1".to_string(),
            kind: if quantity < 0 {
                MovementKind::Issuing
            } else {
                MovementKind::Receiving
            },
            quantity,
            previous_stock: previous,
            current_stock: previous + quantity,
            reference: None,
            reason: None,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_consistent_chain() {
        let chain = vec![entry(1, 10, 0), entry(2, -3, 10), entry(3, 2, 7)];
        assert_eq!(
            verify_chain(&chain, 9),
            ChainReport::Consistent { entries: 3, stock: 9 }
        );
        assert!(verify_chain(&[], 0).is_consistent());
    }

    #[test]
    fn test_broken_link() {
        let chain = vec![entry(1, 10, 0), entry(2, -3, 8)];
        assert_eq!(
            verify_chain(&chain, 5),
            ChainReport::BrokenLink { entry_id: 2, expected_previous: 10, found_previous: 8 }
        );
    }

    #[test]
    fn test_stock_mismatch() {
        let chain = vec![entry(1, 10, 0)];
        assert_eq!(
            verify_chain(&chain, 12),
            ChainReport::StockMismatch { last_snapshot: 10, stock: 12 }
        );
    }
}
