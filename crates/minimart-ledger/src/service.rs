//! # Ledger Facade
//!
//! The request/response surface a transport (HTTP handler, desktop command,
//! CLI) calls into.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Ledger { db, config }                                                │
//! │                                                                       │
//! │  create_sale ──────────► sale::create_sale                            │
//! │  reverse_sale ─────────► reversal::reverse_sale                       │
//! │  receive_stock ────────► adjustment::receive_stock      ┐             │
//! │  issue_stock ──────────► adjustment::issue_stock        │  units of   │
//! │  create_stock_count ───► adjustment::create_stock_count │  work       │
//! │  apply_stock_count ────► adjustment::apply_stock_count  │             │
//! │  adjust_points ────────► members::adjust_points         ┘             │
//! │  evaluate_cart ────────► promotions::evaluate_cart       (read-only)  │
//! │  entries_*, overview ──► reporting                       (read-only)  │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::info;

use minimart_core::promotion::{CalculationResult, CartLine, NewPromotion, Promotion};
use minimart_core::{
    ChainReport, CoreError, LedgerEntry, LedgerQuery, LineRequest, Member, NewMember, NewProduct,
    NewSale, PointTransaction, Product, ReversalMode, Sale, SaleDetail, StockCount, StockOverview,
};
use minimart_db::Database;

use crate::catalog::{self, Removal};
use crate::config::LedgerConfig;
use crate::error::LedgerResult;
use crate::{adjustment, members, promotions, reporting, reversal, sale};

const DEFAULT_RECENT_SALES: i64 = 20;

/// Entry point to every ledger operation.
///
/// Cloning is cheap; clones share the database.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    config: LedgerConfig,
}

impl Ledger {
    /// Opens the store described by `config`, running migrations.
    pub async fn open(config: LedgerConfig) -> LedgerResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.database_path.display(), "Ledger opened");
        Ok(Ledger { db, config })
    }

    /// Wraps an already-open database.
    pub fn new(db: Database, config: LedgerConfig) -> Self {
        Ledger { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub async fn close(&self) {
        self.db.close().await;
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn create_sale(&self, request: NewSale) -> LedgerResult<SaleDetail> {
        sale::create_sale(&self.db, request, self.config.point_value_cents).await
    }

    /// Voids or refunds a COMPLETED sale. Not idempotent.
    pub async fn reverse_sale(
        &self,
        sale_id: &str,
        mode: ReversalMode,
        reason: Option<String>,
        actor: Option<String>,
    ) -> LedgerResult<SaleDetail> {
        reversal::reverse_sale(&self.db, sale_id, mode, reason, actor).await
    }

    pub async fn void_sale(&self, sale_id: &str, actor: Option<String>) -> LedgerResult<SaleDetail> {
        self.reverse_sale(sale_id, ReversalMode::Void, None, actor).await
    }

    pub async fn refund_sale(
        &self,
        sale_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> LedgerResult<SaleDetail> {
        self.reverse_sale(sale_id, ReversalMode::Refund, reason, actor).await
    }

    /// A sale with its items and payment.
    pub async fn get_sale(&self, sale_id: &str) -> LedgerResult<SaleDetail> {
        let detail = self
            .db
            .sales()
            .get_detail(sale_id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(sale_id.to_string()))?;
        Ok(detail)
    }

    pub async fn get_sale_by_number(&self, sale_number: &str) -> LedgerResult<Sale> {
        let found = self
            .db
            .sales()
            .get_by_number(sale_number)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(sale_number.to_string()))?;
        Ok(found)
    }

    /// Newest sales first.
    pub async fn recent_sales(&self, limit: Option<i64>) -> LedgerResult<Vec<Sale>> {
        Ok(self
            .db
            .sales()
            .recent(limit.unwrap_or(DEFAULT_RECENT_SALES))
            .await?)
    }

    // =========================================================================
    // Inventory adjustments
    // =========================================================================

    pub async fn receive_stock(
        &self,
        items: Vec<LineRequest>,
        reference: Option<String>,
        notes: Option<String>,
        actor: Option<String>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        adjustment::receive_stock(&self.db, items, reference, notes, actor).await
    }

    pub async fn issue_stock(
        &self,
        product_id: &str,
        quantity: i64,
        reason: impl Into<String>,
        reference: Option<String>,
        notes: Option<String>,
        actor: Option<String>,
    ) -> LedgerResult<LedgerEntry> {
        adjustment::issue_stock(
            &self.db,
            product_id,
            quantity,
            reason.into(),
            reference,
            notes,
            actor,
        )
        .await
    }

    pub async fn create_stock_count(
        &self,
        product_id: &str,
        counted_quantity: i64,
        notes: Option<String>,
        actor: Option<String>,
    ) -> LedgerResult<StockCount> {
        adjustment::create_stock_count(&self.db, product_id, counted_quantity, notes, actor).await
    }

    /// Applies a count to live stock. Not idempotent.
    pub async fn apply_stock_count(
        &self,
        count_id: &str,
        actor: Option<String>,
    ) -> LedgerResult<StockCount> {
        adjustment::apply_stock_count(&self.db, count_id, actor).await
    }

    pub async fn get_stock_count(&self, count_id: &str) -> LedgerResult<StockCount> {
        let count = self
            .db
            .stock_counts()
            .get_by_id(count_id)
            .await?
            .ok_or_else(|| CoreError::StockCountNotFound(count_id.to_string()))?;
        Ok(count)
    }

    /// Counts, newest first, optionally filtered by product and state.
    pub async fn list_stock_counts(
        &self,
        product_id: Option<&str>,
        is_adjusted: Option<bool>,
    ) -> LedgerResult<Vec<StockCount>> {
        Ok(self.db.stock_counts().list(product_id, is_adjusted).await?)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn create_product(
        &self,
        new: NewProduct,
        actor: Option<String>,
    ) -> LedgerResult<Product> {
        catalog::create_product(&self.db, new, self.config.default_min_stock, actor).await
    }

    pub async fn get_product(&self, product_id: &str) -> LedgerResult<Product> {
        catalog::get_product(&self.db, product_id).await
    }

    pub async fn deactivate_product(&self, product_id: &str) -> LedgerResult<()> {
        catalog::deactivate_product(&self.db, product_id).await
    }

    pub async fn remove_product(&self, product_id: &str) -> LedgerResult<Removal> {
        catalog::remove_product(&self.db, product_id).await
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub async fn create_member(&self, new: NewMember) -> LedgerResult<Member> {
        members::create_member(&self.db, new).await
    }

    pub async fn get_member(&self, member_id: &str) -> LedgerResult<Member> {
        members::get_member(&self.db, member_id).await
    }

    pub async fn get_member_by_phone(&self, phone: &str) -> LedgerResult<Member> {
        members::get_member_by_phone(&self.db, phone).await
    }

    /// Deactivated members keep their points but can't be linked to sales.
    pub async fn set_member_active(&self, member_id: &str, active: bool) -> LedgerResult<Member> {
        members::set_member_active(&self.db, member_id, active).await
    }

    pub async fn adjust_points(
        &self,
        member_id: &str,
        points: i64,
        description: Option<String>,
        actor: Option<String>,
    ) -> LedgerResult<PointTransaction> {
        members::adjust_points(&self.db, member_id, points, description, actor).await
    }

    pub async fn point_history(
        &self,
        member_id: &str,
        limit: Option<i64>,
    ) -> LedgerResult<Vec<PointTransaction>> {
        members::point_history(&self.db, member_id, limit).await
    }

    // =========================================================================
    // Promotions
    // =========================================================================

    pub async fn create_promotion(&self, new: NewPromotion) -> LedgerResult<Promotion> {
        promotions::create_promotion(&self.db, new).await
    }

    pub async fn get_promotion(&self, promotion_id: &str) -> LedgerResult<Promotion> {
        promotions::get_promotion(&self.db, promotion_id).await
    }

    pub async fn set_promotion_active(
        &self,
        promotion_id: &str,
        active: bool,
    ) -> LedgerResult<Promotion> {
        promotions::set_promotion_active(&self.db, promotion_id, active).await
    }

    pub async fn list_promotions(&self) -> LedgerResult<Vec<Promotion>> {
        promotions::list_promotions(&self.db).await
    }

    pub async fn active_promotions(&self, now: DateTime<Utc>) -> LedgerResult<Vec<Promotion>> {
        promotions::active_promotions(&self.db, now).await
    }

    /// Prices a cart against the promotions running right now.
    pub async fn evaluate_cart(&self, cart: &[CartLine]) -> LedgerResult<CalculationResult> {
        promotions::evaluate_cart(&self.db, cart, Utc::now()).await
    }

    pub async fn evaluate_cart_at(
        &self,
        cart: &[CartLine],
        now: DateTime<Utc>,
    ) -> LedgerResult<CalculationResult> {
        promotions::evaluate_cart(&self.db, cart, now).await
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    pub async fn entries_for_product(
        &self,
        product_id: &str,
        limit: Option<i64>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        reporting::entries_for_product(&self.db, product_id, limit).await
    }

    pub async fn entries(&self, filter: &LedgerQuery) -> LedgerResult<Vec<LedgerEntry>> {
        reporting::entries(&self.db, filter).await
    }

    pub async fn entries_by_reference(&self, reference: &str) -> LedgerResult<Vec<LedgerEntry>> {
        reporting::entries_by_reference(&self.db, reference).await
    }

    pub async fn stock_overview(&self) -> LedgerResult<StockOverview> {
        reporting::stock_overview(&self.db).await
    }

    pub async fn low_stock_products(&self) -> LedgerResult<Vec<Product>> {
        reporting::low_stock_products(&self.db).await
    }

    pub async fn verify_product_chain(&self, product_id: &str) -> LedgerResult<ChainReport> {
        reporting::verify_product_chain(&self.db, product_id).await
    }
}
