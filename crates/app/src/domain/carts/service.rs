//! Carts service.

use async_trait::async_trait;
use folio::{TaxRate, Totals, amounts};
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info};

use crate::{
    auth::Identity,
    database::Db,
    domain::{
        carts::{
            data::{CartSummary, CartSummaryItem, CartTotals, NewCartItem},
            errors::CartsServiceError,
            records::{CartOwner, CartRecord},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        catalog::{records::VariantUuid, repositories::PgVariantsRepository},
        coupons::{repository::PgCouponsRepository, service::evaluate_code},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    variants: PgVariantsRepository,
    coupons: PgCouponsRepository,
    tax_rate: TaxRate,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, tax_rate: TaxRate) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            variants: PgVariantsRepository::new(),
            coupons: PgCouponsRepository::new(),
            tax_rate,
        }
    }

    async fn summarize(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: Option<&CartRecord>,
        now: Timestamp,
    ) -> Result<CartSummary, CartsServiceError> {
        let Some(cart) = cart else {
            return Ok(CartSummary::default());
        };

        let lines = self.items.list_lines(tx, cart.uuid).await?;

        let items = lines
            .into_iter()
            .map(|line| CartSummaryItem::price(line, now))
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = amounts::checked_sum(items.iter().map(|item| item.subtotal))?;

        let item_count = u32::try_from(items.len()).unwrap_or(u32::MAX);

        Ok(CartSummary {
            cart_uuid: Some(cart.uuid),
            items,
            item_count,
            subtotal,
        })
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_summary(&self, identity: &Identity) -> Result<CartSummary, CartsServiceError> {
        let owner = CartOwner::from(identity);

        let mut tx = self.db.begin().await?;

        let cart = self.carts.find_cart(&mut tx, &owner, false).await?;
        let summary = self.summarize(&mut tx, cart.as_ref(), Timestamp::now()).await?;

        tx.commit().await?;

        Ok(summary)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, identity, item),
        fields(
            variant_uuid = %item.variant,
            quantity = item.quantity,
            cart_uuid = tracing::field::Empty,
            resulting_quantity = tracing::field::Empty
        ),
        err
    )]
    async fn add_item(
        &self,
        identity: &Identity,
        item: NewCartItem,
    ) -> Result<CartSummary, CartsServiceError> {
        let owner = CartOwner::from(identity);

        let mut tx = self.db.begin().await?;

        let variant = self
            .variants
            .get_active_variant(&mut tx, item.variant)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let terms = variant.terms();

        terms.validate_quantity(item.quantity)?;

        let cart = self.carts.find_or_create_cart(&mut tx, &owner).await?;

        let span = Span::current();

        span.record("cart_uuid", tracing::field::display(cart.uuid));

        let resulting = self
            .items
            .upsert_item(&mut tx, cart.uuid, item.variant, item.quantity, &item.meta)
            .await?;

        span.record("resulting_quantity", resulting);

        // Dropping `tx` on this error rolls the merge back.
        terms.validate_quantity(resulting)?;

        self.carts.touch_cart(&mut tx, cart.uuid).await?;

        let summary = self.summarize(&mut tx, Some(&cart), Timestamp::now()).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, variant_uuid = %item.variant, "added cart item");

        Ok(summary)
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self, identity),
        fields(variant_uuid = %variant),
        err
    )]
    async fn update_item(
        &self,
        identity: &Identity,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<CartSummary, CartsServiceError> {
        let owner = CartOwner::from(identity);

        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .find_cart(&mut tx, &owner, false)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let rows_affected = if quantity == 0 {
            self.items.delete_item(&mut tx, cart.uuid, variant).await?
        } else {
            let record = self
                .variants
                .get_active_variant(&mut tx, variant)
                .await?
                .ok_or(CartsServiceError::NotFound)?;

            record.terms().validate_quantity(quantity)?;

            self.items
                .update_quantity(&mut tx, cart.uuid, variant, quantity)
                .await?
        };

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        self.carts.touch_cart(&mut tx, cart.uuid).await?;

        let summary = self.summarize(&mut tx, Some(&cart), Timestamp::now()).await?;

        tx.commit().await?;

        Ok(summary)
    }

    async fn remove_item(
        &self,
        identity: &Identity,
        variant: VariantUuid,
    ) -> Result<CartSummary, CartsServiceError> {
        let owner = CartOwner::from(identity);

        let mut tx = self.db.begin().await?;

        let cart = self.carts.find_cart(&mut tx, &owner, false).await?;

        if let Some(cart) = &cart {
            self.items.delete_item(&mut tx, cart.uuid, variant).await?;
        }

        let summary = self.summarize(&mut tx, cart.as_ref(), Timestamp::now()).await?;

        tx.commit().await?;

        Ok(summary)
    }

    async fn clear(&self, identity: &Identity) -> Result<(), CartsServiceError> {
        let owner = CartOwner::from(identity);

        let mut tx = self.db.begin().await?;

        if let Some(cart) = self.carts.find_cart(&mut tx, &owner, false).await? {
            let removed = self.items.clear_items(&mut tx, cart.uuid).await?;

            info!(cart_uuid = %cart.uuid, removed, "cleared cart");
        }

        tx.commit().await?;

        Ok(())
    }

    async fn calculate_totals(
        &self,
        identity: &Identity,
        coupon_code: Option<String>,
    ) -> Result<CartTotals, CartsServiceError> {
        let owner = CartOwner::from(identity);
        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        let cart = self.carts.find_cart(&mut tx, &owner, false).await?;
        let summary = self.summarize(&mut tx, cart.as_ref(), now).await?;

        let coupon = match coupon_code.as_deref() {
            Some(code) => Some(
                evaluate_code::<CartsServiceError>(
                    &self.coupons,
                    &mut tx,
                    code,
                    summary.subtotal,
                    now,
                    false,
                )
                .await?,
            ),
            None => None,
        };

        tx.commit().await?;

        let discount = coupon.as_ref().map_or(0, |applied| applied.discount);
        let totals = Totals::compute(summary.subtotal, discount, self.tax_rate)?;

        Ok(CartTotals {
            subtotal: totals.subtotal,
            discount: totals.discount,
            tax: totals.tax,
            total: totals.total,
            coupon,
        })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Read view of the caller's cart. Never creates a cart.
    async fn get_summary(&self, identity: &Identity) -> Result<CartSummary, CartsServiceError>;

    /// Add a variant, merging with an existing line for the same variant.
    async fn add_item(
        &self,
        identity: &Identity,
        item: NewCartItem,
    ) -> Result<CartSummary, CartsServiceError>;

    /// Replace a line's quantity; zero removes the line.
    async fn update_item(
        &self,
        identity: &Identity,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<CartSummary, CartsServiceError>;

    async fn remove_item(
        &self,
        identity: &Identity,
        variant: VariantUuid,
    ) -> Result<CartSummary, CartsServiceError>;

    async fn clear(&self, identity: &Identity) -> Result<(), CartsServiceError>;

    /// Totals with an optional coupon. Coupon usage is not recorded.
    async fn calculate_totals(
        &self,
        identity: &Identity,
        coupon_code: Option<String>,
    ) -> Result<CartTotals, CartsServiceError>;
}
