//! Catalog service.

use async_trait::async_trait;
use folio::{PriceQuote, VariantTerms};
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    auth::Actor,
    database::Db,
    domain::catalog::{
        data::{
            NewService, NewVariant, PriceRequest, Removal, ServiceFilter, ServiceUpdate,
            VariantUpdate,
        },
        errors::CatalogServiceError,
        records::{ServiceDetails, ServiceRecord, ServiceUuid, VariantRecord, VariantUuid},
        repositories::{PgServicesRepository, PgVariantsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    services: PgServicesRepository,
    variants: PgVariantsRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            services: PgServicesRepository::new(),
            variants: PgVariantsRepository::new(),
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), CatalogServiceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CatalogServiceError::Unauthorized)
    }
}

fn validate_terms(terms: &VariantTerms) -> Result<(), CatalogServiceError> {
    terms.validate_quantity(terms.min_quantity)?;

    Ok(())
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn list_services(
        &self,
        filter: ServiceFilter,
    ) -> Result<Vec<ServiceRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let services = self.services.list_services(&mut tx, filter).await?;

        tx.commit().await?;

        Ok(services)
    }

    async fn get_service(&self, slug: &str) -> Result<ServiceDetails, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let service = self
            .services
            .get_active_service_by_slug(&mut tx, slug)
            .await?;

        let variants = self
            .variants
            .list_active_variants(&mut tx, service.uuid)
            .await?;

        tx.commit().await?;

        Ok(ServiceDetails { service, variants })
    }

    #[tracing::instrument(
        name = "catalog.service.create_service",
        skip(self, service),
        fields(user_uuid = %actor.user, service_uuid = %service.uuid, slug = %service.slug),
        err
    )]
    async fn create_service(
        &self,
        actor: Actor,
        service: NewService,
    ) -> Result<ServiceRecord, CatalogServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let record = self.services.create_service(&mut tx, &service).await?;

        tx.commit().await?;

        info!(service_uuid = %record.uuid, "created service");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.create_variant",
        skip(self, variant),
        fields(user_uuid = %actor.user, service_uuid = %service, variant_uuid = %variant.uuid),
        err
    )]
    async fn create_variant(
        &self,
        actor: Actor,
        service: ServiceUuid,
        variant: NewVariant,
    ) -> Result<VariantRecord, CatalogServiceError> {
        require_admin(&actor)?;

        validate_terms(&variant.terms())?;

        let mut tx = self.db.begin().await?;

        let record = self
            .variants
            .create_variant(&mut tx, service, &variant)
            .await?;

        tx.commit().await?;

        info!(variant_uuid = %record.uuid, "created variant");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.set_service_active",
        skip(self),
        fields(user_uuid = %actor.user, service_uuid = %service),
        err
    )]
    async fn set_service_active(
        &self,
        actor: Actor,
        service: ServiceUuid,
        is_active: bool,
    ) -> Result<ServiceRecord, CatalogServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .services
            .set_service_active(&mut tx, service, is_active)
            .await?;

        tx.commit().await?;

        info!(service_uuid = %record.uuid, is_active, "updated service visibility");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.update_service",
        skip(self, update),
        fields(user_uuid = %actor.user, service_uuid = %service, slug = %update.slug),
        err
    )]
    async fn update_service(
        &self,
        actor: Actor,
        service: ServiceUuid,
        update: ServiceUpdate,
    ) -> Result<ServiceRecord, CatalogServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .services
            .update_service(&mut tx, service, &update)
            .await?;

        tx.commit().await?;

        info!(service_uuid = %record.uuid, "updated service");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.delete_service",
        skip(self),
        fields(user_uuid = %actor.user, service_uuid = %service),
        err
    )]
    async fn delete_service(
        &self,
        actor: Actor,
        service: ServiceUuid,
    ) -> Result<Removal, CatalogServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let references = self
            .variants
            .order_references(&mut tx, Some(service), None)
            .await?;

        if references.open > 0 {
            return Err(CatalogServiceError::InUse(references.open));
        }

        let removal = if references.total > 0 {
            self.services
                .set_service_active(&mut tx, service, false)
                .await?;

            Removal::Retired
        } else {
            self.services.delete_service(&mut tx, service).await?;

            Removal::Deleted
        };

        tx.commit().await?;

        info!(service_uuid = %service, ?removal, "removed service");

        Ok(removal)
    }

    #[tracing::instrument(
        name = "catalog.service.update_variant",
        skip(self, update),
        fields(user_uuid = %actor.user, variant_uuid = %variant),
        err
    )]
    async fn update_variant(
        &self,
        actor: Actor,
        variant: VariantUuid,
        update: VariantUpdate,
    ) -> Result<VariantRecord, CatalogServiceError> {
        require_admin(&actor)?;

        validate_terms(&update.terms())?;

        let mut tx = self.db.begin().await?;

        let record = self
            .variants
            .update_variant(&mut tx, variant, &update)
            .await?;

        tx.commit().await?;

        info!(variant_uuid = %record.uuid, price = record.price, "updated variant");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.delete_variant",
        skip(self),
        fields(user_uuid = %actor.user, variant_uuid = %variant),
        err
    )]
    async fn delete_variant(
        &self,
        actor: Actor,
        variant: VariantUuid,
    ) -> Result<Removal, CatalogServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let references = self
            .variants
            .order_references(&mut tx, None, Some(variant))
            .await?;

        if references.open > 0 {
            return Err(CatalogServiceError::InUse(references.open));
        }

        let removal = if references.total > 0 {
            self.variants.retire_variant(&mut tx, variant).await?;

            Removal::Retired
        } else {
            self.variants.delete_variant(&mut tx, variant).await?;

            Removal::Deleted
        };

        tx.commit().await?;

        info!(variant_uuid = %variant, ?removal, "removed variant");

        Ok(removal)
    }

    async fn quote_price(&self, request: PriceRequest) -> Result<PriceQuote, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let variant = self
            .variants
            .get_active_variant(&mut tx, request.variant)
            .await?
            .ok_or(CatalogServiceError::NotFound)?;

        tx.commit().await?;

        let quote = folio::pricing::quote(
            &variant.terms(),
            request.quantity,
            request.tier,
            &request.add_ons,
            Timestamp::now(),
        )?;

        Ok(quote)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Active services, ordered by sort order then title.
    async fn list_services(
        &self,
        filter: ServiceFilter,
    ) -> Result<Vec<ServiceRecord>, CatalogServiceError>;

    /// An active service and its active variants, cheapest first.
    async fn get_service(&self, slug: &str) -> Result<ServiceDetails, CatalogServiceError>;

    async fn create_service(
        &self,
        actor: Actor,
        service: NewService,
    ) -> Result<ServiceRecord, CatalogServiceError>;

    async fn create_variant(
        &self,
        actor: Actor,
        service: ServiceUuid,
        variant: NewVariant,
    ) -> Result<VariantRecord, CatalogServiceError>;

    async fn set_service_active(
        &self,
        actor: Actor,
        service: ServiceUuid,
        is_active: bool,
    ) -> Result<ServiceRecord, CatalogServiceError>;

    /// Replaces every editable field of a service.
    async fn update_service(
        &self,
        actor: Actor,
        service: ServiceUuid,
        update: ServiceUpdate,
    ) -> Result<ServiceRecord, CatalogServiceError>;

    /// Refused while open orders reference any of its variants. A service
    /// that only closed orders reference is deactivated rather than deleted.
    async fn delete_service(
        &self,
        actor: Actor,
        service: ServiceUuid,
    ) -> Result<Removal, CatalogServiceError>;

    async fn update_variant(
        &self,
        actor: Actor,
        variant: VariantUuid,
        update: VariantUpdate,
    ) -> Result<VariantRecord, CatalogServiceError>;

    /// Same rules as [`CatalogService::delete_service`], for one variant.
    async fn delete_variant(
        &self,
        actor: Actor,
        variant: VariantUuid,
    ) -> Result<Removal, CatalogServiceError>;

    /// Prices a stored variant without touching any cart.
    async fn quote_price(&self, request: PriceRequest) -> Result<PriceQuote, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use folio::{OrderStatus, PricingError, TurnaroundTier, UnitType};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        auth::Identity,
        domain::{catalog::records::ServiceType, orders::OrdersService},
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn get_service_returns_variants_cheapest_first() -> TestResult {
        let ctx = TestContext::new().await;

        let service = helpers::create_service(&ctx, "proofreading").await?;
        helpers::create_variant(&ctx, service.uuid, 9_000, UnitType::Fixed, 1, None).await?;
        helpers::create_variant(&ctx, service.uuid, 3_000, UnitType::Fixed, 1, None).await?;

        let details = ctx.catalog.get_service("proofreading").await?;

        let prices: Vec<u64> = details.variants.iter().map(|v| v.price).collect();

        assert_eq!(details.service.uuid, service.uuid);
        assert_eq!(prices, vec![3_000, 9_000]);

        Ok(())
    }

    #[tokio::test]
    async fn inactive_services_are_hidden() -> TestResult {
        let ctx = TestContext::new().await;

        let service = helpers::create_service(&ctx, "hidden").await?;

        ctx.catalog
            .set_service_active(ctx.admin, service.uuid, false)
            .await?;

        let listed = ctx.catalog.list_services(ServiceFilter::default()).await?;
        let result = ctx.catalog.get_service("hidden").await;

        assert!(listed.iter().all(|s| s.uuid != service.uuid));
        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_services_filters_featured() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::create_service(&ctx, "plain").await?;

        let featured = ctx
            .catalog
            .create_service(
                ctx.admin,
                NewService {
                    uuid: ServiceUuid::new(),
                    slug: "featured".to_string(),
                    title: "Featured".to_string(),
                    description: String::new(),
                    service_type: ServiceType::Design,
                    base_price: 0,
                    features: json!(["cover"]),
                    sort_order: 0,
                    is_featured: true,
                },
            )
            .await?;

        let listed = ctx
            .catalog
            .list_services(ServiceFilter {
                service_type: None,
                featured_only: true,
            })
            .await?;

        assert_eq!(listed.len(), 1);
        assert_eq!(listed.first().map(|s| s.uuid), Some(featured.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn non_admin_cannot_create_services() {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .create_service(
                ctx.customer,
                NewService {
                    uuid: ServiceUuid::new(),
                    slug: "nope".to_string(),
                    title: "Nope".to_string(),
                    description: String::new(),
                    service_type: ServiceType::Editing,
                    base_price: 0,
                    features: json!([]),
                    sort_order: 0,
                    is_featured: false,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_service_replaces_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let service = helpers::create_service(&ctx, "line-editing").await?;

        let updated = ctx
            .catalog
            .update_service(
                ctx.admin,
                service.uuid,
                ServiceUpdate {
                    slug: "developmental-editing".to_string(),
                    title: "Developmental Editing".to_string(),
                    description: "Structure and pacing".to_string(),
                    service_type: ServiceType::Editing,
                    base_price: 15_000,
                    features: json!(["report"]),
                    sort_order: 2,
                    is_active: true,
                    is_featured: true,
                },
            )
            .await?;

        assert_eq!(updated.uuid, service.uuid);
        assert_eq!(updated.base_price, 15_000);
        assert!(updated.is_featured);

        let details = ctx.catalog.get_service("developmental-editing").await?;

        assert_eq!(details.service.title, "Developmental Editing");
        assert!(
            matches!(
                ctx.catalog.get_service("line-editing").await,
                Err(CatalogServiceError::NotFound)
            ),
            "old slug should be gone"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_variant_validates_and_reprices() -> TestResult {
        let ctx = TestContext::new().await;

        let variant = helpers::fixed_variant(&ctx, 1_000).await?;

        let update = VariantUpdate {
            title: "Per page".to_string(),
            price: 250,
            unit_type: UnitType::PerPage,
            turnaround_days: 3,
            min_quantity: 10,
            max_quantity: Some(400),
            is_active: true,
        };

        let inverted = ctx
            .catalog
            .update_variant(
                ctx.admin,
                variant.uuid,
                VariantUpdate {
                    max_quantity: Some(5),
                    ..update.clone()
                },
            )
            .await;

        assert!(
            matches!(
                inverted,
                Err(CatalogServiceError::Pricing(PricingError::InvalidBounds { .. }))
            ),
            "expected InvalidBounds, got {inverted:?}"
        );

        let by_customer = ctx
            .catalog
            .update_variant(ctx.customer, variant.uuid, update.clone())
            .await;

        assert!(
            matches!(by_customer, Err(CatalogServiceError::Unauthorized)),
            "expected Unauthorized, got {by_customer:?}"
        );

        let record = ctx
            .catalog
            .update_variant(ctx.admin, variant.uuid, update)
            .await?;

        assert_eq!(record.price, 250);
        assert_eq!(record.unit_type, UnitType::PerPage);
        assert_eq!(record.max_quantity, Some(400));

        let quote = ctx
            .catalog
            .quote_price(PriceRequest {
                variant: variant.uuid,
                quantity: 20,
                tier: TurnaroundTier::Standard,
                add_ons: Vec::new(),
            })
            .await?;

        assert_eq!(quote.breakdown.base.total, 5_000);

        Ok(())
    }

    #[tokio::test]
    async fn variants_on_open_orders_cannot_be_deleted() -> TestResult {
        let ctx = TestContext::new().await;
        let identity = Identity::User(ctx.customer);

        let variant = helpers::fixed_variant(&ctx, 1_000).await?;

        helpers::add_to_cart(&ctx, &identity, variant.uuid, 1).await?;
        let receipt = helpers::checkout(&ctx, &identity, None).await?;

        let blocked = ctx.catalog.delete_variant(ctx.admin, variant.uuid).await;

        assert!(
            matches!(blocked, Err(CatalogServiceError::InUse(1))),
            "expected InUse, got {blocked:?}"
        );

        let service_blocked = ctx
            .catalog
            .delete_service(ctx.admin, variant.service_uuid)
            .await;

        assert!(
            matches!(service_blocked, Err(CatalogServiceError::InUse(1))),
            "expected InUse, got {service_blocked:?}"
        );

        helpers::force_status(&ctx, receipt.order_uuid, OrderStatus::Cancelled).await?;

        let removal = ctx.catalog.delete_variant(ctx.admin, variant.uuid).await?;

        assert_eq!(removal, Removal::Retired);

        let quote = ctx
            .catalog
            .quote_price(PriceRequest {
                variant: variant.uuid,
                quantity: 1,
                tier: TurnaroundTier::Standard,
                add_ons: Vec::new(),
            })
            .await;

        assert!(
            matches!(quote, Err(CatalogServiceError::NotFound)),
            "retired variant should not be quoted, got {quote:?}"
        );

        let order = ctx
            .orders
            .get_order(&identity, receipt.order_uuid)
            .await?;

        assert_eq!(order.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn unreferenced_services_are_deleted() -> TestResult {
        let ctx = TestContext::new().await;

        let variant = helpers::fixed_variant(&ctx, 1_000).await?;

        let by_customer = ctx
            .catalog
            .delete_service(ctx.customer, variant.service_uuid)
            .await;

        assert!(
            matches!(by_customer, Err(CatalogServiceError::Unauthorized)),
            "expected Unauthorized, got {by_customer:?}"
        );

        let removal = ctx
            .catalog
            .delete_service(ctx.admin, variant.service_uuid)
            .await?;

        assert_eq!(removal, Removal::Deleted);

        let again = ctx
            .catalog
            .delete_service(ctx.admin, variant.service_uuid)
            .await;

        assert!(
            matches!(again, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn variant_bounds_are_validated() -> TestResult {
        let ctx = TestContext::new().await;

        let service = helpers::create_service(&ctx, "bounds").await?;

        let result =
            helpers::create_variant(&ctx, service.uuid, 100, UnitType::PerPage, 10, Some(5)).await;

        assert!(
            matches!(
                result,
                Err(CatalogServiceError::Pricing(PricingError::InvalidBounds { .. }))
            ),
            "expected InvalidBounds, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn quote_price_applies_tier_and_add_ons() -> TestResult {
        let ctx = TestContext::new().await;

        let service = helpers::create_service(&ctx, "quote").await?;
        let variant =
            helpers::create_variant(&ctx, service.uuid, 2, UnitType::PerWord, 1, None).await?;

        let quote = ctx
            .catalog
            .quote_price(PriceRequest {
                variant: variant.uuid,
                quantity: 1_000,
                tier: TurnaroundTier::Rush,
                add_ons: vec!["priority_support".to_string(), "mystery".to_string()],
            })
            .await?;

        assert_eq!(quote.breakdown.base.total, 2_000);
        assert_eq!(quote.breakdown.turnaround.additional_cost, 1_000);
        assert_eq!(quote.breakdown.add_ons.len(), 1);
        assert_eq!(quote.subtotal, 3_000 + 2_500);

        Ok(())
    }

    #[tokio::test]
    async fn quote_price_unknown_variant_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .quote_price(PriceRequest {
                variant: VariantUuid::new(),
                quantity: 1,
                tier: TurnaroundTier::Standard,
                add_ons: Vec::new(),
            })
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
