use clap::{Args, ValueEnum};
use folio::CouponKind;
use folio_app::{
    auth::{Actor, PgAuthService, Role},
    domain::coupons::{CouponsService, PgCouponsService, data::NewCoupon, records::CouponUuid},
};
use jiff::Timestamp;

use crate::cli::AuthArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Fixed,
    Percentage,
}

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    #[command(flatten)]
    auth: AuthArgs,

    /// Email of the admin creating the coupon
    #[arg(long, env = "FOLIO_ADMIN_EMAIL")]
    admin_email: String,

    /// Code customers enter; stored uppercased
    #[arg(long)]
    code: String,

    #[arg(long)]
    name: String,

    #[arg(long, value_enum)]
    kind: KindArg,

    /// Minor units for `fixed`, basis points for `percentage`
    #[arg(long)]
    value: u64,

    /// Smallest subtotal the coupon applies to, in minor units
    #[arg(long)]
    minimum_amount: Option<u64>,

    /// Cap on the discount, in minor units
    #[arg(long)]
    maximum_discount: Option<u64>,

    /// Start of validity (RFC 3339); defaults to now
    #[arg(long)]
    valid_from: Option<String>,

    /// End of validity (RFC 3339)
    #[arg(long)]
    valid_to: String,

    #[arg(long)]
    usage_limit: Option<u32>,

    /// Create the coupon switched off
    #[arg(long)]
    inactive: bool,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let kind = coupon_kind(args.kind, args.value)?;
    let valid_from = args
        .valid_from
        .as_deref()
        .map_or_else(|| Ok(Timestamp::now()), parse_timestamp)?;
    let valid_to = parse_timestamp(&args.valid_to)?;

    if valid_to <= valid_from {
        return Err("valid-to must be after valid-from".to_string());
    }

    let db = args.auth.database().connect().await?;
    let auth = PgAuthService::new(db.clone(), args.auth.hasher()?);

    let admin = auth
        .find_user_by_email(args.admin_email.trim())
        .await
        .map_err(|error| format!("failed to look up admin: {error}"))?
        .filter(|user| user.role == Role::Admin)
        .ok_or_else(|| format!("{} is not an admin", args.admin_email.trim()))?;

    let coupons = PgCouponsService::new(db);

    let coupon = coupons
        .create_coupon(
            Actor::new(admin.uuid, admin.role),
            NewCoupon {
                uuid: CouponUuid::new(),
                code: args.code,
                name: args.name,
                kind,
                minimum_amount: args.minimum_amount,
                maximum_discount: args.maximum_discount,
                valid_from,
                valid_to,
                usage_limit: args.usage_limit,
                is_active: !args.inactive,
            },
        )
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("coupon_code: {}", coupon.code);
    println!("valid_to: {}", coupon.terms.valid_to);

    Ok(())
}

fn coupon_kind(kind: KindArg, value: u64) -> Result<CouponKind, String> {
    match kind {
        KindArg::Fixed if value > 0 => Ok(CouponKind::Fixed { amount: value }),
        KindArg::Percentage => u16::try_from(value)
            .ok()
            .filter(|basis_points| (1..=10_000).contains(basis_points))
            .map(|basis_points| CouponKind::Percentage { basis_points })
            .ok_or_else(|| "percentage value must be 1-10000 basis points".to_string()),
        KindArg::Fixed => Err("fixed value must be positive".to_string()),
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    raw.parse::<Timestamp>()
        .map_err(|error| format!("invalid timestamp {raw}: {error}"))
}
