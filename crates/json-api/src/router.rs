//! App Router

use salvo::Router;

use crate::{
    auth, carts, catalog, coupons, files, healthcheck, observability, orders, payments,
};

/// Every API route. Shared hoops (state, logging, panics) are added by the
/// caller.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(public_router())
        .push(Router::new().hoop(auth::middleware::handler).push(authenticated_router()))
        .push(optional_identity_router())
}

fn public_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("services")
                .get(catalog::index::handler)
                .push(Router::with_path("{slug}").get(catalog::get::handler)),
        )
        .push(Router::with_path("calculate-price").post(catalog::quote::handler))
        .push(Router::with_path("webhooks/{gateway}").post(payments::webhook::handler))
}

/// Reads open to anonymous callers. Mounted after the authenticated routes
/// so `files/usage` is not taken for a file id.
fn optional_identity_router() -> Router {
    Router::new().hoop(auth::middleware::optional).push(
        Router::with_path("files/{file}")
            .get(files::get::handler)
            .push(Router::with_path("download").get(files::download::handler)),
    )
}

fn authenticated_router() -> Router {
    Router::new()
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("totals").post(carts::totals::handler))
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .push(
                            Router::with_path("{variant}")
                                .put(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                ),
        )
        .push(Router::with_path("checkout").post(orders::checkout::handler))
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("files").get(files::order::handler))
                        .push(Router::with_path("notes").post(orders::notes::handler))
                        .push(Router::with_path("status").put(orders::status::handler)),
                ),
        )
        .push(
            Router::with_path("payments")
                .push(Router::with_path("{gateway}/intent").post(payments::intent::handler))
                .push(Router::with_path("{payment}").get(payments::status::handler)),
        )
        .push(
            Router::with_path("files")
                .get(files::index::handler)
                .post(files::upload::handler)
                .push(Router::with_path("usage").get(files::usage::handler))
                .push(Router::with_path("bulk").post(files::bulk::handler))
                .push(
                    Router::with_path("{file}")
                        .delete(files::delete::handler)
                        .push(Router::with_path("visibility").put(files::visibility::handler)),
                ),
        )
        .push(admin_router())
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .push(
            Router::with_path("services")
                .post(catalog::create::handler)
                .push(
                    Router::with_path("{service}")
                        .put(catalog::update::handler)
                        .delete(catalog::delete::handler)
                        .push(Router::with_path("variants").post(catalog::variants::handler))
                        .push(Router::with_path("active").put(catalog::activate::handler)),
                ),
        )
        .push(
            Router::with_path("variants/{variant}")
                .put(catalog::variant_update::handler)
                .delete(catalog::variant_delete::handler),
        )
        .push(
            Router::with_path("coupons")
                .get(coupons::index::handler)
                .post(coupons::create::handler),
        )
        .push(
            Router::with_path("orders/{order}")
                .push(Router::with_path("editor").put(orders::assign::handler))
                .push(Router::with_path("refund").post(orders::refund::handler)),
        )
        .push(Router::with_path("statistics").get(orders::statistics::handler))
}
