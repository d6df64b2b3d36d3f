pub mod auth;
pub mod banners;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod lab_tests;
pub mod payments;
pub mod stats;
pub mod swagger;
pub mod users;

use crate::middleware::access::AccessPolicy;
use crate::middleware::AuthMiddleware;
use actix_web::web;

/// Registers every route with its access policy. `stats_access` guards the
/// category and popularity reports.
pub fn configure(cfg: &mut web::ServiceConfig, stats_access: AccessPolicy) {
    cfg
        // Health
        .route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))

        // Auth
        .route("/jwt", web::post().to(auth::issue_token))

        // Users
        .service(
            web::resource("/users")
                .route(web::get().to(users::list_users).wrap(AuthMiddleware::admin()))
                .route(web::post().to(users::sign_up)),
        )
        .service(
            web::resource("/users/admin/{key}")
                .route(web::get().to(users::admin_check).wrap(AuthMiddleware::authenticated()))
                .route(web::patch().to(users::make_admin).wrap(AuthMiddleware::admin())),
        )
        .service(
            web::resource("/users/status/{key}")
                .route(web::get().to(users::user_status))
                .route(web::patch().to(users::update_status).wrap(AuthMiddleware::admin())),
        )
        .route(
            "/users/{id}",
            web::delete().to(users::delete_user).wrap(AuthMiddleware::admin()),
        )

        // Catalog
        .service(
            web::resource("/tests")
                .route(web::get().to(lab_tests::list_tests))
                .route(web::post().to(lab_tests::create_test).wrap(AuthMiddleware::admin())),
        )
        .service(
            web::resource("/tests/{id}")
                .route(web::get().to(lab_tests::get_test))
                .route(web::patch().to(lab_tests::update_test).wrap(AuthMiddleware::admin()))
                .route(web::delete().to(lab_tests::delete_test).wrap(AuthMiddleware::admin())),
        )
        .route("/reviews", web::get().to(catalog::list_reviews))
        .route("/doctors", web::get().to(catalog::list_doctors))
        .route("/promotions", web::get().to(catalog::list_promotions))

        // Bookings
        .service(
            web::resource("/bookings")
                .route(web::get().to(bookings::list_bookings).wrap(AuthMiddleware::authenticated()))
                .route(web::post().to(bookings::create_booking).wrap(AuthMiddleware::authenticated())),
        )
        .route(
            "/bookings/status/{id}",
            web::patch().to(bookings::update_booking_status).wrap(AuthMiddleware::admin()),
        )
        .route(
            "/bookings/{id}",
            web::delete().to(bookings::delete_booking).wrap(AuthMiddleware::authenticated()),
        )

        // Payments
        .route(
            "/create-payment-intent",
            web::post().to(payments::create_payment_intent).wrap(AuthMiddleware::authenticated()),
        )
        .route(
            "/payments",
            web::post().to(payments::record_payment).wrap(AuthMiddleware::authenticated()),
        )
        .route(
            "/payments/{email}",
            web::get().to(payments::payment_history).wrap(AuthMiddleware::authenticated()),
        )

        // Banners (the literal segment must be registered before `{id}`)
        .service(
            web::resource("/banners")
                .route(web::get().to(banners::list_banners))
                .route(web::post().to(banners::create_banner).wrap(AuthMiddleware::admin())),
        )
        .route("/banners/active", web::get().to(banners::active_banner))
        .route(
            "/banners/{id}/activate",
            web::patch().to(banners::activate_banner).wrap(AuthMiddleware::admin()),
        )
        .route(
            "/banners/{id}",
            web::delete().to(banners::delete_banner).wrap(AuthMiddleware::admin()),
        )

        // Stats
        .route(
            "/admin-stats",
            web::get().to(stats::admin_stats).wrap(AuthMiddleware::admin()),
        )
        .route(
            "/category-stats",
            web::get().to(stats::category_stats).wrap(AuthMiddleware::new(stats_access)),
        )
        .route(
            "/popular-tests",
            web::get().to(stats::popular_tests).wrap(AuthMiddleware::new(stats_access)),
        );
}
