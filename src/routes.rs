use crate::{
    api::attendance,
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let upload_limiter = build_limiter(config.rate_upload_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::dashboard)))
                    // /attendance/upload
                    .service(
                        web::resource("/upload")
                            .wrap(upload_limiter)
                            .route(web::post().to(attendance::upload))
                            .route(web::delete().to(attendance::discard_upload)),
                    )
                    // /attendance/refresh
                    .service(web::resource("/refresh").route(web::post().to(attendance::refresh)))
                    // /attendance/save
                    .service(web::resource("/save").route(web::post().to(attendance::save)))
                    // /attendance/history
                    .service(web::resource("/history").route(web::get().to(attendance::history))),
            ),
    );
}

// UPLOAD
//  └─ POST /attendance/upload  (workbook bytes) → rows held in session

// REVIEW
//  └─ GET /attendance?year&month&name&page&per_page

// SAVE
//  └─ POST /attendance/save → backend persists + regenerates
//       └─ session reloads persisted rows
