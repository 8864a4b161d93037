use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the ranking-live service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::leaderboard,
        crate::routes::public::session,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::admin::start_countdown,
        crate::routes::admin::activate_celebration,
        crate::routes::admin::deactivate_celebration,
        crate::routes::admin::connect_feed,
        crate::routes::admin::teardown_session,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::leaderboard::LeaderboardView,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::Podium,
            crate::dto::session::SessionView,
            crate::dto::session::FeedStatus,
            crate::dto::session::VisibleFeedPhase,
            crate::dto::session::CountdownView,
            crate::dto::session::VisibleCountdownPhase,
            crate::dto::session::CelebrationView,
            crate::dto::admin::StartCountdownRequest,
            crate::dto::admin::StartCountdownResponse,
            crate::dto::admin::CelebrationResponse,
            crate::dto::admin::ConnectResponse,
            crate::dto::admin::ActionResponse,
            crate::dto::sse::AdminHandshake,
            crate::dto::sse::FeedRejectedEvent,
            crate::dto::feed::FeedOutbound,
            crate::dto::feed::PlayerPayload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Read-only leaderboard views"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "admin", description = "Operator commands, gated by the admin token"),
    )
)]
pub struct ApiDoc;
