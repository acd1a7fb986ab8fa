use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Station Rush Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::names::claim_name,
        crate::routes::names::name_status,
        crate::routes::names::release_name,
        crate::routes::stations::list_stations,
        crate::routes::stations::victory,
        crate::routes::stations::report_status,
        crate::routes::stations::report_remote,
        crate::routes::session::start_session,
        crate::routes::session::current_session,
        crate::routes::session::finish_session,
        crate::routes::session::abandon_session,
        crate::routes::session::press_buzzer,
        crate::routes::session::poll_buzzer,
        crate::routes::session::record_activity,
        crate::routes::session::idle_status,
        crate::routes::runs::record_run,
        crate::routes::runs::rankings,
        crate::routes::admin::list_runs,
        crate::routes::admin::edit_runs,
        crate::routes::admin::delete_runs,
        crate::routes::admin::clear_runs,
        crate::routes::admin::reset_floor,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::names::ClaimNameRequest,
            crate::dto::names::OkResponse,
            crate::dto::names::NameStatusResponse,
            crate::state::stations::StationStatus,
            crate::dto::stations::StationStatusRequest,
            crate::dto::stations::RemoteReportRequest,
            crate::dto::stations::StationReportResponse,
            crate::dto::stations::VictoryResponse,
            crate::dto::session::StartSessionRequest,
            crate::dto::session::SessionView,
            crate::dto::session::FinishReason,
            crate::dto::session::FinishSessionRequest,
            crate::dto::session::FinishSessionResponse,
            crate::dto::session::BuzzerResponse,
            crate::dto::session::IdleResponse,
            crate::dto::runs::RecordRunRequest,
            crate::dto::runs::RecordRunResponse,
            crate::dto::runs::RankingScope,
            crate::dto::runs::RankingItem,
            crate::dto::admin::AdminRunItem,
            crate::dto::admin::AdminRunRow,
            crate::dto::admin::AdminEditResponse,
            crate::dto::admin::AdminDeleteResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "names", description = "Player name reservations"),
        (name = "stations", description = "Station status reports and victory probe"),
        (name = "session", description = "Timed session lifecycle, buzzer and idle mode"),
        (name = "runs", description = "Leaderboard recording and rankings"),
        (name = "admin", description = "Operator maintenance endpoints"),
    )
)]
pub struct ApiDoc;
