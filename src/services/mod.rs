/// Admin service for leaderboard maintenance and floor reset.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Kiosk activity and idle mode.
pub mod idle_service;
/// Run recording and rankings.
pub mod leaderboard_service;
/// Player name reservations.
pub mod name_service;
/// Timed session lifecycle and finalization.
pub mod session_service;
/// Station reports and victory detection.
pub mod station_service;
/// Run store connection supervisor driving degraded mode.
pub mod storage_supervisor;
