use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::stations::StationStatus;

/// Explicit status report from a station.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StationStatusRequest {
    pub status: StationStatus,
}

/// Report pushed by a satellite reader: the station, the tag it read and, optionally, its own
/// classification of that tag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoteReportRequest {
    /// Station identifier (e.g. `stl1`).
    pub satellite: String,
    /// Tag id read by the station.
    #[serde(default)]
    pub id: Option<String>,
    /// Classification made by the satellite; `wrong` is accepted for `incorrect`.
    #[serde(default)]
    pub status: Option<StationStatus>,
}

/// Outcome of a station report.
#[derive(Debug, Serialize, ToSchema)]
pub struct StationReportResponse {
    pub station: String,
    /// Status the station holds after the report.
    pub status: StationStatus,
    /// False when the report was ignored (e.g. `correct` is never downgraded).
    pub applied: bool,
}

/// Victory probe for polling clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct VictoryResponse {
    pub victory: bool,
}
