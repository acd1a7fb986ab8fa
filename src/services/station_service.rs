//! Station reports: explicit statuses and satellite tag reads.

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::{
    dto::stations::{RemoteReportRequest, StationReportResponse, VictoryResponse},
    error::ServiceError,
    state::{SharedState, stations::StationStatus},
};

/// Current status of every station.
pub fn snapshot(state: &SharedState) -> IndexMap<String, StationStatus> {
    state.stations().snapshot().stations
}

/// Whether every station reports correct.
pub fn victory(state: &SharedState) -> VictoryResponse {
    VictoryResponse {
        victory: state.stations().is_victory(),
    }
}

/// Apply a status report from `station_id`.
pub fn report_status(
    state: &SharedState,
    station_id: &str,
    status: StationStatus,
) -> Result<StationReportResponse, ServiceError> {
    if station_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "station id must not be empty".into(),
        ));
    }

    let outcome = state.stations().report_status(station_id, status);
    if outcome.applied {
        info!(station = %station_id, status = ?status, "station status updated");
    } else {
        warn!(
            station = %station_id,
            requested = ?status,
            current = ?outcome.status,
            "station report ignored"
        );
    }

    Ok(StationReportResponse {
        station: station_id.to_owned(),
        status: outcome.status,
        applied: outcome.applied,
    })
}

/// Classify a tag read against the station's expected tag.
pub fn classify_tag(expected: &str, tag_id: &str) -> StationStatus {
    if tag_id == expected {
        StationStatus::Correct
    } else {
        StationStatus::Incorrect
    }
}

/// Handle a satellite report. An explicit status wins; otherwise the tag is classified against
/// the configured expected tag.
pub fn report_remote(
    state: &SharedState,
    request: RemoteReportRequest,
) -> Result<StationReportResponse, ServiceError> {
    let status = match (request.status, request.id.as_deref()) {
        (Some(status), _) => status,
        (None, Some(tag_id)) => match state.config().expected_tag(&request.satellite) {
            Some(expected) => classify_tag(expected, tag_id),
            None => {
                return Err(ServiceError::InvalidInput(format!(
                    "station `{}` has no configured tag; report an explicit status",
                    request.satellite
                )));
            }
        },
        (None, None) => {
            return Err(ServiceError::InvalidInput(
                "either `status` or `id` is required".into(),
            ));
        }
    };

    report_status(state, &request.satellite, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AppConfig, StationConfig},
        state::AppState,
    };

    fn state_with_tags() -> SharedState {
        let config = AppConfig {
            stations: vec![
                StationConfig {
                    id: "local".into(),
                    tag: Some("584186924480".into()),
                },
                StationConfig {
                    id: "stl1".into(),
                    tag: None,
                },
            ],
            ..AppConfig::default()
        };
        AppState::new(config)
    }

    fn remote(
        satellite: &str,
        id: Option<&str>,
        status: Option<StationStatus>,
    ) -> RemoteReportRequest {
        RemoteReportRequest {
            satellite: satellite.into(),
            id: id.map(Into::into),
            status,
        }
    }

    #[test]
    fn tag_reads_are_classified_against_config() {
        let state = state_with_tags();
        let wrong = report_remote(&state, remote("local", Some("0000"), None)).unwrap();
        assert_eq!(wrong.status, StationStatus::Incorrect);

        let right = report_remote(&state, remote("local", Some("584186924480"), None)).unwrap();
        assert_eq!(right.status, StationStatus::Correct);
        assert!(right.applied);
    }

    #[test]
    fn untagged_station_needs_explicit_status() {
        let state = state_with_tags();
        assert!(matches!(
            report_remote(&state, remote("stl1", Some("1234"), None)),
            Err(ServiceError::InvalidInput(_))
        ));
        let report =
            report_remote(&state, remote("stl1", Some("1234"), Some(StationStatus::Correct)))
                .unwrap();
        assert_eq!(report.status, StationStatus::Correct);
        assert!(!state.stations().is_victory(), "local still pending");
    }

    #[test]
    fn empty_station_id_is_rejected() {
        let state = state_with_tags();
        assert!(report_status(&state, " ", StationStatus::Correct).is_err());
    }
}
