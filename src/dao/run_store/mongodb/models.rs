use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use super::error::MongoDaoError;
use crate::dao::models::{RunEntity, RunId};

/// Document stored in the `runs` collection. BSON has no unsigned integers, hence `i64` ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRunDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub elapsed: String,
    pub recorded_at: DateTime,
    /// Session the run finalizes; unique when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl From<RunEntity> for MongoRunDocument {
    fn from(value: RunEntity) -> Self {
        Self {
            id: id_to_bson(value.id),
            name: value.name,
            elapsed: value.elapsed,
            recorded_at: DateTime::from_system_time(value.recorded_at),
            session: None,
        }
    }
}

impl TryFrom<MongoRunDocument> for RunEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoRunDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: id_from_bson(value.id)?,
            name: value.name,
            elapsed: value.elapsed,
            recorded_at: value.recorded_at.to_system_time(),
        })
    }
}

/// Sequence document of the `counters` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub seq: i64,
}

pub fn id_to_bson(id: RunId) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

pub fn id_from_bson(id: i64) -> Result<RunId, MongoDaoError> {
    RunId::try_from(id).map_err(|_| MongoDaoError::NegativeId { id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert_eq!(id_from_bson(7).unwrap(), 7);
        assert!(matches!(
            id_from_bson(-1),
            Err(MongoDaoError::NegativeId { id: -1 })
        ));
        assert_eq!(id_to_bson(RunId::MAX), i64::MAX);
    }
}
