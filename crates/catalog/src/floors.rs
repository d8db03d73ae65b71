use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::raw::RawId;

/// Floor entry as returned by the floor list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFloor {
    pub floor_id: RawId,
    #[serde(default)]
    pub name: String,
}

impl RawFloor {
    pub fn new(floor_id: &str, name: impl Into<String>) -> Self {
        Self {
            floor_id: RawId::from(floor_id),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    #[serde(rename = "floorId")]
    pub id: i64,
    pub name: String,
}

/// A flat record keyed by an integer id.
pub trait FlatRecord {
    /// Parsed id, or `None` when the raw id is not an integer.
    fn flat_id(&self) -> Option<i64>;
}

impl FlatRecord for RawFloor {
    fn flat_id(&self) -> Option<i64> {
        self.floor_id.to_int()
    }
}

impl FlatRecord for Floor {
    fn flat_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

/// Keep the first occurrence of each parsed id, in input order.
///
/// Records with unparseable ids are dropped.
pub fn dedupe_by_id<T: FlatRecord + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Some(id) = item.flat_id() else {
            debug!("dropping flat record with non-integer id");
            continue;
        };
        if seen.insert(id) {
            out.push(item.clone());
        } else {
            debug!(id, "dropping duplicate flat record");
        }
    }
    out
}

pub fn dedupe_floors(raw: &[RawFloor]) -> Vec<Floor> {
    dedupe_by_id(raw)
        .into_iter()
        .filter_map(|f| {
            Some(Floor {
                id: f.flat_id()?,
                name: f.name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Floor, RawFloor, dedupe_by_id, dedupe_floors};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<RawFloor> {
        vec![
            RawFloor::new("1", "B1"),
            RawFloor::new("1", "B1-dup"),
            RawFloor::new("x", "bad"),
            RawFloor::new("2", "1F"),
        ]
    }

    #[test]
    fn keeps_first_occurrence_and_drops_invalid() {
        assert_eq!(
            dedupe_floors(&sample()),
            vec![
                Floor {
                    id: 1,
                    name: "B1".into()
                },
                Floor {
                    id: 2,
                    name: "1F".into()
                },
            ]
        );
    }

    #[test]
    fn dedupe_is_idempotent() {
        let once = dedupe_floors(&sample());
        assert_eq!(dedupe_by_id(&once), once);

        let raw_once = dedupe_by_id(&sample());
        assert_eq!(dedupe_by_id(&raw_once), raw_once);
    }

    #[test]
    fn parses_floor_payload() {
        let raw: Vec<RawFloor> = serde_json::from_str(
            r#"[{"floorId": "3", "name": "2F"}, {"floorId": 4, "name": "3F"}, {"floorId": " 3 ", "name": "again"}]"#,
        )
        .unwrap();
        let floors = dedupe_floors(&raw);
        assert_eq!(floors.len(), 2);
        assert_eq!(
            serde_json::to_value(&floors[0]).unwrap(),
            serde_json::json!({"floorId": 3, "name": "2F"})
        );
    }
}
