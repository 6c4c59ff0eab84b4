//! Body-measurement journal
//!
//! Entries are kept newest first. Deleting an entry leaves a tombstone so
//! the deletion can sync; [`visible`] hides tombstones.

use crate::errors::{DomainError, DomainResult};
use crate::models::{new_id, BodyMeasurements, CustomMeasurement, JournalEntry};
use crate::validation::{validate_measurement, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Journal form contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDraft {
    #[serde(flatten)]
    pub measurements: BodyMeasurements,
    #[serde(default)]
    pub custom_measurements: Vec<CustomMeasurement>,
}

impl JournalDraft {
    /// Check every recorded value
    pub fn validate_values(&self) -> DomainResult<()> {
        for (field, value) in self.measurements.fields() {
            if let Some(v) = value {
                validate_measurement(v).map_err(|msg| ValidationError::new(field, &msg))?;
            }
        }
        for custom in &self.custom_measurements {
            check_custom(&custom.name, custom.value, &custom.unit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Validate)]
struct CustomMeasurementInput {
    #[validate(length(min = 1, max = 64))]
    name: String,
    #[validate(length(max = 16))]
    unit: String,
}

fn check_custom(name: &str, value: f64, unit: &str) -> DomainResult<()> {
    let input = CustomMeasurementInput {
        name: name.trim().to_string(),
        unit: unit.trim().to_string(),
    };
    input.validate().map_err(|_| {
        ValidationError::new(
            "custom_measurement",
            "name must be 1-64 characters and unit at most 16",
        )
    })?;
    validate_measurement(value).map_err(|msg| ValidationError::new("custom_measurement", &msg))?;
    Ok(())
}

/// Build a custom measurement from form input
pub fn add_custom_measurement(name: &str, raw_value: &str, unit: &str) -> DomainResult<CustomMeasurement> {
    let value: f64 = raw_value
        .trim()
        .parse()
        .map_err(|_| ValidationError::new("custom_measurement", "value must be a number"))?;
    check_custom(name, value, unit)?;

    Ok(CustomMeasurement {
        id: new_id(),
        name: name.trim().to_string(),
        value,
        unit: unit.trim().to_string(),
    })
}

/// Record a new entry at the top of the journal
pub fn create(
    entries: &mut Vec<JournalEntry>,
    draft: JournalDraft,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> DomainResult<JournalEntry> {
    draft.validate_values()?;
    let entry = JournalEntry {
        id: new_id(),
        date: today,
        measurements: draft.measurements,
        custom_measurements: draft.custom_measurements,
        updated_at: Some(now),
        deleted_at: None,
    };
    entries.insert(0, entry.clone());
    Ok(entry)
}

/// Edit an entry: recorded fields overwrite, custom measurements are replaced
pub fn update(
    entries: &mut [JournalEntry],
    id: &str,
    draft: JournalDraft,
    now: DateTime<Utc>,
) -> DomainResult<JournalEntry> {
    draft.validate_values()?;
    let entry = find_live_mut(entries, id)?;
    entry.measurements.merge_from(&draft.measurements);
    entry.custom_measurements = draft.custom_measurements;
    entry.updated_at = Some(now);
    Ok(entry.clone())
}

/// Tombstone an entry
pub fn delete(entries: &mut [JournalEntry], id: &str, now: DateTime<Utc>) -> DomainResult<()> {
    let entry = find_live_mut(entries, id)?;
    entry.deleted_at = Some(now);
    entry.updated_at = Some(now);
    Ok(())
}

/// Entries that have not been deleted
pub fn visible(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    entries.iter().filter(|e| e.deleted_at.is_none()).collect()
}

fn find_live_mut<'a>(entries: &'a mut [JournalEntry], id: &str) -> DomainResult<&'a mut JournalEntry> {
    entries
        .iter_mut()
        .find(|e| e.id == id && e.deleted_at.is_none())
        .ok_or_else(|| DomainError::NotFound(format!("journal entry {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    fn draft(weight: f64, waist: f64) -> JournalDraft {
        JournalDraft {
            measurements: BodyMeasurements {
                weight: Some(weight),
                waist: Some(waist),
                ..Default::default()
            },
            custom_measurements: vec![],
        }
    }

    #[test]
    fn test_create_prepends() {
        let now = Utc::now();
        let mut entries = Vec::new();
        let first = create(&mut entries, draft(82.0, 86.0), today(), now).unwrap();
        let second = create(&mut entries, draft(81.5, 85.5), today(), now).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
        assert_eq!(entries[0].updated_at, Some(now));
    }

    #[test]
    fn test_create_rejects_bad_values() {
        let mut entries = Vec::new();
        let err = create(&mut entries, draft(-1.0, 80.0), today(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("Weight: Measurement cannot be negative".to_string())
        );

        let nan = draft(f64::NAN, 80.0);
        assert!(create(&mut entries, nan, today(), Utc::now()).is_err());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_update_merges_fields() {
        let now = Utc::now();
        let mut entries = Vec::new();
        let entry = create(&mut entries, draft(82.0, 86.0), today(), now).unwrap();

        let patch = JournalDraft {
            measurements: BodyMeasurements {
                chest: Some(104.0),
                ..Default::default()
            },
            custom_measurements: vec![add_custom_measurement("Wrist", "17.5", "cm").unwrap()],
        };
        let later = now + Duration::minutes(5);
        let updated = update(&mut entries, &entry.id, patch, later).unwrap();

        assert_eq!(updated.measurements.weight, Some(82.0));
        assert_eq!(updated.measurements.chest, Some(104.0));
        assert_eq!(updated.custom_measurements.len(), 1);
        assert_eq!(updated.updated_at, Some(later));
        assert_eq!(entries[0], updated);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut entries = Vec::new();
        let err = update(&mut entries, "missing", draft(80.0, 80.0), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_delete_tombstones() {
        let now = Utc::now();
        let mut entries = Vec::new();
        let entry = create(&mut entries, draft(82.0, 86.0), today(), now).unwrap();
        create(&mut entries, draft(81.0, 85.0), today(), now).unwrap();

        delete(&mut entries, &entry.id, now).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(visible(&entries).len(), 1);
        assert!(entries[1].deleted_at.is_some());

        // A tombstone cannot be deleted or edited again
        assert!(delete(&mut entries, &entry.id, now).is_err());
        assert!(update(&mut entries, &entry.id, draft(1.0, 1.0), now).is_err());
    }

    #[test]
    fn test_add_custom_measurement() {
        let custom = add_custom_measurement(" Wrist ", "17.5", "cm").unwrap();
        assert_eq!(custom.name, "Wrist");
        assert_eq!(custom.value, 17.5);

        assert!(add_custom_measurement("", "17.5", "cm").is_err());
        assert!(add_custom_measurement("Wrist", "", "cm").is_err());
        assert!(add_custom_measurement("Wrist", "abc", "cm").is_err());
        assert!(add_custom_measurement("Wrist", "-3", "cm").is_err());
    }
}
