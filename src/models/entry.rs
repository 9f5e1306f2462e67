use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subjective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardiovascular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neurological: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_exam: Option<String>,
}

/// Shallow merge of a clinical section: each key present in `patch`
/// replaces the stored key (nested objects such as `temperature` included),
/// and an explicit `null` clears it.
fn merge_section<T>(stored: &T, patch: Map<String, Value>, section: &str) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = match serde_json::to_value(stored)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(patch);

    serde_json::from_value(Value::Object(merged))
        .map_err(|e| ApiError::validation(format!("Invalid {section}: {e}")))
}

fn parse_section<T>(patch: Option<Map<String, Value>>, section: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    match patch {
        Some(map) => serde_json::from_value(Value::Object(map))
            .map_err(|e| ApiError::validation(format!("Invalid {section}: {e}"))),
        None => Ok(T::default()),
    }
}

/// A charted observation for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub vital_signs: VitalSigns,
    pub subjective: Subjective,
    pub objective: Objective,
    pub assessment: String,
    pub plan: String,
    pub transcript: String,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `entries` table; the clinical sections are JSONB.
#[derive(Debug, FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub vital_signs: Json<VitalSigns>,
    pub subjective: Json<Subjective>,
    pub objective: Json<Objective>,
    pub assessment: String,
    pub plan: String,
    pub transcript: String,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            patient_id: row.patient_id,
            vital_signs: row.vital_signs.0,
            subjective: row.subjective.0,
            objective: row.objective.0,
            assessment: row.assessment,
            plan: row.plan,
            transcript: row.transcript,
            reviewed: row.reviewed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub patient_id: Uuid,
    pub vital_signs: VitalSigns,
    pub subjective: Subjective,
    pub objective: Objective,
    pub assessment: String,
    pub plan: String,
    pub transcript: String,
}

/// Body of `POST` and `PUT /api/entries`. Ids arrive as strings so that a
/// malformed id can be reported as "not found" rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub id: Option<String>,
    pub patient_id: Option<String>,
    pub vital_signs: Option<Map<String, Value>>,
    pub subjective: Option<Map<String, Value>>,
    pub objective: Option<Map<String, Value>>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub transcript: Option<String>,
    pub reviewed: Option<bool>,
}

impl EntryPayload {
    pub fn into_new_entry(self, patient_id: Uuid) -> Result<NewEntry, ApiError> {
        Ok(NewEntry {
            patient_id,
            vital_signs: parse_section(self.vital_signs, "vitalSigns")?,
            subjective: parse_section(self.subjective, "subjective")?,
            objective: parse_section(self.objective, "objective")?,
            assessment: self.assessment.unwrap_or_default(),
            plan: self.plan.unwrap_or_default(),
            transcript: self.transcript.unwrap_or_default(),
        })
    }

    /// Fold the fields present in this payload into `entry`. Nothing is
    /// changed if a section does not fit its shape.
    pub fn apply_to(self, entry: &mut Entry) -> Result<(), ApiError> {
        let vital_signs = self
            .vital_signs
            .map(|patch| merge_section(&entry.vital_signs, patch, "vitalSigns"))
            .transpose()?;
        let subjective = self
            .subjective
            .map(|patch| merge_section(&entry.subjective, patch, "subjective"))
            .transpose()?;
        let objective = self
            .objective
            .map(|patch| merge_section(&entry.objective, patch, "objective"))
            .transpose()?;

        if let Some(vital_signs) = vital_signs {
            entry.vital_signs = vital_signs;
        }
        if let Some(subjective) = subjective {
            entry.subjective = subjective;
        }
        if let Some(objective) = objective {
            entry.objective = objective;
        }
        if let Some(assessment) = self.assessment {
            entry.assessment = assessment;
        }
        if let Some(plan) = self.plan {
            entry.plan = plan;
        }
        if let Some(reviewed) = self.reviewed {
            entry.reviewed = reviewed;
        }
        if let Some(transcript) = self.transcript {
            entry.transcript = transcript;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> Entry {
        Entry {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            vital_signs: VitalSigns {
                temperature: Some(Temperature {
                    value: Some("37.2".into()),
                    unit: Some("C".into()),
                }),
                heart_rate: Some("72".into()),
                ..Default::default()
            },
            subjective: Subjective {
                chief_complaint: Some("Headache".into()),
                pain_level: Some("4".into()),
                ..Default::default()
            },
            objective: Objective::default(),
            assessment: "Stable".into(),
            plan: "Observe".into(),
            transcript: String::new(),
            reviewed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_merges_nested_sections_key_by_key() {
        let mut entry = sample_entry();
        let patch: EntryPayload = serde_json::from_value(json!({
            "id": entry.id.to_string(),
            "vitalSigns": { "heartRate": "88" },
            "subjective": { "painLevel": "7" },
            "reviewed": true
        }))
        .unwrap();

        patch.apply_to(&mut entry).unwrap();

        assert_eq!(entry.vital_signs.heart_rate.as_deref(), Some("88"));
        assert_eq!(
            entry.vital_signs.temperature.as_ref().and_then(|t| t.value.as_deref()),
            Some("37.2")
        );
        assert_eq!(entry.subjective.pain_level.as_deref(), Some("7"));
        assert_eq!(entry.subjective.chief_complaint.as_deref(), Some("Headache"));
        assert!(entry.reviewed);
        assert_eq!(entry.assessment, "Stable");
    }

    #[test]
    fn test_patch_replaces_nested_object_wholesale() {
        let mut entry = sample_entry();
        let patch: EntryPayload = serde_json::from_value(json!({
            "vitalSigns": { "temperature": { "value": "99.1" } }
        }))
        .unwrap();

        patch.apply_to(&mut entry).unwrap();

        let temperature = entry.vital_signs.temperature.unwrap();
        assert_eq!(temperature.value.as_deref(), Some("99.1"));
        assert_eq!(temperature.unit, None);
    }

    #[test]
    fn test_patch_null_clears_field() {
        let mut entry = sample_entry();
        let patch: EntryPayload = serde_json::from_value(json!({
            "vitalSigns": { "temperature": null },
            "subjective": { "painLevel": null }
        }))
        .unwrap();

        patch.apply_to(&mut entry).unwrap();

        assert_eq!(entry.vital_signs.temperature, None);
        assert_eq!(entry.vital_signs.heart_rate.as_deref(), Some("72"));
        assert_eq!(entry.subjective.pain_level, None);
        assert_eq!(entry.subjective.chief_complaint.as_deref(), Some("Headache"));
    }

    #[test]
    fn test_patch_with_wrong_shape_changes_nothing() {
        let mut entry = sample_entry();
        let before = entry.clone();
        let patch: EntryPayload = serde_json::from_value(json!({
            "plan": "Discharge",
            "subjective": { "painLevel": 7 }
        }))
        .unwrap();

        let err = patch.apply_to(&mut entry).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.starts_with("Invalid subjective")));
        assert_eq!(entry, before);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = sample_entry();
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["patientId"], entry.patient_id.to_string());
        assert_eq!(json["vitalSigns"]["heartRate"], "72");
        assert_eq!(json["vitalSigns"]["temperature"]["unit"], "C");
        assert_eq!(json["subjective"]["chiefComplaint"], "Headache");
        assert_eq!(json["objective"], json!({}));
        assert_eq!(json["reviewed"], false);
    }

    #[test]
    fn test_new_entry_defaults() {
        let new_entry = EntryPayload::default().into_new_entry(Uuid::nil()).unwrap();
        assert_eq!(new_entry.transcript, "");
        assert_eq!(new_entry.vital_signs, VitalSigns::default());
    }
}
