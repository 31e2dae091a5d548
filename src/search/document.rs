//! Typed codec between the structured HR profile and its search-engine
//! document form. The engine stores the nested object sections as arrays of
//! per-item JSON strings; this module is the only place that serialization
//! boundary is crossed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested sections persisted as JSON-encoded strings in the document store.
/// `skills` is excluded: it is a plain multi-valued string field.
const NESTED_OBJECT_FIELDS: &[&str] = &["work_experience", "project", "education"];

/// Engine-managed fields that must never appear in an atomic update payload.
const ENGINE_FIELDS: &[&str] = &["id", "_version_"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills_used: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// Structured HR candidate profile as exposed by the API.
///
/// All nested sections are arrays; a missing section reads as an empty array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HrProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_profile_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub project: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
}

/// Partial update payload: only present fields are written. Nested sections
/// are `Option<Vec<..>>` so "not supplied" and "set to empty" stay distinct.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HrProfileUpdate {
    pub hr_profile_id: Option<i64>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email_id: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub resume_headline: Option<String>,
    pub current_location: Option<String>,
    pub nationality: Option<String>,
    pub about_me: Option<String>,
    pub status: Option<String>,
    pub skills: Option<Vec<String>>,
    pub work_experience: Option<Vec<WorkExperience>>,
    pub project: Option<Vec<Project>>,
    pub education: Option<Vec<Education>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Profile document is not a JSON object")]
    NotAnObject,
    #[error("Invalid nested JSON in field '{field}': {source}")]
    InvalidNested {
        field: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Encode a structured profile into its document-store form.
///
/// Absent scalar fields are omitted entirely; nested object arrays become
/// arrays of per-item JSON strings, empty arrays included as `[]`.
pub fn encode(profile: &HrProfile) -> Result<Value, CodecError> {
    let value = serde_json::to_value(profile)?;
    let mut map = match value {
        Value::Object(map) => map,
        _ => return Err(CodecError::NotAnObject),
    };

    for field in NESTED_OBJECT_FIELDS {
        if let Some(Value::Array(items)) = map.remove(*field) {
            let encoded = items
                .into_iter()
                .map(|item| serde_json::to_string(&item).map(Value::String))
                .collect::<Result<Vec<_>, _>>()?;
            map.insert((*field).to_string(), Value::Array(encoded));
        }
    }

    Ok(Value::Object(map))
}

/// Decode a raw document-store record back into a structured profile.
///
/// Each nested section is JSON-decoded per item; a missing section decodes as
/// an empty array, and a bare string (legacy single-object shape) as a
/// one-item array. Scalar fields pass through untouched.
pub fn decode(doc: &Value) -> Result<HrProfile, CodecError> {
    let mut map = match doc {
        Value::Object(map) => map.clone(),
        _ => return Err(CodecError::NotAnObject),
    };

    for field in NESTED_OBJECT_FIELDS {
        let decoded = match map.remove(*field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| decode_nested_item(field, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => vec![decode_nested_item(field, other)?],
        };
        map.insert((*field).to_string(), Value::Array(decoded));
    }

    // _version_ and any other engine bookkeeping fields are ignored by serde
    serde_json::from_value(Value::Object(map)).map_err(CodecError::Serialize)
}

fn decode_nested_item(field: &str, item: Value) -> Result<Value, CodecError> {
    match item {
        Value::String(raw) => serde_json::from_str(&raw).map_err(|source| {
            CodecError::InvalidNested {
                field: field.to_string(),
                source,
            }
        }),
        // Already structured; tolerate and pass through
        other => Ok(other),
    }
}

/// Build an atomic-update document: `{"id": .., field: {"set": value}}` for
/// supplied fields only. The document id is carried as the locator, never as
/// a `set` operation, and engine-managed fields are excluded.
pub fn to_atomic_update(id: &str, update: &HrProfileUpdate) -> Result<Value, CodecError> {
    let mut doc = Map::new();
    doc.insert("id".to_string(), Value::String(id.to_string()));

    set_scalar(&mut doc, "hr_profile_id", &update.hr_profile_id)?;
    set_scalar(&mut doc, "first_name", &update.first_name)?;
    set_scalar(&mut doc, "middle_name", &update.middle_name)?;
    set_scalar(&mut doc, "last_name", &update.last_name)?;
    set_scalar(&mut doc, "email_id", &update.email_id)?;
    set_scalar(&mut doc, "mobile", &update.mobile)?;
    set_scalar(&mut doc, "gender", &update.gender)?;
    set_scalar(&mut doc, "date_of_birth", &update.date_of_birth)?;
    set_scalar(&mut doc, "resume_headline", &update.resume_headline)?;
    set_scalar(&mut doc, "current_location", &update.current_location)?;
    set_scalar(&mut doc, "nationality", &update.nationality)?;
    set_scalar(&mut doc, "about_me", &update.about_me)?;
    set_scalar(&mut doc, "status", &update.status)?;

    if let Some(skills) = &update.skills {
        doc.insert("skills".to_string(), set_op(serde_json::to_value(skills)?));
    }
    set_nested(&mut doc, "work_experience", &update.work_experience)?;
    set_nested(&mut doc, "project", &update.project)?;
    set_nested(&mut doc, "education", &update.education)?;

    debug_assert!(ENGINE_FIELDS
        .iter()
        .all(|f| *f == "id" || !doc.contains_key(*f)));

    Ok(Value::Object(doc))
}

fn set_op(value: Value) -> Value {
    let mut op = Map::new();
    op.insert("set".to_string(), value);
    Value::Object(op)
}

fn set_scalar<T: Serialize>(
    doc: &mut Map<String, Value>,
    field: &str,
    value: &Option<T>,
) -> Result<(), CodecError> {
    if let Some(value) = value {
        doc.insert(field.to_string(), set_op(serde_json::to_value(value)?));
    }
    Ok(())
}

fn set_nested<T: Serialize>(
    doc: &mut Map<String, Value>,
    field: &str,
    value: &Option<Vec<T>>,
) -> Result<(), CodecError> {
    if let Some(items) = value {
        let encoded = items
            .iter()
            .map(|item| serde_json::to_string(item).map(Value::String))
            .collect::<Result<Vec<_>, _>>()?;
        doc.insert(field.to_string(), set_op(Value::Array(encoded)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_profile() -> HrProfile {
        HrProfile {
            id: Some("doc-1".to_string()),
            hr_profile_id: Some(101),
            tenant_id: Some(7),
            first_name: Some("Asha".to_string()),
            last_name: Some("Rao".to_string()),
            email_id: Some("asha@example.com".to_string()),
            skills: vec!["rust".to_string(), "sql".to_string()],
            work_experience: vec![WorkExperience {
                company: Some("Initech".to_string()),
                designation: Some("Engineer".to_string()),
                start_date: Some("2019-01".to_string()),
                end_date: Some("2022-06".to_string()),
                ..Default::default()
            }],
            project: vec![
                Project {
                    title: Some("Billing revamp".to_string()),
                    skills_used: vec!["rust".to_string()],
                    ..Default::default()
                },
                Project {
                    title: Some("Search migration".to_string()),
                    ..Default::default()
                },
            ],
            education: vec![Education {
                degree: Some("BSc".to_string()),
                institution: Some("State University".to_string()),
                end_year: Some("2018".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn nested_sections_encode_as_json_strings() {
        let doc = encode(&sample_profile()).unwrap();

        let work = doc["work_experience"].as_array().unwrap();
        assert_eq!(work.len(), 1);
        let raw = work[0].as_str().expect("encoded item should be a string");
        let parsed: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed["company"], "Initech");

        // Skills stay a plain multi-valued string field
        assert_eq!(doc["skills"], json!(["rust", "sql"]));
    }

    #[test]
    fn absent_scalars_are_omitted_not_null() {
        let doc = encode(&sample_profile()).unwrap();
        assert!(doc.get("mobile").is_none());
        assert!(doc.get("about_me").is_none());
    }

    #[test]
    fn empty_arrays_encode_as_empty_arrays() {
        let profile = HrProfile {
            id: Some("doc-2".to_string()),
            ..Default::default()
        };
        let doc = encode(&profile).unwrap();
        assert_eq!(doc["skills"], json!([]));
        assert_eq!(doc["work_experience"], json!([]));
        assert_eq!(doc["project"], json!([]));
        assert_eq!(doc["education"], json!([]));
    }

    #[test]
    fn round_trip_is_deep_equal() {
        for profile in [
            HrProfile::default(),
            HrProfile {
                education: vec![Education {
                    degree: Some("MSc".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
            sample_profile(),
        ] {
            let doc = encode(&profile).unwrap();
            let decoded = decode(&doc).unwrap();
            assert_eq!(decoded, profile);
        }
    }

    #[test]
    fn decode_treats_missing_sections_as_empty() {
        let doc = json!({
            "id": "doc-3",
            "first_name": "Lee",
            "_version_": 1712345678901234i64
        });
        let profile = decode(&doc).unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Lee"));
        assert!(profile.work_experience.is_empty());
        assert!(profile.project.is_empty());
        assert!(profile.education.is_empty());
        assert!(profile.skills.is_empty());
    }

    #[test]
    fn decode_wraps_legacy_single_object_shape() {
        let doc = json!({
            "id": "doc-4",
            "education": "{\"degree\":\"BA\"}"
        });
        let profile = decode(&doc).unwrap();
        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.education[0].degree.as_deref(), Some("BA"));
    }

    #[test]
    fn decode_rejects_corrupt_nested_json() {
        let doc = json!({
            "id": "doc-5",
            "project": ["{not json"]
        });
        assert!(matches!(
            decode(&doc),
            Err(CodecError::InvalidNested { .. })
        ));
    }

    #[test]
    fn atomic_update_sets_only_supplied_fields() {
        let update = HrProfileUpdate {
            first_name: Some("Mira".to_string()),
            skills: Some(vec!["go".to_string()]),
            ..Default::default()
        };
        let doc = to_atomic_update("doc-6", &update).unwrap();

        assert_eq!(doc["id"], "doc-6");
        assert_eq!(doc["first_name"], json!({"set": "Mira"}));
        assert_eq!(doc["skills"], json!({"set": ["go"]}));
        // Nothing else is touched
        assert_eq!(doc.as_object().unwrap().len(), 3);
    }

    #[test]
    fn atomic_update_encodes_nested_sections_as_strings() {
        let update = HrProfileUpdate {
            education: Some(vec![Education {
                degree: Some("PhD".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let doc = to_atomic_update("doc-7", &update).unwrap();

        let set = doc["education"]["set"].as_array().unwrap();
        let parsed: Value = serde_json::from_str(set[0].as_str().unwrap()).unwrap();
        assert_eq!(parsed["degree"], "PhD");
    }

    #[test]
    fn atomic_update_can_clear_a_section() {
        let update = HrProfileUpdate {
            project: Some(Vec::new()),
            ..Default::default()
        };
        let doc = to_atomic_update("doc-8", &update).unwrap();
        assert_eq!(doc["project"], json!({"set": []}));
    }
}
