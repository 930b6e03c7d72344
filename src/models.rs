use crate::repository::Entity;
use crate::routes::resource::Resource;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    #[validate(length(max = 100, message = "nom must be at most 100 characters"))]
    pub nom: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "prenom must be at most 100 characters"))]
    pub prenom: String,

    #[serde(default, deserialize_with = "deserialize_birth_date")]
    pub date_naissance: Option<NaiveDate>,
}

impl Student {
    pub fn new(
        nom: impl Into<String>,
        prenom: impl Into<String>,
        date_naissance: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            prenom: prenom.into(),
            date_naissance,
        }
    }
}

impl Entity for Student {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

impl Resource for Student {
    const COLLECTION: &'static str = "students";
    const NAME: &'static str = "Student";
}

/// Accepts `YYYY-MM-DD`, a full timestamp (only the date part is kept), an
/// empty string or null.
fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let day = value.split('T').next().unwrap_or(value);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| {
                    serde::de::Error::custom(format!("invalid dateNaissance '{}': {}", value, e))
                })
        }
    }
}
