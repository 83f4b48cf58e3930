use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub preferred_name: Option<String>,
    pub last_name: String,
}

/// Body accepted by create and update. `id` is only honoured on create.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StudentPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub first_name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    pub last_name: String,
}

impl StudentPayload {
    /// The client-supplied id if it isn't blank, otherwise a fresh v4 UUID.
    pub fn id_or_generate(&self) -> String {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string)
    }

    pub fn into_student(self, id: String) -> Student {
        let Self {
            id: _,
            first_name,
            preferred_name,
            last_name,
        } = self;

        Student {
            id,
            first_name,
            preferred_name: preferred_name.filter(|name| !name.is_empty()),
            last_name,
        }
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.preferred_name {
            Some(pn) => write!(f, "{pn} {}", self.last_name),
            None => write!(f, "{} {}", self.first_name, self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: Option<&str>) -> StudentPayload {
        StudentPayload {
            id: id.map(ToString::to_string),
            first_name: "Alice".into(),
            preferred_name: None,
            last_name: "Liddell".into(),
        }
    }

    #[test]
    fn explicit_id_is_kept() {
        assert_eq!(payload(Some("1")).id_or_generate(), "1");
    }

    #[test]
    fn blank_id_is_generated() {
        let generated = payload(Some("  ")).id_or_generate();
        assert!(Uuid::try_parse(&generated).is_ok());
        assert_ne!(generated, payload(None).id_or_generate());
    }

    #[test]
    fn payload_deserialises_without_optional_fields() {
        let payload: StudentPayload =
            serde_json::from_str(r#"{"first_name": "Alice", "last_name": "Liddell"}"#).unwrap();
        assert_eq!(payload, self::payload(None));
    }

    #[test]
    fn display_prefers_preferred_name() {
        let mut student = payload(None).into_student("1".into());
        assert_eq!(student.to_string(), "Alice Liddell");
        student.preferred_name = Some("Ali".into());
        assert_eq!(student.to_string(), "Ali Liddell");
    }
}
