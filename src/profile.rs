//! User profile attached to authored items.
use serde::{Deserialize, Serialize};

/// Completion status of an academic-history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "termine")]
    Completed,
    #[serde(rename = "encours")]
    InProgress,
}

/// One year of the user's academic history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicEntry {
    pub annee: String,
    pub niveau: String,
    pub filiere: String,
    pub etablissement: String,
    pub statut: Status,
}

/// The signed-in student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier as issued at sign-up, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Track, e.g. "Licence 3 * Informatique"
    #[serde(default)]
    pub formation: String,
    #[serde(default)]
    pub description: String,
    /// Skills
    #[serde(default)]
    pub competences: Vec<String>,
    #[serde(default)]
    pub parcours: Vec<AcademicEntry>,
}

impl UserProfile {
    /// Profile used when nothing has been persisted yet.
    pub fn default_profile() -> Self {
        let entry = |annee: &str, niveau: &str, statut| AcademicEntry {
            annee: annee.to_string(),
            niveau: niveau.to_string(),
            filiere: "Informatique".to_string(),
            etablissement: "ESI/UNB".to_string(),
            statut,
        };

        UserProfile {
            id: None,
            name: "COMPAORE Salomon".to_string(),
            email: "compaore@example.com".to_string(),
            role: None,
            formation: "Licence 3 * Informatique * ESI * UNB".to_string(),
            description: "Passionné du DevOps - Co-Founder de MicraV - Co-Founder MULTIVERUS"
                .to_string(),
            competences: ["REACT", "Tailwindcss", "TypeScript", "Postman"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            parcours: vec![
                entry("2023-2024", "Licence 1", Status::Completed),
                entry("2024-2025", "Licence 2", Status::Completed),
                entry("2025-2026", "Licence 3", Status::InProgress),
            ],
        }
    }

    /// First letter of the name, shown in place of an avatar.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_has_current_year_in_progress() {
        let profile = UserProfile::default_profile();
        assert_eq!(profile.parcours.len(), 3);
        assert_eq!(profile.parcours[2].statut, Status::InProgress);
        assert_eq!(profile.initial(), 'C');
    }

    #[test]
    fn status_uses_short_tags() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"encours\"");
        let parsed: UserProfile =
            serde_json::from_str(r#"{"name":"Ana","parcours":[{"annee":"2025","niveau":"M2","filiere":"SI","etablissement":"ESI","statut":"termine"}]}"#)
                .unwrap();
        assert_eq!(parsed.parcours[0].statut, Status::Completed);
        assert!(parsed.competences.is_empty());
        assert_eq!(parsed.id, None);
    }

    #[test]
    fn account_id_survives_reload() {
        let raw = r#"{"id":1718000000000,"name":"Ana","email":"ana@example.com"}"#;
        let parsed: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, Some(serde_json::json!(1718000000000u64)));

        let saved = serde_json::to_value(&parsed).unwrap();
        assert_eq!(saved["id"], 1718000000000u64);
        assert!(serde_json::to_value(UserProfile::default_profile())
            .unwrap()
            .get("id")
            .is_none());
    }
}
