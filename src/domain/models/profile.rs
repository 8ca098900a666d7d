use serde::{Deserialize, Deserializer, Serialize};

/// Display data attached to an account, one optional record per section.
///
/// A section that is `None` was never filled in; a section that is present
/// with empty fields was saved empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<BasicInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional: Option<Professional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic: Option<Academic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<Social>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicInfo {
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Professional {
    pub current_company: Option<String>,
    pub designation: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Academic {
    #[serde(deserialize_with = "lenient_text")]
    pub graduation_year: Option<String>,
    pub degree: Option<String>,
    pub specialization: Option<String>,
    pub qualifications: Vec<String>,
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Social {
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

impl UserProfile {
    pub fn with_department(department: Option<String>) -> Self {
        Self {
            basic_info: Some(BasicInfo { department, ..Default::default() }),
            ..Default::default()
        }
    }

    pub fn department(&self) -> Option<&str> {
        self.basic_info.as_ref()?.department.as_deref()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.basic_info.as_ref()?.avatar.as_deref()
    }

    pub fn graduation_year(&self) -> Option<&str> {
        self.academic.as_ref()?.graduation_year.as_deref()
    }

    pub fn degree(&self) -> Option<&str> {
        self.academic.as_ref()?.degree.as_deref()
    }

    /// Sections present in `update` replace the stored ones; absent sections are kept.
    pub fn merge(&mut self, update: UserProfile) {
        if let Some(section) = update.basic_info { self.basic_info = Some(section); }
        if let Some(section) = update.professional { self.professional = Some(section); }
        if let Some(section) = update.academic { self.academic = Some(section); }
        if let Some(section) = update.social { self.social = Some(section); }
    }
}

/// Forms send years either as `"2019"` or `2019`; both are stored as text.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected text or number, got {}", other))),
    }
}
