//! Member (anggota) model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gender as recorded on the member form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Laki-laki")]
    Male,
    #[serde(alias = "Perempuan")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" | "Laki-laki" => Some(Gender::Male),
            "female" | "Perempuan" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Display label used by the member list.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Laki-laki",
            Gender::Female => "Perempuan",
        }
    }
}

/// Role category of a member (dapukan).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleCategory {
    #[serde(alias = "pengurus")]
    Administrator,
    #[serde(alias = "rokyah")]
    Chaplain,
}

impl RoleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::Administrator => "administrator",
            RoleCategory::Chaplain => "chaplain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "administrator" | "pengurus" => Some(RoleCategory::Administrator),
            "chaplain" | "rokyah" => Some(RoleCategory::Chaplain),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleCategory::Administrator => "Pengurus",
            RoleCategory::Chaplain => "Rokyah",
        }
    }
}

/// A registered member of the organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub birthplace: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub role_category: RoleCategory,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated member fields, ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberFields {
    pub name: String,
    pub birthplace: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub role_category: RoleCategory,
}

/// Raw member form input. Used for both create and update.
///
/// Every field may be missing or blank here; `forms::validate_member` turns
/// it into [`MemberFields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birthplace: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub role_category: Option<RoleCategory>,
}

impl From<&Member> for MemberForm {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            birthplace: member.birthplace.clone(),
            birth_date: member.birth_date.to_string(),
            gender: Some(member.gender),
            role_category: Some(member.role_category),
        }
    }
}

/// Member entry for the attendance dialog's member selector.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberOption {
    pub id: String,
    pub name: String,
    pub role_category: RoleCategory,
}

impl From<&Member> for MemberOption {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            role_category: member.role_category,
        }
    }
}
