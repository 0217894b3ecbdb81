use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Partner visa subclasses the tracker supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VisaSubclass {
    /// Onshore temporary partner visa.
    #[default]
    #[serde(rename = "820")]
    Onshore820,
    /// Onshore permanent partner visa.
    #[serde(rename = "801")]
    Onshore801,
    /// Offshore temporary partner visa.
    #[serde(rename = "309")]
    Offshore309,
    /// Offshore permanent partner visa.
    #[serde(rename = "100")]
    Offshore100,
}

impl VisaSubclass {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            VisaSubclass::Onshore820 => "820",
            VisaSubclass::Onshore801 => "801",
            VisaSubclass::Offshore309 => "309",
            VisaSubclass::Offshore100 => "100",
        }
    }

    #[must_use]
    pub fn is_onshore(self) -> bool {
        matches!(self, VisaSubclass::Onshore820 | VisaSubclass::Onshore801)
    }
}

impl fmt::Display for VisaSubclass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subclass {}", self.code())
    }
}

impl FromStr for VisaSubclass {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "820" => Ok(VisaSubclass::Onshore820),
            "801" => Ok(VisaSubclass::Onshore801),
            "309" => Ok(VisaSubclass::Offshore309),
            "100" => Ok(VisaSubclass::Offshore100),
            other => Err(ProfileError::UnknownSubclass(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("full name cannot be empty")]
    EmptyName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("unknown visa subclass: {0}")]
    UnknownSubclass(String),
}

/// The signed-in applicant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: String,
    email: String,
    full_name: String,
    partner_name: Option<String>,
    visa_subclass: VisaSubclass,
    lodged_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct UserProfileDraft {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub partner_name: Option<String>,
    pub visa_subclass: VisaSubclass,
    pub lodged_on: Option<NaiveDate>,
}

impl UserProfileDraft {
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyName` for a blank name and
    /// `ProfileError::InvalidEmail` when the email has no local part or domain.
    pub fn validate(self) -> Result<UserProfile, ProfileError> {
        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let email = self.email.trim().to_ascii_lowercase();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(ProfileError::InvalidEmail(self.email));
        }

        Ok(UserProfile {
            id: self.id.trim().to_string(),
            email,
            full_name,
            partner_name: self
                .partner_name
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty()),
            visa_subclass: self.visa_subclass,
            lodged_on: self.lodged_on,
        })
    }
}

impl UserProfile {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn partner_name(&self) -> Option<&str> {
        self.partner_name.as_deref()
    }

    #[must_use]
    pub fn visa_subclass(&self) -> VisaSubclass {
        self.visa_subclass
    }

    #[must_use]
    pub fn lodged_on(&self) -> Option<NaiveDate> {
        self.lodged_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UserProfileDraft {
        UserProfileDraft {
            id: "user-1".into(),
            email: " Alex@Example.com ".into(),
            full_name: "Alex Nguyen".into(),
            partner_name: Some(String::new()),
            visa_subclass: VisaSubclass::Offshore309,
            lodged_on: None,
        }
    }

    #[test]
    fn validate_normalizes_fields() {
        let profile = draft().validate().unwrap();
        assert_eq!(profile.email(), "alex@example.com");
        assert_eq!(profile.partner_name(), None);
        assert!(!profile.visa_subclass().is_onshore());
    }

    #[test]
    fn validate_rejects_bad_email() {
        let mut bad = draft();
        bad.email = "alex.example.com".into();
        assert!(matches!(bad.validate(), Err(ProfileError::InvalidEmail(_))));
    }

    #[test]
    fn subclass_parses_codes() {
        assert_eq!("801".parse::<VisaSubclass>().unwrap(), VisaSubclass::Onshore801);
        assert!("500".parse::<VisaSubclass>().is_err());
    }
}
