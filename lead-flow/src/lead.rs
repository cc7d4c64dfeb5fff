use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{looks_like_email, looks_like_phone};

/// Contact details collected by the script, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadField {
    Name,
    Phone,
    Email,
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadField::Name => f.write_str("name"),
            LeadField::Phone => f.write_str("phone"),
            LeadField::Email => f.write_str("email"),
        }
    }
}

/// Lead contact information for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl LeadInfo {
    pub fn get(&self, field: LeadField) -> Option<&str> {
        match field {
            LeadField::Name => self.name.as_deref(),
            LeadField::Phone => self.phone.as_deref(),
            LeadField::Email => self.email.as_deref(),
        }
    }

    /// Store `value` for `field`.
    ///
    /// Returns `false` without touching anything when the field is already set or an
    /// earlier field is still missing.
    pub fn record(&mut self, field: LeadField, value: impl Into<String>) -> bool {
        let ready = match field {
            LeadField::Name => self.name.is_none(),
            LeadField::Phone => self.name.is_some() && self.phone.is_none(),
            LeadField::Email => self.phone.is_some() && self.email.is_none(),
        };
        if !ready {
            return false;
        }

        let slot = match field {
            LeadField::Name => &mut self.name,
            LeadField::Phone => &mut self.phone,
            LeadField::Email => &mut self.email,
        };
        *slot = Some(value.into());
        true
    }

    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.phone.is_some() && self.email.is_some()
    }

    pub fn summary(&self) -> LeadSummary {
        LeadSummary {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            phone_looks_valid: self.phone.as_deref().is_some_and(looks_like_phone),
            email_looks_valid: self.email.as_deref().is_some_and(looks_like_email),
        }
    }
}

/// Read-only view of a lead with shape hints attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSummary {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub phone_looks_valid: bool,
    pub email_looks_valid: bool,
}

impl fmt::Display for LeadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hint = |ok: bool| if ok { "" } else { " (unverified)" };
        writeln!(f, "name:  {}", self.name.as_deref().unwrap_or("-"))?;
        match &self.phone {
            Some(phone) => writeln!(f, "phone: {phone}{}", hint(self.phone_looks_valid))?,
            None => writeln!(f, "phone: -")?,
        }
        match &self.email {
            Some(email) => write!(f, "email: {email}{}", hint(self.email_looks_valid)),
            None => write!(f, "email: -"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_fill_in_order() {
        let mut lead = LeadInfo::default();
        assert!(!lead.record(LeadField::Phone, "47999998888"));
        assert!(!lead.record(LeadField::Email, "maria@ex.com"));
        assert_eq!(lead, LeadInfo::default());

        assert!(lead.record(LeadField::Name, "Maria"));
        assert!(lead.record(LeadField::Phone, "47999998888"));
        assert!(lead.record(LeadField::Email, "maria@ex.com"));
        assert!(lead.is_complete());
    }

    #[test]
    fn test_set_field_is_never_overwritten() {
        let mut lead = LeadInfo::default();
        assert!(lead.record(LeadField::Name, "Maria"));
        assert!(!lead.record(LeadField::Name, "João"));
        assert_eq!(lead.get(LeadField::Name), Some("Maria"));
    }

    #[test]
    fn test_summary_accepts_odd_values() {
        let mut lead = LeadInfo::default();
        lead.record(LeadField::Name, "Maria");
        lead.record(LeadField::Phone, "depois eu passo");
        lead.record(LeadField::Email, "maria@ex.com");

        let summary = lead.summary();
        assert_eq!(summary.phone.as_deref(), Some("depois eu passo"));
        assert!(!summary.phone_looks_valid);
        assert!(summary.email_looks_valid);
        assert!(summary.to_string().contains("(unverified)"));
    }
}
