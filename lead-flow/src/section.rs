use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Page regions the visitor can scroll through.
///
/// The site's element ids (`lotes`, `vantagens`, ...) parse as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Home,
    #[serde(alias = "lotes")]
    Lots,
    #[serde(alias = "vantagens")]
    Advantages,
    #[serde(alias = "localizacao")]
    Location,
    #[serde(alias = "contato")]
    Contact,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::Lots,
        Section::Advantages,
        Section::Location,
        Section::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Lots => "lots",
            Section::Advantages => "advantages",
            Section::Location => "location",
            Section::Contact => "contact",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Section::Home),
            "lots" | "lotes" => Ok(Section::Lots),
            "advantages" | "vantagens" => Ok(Section::Advantages),
            "location" | "localizacao" => Ok(Section::Location),
            "contact" | "contato" => Ok(Section::Contact),
            other => Err(FlowError::UnknownSection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_page_ids() {
        assert_eq!("lotes".parse::<Section>().unwrap(), Section::Lots);
        assert_eq!("Contato".parse::<Section>().unwrap(), Section::Contact);
        assert_eq!("location".parse::<Section>().unwrap(), Section::Location);
        assert!(matches!(
            "footer".parse::<Section>(),
            Err(FlowError::UnknownSection(id)) if id == "footer"
        ));
    }

    #[test]
    fn test_serde_alias() {
        let section: Section = serde_yaml::from_str("vantagens").unwrap();
        assert_eq!(section, Section::Advantages);
        assert_eq!(serde_yaml::to_string(&Section::Advantages).unwrap().trim(), "advantages");
    }
}
