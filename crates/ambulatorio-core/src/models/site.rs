//! Sites, service categories and patient types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A physical location the service operates from. The access-scoping unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    PtaCentro,
    VillaGinestre,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::PtaCentro, Site::VillaGinestre];

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::PtaCentro => "pta_centro",
            Site::VillaGinestre => "villa_ginestre",
        }
    }

    /// The only category this site may handle, if it is restricted.
    pub fn restricted_to(&self) -> Option<Category> {
        match self {
            Site::PtaCentro => None,
            Site::VillaGinestre => Some(Category::Picc),
        }
    }

    /// Whether records of `category` may be created here.
    pub fn allows(&self, category: Category) -> bool {
        self.restricted_to().map_or(true, |only| only == category)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Site::PtaCentro => "PTA Centro",
            Site::VillaGinestre => "Villa delle Ginestre",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pta_centro" => Ok(Site::PtaCentro),
            "villa_ginestre" => Ok(Site::VillaGinestre),
            _ => Err(format!("Unknown site: {}", s)),
        }
    }
}

/// Clinical service category: catheter care or wound care.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "PICC")]
    Picc,
    #[serde(rename = "MED")]
    Med,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Picc => "PICC",
            Category::Med => "MED",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PICC" => Ok(Category::Picc),
            "MED" => Ok(Category::Med),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Clinical type of a patient: one specialty or both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatientType {
    #[serde(rename = "PICC")]
    Picc,
    #[serde(rename = "MED")]
    Med,
    #[serde(rename = "PICC_MED")]
    PiccMed,
}

impl PatientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientType::Picc => "PICC",
            PatientType::Med => "MED",
            PatientType::PiccMed => "PICC_MED",
        }
    }

    /// Categories of care this patient receives.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            PatientType::Picc => &[Category::Picc],
            PatientType::Med => &[Category::Med],
            PatientType::PiccMed => &[Category::Picc, Category::Med],
        }
    }

    /// Whether a patient of this type may be registered at `site`.
    pub fn allowed_at(&self, site: Site) -> bool {
        self.categories().iter().all(|c| site.allows(*c))
    }
}

impl FromStr for PatientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PICC" => Ok(PatientType::Picc),
            "MED" => Ok(PatientType::Med),
            "PICC_MED" => Ok(PatientType::PiccMed),
            _ => Err(format!("Unknown patient type: {}", s)),
        }
    }
}
