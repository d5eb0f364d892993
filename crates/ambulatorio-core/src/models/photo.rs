//! Photo attachments.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::site::{Category, Site};

/// A site- and patient-scoped image stored inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: String,
    pub patient_id: String,
    pub site: Site,
    pub category: Category,
    pub description: Option<String>,
    /// Date the photo was taken
    pub date: NaiveDate,
    pub content_type: String,
    /// Hex SHA-256 of `image_data`
    pub sha256: String,
    /// Raw bytes; base64 on the wire
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub image_data: Vec<u8>,
    pub created_at: String,
}

/// Metadata that accompanies an upload.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub patient_id: String,
    pub site: Site,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub content_type: String,
    pub image_data: Vec<u8>,
}

impl From<NewPhoto> for Photo {
    fn from(new: NewPhoto) -> Self {
        let sha256 = content_hash(&new.image_data);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            site: new.site,
            category: new.category,
            description: new.description,
            date: new.date,
            content_type: new.content_type,
            sha256,
            image_data: new.image_data,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Hex SHA-256 of a byte slice.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn to_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded).map_err(serde::de::Error::custom)
}
