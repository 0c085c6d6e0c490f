// Item store models.
//
// Field names follow the stored record (lower-case `imagepath`,
// `claimedby`, `claimeddate`), so serde renames are explicit here.

use serde::{Deserialize, Serialize};

use super::stream::{bool_attr, string_attr, Image};

/// A reported lost item as stored in the item store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LostItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Free text; may be missing on older records.
    pub category: Option<String>,
    pub location: Option<String>,
    /// Date found, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Key into the upload bucket (e.g. `uploads/1714521600_wallet.jpg`).
    #[serde(rename = "imagepath")]
    pub image_path: Option<String>,
    #[serde(rename = "isClaimed", default)]
    pub is_claimed: bool,
    #[serde(rename = "claimedby")]
    pub claimed_by: Option<String>,
    #[serde(rename = "claimeddate")]
    pub claimed_date: Option<String>,
}

impl LostItem {
    /// Typed view of a change-record image. Empty strings count as missing.
    pub fn from_image(image: &Image) -> Self {
        Self {
            id: string_attr(image, "id"),
            name: string_attr(image, "name"),
            description: string_attr(image, "description"),
            category: string_attr(image, "category"),
            location: string_attr(image, "location"),
            date: string_attr(image, "date"),
            image_path: string_attr(image, "imagepath"),
            is_claimed: bool_attr(image, "isClaimed").unwrap_or(false),
            claimed_by: string_attr(image, "claimedby"),
            claimed_date: string_attr(image, "claimeddate"),
        }
    }
}

/// A user profile record, created once per confirmed account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// `{sub}::{username}`, the owner key the data layer authorizes on.
    pub profile_owner: String,
    pub email: String,
}

impl UserProfile {
    pub fn new(subject: &str, username: &str, email: &str) -> Self {
        Self {
            profile_owner: format!("{subject}::{username}"),
            email: email.to_string(),
        }
    }
}
