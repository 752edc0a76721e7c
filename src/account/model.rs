use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource type of every account.
pub const ACCOUNT_TYPE: &str = "accounts";

/// JSON-API top-level document: `{"data": ...}`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub data: T,
}

/// An organisation account as exchanged with the API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Account {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Uuid,
    pub organisation_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
    #[serde(default)]
    pub attributes: AccountAttributes,
}

impl Account {
    /// A new account with a random ID, ready to be created.
    pub fn new(organisation_id: Uuid, attributes: AccountAttributes) -> Self {
        Self {
            kind: ACCOUNT_TYPE.to_string(),
            id: Uuid::new_v4(),
            organisation_id,
            version: None,
            created_on: None,
            modified_on: None,
            attributes,
        }
    }
}

/// Account attributes. Absent values are left out of the request body.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AccountAttributes {
    /// ISO 3166-1 country code, e.g. `GB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO 4217 currency code, e.g. `GBP`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_id_code: Option<String>,
    /// SWIFT BIC, 8 or 11 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Account holder name, up to four lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_account: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_matching_opt_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_identification: Option<String>,
}
