//! Sender and recipient numbers.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::validation;

/// Numbers used for the outbound SMS and voice call.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RecipientsConfig {
    /// Provider number both requests originate from.
    #[validate(custom(function = validation::validate_e164))]
    #[serde(default, deserialize_with = "deserialize_number")]
    pub from: String,

    /// Recipient of the public SMS alert.
    #[validate(custom(function = validation::validate_e164))]
    #[serde(default, deserialize_with = "deserialize_number")]
    pub sms_to: String,

    /// Recipient of the law-enforcement voice call.
    #[validate(custom(function = validation::validate_e164))]
    #[serde(default, deserialize_with = "deserialize_number")]
    pub call_to: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberValue {
    Text(String),
    Digits(u64),
}

/// Environment providers parse `+15551234567` as an integer, so accept both forms.
fn deserialize_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberValue::deserialize(deserializer)? {
        NumberValue::Text(text) => Ok(text.trim().to_string()),
        NumberValue::Digits(digits) => Ok(format!("+{}", digits)),
    }
}
