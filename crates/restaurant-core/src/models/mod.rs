//! Data models for Restaurant Reviews

mod restaurant;
mod review;

pub use restaurant::{LatLng, Restaurant};
pub use review::{NewReview, Review, ReviewId, MAX_RATING, MIN_RATING};

use serde::{Deserialize, Deserializer};

/// Accept integers that the API sometimes echoes back as strings
/// (form values are posted verbatim).
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Float(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        #[allow(clippy::cast_possible_truncation)]
        NumberOrString::Float(value) if value.fract().abs() < f64::EPSILON => Ok(value as i64),
        NumberOrString::Float(value) => Err(serde::de::Error::custom(format!(
            "expected an integer, got {value}"
        ))),
        NumberOrString::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {text:?}"))),
    }
}
