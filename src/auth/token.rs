use chrono::{DateTime, TimeDelta, Utc};
use serde::{de, Deserialize, Deserializer};

/// Parsed body of a successful token response.
///
/// The provider uses dotted names for the timestamps (`.issued`,
/// `.expires`) and HTTP-date strings for their values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub token_type: String,
    /// Seconds; the provider may send it as a number or a numeric string.
    #[serde(deserialize_with = "seconds_from_number_or_string")]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = ".issued", deserialize_with = "http_date::deserialize")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = ".expires", deserialize_with = "http_date::deserialize")]
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_bearer(&self) -> bool {
        self.token_type.eq_ignore_ascii_case("bearer")
    }

    pub fn lifetime(&self) -> TimeDelta {
        self.expires_at - self.issued_at
    }

    /// True if `expires_at - issued_at` matches `expires_in`.
    pub fn is_consistent(&self) -> bool {
        i64::try_from(self.expires_in).is_ok_and(|secs| secs == self.lifetime().num_seconds())
    }
}

fn seconds_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(seconds) => Ok(seconds),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid expires_in: {:?}", text))),
    }
}

/// RFC 1123 dates as used in HTTP headers, e.g. `Mon, 19 Oct 2026 10:00:00 GMT`.
pub mod http_date {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    const FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

    pub fn format(date: &DateTime<Utc>) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc2822(raw.trim()).map(|date| date.with_timezone(&Utc))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| de::Error::custom(format!("invalid date {:?}: {}", raw, e)))
    }
}
