//! Kenyan mobile numbers (MSISDN) in the form the mobile-money provider accepts.

use std::fmt;

use serde::Serialize;

/// Country calling code prefixed to every normalized number.
const COUNTRY_CODE: &str = "254";

/// Length of the subscriber part after the country code (e.g. `712345678`).
const SUBSCRIBER_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phone number: {0:?}")]
pub struct PhoneNumberError(pub String);

/// A normalized 12-digit MSISDN such as `254712345678`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Msisdn(String);

impl Msisdn {
    /// Normalize user input into the `2547XXXXXXXX` / `2541XXXXXXXX` form.
    ///
    /// Accepts local (`0712345678`), bare (`712345678`), international
    /// (`254712345678`) and E.164 (`+254712345678`) spellings; spaces and
    /// dashes are ignored.
    pub fn parse(raw: &str) -> Result<Self, PhoneNumberError> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);

        let subscriber = if digits.len() == COUNTRY_CODE.len() + SUBSCRIBER_LEN {
            digits.strip_prefix(COUNTRY_CODE)
        } else if digits.len() == SUBSCRIBER_LEN + 1 {
            digits.strip_prefix('0')
        } else if digits.len() == SUBSCRIBER_LEN && !compact.starts_with('+') {
            Some(digits)
        } else {
            None
        };

        match subscriber {
            Some(s) if is_mobile_subscriber(s) => Ok(Self(format!("{COUNTRY_CODE}{s}"))),
            _ => Err(PhoneNumberError(raw.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mobile ranges start with 7 (`07xx`) or 1 (`011x`).
fn is_mobile_subscriber(s: &str) -> bool {
    s.len() == SUBSCRIBER_LEN
        && s.bytes().all(|b| b.is_ascii_digit())
        && matches!(s.as_bytes()[0], b'7' | b'1')
}
