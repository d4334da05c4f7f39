//! Region payload formatting.

use serde::Serialize;
use std::fmt;

/// Field separator inside a region payload.
pub const FIELD_SEPARATOR: char = '|';

/// A region payload split into its named fields.
///
/// Payloads look like `中国|0|浙江省|杭州市|电信`. Missing trailing fields
/// are empty strings; fields past the fifth are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub country: String,
    pub region: String,
    pub province: String,
    pub city: String,
    pub isp: String,
}

impl Region {
    /// Split a payload string into named fields. Never fails.
    pub fn parse(payload: &str) -> Self {
        let mut fields = payload.split(FIELD_SEPARATOR);
        let mut next = || fields.next().unwrap_or_default().to_string();

        Self {
            country: next(),
            region: next(),
            province: next(),
            city: next(),
            isp: next(),
        }
    }

    /// Split raw payload bytes, replacing invalid UTF-8.
    pub fn from_payload(payload: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(payload))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.country, self.region, self.province, self.city, self.isp
        )
    }
}

impl std::str::FromStr for Region {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
