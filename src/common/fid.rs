//! File id codec
//!
//! A file id addresses one object inside one volume:
//!
//! ```text
//!   7,01637037d6
//!   │ └──┬─┘└─┬──┘
//!   │   key  cookie (always the last 8 hex digits)
//!   volume id (decimal)
//! ```

use crate::common::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Number of hex digits holding the cookie at the end of the second segment
const COOKIE_HEX_LEN: usize = 8;

/// Composite object identifier `(volume id, key, cookie)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fid {
    pub volume_id: u32,
    pub key: u64,
    pub cookie: u32,
}

impl Fid {
    pub fn new(volume_id: u32, key: u64, cookie: u32) -> Self {
        Self {
            volume_id,
            key,
            cookie,
        }
    }

    /// Parse `"<volumeId>,<hex key><8 hex cookie>"`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(',');
        let (vid, rest) = match (parts.next(), parts.next(), parts.next()) {
            (Some(vid), Some(rest), None) => (vid, rest),
            _ => return Err(Error::format(s, "malformed identifier")),
        };

        if rest.len() <= COOKIE_HEX_LEN {
            return Err(Error::format(s, "malformed identifier"));
        }
        // The cookie split below is by byte offset.
        if !rest.is_ascii() {
            return Err(Error::format(s, "non-hex key or cookie"));
        }

        if !is_digits(vid, 10) {
            return Err(Error::format(s, "invalid volume id"));
        }
        let volume_id = vid
            .parse::<u32>()
            .map_err(|_| Error::format(s, "invalid volume id"))?;

        let (key_hex, cookie_hex) = rest.split_at(rest.len() - COOKIE_HEX_LEN);
        if !is_digits(key_hex, 16) || !is_digits(cookie_hex, 16) {
            return Err(Error::format(s, "non-hex key or cookie"));
        }
        let key = u64::from_str_radix(key_hex, 16)
            .map_err(|_| Error::format(s, "key out of range"))?;
        let cookie = u32::from_str_radix(cookie_hex, 16)
            .map_err(|_| Error::format(s, "cookie out of range"))?;

        Ok(Self {
            volume_id,
            key,
            cookie,
        })
    }

    /// Volume id as the decimal string the master expects
    pub fn volume_id_str(&self) -> String {
        self.volume_id.to_string()
    }
}

/// `from_str_radix` tolerates a leading `+`, the wire format does not.
fn is_digits(s: &str, radix: u32) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_digit(radix))
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:x}{:08x}", self.volume_id, self.key, self.cookie)
    }
}

impl FromStr for Fid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
