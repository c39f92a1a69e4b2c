//! Request options and JSON envelopes exchanged with the master

use serde::{Deserialize, Deserializer, Serialize};

/// A replica of a volume as reported by `/dir/lookup`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// `host:port` used between servers
    #[serde(default)]
    pub url: String,
    /// `host:port` advertised to clients
    #[serde(default)]
    pub public_url: String,
}

impl Location {
    pub fn new(url: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_url: public_url.into(),
        }
    }
}

/// `/dir/assign` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignResponse {
    pub count: u64,
    pub fid: String,
    pub url: String,
    pub public_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// `/dir/lookup` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupResponse {
    pub locations: Vec<Location>,
    #[serde(deserialize_with = "string_or_number")]
    pub volume_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Upload response from `/submit`, a volume server or a filer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub fid: String,
    pub url: String,
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Optional hints for `/dir/assign`, `/vol/grow` and `/submit`.
///
/// Empty fields (and a zero count) are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignOptions {
    pub count: u32,
    pub collection: String,
    pub replication: String,
    pub data_center: String,
    pub ttl: String,
}

/// `/vol/grow` takes the same hints as an assignment
pub type GrowOptions = AssignOptions;

impl AssignOptions {
    pub fn with_count(count: u32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn replication(mut self, replication: impl Into<String>) -> Self {
        self.replication = replication.into();
        self
    }

    pub fn data_center(mut self, data_center: impl Into<String>) -> Self {
        self.data_center = data_center.into();
        self
    }

    pub fn ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = ttl.into();
        self
    }

    /// Query pairs in the master's parameter names
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.count > 0 {
            query.push(("count", self.count.to_string()));
        }
        for (name, value) in [
            ("collection", &self.collection),
            ("replication", &self.replication),
            ("dataCenter", &self.data_center),
            ("ttl", &self.ttl),
        ] {
            if !value.is_empty() {
                query.push((name, value.clone()));
            }
        }
        query
    }
}

/// Older masters send `volumeId` as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
