use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::well_known::Rfc2822;
use time::{Duration, OffsetDateTime};

/// A single tag from a quay.io repository.
///
/// Only `name` and `last_modified` are required; the remaining fields fall
/// back to their defaults when the registry leaves them out or sends `null`.
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reversion: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_ts: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manifest_digest: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_manifest_list: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    /// e.g. `Mon, 02 Jan 2006 15:04:05 +0000`
    pub last_modified: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Tag {
    pub fn last_modified_at(&self) -> Result<OffsetDateTime> {
        OffsetDateTime::parse(&self.last_modified, &Rfc2822).with_context(|| {
            format!(
                "Failed to parse last_modified {:?} of tag {}",
                self.last_modified, self.name
            )
        })
    }

    /// Age of the tag relative to `now`.
    pub fn age_at(&self, now: OffsetDateTime) -> Result<Duration> {
        Ok(now - self.last_modified_at()?)
    }
}

/// The current UTC time, truncated to whole seconds.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds(now.nanosecond().into())
}
