use std::io::Write;

use anyhow::{Context, Result};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info};

use crate::args::Config;
use crate::quay::QuayClient;
use crate::tag::{now_utc, Tag};

/// A tag that is older than the configured age, with the age it was judged by.
#[derive(Debug)]
pub struct ExpiredTag<'a> {
    pub tag: &'a Tag,
    pub age: Duration,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSummary {
    pub expired: usize,
    pub deleted: usize,
}

/// Selects the tags whose age in whole seconds is strictly greater than
/// `max_age`, keeping the order in which they were listed.
pub fn expired_tags(tags: &[Tag], max_age: i64, now: OffsetDateTime) -> Result<Vec<ExpiredTag<'_>>> {
    let mut expired = Vec::new();
    for tag in tags {
        let age = tag.age_at(now)?;
        if age.whole_seconds() > max_age {
            expired.push(ExpiredTag { tag, age });
        } else {
            debug!("Keeping {} (age {}s)", tag.name, age.whole_seconds());
        }
    }
    Ok(expired)
}

/// Renders a duration as `H:MM:SS`, prefixed with a day count when it spans
/// at least one day. Negative durations borrow whole days, so ten seconds in
/// the future reads `-1 day, 23:59:50`.
pub fn fmt_duration(duration: Duration) -> String {
    let total = duration.whole_seconds();
    let days = total.div_euclid(86400);
    let rest = total.rem_euclid(86400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);

    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

pub fn report_line(repository: &str, expired: &ExpiredTag<'_>) -> String {
    format!(
        "{repository}:{}  {}  [{}]",
        expired.tag.name,
        expired.age.whole_seconds(),
        fmt_duration(expired.age)
    )
}

/// Lists the active tags of the configured repository and reports, and
/// optionally deletes, every expired one.
pub async fn run<W: Write>(config: &Config, client: &QuayClient, out: &mut W) -> Result<PurgeSummary> {
    let tags = client.list_active_tags(&config.repository).await?;
    process(config, client, &tags, now_utc(), out).await
}

/// Reports the expired tags among `tags` and deletes them if purging.
///
/// Deletions run one at a time, each right after its report line. The first
/// failure stops the run; tags deleted before it stay deleted.
pub async fn process<W: Write>(
    config: &Config,
    client: &QuayClient,
    tags: &[Tag],
    now: OffsetDateTime,
    out: &mut W,
) -> Result<PurgeSummary> {
    let expired = expired_tags(tags, config.age, now)?;
    let mut summary = PurgeSummary {
        expired: expired.len(),
        deleted: 0,
    };
    debug!("{} of {} tags are older than {}s", expired.len(), tags.len(), config.age);

    for tag in &expired {
        let line = report_line(&config.repository, tag);
        if !config.purge {
            writeln!(out, "{line}")?;
            continue;
        }

        write!(out, "{line}  ")?;
        out.flush()?;
        if let Err(err) = client.delete_tag(&config.repository, &tag.tag.name).await {
            writeln!(out)?;
            error!("Purge stopped after deleting {} of {} expired tags", summary.deleted, summary.expired);
            return Err(err).context(format!(
                "Deleted {} of {} expired tags before failing on {}",
                summary.deleted, summary.expired, tag.tag.name
            ));
        }
        writeln!(out, "deleted")?;
        summary.deleted += 1;
    }

    if config.purge {
        info!("Deleted {} tags from {}", summary.deleted, config.repository);
    }
    Ok(summary)
}
