//! Aggregations behind the report charts

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorCode, PipelineError, Result};
use crate::model::EnrichedRecord;

/// How many channels the channel ranking keeps
pub const TOP_CHANNELS: usize = 10;

/// Numeric column summed by the channel ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMetric {
    #[default]
    Likes,
    Views,
}

impl RankingMetric {
    /// Column name in the enriched table
    pub fn column(self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Views => "views",
        }
    }

    /// Capitalized form used in chart titles
    pub fn label(self) -> &'static str {
        match self {
            Self::Likes => "Likes",
            Self::Views => "Views",
        }
    }

    fn value(self, record: &EnrichedRecord) -> u64 {
        match self {
            Self::Likes => record.likes,
            Self::Views => record.views,
        }
    }
}

impl FromStr for RankingMetric {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "likes" => Ok(Self::Likes),
            "views" => Ok(Self::Views),
            other => Err(PipelineError::invalid_argument(
                ErrorCode::ARGUMENT_UNSUPPORTED_METRIC,
                format!("metric must be 'likes' or 'views', got '{}'", other),
                "channel_metric",
            )),
        }
    }
}

impl fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One group and its summed metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedGroup {
    pub name: String,
    pub total: u64,
}

/// Total views per category, largest first
///
/// Records without a category name form no group.
pub fn rank_categories(records: &[EnrichedRecord]) -> Vec<RankedGroup> {
    sum_by(
        records,
        |record| record.category_name.as_deref(),
        |record| record.views,
    )
}

/// Total `metric` per channel, largest first, at most `limit` groups
pub fn rank_channels(
    records: &[EnrichedRecord],
    metric: RankingMetric,
    limit: usize,
) -> Vec<RankedGroup> {
    let mut ranked = sum_by(
        records,
        |record| Some(record.channel_title.as_str()),
        |record| metric.value(record),
    );
    ranked.truncate(limit);
    ranked
}

fn sum_by<'a, K, V>(records: &'a [EnrichedRecord], key: K, value: V) -> Vec<RankedGroup>
where
    K: Fn(&'a EnrichedRecord) -> Option<&'a str>,
    V: Fn(&EnrichedRecord) -> u64,
{
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if let Some(name) = key(record) {
            let total = totals.entry(name).or_default();
            *total = total.saturating_add(value(record));
        }
    }

    let mut ranked: Vec<RankedGroup> = totals
        .into_iter()
        .map(|(name, total)| RankedGroup {
            name: name.to_string(),
            total,
        })
        .collect();
    // Ties resolve by name so repeated runs agree
    ranked.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    ranked
}
