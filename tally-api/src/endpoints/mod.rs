pub mod delivery;
pub mod expense_records;
pub mod sales_records;
pub mod stats;
pub mod stores;
pub mod users;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type StoreId = i64;
pub type RecordId = i64;

/// Label the server uses for the grand-total entry of a summary
pub const TOTAL_LABEL: &str = "총계";

/// Whole Korean won.
///
/// Statistics that exclude delivery commission can come back fractional, so
/// deserialization accepts any JSON number and rounds to the nearest won.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct Won(i64);

impl Won {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for Won {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<f64> for Won {
    fn from(value: f64) -> Self {
        Self(value.round() as i64)
    }
}

impl From<Won> for i64 {
    fn from(value: Won) -> Self {
        value.0
    }
}

impl std::ops::Add for Won {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Won {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Won {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self(0), |acc, x| acc + x)
    }
}

impl std::fmt::Display for Won {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// Paging, ordering and filtering shared by the record listings.
///
/// The date range only ever goes out with both ends set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub page: u32,
    pub size: u32,
    pub sort_order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort_order: SortOrder::Desc,
            payment: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl RecordQuery {
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start_date = Some(start);
        self.end_date = Some(end);
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Confirmation text the server sends back for mutations.
///
/// The server usually sends it as a bare `text/plain` sentence; the client
/// also accepts a JSON string, and an empty body decodes as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageResponse(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Monthly,
    Daily,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Monthly => f.write_str("monthly"),
            Period::Daily => f.write_str("daily"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub label: String,
    pub amount: Won,
}

/// A label to amount series such as `1월 → 1200, …, 총계 → 9000`.
///
/// Entries keep the order the server sent them in.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Summary(Vec<SummaryEntry>);

impl Summary {
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<Won> {
        self.0
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.amount)
    }

    pub fn total(&self) -> Option<Won> {
        self.get(TOTAL_LABEL)
    }

    /// Every entry except the grand total
    pub fn periods(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.0.iter().filter(|entry| entry.label != TOTAL_LABEL)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.periods().map(|entry| entry.label.as_str())
    }

    /// Amounts aligned to `labels`, zero where this summary has no entry
    pub fn aligned_to<'l>(&self, labels: impl IntoIterator<Item = &'l str>) -> Vec<Won> {
        labels
            .into_iter()
            .map(|label| self.get(label).unwrap_or_default())
            .collect()
    }
}

impl FromIterator<(String, Won)> for Summary {
    fn from_iter<I: IntoIterator<Item = (String, Won)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(label, amount)| SummaryEntry { label, amount })
                .collect(),
        )
    }
}

impl Serialize for Summary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.label, &entry.amount)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Summary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SummaryVisitor;

        impl<'de> Visitor<'de> for SummaryVisitor {
            type Value = Summary;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of period labels to amounts")
            }

            fn visit_unit<E>(self) -> Result<Summary, E>
            where
                E: serde::de::Error,
            {
                Ok(Summary::default())
            }

            fn visit_map<A>(self, mut access: A) -> Result<Summary, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, amount)) = access.next_entry::<String, Won>()? {
                    entries.push(SummaryEntry { label, amount });
                }
                Ok(Summary(entries))
            }
        }

        deserializer.deserialize_any(SummaryVisitor)
    }
}
