//! # Facet Aggregator
//!
//! Counts distinct values per facetable column over a row set. Output keeps
//! first-occurrence order: columns in the order they were first seen, values
//! within a column likewise. Numeric columns also report `min`/`max`.
//!
//! Every facetable column of [`Lead`] holds a single value, so there is no
//! multi-value expansion here.

use crate::lead::Lead;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Facetable columns, in row field order.
pub const FACET_FIELDS: [&str; 8] = [
    "companyId",
    "visitorId",
    "status",
    "claimedBy",
    "callStatus",
    "responseTime",
    "callDuration",
    "outcome",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Number(i64),
    Text(String),
}

impl FacetValue {
    /// Empty strings and zero are not counted.
    fn is_truthy(&self) -> bool {
        match self {
            FacetValue::Number(n) => *n != 0,
            FacetValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Number(n) => write!(f, "{n}"),
            FacetValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetRow {
    pub value: FacetValue,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Facet {
    pub rows: Vec<FacetRow>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Facets keyed by column id, serialized as a JSON object whose key order
/// is the first-occurrence order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Facets(Vec<(String, Facet)>);

impl Facets {
    pub fn get(&self, field: &str) -> Option<&Facet> {
        self.0.iter().find(|(name, _)| name == field).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Facet)> {
        self.0.iter().map(|(name, facet)| (name.as_str(), facet))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Facets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, facet) in &self.0 {
            map.serialize_entry(name, facet)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Facets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FacetsVisitor;

        impl<'de> Visitor<'de> for FacetsVisitor {
            type Value = Facets;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of facets")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Facets, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, facet)) = access.next_entry::<String, Facet>()? {
                    entries.push((name, facet));
                }
                Ok(Facets(entries))
            }
        }

        deserializer.deserialize_map(FacetsVisitor)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[derive(Default)]
struct Counter {
    rows: Vec<FacetRow>,
    index: HashMap<FacetValue, usize>,
}

impl Counter {
    fn add(&mut self, value: FacetValue) {
        match self.index.get(&value) {
            Some(&pos) => self.rows[pos].total += 1,
            None => {
                self.index.insert(value.clone(), self.rows.len());
                self.rows.push(FacetRow { value, total: 1 });
            }
        }
    }

    fn finish(self) -> Facet {
        let total = self.rows.iter().map(|r| r.total).sum();
        let numbers = self.rows.iter().filter_map(|r| match r.value {
            FacetValue::Number(n) => Some(n),
            FacetValue::Text(_) => None,
        });
        let (min, max) = numbers.fold((None, None), |(min, max), n| {
            (
                Some(min.map_or(n, |m: i64| m.min(n))),
                Some(max.map_or(n, |m: i64| m.max(n))),
            )
        });
        Facet {
            rows: self.rows,
            total,
            min,
            max,
        }
    }
}

fn text(value: &str) -> Option<FacetValue> {
    Some(FacetValue::Text(value.to_string()))
}

/// Facetable values of one row, aligned with [`FACET_FIELDS`].
fn facet_values(row: &Lead) -> [Option<FacetValue>; 8] {
    [
        text(&row.company_id),
        text(&row.visitor_id),
        text(row.status.as_str()),
        row.claimed_by.as_deref().and_then(text),
        text(row.call_status.as_str()),
        row.response_time.map(|v| FacetValue::Number(i64::from(v))),
        row.call_duration.map(|v| FacetValue::Number(i64::from(v))),
        row.outcome.and_then(|o| text(o.as_str())),
    ]
}

/// Build the facets of `rows`. An empty row set yields no facets at all.
pub fn facets(rows: &[Lead]) -> Facets {
    let mut order: Vec<usize> = Vec::new();
    let mut counters: Vec<Counter> = FACET_FIELDS.iter().map(|_| Counter::default()).collect();

    for row in rows {
        for (slot, value) in facet_values(row).into_iter().enumerate() {
            let Some(value) = value.filter(FacetValue::is_truthy) else {
                continue;
            };
            if counters[slot].rows.is_empty() {
                order.push(slot);
            }
            counters[slot].add(value);
        }
    }

    let mut counters: Vec<Option<Counter>> = counters.into_iter().map(Some).collect();
    let entries = order
        .into_iter()
        .filter_map(|slot| {
            counters[slot]
                .take()
                .map(|counter| (FACET_FIELDS[slot].to_string(), counter.finish()))
        })
        .collect();
    Facets(entries)
}
