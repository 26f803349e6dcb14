//! Anonymization labels for peer ranking.
//!
//! Stage-2 rankers see responses under labels ("Response A", "Response B",
//! …) rather than model names, so a ranker cannot favor a model it
//! recognizes. Labels are assigned positionally, once per pipeline run,
//! and [`LabelMap`] keeps the order they were assigned in.

use crate::core::model::ModelId;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// Spreadsheet-style alphabetic label for index `i`.
///
/// Bijective base-26 over A–Z: 0→"A", 25→"Z", 26→"AA", 51→"AZ", 52→"BA".
/// Not standard base-26 — there is no zero digit, exactly like
/// spreadsheet column names.
pub fn alpha_label(index: usize) -> String {
    let mut i = index;
    let mut buf = Vec::new();
    loop {
        buf.push(b'A' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    buf.reverse();
    // Safe: buf only ever holds ASCII A-Z
    String::from_utf8(buf).expect("alpha labels are ASCII")
}

/// The full label string shown to rankers for index `i`, e.g. "Response A".
pub fn response_label(index: usize) -> String {
    format!("Response {}", alpha_label(index))
}

/// Ordered mapping from response label to the model that produced the
/// response. Built once alongside label assignment, read-only thereafter.
///
/// Serializes as a JSON object whose key order matches assignment order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    entries: Vec<(String, ModelId)>,
}

impl LabelMap {
    /// Assign labels positionally to the given models, in order.
    pub fn assign(models: &[ModelId]) -> Self {
        let entries = models
            .iter()
            .enumerate()
            .map(|(i, model)| (response_label(i), model.clone()))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the model behind a label string like "Response B".
    pub fn model_for(&self, label: &str) -> Option<&ModelId> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, m)| m)
    }

    /// Labels in assignment order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    /// The expected-label set handed to the ranking parser.
    pub fn expected_labels(&self) -> BTreeSet<String> {
        self.entries.iter().map(|(l, _)| l.clone()).collect()
    }

    /// The distinct models shown to rankers, sorted for determinism.
    ///
    /// This is the candidate universe for tournament aggregation — a model
    /// belongs here even if no ranker ever cast a valid vote about it.
    pub fn model_universe(&self) -> Vec<ModelId> {
        let set: BTreeSet<ModelId> = self.entries.iter().map(|(_, m)| m.clone()).collect();
        set.into_iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelId)> {
        self.entries.iter().map(|(l, m)| (l.as_str(), m))
    }
}

impl Serialize for LabelMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, model) in &self.entries {
            map.serialize_entry(label, model)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LabelMapVisitor;

        impl<'de> Visitor<'de> for LabelMapVisitor {
            type Value = LabelMap;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map from response label to model id")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, model)) = access.next_entry::<String, ModelId>()? {
                    entries.push((label, model));
                }
                Ok(LabelMap { entries })
            }
        }

        deserializer.deserialize_map(LabelMapVisitor)
    }
}
