use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::marker::PhantomData;

///
/// A single value reported by the service, either numeric or free text
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    ///
    /// Numeric value, parsing numeric text such as `"13.2"`
    ///
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Number(n) => Some(*n),
            Reading::Text(s) => s.trim().parse().ok(),
        }
    }

    ///
    /// Non-empty text value
    ///
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reading::Text(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            Reading::Number(_) => None,
        }
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(n) => write!(f, "{n}"),
            Reading::Text(s) => f.write_str(s),
        }
    }
}

///
/// Recommended diet, one entry per nutrient in the order the service listed them
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InferenceResult {
    entries: Vec<(String, Reading)>,
}

impl InferenceResult {
    pub fn new(entries: Vec<(String, Reading)>) -> Self {
        InferenceResult { entries }
    }

    pub fn entries(&self) -> &[(String, Reading)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Reading> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

///
/// Fields recognised in an uploaded report.
/// Anything the service returns beyond the known fields is kept in `extra`.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ExtractedStats {
    #[serde(rename = "Ages", default)]
    pub ages: Option<Reading>,

    #[serde(rename = "Gender", default)]
    pub gender: Option<Reading>,

    #[serde(rename = "Height", default)]
    pub height: Option<Reading>,

    #[serde(rename = "Weight", default)]
    pub weight: Option<Reading>,

    #[serde(rename = "Hemoglobin", default)]
    pub hemoglobin: Option<Reading>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub extracted_stats: ExtractedStats,

    #[serde(default)]
    pub suggested_deficiency: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ExtractedInfo {
    #[serde(rename = "Hemoglobin", default)]
    pub hemoglobin: Option<Reading>,

    #[serde(rename = "Ages", default)]
    pub ages: Option<Reading>,
}

///
/// Seven day meal plan built from an uploaded report
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WeeklyPlan {
    pub deficiency_found: String,

    pub goal: String,

    #[serde(default)]
    pub extracted_info: ExtractedInfo,

    #[serde(deserialize_with = "ordered_entries")]
    pub weekly_diet: Vec<(String, String)>,
}

///
/// Deserializes a JSON object into `(key, value)` pairs, keeping the key order of the document
///
pub(crate) fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V> Visitor<'de> for OrderedVisitor<V>
    where
        V: Deserialize<'de>,
    {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(PhantomData))
}
