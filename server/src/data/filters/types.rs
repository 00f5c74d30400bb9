//! Filter type definitions
//!
//! The predicate tree submitted with a list request. Leaf filters are grouped
//! into complex filters, which are combined under a single root request.
//!
//! The JSON shape is the one the listing endpoint has always accepted:
//!
//! ```json
//! {"complexfilters": [{"filters": [{"property": "state", "comparison": "equals", "value": "Open"}],
//!                      "junction": "or"}],
//!  "union": "and"}
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Boolean combinator applied to a node's children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Junction {
    #[default]
    And,
    Or,
}

impl Junction {
    /// Parse junction text case-insensitively.
    ///
    /// Only "or" selects [`Junction::Or`]. Empty text is the documented default
    /// and anything else falls back to [`Junction::And`] with a warning.
    pub fn from_str_loose(s: &str) -> Self {
        if s.eq_ignore_ascii_case("or") {
            return Self::Or;
        }
        if !s.is_empty() && !s.eq_ignore_ascii_case("and") {
            tracing::warn!(junction = %s, "Unrecognized junction, defaulting to and");
        }
        Self::And
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl<'de> Deserialize<'de> for Junction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_str_loose).unwrap_or_default())
    }
}

/// Comparison applied by a leaf filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Equals,
    NotEquals,
    Contains,
}

impl Comparison {
    const VARIANTS: &'static [&'static str] = &["equals", "notequals", "contains"];

    pub fn from_str_loose(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("equals") {
            Some(Self::Equals)
        } else if s.eq_ignore_ascii_case("notequals") {
            Some(Self::NotEquals)
        } else if s.eq_ignore_ascii_case("contains") {
            Some(Self::Contains)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for Comparison {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str_loose(&raw).ok_or_else(|| de::Error::unknown_variant(&raw, Self::VARIANTS))
    }
}

/// A single property/comparison/value triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub property: String,
    pub comparison: Comparison,
    #[serde(default)]
    pub value: String,
}

impl Filter {
    pub fn new(property: impl Into<String>, comparison: Comparison, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            comparison,
            value: value.into(),
        }
    }

    pub fn equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(property, Comparison::Equals, value)
    }

    pub fn not_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(property, Comparison::NotEquals, value)
    }

    pub fn contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(property, Comparison::Contains, value)
    }
}

/// Boolean-combination node of the predicate tree
///
/// A node either branches into child nodes or holds leaf filters. On the wire
/// both lists are optional; a non-empty `children` list wins over `filters`.
/// A branch still carries the `filters` it was sent with, since the legacy
/// compilers read a node's own filters and never its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ComplexFilterWire", into = "ComplexFilterWire")]
pub enum ComplexFilter {
    Branch {
        children: Vec<ComplexFilter>,
        /// Filters sent next to `children`; shadowed outside legacy compilation
        filters: Vec<Filter>,
        junction: Junction,
    },
    LeafGroup {
        filters: Vec<Filter>,
        junction: Junction,
    },
}

impl ComplexFilter {
    pub fn branch(junction: Junction, children: Vec<ComplexFilter>) -> Self {
        Self::Branch {
            children,
            filters: Vec::new(),
            junction,
        }
    }

    /// Attach shadowed filters to a branch; leaf groups are returned unchanged
    pub fn with_shadowed(mut self, shadowed: Vec<Filter>) -> Self {
        if let Self::Branch { filters, .. } = &mut self {
            *filters = shadowed;
        }
        self
    }

    /// The node's own filters, whichever variant it is
    pub fn own_filters(&self) -> &[Filter] {
        match self {
            Self::Branch { filters, .. } | Self::LeafGroup { filters, .. } => filters,
        }
    }

    pub fn leaves(junction: Junction, filters: Vec<Filter>) -> Self {
        Self::LeafGroup { filters, junction }
    }

    pub fn junction(&self) -> Junction {
        match self {
            Self::Branch { junction, .. } | Self::LeafGroup { junction, .. } => *junction,
        }
    }

    /// Number of leaf filters in this subtree, shadowed ones included
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Branch {
                children, filters, ..
            } => filters.len() + children.iter().map(Self::leaf_count).sum::<usize>(),
            Self::LeafGroup { filters, .. } => filters.len(),
        }
    }

    /// Nesting depth of this subtree (a leaf group is depth 1)
    pub fn depth(&self) -> usize {
        match self {
            Self::Branch { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::LeafGroup { .. } => 1,
        }
    }
}

/// Wire representation with both lists optional
#[derive(Serialize, Deserialize)]
struct ComplexFilterWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<ComplexFilter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filters: Option<Vec<Filter>>,
    #[serde(default)]
    junction: Junction,
}

impl From<ComplexFilterWire> for ComplexFilter {
    fn from(wire: ComplexFilterWire) -> Self {
        match wire.children {
            Some(children) if !children.is_empty() => Self::Branch {
                children,
                filters: wire.filters.unwrap_or_default(),
                junction: wire.junction,
            },
            _ => Self::LeafGroup {
                filters: wire.filters.unwrap_or_default(),
                junction: wire.junction,
            },
        }
    }
}

impl From<ComplexFilter> for ComplexFilterWire {
    fn from(filter: ComplexFilter) -> Self {
        match filter {
            ComplexFilter::Branch {
                children,
                filters,
                junction,
            } => Self {
                children: Some(children),
                filters: (!filters.is_empty()).then_some(filters),
                junction,
            },
            ComplexFilter::LeafGroup { filters, junction } => Self {
                children: None,
                filters: Some(filters),
                junction,
            },
        }
    }
}

/// Root of a predicate tree submitted with a list query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(rename = "complexfilters", default, deserialize_with = "null_as_empty")]
    pub filters: Vec<ComplexFilter>,
    #[serde(rename = "union", default)]
    pub junction: Junction,
}

impl FilterRequest {
    pub fn new(junction: Junction, filters: Vec<ComplexFilter>) -> Self {
        Self { filters, junction }
    }

    pub fn leaf_count(&self) -> usize {
        self.filters.iter().map(ComplexFilter::leaf_count).sum()
    }

    pub fn depth(&self) -> usize {
        self.filters
            .iter()
            .map(ComplexFilter::depth)
            .max()
            .unwrap_or(0)
    }
}

/// How the query compilers translate a predicate tree
///
/// `Legacy` reproduces the deployed compilers: every top-level node's own
/// leaves are AND-joined, children are ignored and SQL `contains` is set membership. `Consistent`
/// compiles the full tree with the same meaning as the in-memory evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSemantics {
    #[default]
    Legacy,
    Consistent,
}

impl std::fmt::Display for FilterSemantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Consistent => write!(f, "consistent"),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
