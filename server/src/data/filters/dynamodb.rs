//! DynamoDB filter compilation
//!
//! Builds a `FilterExpression` for a Scan. Property names and values only
//! appear as `#nameN` / `:valueN` placeholders, numbered flatly across the
//! whole tree, so reserved words and caller text never reach the expression.

use std::collections::BTreeMap;

use serde::Serialize;

use super::accessor::PropertyAccessor;
use super::types::{Comparison, ComplexFilter, Filter, FilterRequest, FilterSemantics, Junction};
use crate::data::types::Incident;

/// Placeholder for the incident attribute map
const ATTRIBUTES_PLACEHOLDER: &str = "#attributes";
const ATTRIBUTES_NAME: &str = "attributes";

/// Typed expression value, mirroring the DynamoDB `S` / `N` attribute types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DynamoValue {
    S(String),
    N(String),
}

/// A compiled filter expression and its placeholder maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamoFilter {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, DynamoValue>,
}

/// Result of compiling a request for a Scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamoScan {
    /// Scan every item
    All,
    /// Scan with a filter expression
    Filtered(DynamoFilter),
    /// The tree can never match; no scan is needed
    Nothing,
}

/// Compile `request` for a Scan of the incident table
pub fn compile(request: Option<&FilterRequest>, semantics: FilterSemantics) -> DynamoScan {
    let Some(request) = request else {
        return DynamoScan::All;
    };

    let scan = match semantics {
        FilterSemantics::Legacy => legacy_scan(request),
        FilterSemantics::Consistent => consistent_scan(request),
    };
    if let DynamoScan::Filtered(filter) = &scan {
        tracing::debug!(
            expression = %filter.expression,
            placeholders = filter.names.len(),
            %semantics,
            "Compiled DynamoDB filter"
        );
    }
    scan
}

#[derive(Default)]
struct Placeholders {
    next: usize,
    filter: DynamoFilter,
}

impl Placeholders {
    /// Registers one name/value pair and returns the rendered comparison
    fn leaf(&mut self, filter: &Filter, semantics: FilterSemantics) -> String {
        let n = self.next;
        self.next += 1;

        let name = format!("#name{}", n);
        let value = format!(":value{}", n);
        let property = filter.property.to_lowercase();

        let target = match semantics {
            FilterSemantics::Consistent if !Incident::is_field(&property) => {
                self.filter.names.insert(
                    ATTRIBUTES_PLACEHOLDER.to_string(),
                    ATTRIBUTES_NAME.to_string(),
                );
                self.filter
                    .names
                    .insert(name.clone(), filter.property.clone());
                format!("{}.{}", ATTRIBUTES_PLACEHOLDER, name)
            }
            _ => {
                self.filter.names.insert(name.clone(), property.clone());
                name
            }
        };

        // Ids are stored as numbers; an `S` value could never equal them
        let typed = if property == "id"
            && filter.comparison != Comparison::Contains
            && filter.value.parse::<i64>().is_ok()
        {
            DynamoValue::N(filter.value.clone())
        } else {
            DynamoValue::S(filter.value.clone())
        };
        self.filter.values.insert(value.clone(), typed);

        match filter.comparison {
            Comparison::Equals => format!("{} = {}", target, value),
            Comparison::NotEquals => format!("{} <> {}", target, value),
            Comparison::Contains => format!("contains( {}, {} )", target, value),
        }
    }
}

/// Every top-level node's own leaves joined with `and `, each followed by a
/// space
fn legacy_scan(request: &FilterRequest) -> DynamoScan {
    let mut placeholders = Placeholders::default();
    let leaves: Vec<String> = request
        .filters
        .iter()
        .flat_map(ComplexFilter::own_filters)
        .map(|filter| format!("{} ", placeholders.leaf(filter, FilterSemantics::Legacy)))
        .collect();

    if leaves.is_empty() {
        return DynamoScan::All;
    }
    let mut filter = placeholders.filter;
    filter.expression = leaves.join("and ");
    DynamoScan::Filtered(filter)
}

/// Tree folded to drop vacuous groups before placeholders are assigned, so
/// every registered placeholder is referenced by the expression
enum Folded<'a> {
    True,
    False,
    Leaf(&'a Filter),
    Group(Junction, Vec<Folded<'a>>),
}

fn fold_group<'a>(junction: Junction, parts: impl Iterator<Item = Folded<'a>>) -> Folded<'a> {
    let mut kept = Vec::new();
    for part in parts {
        match (junction, part) {
            (Junction::And, Folded::True) | (Junction::Or, Folded::False) => {}
            (Junction::And, Folded::False) => return Folded::False,
            (Junction::Or, Folded::True) => return Folded::True,
            (_, part) => kept.push(part),
        }
    }
    match kept.len() {
        0 => match junction {
            Junction::And => Folded::True,
            Junction::Or => Folded::False,
        },
        1 => kept.pop().unwrap_or(Folded::True),
        _ => Folded::Group(junction, kept),
    }
}

fn fold_node(node: &ComplexFilter) -> Folded<'_> {
    match node {
        ComplexFilter::Branch {
            children, junction, ..
        } => {
            fold_group(*junction, children.iter().map(fold_node))
        }
        ComplexFilter::LeafGroup { filters, junction } => {
            fold_group(*junction, filters.iter().map(Folded::Leaf))
        }
    }
}

fn render(folded: &Folded<'_>, placeholders: &mut Placeholders) -> String {
    match folded {
        Folded::Leaf(filter) => placeholders.leaf(filter, FilterSemantics::Consistent),
        Folded::Group(junction, parts) => {
            let separator = match junction {
                Junction::And => " and ",
                Junction::Or => " or ",
            };
            let rendered: Vec<String> = parts
                .iter()
                .map(|part| render(part, placeholders))
                .collect();
            format!("({})", rendered.join(separator))
        }
        // Folding removes constants from every group
        Folded::True | Folded::False => String::new(),
    }
}

fn consistent_scan(request: &FilterRequest) -> DynamoScan {
    match fold_group(request.junction, request.filters.iter().map(fold_node)) {
        Folded::True => DynamoScan::All,
        Folded::False => DynamoScan::Nothing,
        folded => {
            let mut placeholders = Placeholders::default();
            let expression = render(&folded, &mut placeholders);
            let mut filter = placeholders.filter;
            filter.expression = expression;
            DynamoScan::Filtered(filter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(scan: DynamoScan) -> DynamoFilter {
        match scan {
            DynamoScan::Filtered(filter) => filter,
            other => panic!("expected filtered scan, got {:?}", other),
        }
    }

    fn s(value: &str) -> DynamoValue {
        DynamoValue::S(value.to_string())
    }

    #[test]
    fn absent_request_scans_everything() {
        assert_eq!(compile(None, FilterSemantics::Legacy), DynamoScan::All);
        assert_eq!(compile(None, FilterSemantics::Consistent), DynamoScan::All);
    }

    #[test]
    fn legacy_flat_placeholders_joined_with_and() {
        let request = FilterRequest::new(
            Junction::Or,
            vec![
                ComplexFilter::leaves(
                    Junction::Or,
                    vec![
                        Filter::equals("State", "Open"),
                        Filter::not_equals("reporter", "Jake"),
                    ],
                ),
                ComplexFilter::leaves(Junction::And, vec![Filter::contains("Description", "fire")]),
            ],
        );
        let filter = filtered(compile(Some(&request), FilterSemantics::Legacy));

        assert_eq!(
            filter.expression,
            "#name0 = :value0 and #name1 <> :value1 and contains( #name2, :value2 ) "
        );
        assert_eq!(filter.names["#name0"], "state");
        assert_eq!(filter.names["#name1"], "reporter");
        assert_eq!(filter.names["#name2"], "description");
        assert_eq!(filter.values[":value0"], s("Open"));
        assert_eq!(filter.values[":value1"], s("Jake"));
        assert_eq!(filter.values[":value2"], s("fire"));
    }

    #[test]
    fn legacy_ignores_children_and_empty_requests() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::branch(
                Junction::And,
                vec![ComplexFilter::leaves(
                    Junction::And,
                    vec![Filter::equals("state", "Open")],
                )],
            )],
        );
        assert_eq!(
            compile(Some(&request), FilterSemantics::Legacy),
            DynamoScan::All
        );
    }

    #[test]
    fn legacy_compiles_shadowed_filters_of_branches() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::branch(
                Junction::Or,
                vec![ComplexFilter::leaves(Junction::And, vec![Filter::equals("id", "1")])],
            )
            .with_shadowed(vec![Filter::equals("state", "Open")])],
        );
        let filter = filtered(compile(Some(&request), FilterSemantics::Legacy));

        assert_eq!(filter.expression, "#name0 = :value0 ");
        assert_eq!(filter.names["#name0"], "state");
        assert_eq!(filter.values[":value0"], s("Open"));

        // The shadowed filter plays no part once the tree is honored
        let filter = filtered(compile(Some(&request), FilterSemantics::Consistent));
        assert_eq!(filter.expression, "#name0 = :value0");
        assert_eq!(filter.names["#name0"], "id");
    }

    #[test]
    fn numeric_id_values_are_typed_as_numbers() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![
                    Filter::equals("Id", "3"),
                    Filter::equals("id", "three"),
                    Filter::contains("id", "3"),
                    Filter::equals("state", "3"),
                ],
            )],
        );
        for semantics in [FilterSemantics::Legacy, FilterSemantics::Consistent] {
            let filter = filtered(compile(Some(&request), semantics));
            assert_eq!(filter.values[":value0"], DynamoValue::N("3".to_string()));
            assert_eq!(filter.values[":value1"], s("three"));
            assert_eq!(filter.values[":value2"], s("3"));
            assert_eq!(filter.values[":value3"], s("3"));
        }
    }

    #[test]
    fn consistent_follows_the_tree() {
        let request = FilterRequest::new(
            Junction::Or,
            vec![
                ComplexFilter::leaves(
                    Junction::And,
                    vec![
                        Filter::equals("state", "Open"),
                        Filter::equals("reporter", "Sally"),
                    ],
                ),
                ComplexFilter::branch(
                    Junction::And,
                    vec![ComplexFilter::leaves(
                        Junction::And,
                        vec![Filter::equals("Id", "1")],
                    )],
                ),
            ],
        );
        let filter = filtered(compile(Some(&request), FilterSemantics::Consistent));

        assert_eq!(
            filter.expression,
            "((#name0 = :value0 and #name1 = :value1) or #name2 = :value2)"
        );
        assert_eq!(filter.names["#name2"], "id");
        assert_eq!(filter.values[":value2"], DynamoValue::N("1".to_string()));
    }

    #[test]
    fn consistent_folds_vacuous_groups() {
        // (state = Open) and (empty and) and (x or (empty or))
        let request = FilterRequest::new(
            Junction::And,
            vec![
                ComplexFilter::leaves(Junction::And, vec![Filter::equals("state", "Open")]),
                ComplexFilter::leaves(Junction::And, vec![]),
                ComplexFilter::branch(
                    Junction::Or,
                    vec![
                        ComplexFilter::leaves(Junction::And, vec![Filter::contains("reporter", "a")]),
                        ComplexFilter::leaves(Junction::Or, vec![]),
                    ],
                ),
            ],
        );
        let filter = filtered(compile(Some(&request), FilterSemantics::Consistent));

        assert_eq!(
            filter.expression,
            "(#name0 = :value0 and contains( #name1, :value1 ))"
        );
        assert_eq!(filter.names.len(), 2);
        assert_eq!(filter.values.len(), 2);
    }

    #[test]
    fn consistent_vacuous_trees_skip_or_widen_the_scan() {
        let never = FilterRequest::new(
            Junction::And,
            vec![
                ComplexFilter::leaves(Junction::Or, vec![]),
                ComplexFilter::leaves(Junction::And, vec![Filter::equals("state", "Open")]),
            ],
        );
        assert_eq!(
            compile(Some(&never), FilterSemantics::Consistent),
            DynamoScan::Nothing
        );

        let always = FilterRequest::new(Junction::And, vec![]);
        assert_eq!(
            compile(Some(&always), FilterSemantics::Consistent),
            DynamoScan::All
        );

        let empty_or = FilterRequest::new(Junction::Or, vec![]);
        assert_eq!(
            compile(Some(&empty_or), FilterSemantics::Consistent),
            DynamoScan::Nothing
        );
    }

    #[test]
    fn consistent_reads_custom_attributes_from_the_map() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![Filter::equals("Severity", "high")],
            )],
        );
        let filter = filtered(compile(Some(&request), FilterSemantics::Consistent));

        assert_eq!(filter.expression, "#attributes.#name0 = :value0");
        assert_eq!(filter.names["#attributes"], "attributes");
        assert_eq!(filter.names["#name0"], "Severity");
    }
}
