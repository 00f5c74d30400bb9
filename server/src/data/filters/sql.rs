//! SQL filter compilation
//!
//! Builds a parameterized WHERE clause for the relational incident store.
//! Property names never reach the SQL text: well-known fields map through a
//! column whitelist and anything else becomes a bound attribute lookup.
//! Values are always bound.

use super::types::{Comparison, ComplexFilter, Filter, FilterRequest, FilterSemantics, Junction};
use crate::utils::sql::contains_pattern;

/// Positional arguments collected while building a clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlParams {
    pub values: Vec<String>,
}

/// A compiled WHERE clause (empty when nothing filters) and its arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlClause {
    pub sql: String,
    pub params: SqlParams,
}

impl SqlClause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Column whitelist for the incident listing query
pub mod columns {
    /// Well-known incident properties and the columns they read
    pub const INCIDENT_COLUMNS: &[(&str, &str)] = &[
        ("id", "i.Id"),
        ("type", "i.Type"),
        ("description", "i.Description"),
        ("reporter", "i.Reporter"),
        ("state", "i.State"),
    ];

    /// Correlated lookup of a free-form attribute; binds the attribute name
    pub const ATTRIBUTE_LOOKUP: &str = "COALESCE((SELECT ia.AttributeValue FROM IncidentAttributes ia \
         WHERE ia.IncidentId = i.Id AND LOWER(ia.AttributeName) = LOWER(?) LIMIT 1), '')";

    pub fn map_incident_column(property: &str) -> Option<&'static str> {
        INCIDENT_COLUMNS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, column)| *column)
    }
}

/// Compile `request` into a WHERE clause. An absent request compiles to an
/// empty clause (unfiltered scan).
pub fn compile(request: Option<&FilterRequest>, semantics: FilterSemantics) -> SqlClause {
    let Some(request) = request else {
        return SqlClause::default();
    };

    let mut params = SqlParams::default();
    let condition = match semantics {
        FilterSemantics::Legacy => legacy_condition(request, &mut params),
        FilterSemantics::Consistent => Some(consistent_condition(request, &mut params)),
    };

    let clause = match condition {
        Some(condition) => SqlClause {
            sql: format!("WHERE {}", condition),
            params,
        },
        None => SqlClause::default(),
    };
    tracing::debug!(
        sql = %clause.sql,
        args = clause.params.values.len(),
        %semantics,
        "Compiled SQL filter"
    );
    clause
}

impl Filter {
    /// SQL fragment for this leaf with `?` placeholders; pushes its arguments
    pub fn to_sql(&self, params: &mut SqlParams, semantics: FilterSemantics) -> String {
        let column = match columns::map_incident_column(&self.property) {
            Some(column) => column.to_string(),
            None => {
                params.values.push(self.property.clone());
                columns::ATTRIBUTE_LOOKUP.to_string()
            }
        };

        match semantics {
            // Deployed stores compared with a case-insensitive collation
            FilterSemantics::Legacy => {
                params.values.push(self.value.clone());
                match self.comparison {
                    Comparison::Equals => format!("{} COLLATE NOCASE = ?", column),
                    Comparison::NotEquals => format!("{} COLLATE NOCASE != ?", column),
                    Comparison::Contains => format!("{} COLLATE NOCASE IN (?)", column),
                }
            }
            FilterSemantics::Consistent => match self.comparison {
                Comparison::Equals => {
                    params.values.push(self.value.clone());
                    format!("LOWER({}) = LOWER(?)", column)
                }
                Comparison::NotEquals => {
                    params.values.push(self.value.clone());
                    format!("LOWER({}) != LOWER(?)", column)
                }
                Comparison::Contains => {
                    params.values.push(contains_pattern(&self.value));
                    format!("LOWER({}) LIKE LOWER(?) ESCAPE '\\'", column)
                }
            },
        }
    }
}

/// Every top-level node's own leaves AND-joined; children and junctions are
/// not consulted
fn legacy_condition(request: &FilterRequest, params: &mut SqlParams) -> Option<String> {
    let leaves: Vec<String> = request
        .filters
        .iter()
        .flat_map(ComplexFilter::own_filters)
        .map(|filter| filter.to_sql(params, FilterSemantics::Legacy))
        .collect();

    if leaves.is_empty() {
        None
    } else {
        Some(leaves.join(" AND "))
    }
}

fn consistent_condition(request: &FilterRequest, params: &mut SqlParams) -> String {
    let parts: Vec<String> = request
        .filters
        .iter()
        .map(|node| node_sql(node, params))
        .collect();
    join_group(request.junction, parts)
}

fn node_sql(node: &ComplexFilter, params: &mut SqlParams) -> String {
    match node {
        ComplexFilter::Branch {
            children, junction, ..
        } => {
            let parts = children.iter().map(|child| node_sql(child, params)).collect();
            join_group(*junction, parts)
        }
        ComplexFilter::LeafGroup { filters, junction } => {
            let parts = filters
                .iter()
                .map(|filter| filter.to_sql(params, FilterSemantics::Consistent))
                .collect();
            join_group(*junction, parts)
        }
    }
}

fn join_group(junction: Junction, parts: Vec<String>) -> String {
    match (parts.len(), junction) {
        (0, Junction::And) => "1=1".to_string(),
        (0, Junction::Or) => "1=0".to_string(),
        (1, _) => parts.into_iter().next().unwrap_or_default(),
        (_, Junction::And) => format!("({})", parts.join(" AND ")),
        (_, Junction::Or) => format!("({})", parts.join(" OR ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(junction: Junction, groups: Vec<ComplexFilter>) -> FilterRequest {
        FilterRequest::new(junction, groups)
    }

    #[test]
    fn absent_request_is_unfiltered() {
        for semantics in [FilterSemantics::Legacy, FilterSemantics::Consistent] {
            let clause = compile(None, semantics);
            assert!(clause.is_empty());
            assert!(clause.params.values.is_empty());
        }
    }

    #[test]
    fn legacy_and_joins_every_leaf() {
        let request = request(
            Junction::Or,
            vec![
                ComplexFilter::leaves(
                    Junction::Or,
                    vec![
                        Filter::equals("state", "Open"),
                        Filter::not_equals("Reporter", "Jake"),
                    ],
                ),
                ComplexFilter::leaves(Junction::And, vec![Filter::contains("type", "Bug")]),
            ],
        );
        let clause = compile(Some(&request), FilterSemantics::Legacy);

        assert_eq!(
            clause.sql,
            "WHERE i.State COLLATE NOCASE = ? AND i.Reporter COLLATE NOCASE != ? \
             AND i.Type COLLATE NOCASE IN (?)"
        );
        assert_eq!(clause.params.values, vec!["Open", "Jake", "Bug"]);
    }

    #[test]
    fn legacy_ignores_children() {
        let request = request(
            Junction::And,
            vec![
                ComplexFilter::branch(
                    Junction::Or,
                    vec![ComplexFilter::leaves(
                        Junction::And,
                        vec![Filter::equals("state", "Closed")],
                    )],
                ),
                ComplexFilter::leaves(Junction::And, vec![Filter::equals("id", "0")]),
            ],
        );
        let clause = compile(Some(&request), FilterSemantics::Legacy);

        assert_eq!(clause.sql, "WHERE i.Id COLLATE NOCASE = ?");
        assert_eq!(clause.params.values, vec!["0"]);
    }

    #[test]
    fn legacy_compiles_shadowed_filters_of_branches() {
        let request: FilterRequest = serde_json::from_str(
            r#"{"complexfilters": [{
                "children": [{"filters": [{"property": "id", "comparison": "equals", "value": "1"}]}],
                "filters": [{"property": "state", "comparison": "equals", "value": "Open"}]}]}"#,
        )
        .unwrap();

        let clause = compile(Some(&request), FilterSemantics::Legacy);
        assert_eq!(clause.sql, "WHERE i.State COLLATE NOCASE = ?");
        assert_eq!(clause.params.values, vec!["Open"]);

        let clause = compile(Some(&request), FilterSemantics::Consistent);
        assert_eq!(clause.sql, "WHERE LOWER(i.Id) = LOWER(?)");
        assert_eq!(clause.params.values, vec!["1"]);
    }

    #[test]
    fn legacy_without_leaves_emits_no_clause() {
        let request = request(
            Junction::And,
            vec![ComplexFilter::leaves(Junction::Or, vec![])],
        );
        let clause = compile(Some(&request), FilterSemantics::Legacy);
        assert!(clause.is_empty());
    }

    #[test]
    fn unknown_property_binds_attribute_name() {
        let request = request(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![Filter::equals("severity; DROP TABLE Incidents", "high")],
            )],
        );
        let clause = compile(Some(&request), FilterSemantics::Legacy);

        assert_eq!(
            clause.sql,
            format!("WHERE {} COLLATE NOCASE = ?", columns::ATTRIBUTE_LOOKUP)
        );
        assert!(!clause.sql.contains("DROP"));
        assert_eq!(
            clause.params.values,
            vec!["severity; DROP TABLE Incidents", "high"]
        );
    }

    #[test]
    fn consistent_follows_the_tree() {
        let request = request(
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
                        Junction::Or,
                        vec![Filter::not_equals("state", "Open")],
                    )],
                ),
            ],
        );
        let clause = compile(Some(&request), FilterSemantics::Consistent);

        assert_eq!(
            clause.sql,
            "WHERE ((LOWER(i.State) = LOWER(?) AND LOWER(i.Reporter) = LOWER(?)) \
             OR LOWER(i.State) != LOWER(?))"
        );
        assert_eq!(clause.params.values, vec!["Open", "Sally", "Open"]);
    }

    #[test]
    fn consistent_contains_is_escaped_like() {
        let request = request(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![Filter::contains("description", "100%_done")],
            )],
        );
        let clause = compile(Some(&request), FilterSemantics::Consistent);

        assert_eq!(
            clause.sql,
            r"WHERE LOWER(i.Description) LIKE LOWER(?) ESCAPE '\'"
        );
        assert_eq!(clause.params.values, vec![r"%100\%\_done%"]);
    }

    #[test]
    fn consistent_empty_groups_are_constants() {
        let and_root = request(Junction::And, vec![]);
        assert_eq!(
            compile(Some(&and_root), FilterSemantics::Consistent).sql,
            "WHERE 1=1"
        );

        let or_root = request(
            Junction::Or,
            vec![
                ComplexFilter::leaves(Junction::Or, vec![]),
                ComplexFilter::branch(Junction::And, vec![]),
            ],
        );
        assert_eq!(
            compile(Some(&or_root), FilterSemantics::Consistent).sql,
            "WHERE (1=0 OR 1=1)"
        );
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        assert_eq!(columns::map_incident_column("STATE"), Some("i.State"));
        assert_eq!(columns::map_incident_column("Id"), Some("i.Id"));
        assert_eq!(columns::map_incident_column("severity"), None);
    }
}
