//! In-memory evaluation
//!
//! Walks a predicate tree against one entity. Evaluation is pure: no I/O, no
//! mutation, so a scan may evaluate many entities concurrently.

use super::accessor::PropertyAccessor;
use super::types::{Comparison, ComplexFilter, Filter, FilterRequest, Junction};
use crate::utils::string::{contains_ignore_case, eq_ignore_case};

/// Whether `entity` passes `request`. An absent request matches everything.
pub fn matches<T: PropertyAccessor>(entity: &T, request: Option<&FilterRequest>) -> bool {
    match request {
        None => true,
        Some(request) => combine(request.junction, &request.filters, |node| {
            node_matches(entity, node)
        }),
    }
}

fn node_matches<T: PropertyAccessor>(entity: &T, node: &ComplexFilter) -> bool {
    match node {
        ComplexFilter::Branch {
            children, junction, ..
        } => {
            combine(*junction, children, |child| node_matches(entity, child))
        }
        ComplexFilter::LeafGroup { filters, junction } => {
            combine(*junction, filters, |filter| leaf_matches(entity, filter))
        }
    }
}

/// And over an empty set is true, Or over an empty set is false
fn combine<I>(junction: Junction, items: &[I], mut test: impl FnMut(&I) -> bool) -> bool {
    match junction {
        Junction::And => items.iter().all(&mut test),
        Junction::Or => items.iter().any(&mut test),
    }
}

fn leaf_matches<T: PropertyAccessor>(entity: &T, filter: &Filter) -> bool {
    let actual = entity.property_value(&filter.property);
    match filter.comparison {
        Comparison::Equals => eq_ignore_case(&actual, &filter.value),
        Comparison::NotEquals => !eq_ignore_case(&actual, &filter.value),
        Comparison::Contains => contains_ignore_case(&actual, &filter.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Incident, NewIncident, User};

    fn fixtures() -> Vec<Incident> {
        vec![
            NewIncident::new("Sally", "Open").into_incident(0),
            NewIncident::new("Jake", "Closed").into_incident(1),
        ]
    }

    fn matching_ids(request: &FilterRequest) -> Vec<i64> {
        fixtures()
            .iter()
            .filter(|incident| matches(*incident, Some(request)))
            .map(|incident| incident.id)
            .collect()
    }

    fn leaf(filter: Filter) -> bool {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(Junction::And, vec![filter])],
        );
        matches(&NewIncident::new("Sally", "Open").into_incident(0), Some(&request))
    }

    #[test]
    fn absent_filter_matches_everything() {
        for incident in fixtures() {
            assert!(matches(&incident, None));
        }
    }

    #[test]
    fn empty_groups_are_vacuous() {
        let incident = &fixtures()[0];

        let and_root = FilterRequest::new(Junction::And, vec![]);
        let or_root = FilterRequest::new(Junction::Or, vec![]);
        assert!(matches(incident, Some(&and_root)));
        assert!(!matches(incident, Some(&or_root)));

        let and_leaves = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(Junction::And, vec![])],
        );
        let or_leaves = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(Junction::Or, vec![])],
        );
        assert!(matches(incident, Some(&and_leaves)));
        assert!(!matches(incident, Some(&or_leaves)));

        let or_children = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::branch(Junction::Or, vec![])],
        );
        assert!(!matches(incident, Some(&or_children)));
    }

    #[test]
    fn equals_and_not_equals_are_complements() {
        for value in ["Open", "open", "Closed", "", "Ope"] {
            assert_ne!(
                leaf(Filter::equals("state", value)),
                leaf(Filter::not_equals("state", value)),
                "value {:?}",
                value
            );
        }
    }

    #[test]
    fn equals_is_case_insensitive_full_match() {
        assert!(leaf(Filter::equals("STATE", "open")));
        assert!(!leaf(Filter::equals("state", "Ope")));
    }

    #[test]
    fn contains_is_case_insensitive_substring() {
        assert!(leaf(Filter::contains("state", "pen")));
        assert!(leaf(Filter::contains("state", "OPEN")));
        assert!(!leaf(Filter::contains("state", "xyz")));
    }

    #[test]
    fn unknown_property_compares_as_empty() {
        assert!(leaf(Filter::equals("assignee", "")));
        assert!(!leaf(Filter::equals("assignee", "Sally")));
        assert!(leaf(Filter::not_equals("assignee", "Sally")));
        assert!(leaf(Filter::contains("assignee", "")));
    }

    #[test]
    fn attributes_are_filterable() {
        let incident = NewIncident::new("Sally", "Open")
            .with_attribute("Severity", "High")
            .into_incident(0);
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![Filter::equals("severity", "high")],
            )],
        );
        assert!(matches(&incident, Some(&request)));
    }

    #[test]
    fn nested_children_evaluate_recursively() {
        let sally_open = ComplexFilter::leaves(
            Junction::And,
            vec![
                Filter::equals("state", "Open"),
                Filter::equals("reporter", "Sally"),
            ],
        );
        let jake_closed = ComplexFilter::leaves(
            Junction::And,
            vec![
                Filter::equals("state", "Closed"),
                Filter::equals("reporter", "Jake"),
            ],
        );
        let never = ComplexFilter::leaves(Junction::Or, vec![]);

        // (never OR (sally_open OR jake_closed)) AND anything
        let tree = ComplexFilter::branch(
            Junction::Or,
            vec![
                never.clone(),
                ComplexFilter::branch(Junction::Or, vec![sally_open.clone(), jake_closed.clone()]),
            ],
        );
        let request = FilterRequest::new(Junction::And, vec![tree]);
        assert_eq!(matching_ids(&request), vec![0, 1]);

        // Branch order does not change the result
        let reversed = ComplexFilter::branch(
            Junction::Or,
            vec![
                ComplexFilter::branch(Junction::Or, vec![jake_closed, sally_open]),
                never,
            ],
        );
        let request = FilterRequest::new(Junction::And, vec![reversed]);
        assert_eq!(matching_ids(&request), vec![0, 1]);
    }

    #[test]
    fn single_equals_group() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![Filter::equals("state", "Open")],
            )],
        );
        assert_eq!(matching_ids(&request), vec![0]);
    }

    #[test]
    fn or_group_under_and_root() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::Or,
                vec![
                    Filter::equals("state", "Open"),
                    Filter::equals("reporter", "Jake"),
                ],
            )],
        );
        assert_eq!(matching_ids(&request), vec![0, 1]);
    }

    #[test]
    fn and_group_under_and_root() {
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![
                    Filter::equals("state", "Open"),
                    Filter::equals("reporter", "Jake"),
                ],
            )],
        );
        assert!(matching_ids(&request).is_empty());
    }

    #[test]
    fn two_groups_under_or_and_and_roots() {
        let groups = vec![
            ComplexFilter::leaves(
                Junction::And,
                vec![
                    Filter::equals("state", "Open"),
                    Filter::equals("reporter", "Sally"),
                ],
            ),
            ComplexFilter::leaves(
                Junction::And,
                vec![
                    Filter::equals("state", "Closed"),
                    Filter::equals("reporter", "Jake"),
                ],
            ),
        ];

        let or_root = FilterRequest::new(Junction::Or, groups.clone());
        assert_eq!(matching_ids(&or_root), vec![0, 1]);

        let and_root = FilterRequest::new(Junction::And, groups);
        assert!(matching_ids(&and_root).is_empty());
    }

    #[test]
    fn users_share_the_same_tree() {
        let user = User {
            email_address: "sally@example.com".to_string(),
            user_name: "sally".to_string(),
            first_name: "Sally".to_string(),
            last_name: "Smith".to_string(),
            gender: "female".to_string(),
            id: 0,
        };
        let request = FilterRequest::new(
            Junction::And,
            vec![ComplexFilter::leaves(
                Junction::And,
                vec![
                    Filter::contains("emailaddress", "EXAMPLE"),
                    Filter::equals("UserName", "Sally"),
                ],
            )],
        );
        assert!(matches(&user, Some(&request)));
    }
}
