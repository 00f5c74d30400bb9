//! Property accessors
//!
//! Every filterable entity kind exposes its fields to the predicate tree as
//! strings. Well-known fields come from a per-kind table matched
//! case-insensitively; other names fall back to the entity's attribute map.
//! Names that resolve nowhere yield an empty string, never an error.

use std::borrow::Cow;

use crate::data::types::{Incident, User};

/// A well-known field of an entity kind
pub struct Field<T> {
    pub name: &'static str,
    pub get: for<'a> fn(&'a T) -> Cow<'a, str>,
}

/// Maps a property name to the string form of an entity field
pub trait PropertyAccessor: Sized + 'static {
    /// Well-known fields, matched case-insensitively before attributes
    const FIELDS: &'static [Field<Self>];

    /// Free-form attribute lookup for names that are not well-known fields
    fn attribute(&self, _name: &str) -> Option<&str> {
        None
    }

    fn property_value(&self, name: &str) -> Cow<'_, str> {
        if let Some(field) = Self::FIELDS
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
        {
            return (field.get)(self);
        }
        Cow::Borrowed(self.attribute(name).unwrap_or(""))
    }

    /// Whether `name` is one of this kind's well-known fields
    fn is_field(name: &str) -> bool {
        Self::FIELDS
            .iter()
            .any(|field| field.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Incident
// ============================================================================

fn incident_id(incident: &Incident) -> Cow<'_, str> {
    Cow::Owned(incident.id.to_string())
}

fn incident_kind(incident: &Incident) -> Cow<'_, str> {
    Cow::Borrowed(&incident.kind)
}

fn incident_description(incident: &Incident) -> Cow<'_, str> {
    Cow::Borrowed(&incident.description)
}

fn incident_reporter(incident: &Incident) -> Cow<'_, str> {
    Cow::Borrowed(&incident.reporter)
}

fn incident_state(incident: &Incident) -> Cow<'_, str> {
    Cow::Borrowed(&incident.state)
}

impl PropertyAccessor for Incident {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "id", get: incident_id },
        Field { name: "type", get: incident_kind },
        Field { name: "description", get: incident_description },
        Field { name: "reporter", get: incident_reporter },
        Field { name: "state", get: incident_state },
    ];

    /// Exact key first, then the first key equal ignoring case
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}

// ============================================================================
// User
// ============================================================================

fn user_id(user: &User) -> Cow<'_, str> {
    Cow::Owned(user.id.to_string())
}

fn user_name(user: &User) -> Cow<'_, str> {
    Cow::Borrowed(&user.user_name)
}

fn user_first_name(user: &User) -> Cow<'_, str> {
    Cow::Borrowed(&user.first_name)
}

fn user_last_name(user: &User) -> Cow<'_, str> {
    Cow::Borrowed(&user.last_name)
}

fn user_gender(user: &User) -> Cow<'_, str> {
    Cow::Borrowed(&user.gender)
}

fn user_email_address(user: &User) -> Cow<'_, str> {
    Cow::Borrowed(&user.email_address)
}

impl PropertyAccessor for User {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "id", get: user_id },
        Field { name: "username", get: user_name },
        Field { name: "firstname", get: user_first_name },
        Field { name: "lastname", get: user_last_name },
        Field { name: "gender", get: user_gender },
        Field { name: "emailaddress", get: user_email_address },
    ];
}
