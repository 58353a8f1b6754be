//! Inspectable fragments of a request.

use std::borrow::Cow;
use std::fmt;

/// Where in the request a fragment came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Query,
    Body,
    FormField(String),
    Json,
}

impl Location {
    /// Location label without the field name, for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Location::Query => "query",
            Location::Body => "body",
            Location::FormField(_) => "form-field",
            Location::Json => "json",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::FormField(name) => write!(f, "form-field:{}", name),
            other => f.write_str(other.kind()),
        }
    }
}

/// A (location, text) pair derived from request data.
///
/// Raw-body fragments borrow the buffered body when it is valid UTF-8;
/// decoded form values and JSON leaves are owned copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectableFragment<'a> {
    pub location: Location,
    pub text: Cow<'a, str>,
}

impl<'a> InspectableFragment<'a> {
    pub fn new(location: Location, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            location,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_labels() {
        assert_eq!(Location::Query.to_string(), "query");
        assert_eq!(Location::Body.to_string(), "body");
        assert_eq!(Location::Json.to_string(), "json");
        assert_eq!(Location::FormField("user".into()).to_string(), "form-field:user");
        assert_eq!(Location::FormField("user".into()).kind(), "form-field");
    }
}
