//! Compatibility shim for list endpoints.
//!
//! Depending on the endpoint and backend version, a list comes back as a bare
//! array or as an object holding the array under a generic key (`items`,
//! `data`, `results`) or under the resource name (`{ "memberships": [...] }`).
//! Every known variant is listed here; anything else is a decode error
//! rather than a silently empty list.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResourceList<T> {
    /// `[ ... ]`
    Bare(Vec<T>),
    /// `{ "<key>": [ ... ], ...pagination fields }`
    Wrapped(WrappedList<T>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WrappedList<T> {
    #[serde(
        alias = "data",
        alias = "results",
        alias = "communities",
        alias = "memberships",
        alias = "plans",
        alias = "users",
        alias = "professionals",
        alias = "services",
        alias = "locals",
        alias = "sessions",
        alias = "reservations",
        alias = "logs"
    )]
    pub items: Vec<T>,
}

impl<T> ResourceList<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ResourceList::Bare(items) => items,
            ResourceList::Wrapped(wrapped) => wrapped.items,
        }
    }

    /// Normalise a possibly empty body (`null`/no content) into a vector
    pub fn normalize(raw: Option<Self>) -> Vec<T> {
        raw.map(Self::into_vec).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<u32>, serde_json::Error> {
        let raw: Option<ResourceList<u32>> = serde_json::from_str(json)?;
        Ok(ResourceList::normalize(raw))
    }

    #[test]
    fn test_known_shapes() {
        assert_eq!(parse("[1,2]").unwrap(), vec![1, 2]);
        assert_eq!(parse(r#"{"items":[3]}"#).unwrap(), vec![3]);
        assert_eq!(parse(r#"{"data":[4],"total":1}"#).unwrap(), vec![4]);
        assert_eq!(parse(r#"{"memberships":[]}"#).unwrap(), Vec::<u32>::new());
        assert_eq!(parse("null").unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_unknown_shape_is_an_error() {
        assert!(parse(r#"{"whatever":[1]}"#).is_err());
        assert!(parse(r#""text""#).is_err());
    }
}
