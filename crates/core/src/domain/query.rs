use std::fmt;

use serde::Serialize;

use crate::errors::DomainError;

/// A shopper query as typed. Only whitespace-emptiness is rejected; the text is
/// otherwise kept verbatim so templates see the original casing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased copy used for keyword matching only.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Query;
    use crate::errors::DomainError;

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(Query::parse(""), Err(DomainError::EmptyQuery));
        assert_eq!(Query::parse("   \t\n"), Err(DomainError::EmptyQuery));
    }

    #[test]
    fn original_text_is_preserved() {
        let query = Query::parse("  Winter DISCOUNT  ").expect("non-empty query");
        assert_eq!(query.as_str(), "  Winter DISCOUNT  ");
        assert_eq!(query.normalized(), "  winter discount  ");
    }
}
