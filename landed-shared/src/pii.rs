use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wrapper for identities (admin e-mails, user names) attached to override metadata.
/// Debug and Display never print the value; serialization does, since API callers need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Masked(********)")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let who = Masked::new("pricing-admin@example.com".to_string());
        assert_eq!(format!("{:?}", who), "Masked(********)");
        assert_eq!(format!("{}", who), "********");
        assert_eq!(who.expose(), "pricing-admin@example.com");
    }

    #[test]
    fn test_masked_serializes_inner_value() {
        let who = Masked::new("ops".to_string());
        assert_eq!(serde_json::to_string(&who).unwrap(), "\"ops\"");

        let back: Masked<String> = serde_json::from_str("\"ops\"").unwrap();
        assert_eq!(back, who);
    }
}
