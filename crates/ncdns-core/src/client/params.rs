//! Request parameter builder

/// Parameters reserved for the client itself
pub(crate) const RESERVED: &[&str] = &["ApiUser", "ApiKey", "UserName", "ClientIp", "Command"];

/// Ordered command parameters
///
/// Absent values and empty strings are dropped when the request is
/// assembled: the upstream treats an explicitly blank parameter as present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, Some(value));
        self
    }

    /// Add a parameter that may be absent
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter in place
    pub fn push<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        self.entries.push((key.into(), value.map(|v| v.to_string())));
    }

    /// Number of entries, including ones that will be dropped
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries were added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value that will be sent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// Names of the parameters that will be sent
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| v.as_deref().is_some_and(|v| !v.is_empty()))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Entries that will be sent, reserved names removed
    pub(crate) fn into_wire(self) -> Vec<(String, String)> {
        self.entries
            .into_iter()
            .filter(|(k, _)| {
                let reserved = RESERVED.iter().any(|r| r.eq_ignore_ascii_case(k));
                if reserved {
                    tracing::warn!("Ignoring caller-supplied reserved parameter {}", k);
                }
                !reserved
            })
            .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_values_dropped() {
        let params = Params::new()
            .with("SLD", "example")
            .with("Blank", "")
            .with_opt::<u32>("MXPref", None)
            .with_opt("TTL", Some(300));

        assert_eq!(params.names(), vec!["SLD", "TTL"]);
        assert_eq!(
            params.into_wire(),
            vec![
                ("SLD".to_string(), "example".to_string()),
                ("TTL".to_string(), "300".to_string()),
            ]
        );
    }

    #[test]
    fn test_reserved_names_stripped() {
        let params = Params::new().with("apikey", "spoofed").with("TLD", "com");
        assert_eq!(params.into_wire(), vec![("TLD".to_string(), "com".to_string())]);
    }
}
