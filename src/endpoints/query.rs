/// Ordered query-string pairs; list values become repeated keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Add the pair only when a value is set
    pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn push_all<T: ToString>(&mut self, key: &str, values: &[T]) -> &mut Self {
        for value in values {
            self.push(key, value.to_string());
        }
        self
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Carrier;

    #[test]
    fn test_builds_pairs_in_order() {
        let mut query = QueryParams::new();
        query
            .push("fromCountry", "NL")
            .push_opt("toCountry", None::<&str>)
            .push_opt("toBusiness", Some(true))
            .push_all("carrier", &[Carrier::DhlParcel, Carrier::Speedpack]);

        assert_eq!(
            query.as_slice(),
            &[
                ("fromCountry".to_string(), "NL".to_string()),
                ("toBusiness".to_string(), "true".to_string()),
                ("carrier".to_string(), "DHL-PARCEL".to_string()),
                ("carrier".to_string(), "SPEEDPACK".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty() {
        let mut query = QueryParams::new();
        query.push_opt("limit", None::<u32>).push_all::<String>("serviceType", &[]);
        assert!(query.is_empty());
    }
}
