use serde::Serialize;

/// Result of a computation that may legitimately find nothing to report.
/// An empty filter is a normal outcome, so it is a value rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Data(T),
    NoData,
}

impl<T> Outcome<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Outcome::NoData)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Data(v) => Some(v),
            Outcome::NoData => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Data(v) => Some(v),
            Outcome::NoData => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Data(v) => Outcome::Data(f(v)),
            Outcome::NoData => Outcome::NoData,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Outcome::NoData, Outcome::Data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_option_and_map() {
        let data: Outcome<u32> = Some(2).into();
        assert_eq!(data.map(|v| v * 10), Outcome::Data(20));

        let empty: Outcome<u32> = None.into();
        assert!(empty.map(|v| v * 10).is_no_data());
    }

    #[test]
    fn data_accessors() {
        let data = Outcome::Data("groceries");
        assert_eq!(data.data(), Some(&"groceries"));
        assert_eq!(data.into_data(), Some("groceries"));
        assert_eq!(Outcome::<u32>::NoData.into_data(), None);
    }
}
