use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use zk_primitives::Element;

/// A circuit signal, written as a decimal string the way witness generators expect
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signal(pub Element);

impl Signal {
    /// The signal's value
    #[must_use]
    pub fn element(self) -> Element {
        self.0
    }

    pub(crate) fn many(elements: impl IntoIterator<Item = Element>) -> Vec<Signal> {
        elements.into_iter().map(Signal).collect()
    }
}

impl From<Element> for Signal {
    fn from(element: Element) -> Self {
        Self(element)
    }
}

impl From<u64> for Signal {
    fn from(value: u64) -> Self {
        Self(Element::new(value))
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_decimal_string())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_decimal_string())
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Element::from_str(&s).map(Signal).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_json() {
        let signal = Signal::from(1234);
        assert_eq!(serde_json::to_string(&signal).unwrap(), r#""1234""#);

        let parsed: Signal = serde_json::from_str(r#""1234""#).unwrap();
        assert_eq!(parsed, signal);
    }

    #[test]
    fn accepts_hex() {
        let parsed: Signal = serde_json::from_str(r#""0xff""#).unwrap();
        assert_eq!(parsed, Signal::from(255));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Signal>(r#""twelve""#).is_err());
    }
}
