use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifiers of the power curves the API can evaluate.
pub static POWER_CURVES: [&str; 5] = [
    "nrel-reference-2.5kW",
    "nrel-reference-20kW",
    "nrel-reference-100kW",
    "nrel-reference-250kW",
    "nrel-reference-2000kW",
];

pub const DEFAULT_POWER_CURVE: PowerCurve = PowerCurve("nrel-reference-100kW");

/// A power curve drawn from the fixed catalog.
///
/// Construction goes through [`PowerCurve::parse`], so a value of this type
/// is always a catalog member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerCurve(&'static str);

impl PowerCurve {
    pub fn parse(id: &str) -> Option<PowerCurve> {
        let id = id.trim();
        POWER_CURVES
            .iter()
            .find(|candidate| **candidate == id)
            .map(|candidate| PowerCurve(*candidate))
    }

    pub fn all() -> impl Iterator<Item = PowerCurve> {
        POWER_CURVES.iter().map(|id| PowerCurve(*id))
    }

    pub fn id(&self) -> &'static str {
        self.0
    }

    /// Rated capacity label, e.g. "100kW".
    pub fn capacity_label(&self) -> &'static str {
        self.0.rsplit('-').next().unwrap_or(self.0)
    }

    pub fn display_name(&self) -> String {
        format!("NREL Reference {}", self.capacity_label())
    }
}

impl Default for PowerCurve {
    fn default() -> Self {
        DEFAULT_POWER_CURVE
    }
}

impl fmt::Display for PowerCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for PowerCurve {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for PowerCurve {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PowerCurve::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown power curve: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_catalog_members_only() {
        assert_eq!(
            PowerCurve::parse("nrel-reference-2.5kW").map(|p| p.id()),
            Some("nrel-reference-2.5kW")
        );
        assert!(PowerCurve::parse("nrel-reference-100KW").is_none());
        assert!(PowerCurve::parse("").is_none());
    }

    #[test]
    fn default_is_in_catalog() {
        assert!(POWER_CURVES.contains(&PowerCurve::default().id()));
        assert_eq!(PowerCurve::all().count(), POWER_CURVES.len());
    }

    #[test]
    fn display_name_uses_capacity() {
        let curve = PowerCurve::parse("nrel-reference-2000kW").unwrap();
        assert_eq!(curve.capacity_label(), "2000kW");
        assert_eq!(curve.display_name(), "NREL Reference 2000kW");
    }

    #[test]
    fn deserialize_rejects_unknown_ids() {
        let ok: Result<PowerCurve, _> = serde_json::from_str("\"nrel-reference-250kW\"");
        assert!(ok.is_ok());
        let bad: Result<PowerCurve, _> = serde_json::from_str("\"bergey-excel-15\"");
        assert!(bad.is_err());
    }
}
