use crate::bounds::{ModelBounds, ERA5_BOUNDS, WTK_BOUNDS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hub heights (meters) served by the ERA5 model.
pub const ERA5_HUB_HEIGHTS: [u32; 6] = [30, 40, 50, 60, 80, 100];

/// Hub heights (meters) served by the WIND Toolkit model.
pub const WTK_HUB_HEIGHTS: [u32; 8] = [40, 60, 80, 100, 120, 140, 160, 200];

/// A wind reanalysis data source served by the remote API.
///
/// Each model has its own coverage rectangle and its own set of hub heights.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataModel {
    /// ERA5 reanalysis, the primary source.
    #[default]
    Era5,
    /// NREL WIND Toolkit, the secondary source.
    Wtk,
}

impl DataModel {
    pub const ALL: [DataModel; 2] = [DataModel::Era5, DataModel::Wtk];

    /// The path and query token used by the API and share URLs.
    pub fn key(&self) -> &'static str {
        match self {
            DataModel::Era5 => "era5",
            DataModel::Wtk => "wtk",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DataModel::Era5 => "ERA5",
            DataModel::Wtk => "WTK",
        }
    }

    pub fn hub_heights(&self) -> &'static [u32] {
        match self {
            DataModel::Era5 => &ERA5_HUB_HEIGHTS,
            DataModel::Wtk => &WTK_HUB_HEIGHTS,
        }
    }

    pub fn bounds(&self) -> ModelBounds {
        match self {
            DataModel::Era5 => ERA5_BOUNDS,
            DataModel::Wtk => WTK_BOUNDS,
        }
    }

    /// Only ERA5 publishes ensemble estimates.
    pub fn supports_ensemble(&self) -> bool {
        matches!(self, DataModel::Era5)
    }

    /// Parse one of the two recognized tokens, `era5` or `wtk`, exactly.
    pub fn from_token(token: &str) -> Option<DataModel> {
        match token {
            "era5" => Some(DataModel::Era5),
            "wtk" => Some(DataModel::Wtk),
            _ => None,
        }
    }
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DataModel {
    type Err = String;

    /// Command-line form: trimmed and case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataModel::from_token(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown data model: {}", s))
    }
}

/// Snap `requested` to the nearest entry of `heights`.
///
/// Nearest by absolute difference; on a tie the candidate seen first wins.
/// An empty candidate list leaves the request unchanged.
pub fn snap_hub_height(requested: u32, heights: &[u32]) -> u32 {
    let mut best: Option<(u32, u32)> = None;
    for &candidate in heights {
        let diff = candidate.abs_diff(requested);
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((candidate, diff)),
        }
    }
    best.map(|(height, _)| height).unwrap_or(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_nearest_with_first_candidate_on_tie() {
        let heights = [30, 40, 50, 60, 80, 100];
        assert_eq!(snap_hub_height(45, &heights), 40);
        assert_eq!(snap_hub_height(70, &heights), 60);
        assert_eq!(snap_hub_height(90, &heights), 80);
    }

    #[test]
    fn snap_keeps_exact_members_and_clamps_outliers() {
        let heights = [30, 40, 50, 60, 80, 100];
        assert_eq!(snap_hub_height(60, &heights), 60);
        assert_eq!(snap_hub_height(10, &heights), 30);
        assert_eq!(snap_hub_height(200, &heights), 100);
    }

    #[test]
    fn snap_with_no_candidates_is_identity() {
        assert_eq!(snap_hub_height(55, &[]), 55);
    }

    #[test]
    fn tokens_match_exactly() {
        assert_eq!(DataModel::from_token("era5"), Some(DataModel::Era5));
        assert_eq!(DataModel::from_token("wtk"), Some(DataModel::Wtk));
        assert_eq!(DataModel::from_token("ERA5"), None);
        assert_eq!(DataModel::from_token(" wtk "), None);
        assert_eq!(DataModel::from_token("merra2"), None);
    }

    #[test]
    fn command_line_parse_is_lenient() {
        assert_eq!(" WTK ".parse::<DataModel>(), Ok(DataModel::Wtk));
        assert!("merra2".parse::<DataModel>().is_err());
    }

    #[test]
    fn ensemble_is_era5_only() {
        assert!(DataModel::Era5.supports_ensemble());
        assert!(!DataModel::Wtk.supports_ensemble());
    }

    #[test]
    fn serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&DataModel::Wtk).unwrap();
        assert_eq!(json, "\"wtk\"");
        let model: DataModel = serde_json::from_str("\"era5\"").unwrap();
        assert_eq!(model, DataModel::Era5);
    }
}
