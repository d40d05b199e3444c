//! District classification: the closed district-type enum and the mapping
//! from provider position levels onto it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of an electoral district. Drives read-side filtering and
/// the elected/appointed derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistrictType {
    #[serde(rename = "NATIONAL_EXEC")]
    NationalExec,
    #[serde(rename = "NATIONAL_UPPER")]
    NationalUpper,
    #[serde(rename = "NATIONAL_LOWER")]
    NationalLower,
    #[serde(rename = "STATE_EXEC")]
    StateExec,
    #[serde(rename = "STATE_UPPER")]
    StateUpper,
    #[serde(rename = "STATE_LOWER")]
    StateLower,
    #[serde(rename = "COUNTY")]
    County,
    #[serde(rename = "LOCAL")]
    Local,
    #[serde(rename = "LOCAL_EXEC")]
    LocalExec,
    #[serde(rename = "SCHOOL")]
    School,
    #[serde(rename = "JUDICIAL")]
    Judicial,
}

/// District types served through postal membership rows rather than
/// state/federal tier queries.
pub const LOCAL_TYPES: &[DistrictType] = &[
    DistrictType::LocalExec,
    DistrictType::Local,
    DistrictType::County,
    DistrictType::School,
    DistrictType::Judicial,
];

/// Legislator and state-official types filtered by state on the read path.
pub const STATE_TIER_TYPES: &[DistrictType] = &[
    DistrictType::NationalUpper,
    DistrictType::NationalLower,
    DistrictType::StateExec,
    DistrictType::StateUpper,
    DistrictType::StateLower,
];

impl DistrictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalExec => "NATIONAL_EXEC",
            Self::NationalUpper => "NATIONAL_UPPER",
            Self::NationalLower => "NATIONAL_LOWER",
            Self::StateExec => "STATE_EXEC",
            Self::StateUpper => "STATE_UPPER",
            Self::StateLower => "STATE_LOWER",
            Self::County => "COUNTY",
            Self::Local => "LOCAL",
            Self::LocalExec => "LOCAL_EXEC",
            Self::School => "SCHOOL",
            Self::Judicial => "JUDICIAL",
        }
    }

    /// Whether this type is served via postal membership rows.
    pub fn is_local(&self) -> bool {
        LOCAL_TYPES.contains(self)
    }

    /// Sort rank for read-side ordering: national first, local last.
    pub fn rank(&self) -> u8 {
        match self {
            Self::NationalExec => 0,
            Self::NationalUpper => 1,
            Self::NationalLower => 2,
            Self::StateExec => 3,
            Self::StateUpper => 4,
            Self::StateLower => 5,
            Self::County => 6,
            Self::LocalExec => 7,
            Self::Local => 8,
            Self::School => 9,
            Self::Judicial => 10,
        }
    }
}

impl fmt::Display for DistrictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistrictType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NATIONAL_EXEC" => Ok(Self::NationalExec),
            "NATIONAL_UPPER" => Ok(Self::NationalUpper),
            "NATIONAL_LOWER" => Ok(Self::NationalLower),
            "STATE_EXEC" => Ok(Self::StateExec),
            "STATE_UPPER" => Ok(Self::StateUpper),
            "STATE_LOWER" => Ok(Self::StateLower),
            "COUNTY" => Ok(Self::County),
            "LOCAL" => Ok(Self::Local),
            "LOCAL_EXEC" => Ok(Self::LocalExec),
            "SCHOOL" => Ok(Self::School),
            "JUDICIAL" => Ok(Self::Judicial),
            _ => Err(()),
        }
    }
}

/// Position level as reported by the GraphQL provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionLevel {
    Federal,
    State,
    County,
    City,
    Local,
    Township,
    Regional,
    Unknown,
}

impl PositionLevel {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "FEDERAL" => Self::Federal,
            "STATE" => Self::State,
            "COUNTY" => Self::County,
            "CITY" => Self::City,
            "LOCAL" => Self::Local,
            "TOWNSHIP" => Self::Township,
            "REGIONAL" => Self::Regional,
            _ => Self::Unknown,
        }
    }
}

/// Statewide executive titles that classify a STATE-level position as
/// STATE_EXEC.
const STATE_EXEC_TITLES: &[&str] = &[
    "governor",
    "lt. governor",
    "lieutenant governor",
    "secretary of state",
    "attorney general",
    "treasurer",
    "auditor",
    "comptroller",
];

fn contains_senator(name: &str) -> bool {
    name.contains("senator") || name.contains("senate")
}

/// Maps a provider position onto the district-type enum.
///
/// Total over all inputs: anything unrecognized falls through to LOCAL.
/// Matching is case-insensitive on the normalized position name.
pub fn map_district_type(level: PositionLevel, judicial: bool, name: &str) -> DistrictType {
    let name = name.to_lowercase();
    match level {
        PositionLevel::Federal => {
            if name.contains("president") {
                DistrictType::NationalExec
            } else if contains_senator(&name) {
                DistrictType::NationalUpper
            } else {
                DistrictType::NationalLower
            }
        }
        PositionLevel::State => {
            if judicial {
                DistrictType::Judicial
            } else if STATE_EXEC_TITLES.iter().any(|t| name.contains(t)) {
                DistrictType::StateExec
            } else if contains_senator(&name) {
                DistrictType::StateUpper
            } else {
                DistrictType::StateLower
            }
        }
        PositionLevel::County | PositionLevel::Regional => DistrictType::County,
        PositionLevel::City => {
            if name.contains("mayor") {
                DistrictType::LocalExec
            } else {
                DistrictType::Local
            }
        }
        PositionLevel::Local => {
            if name.contains("school") {
                DistrictType::School
            } else if judicial {
                DistrictType::Judicial
            } else {
                DistrictType::Local
            }
        }
        PositionLevel::Township => {
            if name.contains("mayor") || (name.contains("trustee") && name.contains("president")) {
                DistrictType::LocalExec
            } else {
                DistrictType::Local
            }
        }
        PositionLevel::Unknown => DistrictType::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn federal_precedence() {
        assert_eq!(
            map_district_type(PositionLevel::Federal, false, "President of the United States"),
            DistrictType::NationalExec
        );
        assert_eq!(
            map_district_type(PositionLevel::Federal, false, "Vice President"),
            DistrictType::NationalExec
        );
        assert_eq!(
            map_district_type(PositionLevel::Federal, false, "US Senator"),
            DistrictType::NationalUpper
        );
        assert_eq!(
            map_district_type(PositionLevel::Federal, false, "US Senate"),
            DistrictType::NationalUpper
        );
        assert_eq!(
            map_district_type(PositionLevel::Federal, false, "US Representative"),
            DistrictType::NationalLower
        );
    }

    #[test]
    fn state_judicial_wins_over_exec_title() {
        assert_eq!(
            map_district_type(PositionLevel::State, true, "Attorney General"),
            DistrictType::Judicial
        );
    }

    #[test]
    fn state_exec_titles() {
        for title in [
            "Governor",
            "Lt. Governor",
            "Secretary of State",
            "Attorney General",
            "State Treasurer",
            "State Auditor",
            "Comptroller",
        ] {
            assert_eq!(
                map_district_type(PositionLevel::State, false, title),
                DistrictType::StateExec,
                "title: {}",
                title
            );
        }
    }

    #[test]
    fn state_chambers() {
        assert_eq!(
            map_district_type(PositionLevel::State, false, "State Senator"),
            DistrictType::StateUpper
        );
        assert_eq!(
            map_district_type(PositionLevel::State, false, "State Representative"),
            DistrictType::StateLower
        );
    }

    #[test]
    fn county_and_regional() {
        assert_eq!(
            map_district_type(PositionLevel::County, false, "County Commissioner"),
            DistrictType::County
        );
        assert_eq!(
            map_district_type(PositionLevel::Regional, false, "Water Board Member"),
            DistrictType::County
        );
    }

    #[test]
    fn city_mayor_vs_council() {
        assert_eq!(
            map_district_type(PositionLevel::City, false, "Mayor"),
            DistrictType::LocalExec
        );
        assert_eq!(
            map_district_type(PositionLevel::City, false, "City Council Member"),
            DistrictType::Local
        );
    }

    #[test]
    fn local_school_and_judicial() {
        assert_eq!(
            map_district_type(PositionLevel::Local, false, "School Board Member"),
            DistrictType::School
        );
        assert_eq!(
            map_district_type(PositionLevel::Local, true, "Municipal Judge"),
            DistrictType::Judicial
        );
        assert_eq!(
            map_district_type(PositionLevel::Local, false, "Library Trustee"),
            DistrictType::Local
        );
    }

    #[test]
    fn township_trustee_president() {
        assert_eq!(
            map_district_type(PositionLevel::Township, false, "President of the Board of Trustees"),
            DistrictType::LocalExec
        );
        assert_eq!(
            map_district_type(PositionLevel::Township, false, "Township Trustee"),
            DistrictType::Local
        );
        assert_eq!(
            map_district_type(PositionLevel::Township, false, "Township Mayor"),
            DistrictType::LocalExec
        );
    }

    #[test]
    fn unknown_falls_to_local() {
        assert_eq!(
            map_district_type(PositionLevel::Unknown, false, "Mystery Office"),
            DistrictType::Local
        );
        assert_eq!(
            map_district_type(PositionLevel::parse("GALACTIC"), true, ""),
            DistrictType::Local
        );
    }

    #[test]
    fn mapping_is_total_over_levels() {
        // Every (level, judicial) pair yields a value for an arbitrary name.
        let levels = [
            PositionLevel::Federal,
            PositionLevel::State,
            PositionLevel::County,
            PositionLevel::City,
            PositionLevel::Local,
            PositionLevel::Township,
            PositionLevel::Regional,
            PositionLevel::Unknown,
        ];
        for level in levels {
            for judicial in [false, true] {
                let _ = map_district_type(level, judicial, "anything at all");
            }
        }
    }

    #[test]
    fn roundtrip_str() {
        for dt in [
            DistrictType::NationalExec,
            DistrictType::NationalUpper,
            DistrictType::NationalLower,
            DistrictType::StateExec,
            DistrictType::StateUpper,
            DistrictType::StateLower,
            DistrictType::County,
            DistrictType::Local,
            DistrictType::LocalExec,
            DistrictType::School,
            DistrictType::Judicial,
        ] {
            assert_eq!(dt.as_str().parse::<DistrictType>(), Ok(dt));
        }
        assert!("SOMETHING_ELSE".parse::<DistrictType>().is_err());
    }
}
