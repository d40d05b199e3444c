//! Static postal-prefix to state mapping.
//!
//! The first three digits of a US ZIP code determine the destination state
//! or territory. Used on cold lookups where no freshness row has resolved a
//! state yet.

/// Returns the two-letter state/territory code for a 5-digit ZIP, or `None`
/// for unassigned prefixes.
pub fn state_for_zip(zip: &str) -> Option<&'static str> {
    let prefix: u32 = zip.get(..3)?.parse().ok()?;
    let state = match prefix {
        5 => "NY",
        6 | 7 | 9 => "PR",
        8 => "VI",
        10..=27 => "MA",
        28..=29 => "RI",
        30..=38 => "NH",
        39..=49 => "ME",
        50..=59 => "VT",
        60..=69 => "CT",
        70..=89 => "NJ",
        90..=98 => "AE",
        100..=149 => "NY",
        150..=196 => "PA",
        197..=199 => "DE",
        200 | 202..=205 | 569 => "DC",
        201 | 220..=246 => "VA",
        206..=219 => "MD",
        247..=268 => "WV",
        270..=289 => "NC",
        290..=299 => "SC",
        300..=319 | 398..=399 => "GA",
        340 => "AA",
        320..=349 => "FL",
        350..=369 => "AL",
        370..=385 => "TN",
        386..=397 => "MS",
        400..=427 => "KY",
        430..=459 => "OH",
        460..=479 => "IN",
        480..=499 => "MI",
        500..=528 => "IA",
        530..=549 => "WI",
        550..=567 => "MN",
        570..=577 => "SD",
        580..=588 => "ND",
        590..=599 => "MT",
        600..=629 => "IL",
        630..=658 => "MO",
        660..=679 => "KS",
        680..=693 => "NE",
        700..=714 => "LA",
        716..=729 => "AR",
        733 | 750..=799 | 885 => "TX",
        730..=749 => "OK",
        800..=816 => "CO",
        820..=831 => "WY",
        832..=838 => "ID",
        840..=847 => "UT",
        850..=865 => "AZ",
        870..=884 => "NM",
        889..=898 => "NV",
        900..=961 => "CA",
        962..=966 => "AP",
        967..=968 => "HI",
        969 => "GU",
        970..=979 => "OR",
        980..=994 => "WA",
        995..=999 => "AK",
        _ => return None,
    };
    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes() {
        assert_eq!(state_for_zip("47401"), Some("IN"));
        assert_eq!(state_for_zip("90001"), Some("CA"));
        assert_eq!(state_for_zip("10001"), Some("NY"));
        assert_eq!(state_for_zip("20500"), Some("DC"));
        assert_eq!(state_for_zip("20101"), Some("VA"));
        assert_eq!(state_for_zip("73301"), Some("TX"));
        assert_eq!(state_for_zip("73044"), Some("OK"));
        assert_eq!(state_for_zip("00901"), Some("PR"));
        assert_eq!(state_for_zip("99501"), Some("AK"));
    }

    #[test]
    fn unassigned_prefixes() {
        assert_eq!(state_for_zip("00000"), None);
        assert_eq!(state_for_zip("00401"), None);
        assert_eq!(state_for_zip("21300"), None);
        assert_eq!(state_for_zip("88600"), None);
    }

    #[test]
    fn boundary_codes_do_not_panic() {
        // Valid by the 5-digit regex even when no state resolves.
        assert_eq!(state_for_zip("99999"), Some("AK"));
        assert_eq!(state_for_zip(""), None);
        assert_eq!(state_for_zip("1"), None);
    }
}
