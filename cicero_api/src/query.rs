//! Query builder for the officials endpoint.

use url::Url;

/// Query parameters for `/official`. Built fluently, serialized onto the
/// request URL.
#[derive(Default, Clone)]
pub struct OfficialQuery {
    pub search_loc: Option<String>,
    pub district_types: Vec<String>,
    pub max: Option<i64>,
    pub offset: Option<i64>,
}

impl OfficialQuery {
    /// Search by 5-digit postal code.
    pub fn with_postal(mut self, postal: &str) -> Self {
        self.search_loc = Some(postal.to_string());
        self
    }

    /// Restrict to the given district-type strings (repeatable parameter).
    pub fn with_district_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.district_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Appends this query's parameters to the given URL, returning the
    /// modified URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(loc) = &self.search_loc {
            url.query_pairs_mut().append_pair("search_loc", loc);
        }
        for district_type in self.district_types.iter() {
            url.query_pairs_mut()
                .append_pair("district_type", district_type);
        }
        if let Some(max) = self.max {
            url.query_pairs_mut().append_pair("max", &max.to_string());
        }
        if let Some(offset) = self.offset {
            url.query_pairs_mut()
                .append_pair("offset", &offset.to_string());
        }
        url.query_pairs_mut().append_pair("format", "json");
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_serializes_all_params() {
        let url = Url::parse("https://api.example.com/v3.1/official").unwrap();
        let query = OfficialQuery::default()
            .with_postal("47401")
            .with_district_types(["NATIONAL_UPPER", "NATIONAL_LOWER"])
            .with_max(199)
            .with_offset(199);
        let url = query.add_to_url(&url);
        let q = url.query().unwrap();
        assert!(q.contains("search_loc=47401"));
        assert!(q.contains("district_type=NATIONAL_UPPER"));
        assert!(q.contains("district_type=NATIONAL_LOWER"));
        assert!(q.contains("max=199"));
        assert!(q.contains("offset=199"));
        assert!(q.contains("format=json"));
    }

    #[test]
    fn query_omits_unset_params() {
        let url = Url::parse("https://api.example.com/v3.1/official").unwrap();
        let url = OfficialQuery::default().add_to_url(&url);
        let q = url.query().unwrap();
        assert!(!q.contains("search_loc"));
        assert!(!q.contains("offset"));
        assert!(q.contains("format=json"));
    }
}
