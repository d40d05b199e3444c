//! GraphQL documents sent by the client.

/// Shared officeholder selection set.
const OFFICE_HOLDER_FIELDS: &str = r#"
  databaseId
  officeTitle
  totalYearsInOffice
  isAppointed
  isVacant
  isOffCycle
  startAt
  endAt
  person {
    id
    databaseId
    slug
    firstName
    middleName
    lastName
    nickname
    suffix
    party { name shortName }
    photoUrl
    bioText
    urls
    email
    contacts { phone fax email contactType }
    addresses { addressLine1 addressLine2 city state zip phone fax }
    degrees { degree major school gradYear }
    experiences { title organization startYear endYear experienceType }
    identifiers { identifierType identifierValue }
    images { url imageType }
  }
  position {
    databaseId
    name
    description
    level
    judicial
    retention
    state
    city
    label
    seats
    mtfcc
    geoId
    ocdId
    partisanType
    salary
    appointed
    electionFrequency
    hasUnknownBoundaries
    normalizedPosition { name }
  }
"#;

pub fn office_holders_by_zip() -> String {
    format!(
        r#"query OfficeHoldersByZip($zip: String!, $first: Int!, $after: String) {{
  officeHolders(location: {{ zip: $zip }}, first: $first, after: $after) {{
    edges {{ node {{ {fields} }} }}
    pageInfo {{ hasNextPage endCursor }}
  }}
}}"#,
        fields = OFFICE_HOLDER_FIELDS
    )
}

pub fn office_holders_by_address() -> String {
    format!(
        r#"query OfficeHoldersByAddress($address: String!, $first: Int!, $after: String) {{
  officeHolders(location: {{ address: $address }}, first: $first, after: $after) {{
    edges {{ node {{ {fields} }} }}
    pageInfo {{ hasNextPage endCursor }}
  }}
}}"#,
        fields = OFFICE_HOLDER_FIELDS
    )
}

pub const PERSON_CANDIDACIES: &str = r#"query PersonCandidacies($id: ID!) {
  node(id: $id) {
    ... on Person {
      id
      candidacies {
        databaseId
        result
        status
        party { name shortName }
        election { name electionDay }
        position { name level }
        endorsements {
          organization { databaseId name logoUrl websiteUrl }
        }
        stances {
          statement
          referenceUrl
          issue {
            databaseId
            name
            parentIssue {
              databaseId
              name
              parentIssue { databaseId name }
            }
          }
        }
      }
    }
  }
}"#;

pub const RACES_BY_ZIP: &str = r#"query RacesByZip($zip: String!, $electionDay: ISO8601Date!, $first: Int!, $after: String) {
  races(location: { zip: $zip }, filterBy: { electionDay: { gt: $electionDay } }, first: $first, after: $after) {
    edges {
      node {
        databaseId
        election { name electionDay }
        position { name level }
        candidacies {
          person { firstName lastName }
          party { name shortName }
        }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}"#;

pub const POSITION_CONTAINMENT_BY_ZIP: &str = r#"query PositionContainment($zip: String!, $first: Int!, $after: String) {
  positions(location: { zip: $zip }, includingContainment: true, first: $first, after: $after) {
    edges {
      node {
        databaseId
        containsGeography
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}"#;

pub const HEALTH: &str = "query Health { __typename }";
