//! Store-level integration tests. These need a real Postgres with the
//! postgis and uuid-ossp extensions available; they skip themselves when
//! DATABASE_URL is not set.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use civica_lib::district::DistrictType;
use civica_lib::provider::{Provider, ProviderError};
use civica_lib::record::{
    AddressRecord, ChamberRecord, CommitteeRecord, DistrictRecord, GovernmentRecord,
    IdentifierRecord, OfficeRecord, OfficialRecord,
};
use civica_lib::{candidacy, freshness, locks, read, upsert, warm, Db, WarmOutcome};

async fn test_db() -> Option<Db> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = Db::connect(&url).await.expect("connect to test database");
    db.init().await.expect("apply schema");
    Some(db)
}

fn make_record(nonce: &str, n: u32, district_type: DistrictType) -> OfficialRecord {
    let state = Some("IN".to_string());
    OfficialRecord {
        external_id: format!("test-{}-{}", nonce, n),
        global_id: Some(format!("gid-{}-{}", nonce, n)),
        source: "test".to_string(),
        slug: None,
        first_name: "Ada".to_string(),
        middle_name: None,
        last_name: format!("Official{}", n),
        preferred_name: None,
        name_suffix: None,
        party: Some("Independent".to_string()),
        party_short: Some("I".to_string()),
        photo_url: Some(format!("https://example.com/{}.jpg", n)),
        urls: vec!["https://example.gov".to_string()],
        emails: vec![format!("official{}@example.gov", n)],
        biography: None,
        total_years_in_office: Some(3),
        is_appointed: false,
        is_vacant: false,
        is_off_cycle: false,
        valid_from: None,
        valid_to: None,
        office: OfficeRecord {
            title: format!("Council Member {}", n),
            representing_state: state.clone(),
            representing_city: Some("Bloomington".to_string()),
            description: None,
            seats: Some(1),
            position_name: Some("Council Member".to_string()),
            partisan_type: None,
            salary: None,
            is_appointed: false,
            district: DistrictRecord {
                external_id: format!("test-district-{}-{}", nonce, n),
                ocd_id: None,
                label: Some("Test District".to_string()),
                district_type,
                state: state.clone(),
                city: Some("Bloomington".to_string()),
                mtfcc: Some("G4110".to_string()),
                num_officials: Some(1),
                valid_from: None,
                valid_to: None,
                geo_id: Some(format!("geo-{}-{}", nonce, n)),
                is_judicial: district_type == DistrictType::Judicial,
                has_unknown_boundaries: false,
                is_retention: false,
            },
            chamber: ChamberRecord {
                external_id: format!("test-chamber-{}-{}", nonce, n),
                name: "City Council".to_string(),
                name_formal: None,
                official_count: Some(9),
                term_length: Some("4 years".to_string()),
                term_limit: None,
                inauguration_rules: None,
                election_rules: None,
                vacancy_rules: None,
                election_frequency: Some("4 years".to_string()),
                remarks: None,
                has_staggered_terms: false,
                government: GovernmentRecord {
                    name: format!("City of Bloomington {}", nonce),
                    gov_type: "CITY".to_string(),
                    state: "IN".to_string(),
                    city: "Bloomington".to_string(),
                },
            },
        },
        addresses: vec![AddressRecord {
            address_1: Some("401 N Morton St".to_string()),
            city: Some("Bloomington".to_string()),
            state: state.clone(),
            postal_code: Some("47404".to_string()),
            phone_1: Some("812-349-3400".to_string()),
            ..Default::default()
        }],
        identifiers: vec![IdentifierRecord {
            identifier_type: "TWITTER".to_string(),
            identifier_value: format!("Official{}", n),
        }],
        committees: vec![CommitteeRecord {
            name: "Public Safety".to_string(),
            position: Some("Member".to_string()),
        }],
        images: Vec::new(),
        degrees: Vec::new(),
        experiences: Vec::new(),
        contacts: Vec::new(),
    }
}

#[tokio::test]
async fn upsert_is_idempotent() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let nonce = Uuid::new_v4().simple().to_string();
    let record = make_record(&nonce, 1, DistrictType::Local);

    let t = Utc::now();
    let first = upsert::upsert_official(db.pool(), &record, t).await.unwrap();
    let second = upsert::upsert_official(db.pool(), &record, t).await.unwrap();
    assert_eq!(first, second);

    let offices: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM offices WHERE politician_id = $1")
            .bind(first)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(offices, 1);

    let addresses: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM addresses WHERE politician_id = $1")
            .bind(first)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(addresses, 1);

    let identifiers: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM identifiers WHERE politician_id = $1")
            .bind(first)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(identifiers, 1);

    // The official points at its office row.
    let office_id: Option<Uuid> =
        sqlx::query_scalar("SELECT office_id FROM officials WHERE id = $1")
            .bind(first)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert!(office_id.is_some());
}

#[tokio::test]
async fn empty_photo_url_keeps_existing() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let nonce = Uuid::new_v4().simple().to_string();
    let mut record = make_record(&nonce, 2, DistrictType::Local);

    let id = upsert::upsert_official(db.pool(), &record, Utc::now())
        .await
        .unwrap();

    record.photo_url = None;
    upsert::upsert_official(db.pool(), &record, Utc::now())
        .await
        .unwrap();

    let photo: Option<String> =
        sqlx::query_scalar("SELECT photo_url FROM officials WHERE id = $1")
            .bind(id)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(photo.as_deref(), Some("https://example.com/2.jpg"));
}

struct StubProvider {
    records: Mutex<Vec<OfficialRecord>>,
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_by_postal(
        &self,
        _postal: &str,
        filter: Option<&[DistrictType]>,
    ) -> Result<Vec<OfficialRecord>, ProviderError> {
        let records = self.records.lock().unwrap().clone();
        Ok(match filter {
            Some(types) => records
                .into_iter()
                .filter(|r| types.contains(&r.office.district.district_type))
                .collect(),
            None => records,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[tokio::test]
async fn local_warm_stamps_and_sweeps_memberships() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let nonce = Uuid::new_v4().simple().to_string();
    // A synthetic postal outside the real prefix table keeps this run
    // isolated from other tests.
    let postal = format!("{:05}", std::process::id() % 100_000);

    let a = make_record(&nonce, 10, DistrictType::Local);
    let b = make_record(&nonce, 11, DistrictType::School);
    let provider = StubProvider {
        records: Mutex::new(vec![a.clone(), b.clone()]),
    };

    let outcome = warm::warm_local(&db, &provider, &postal).await.unwrap();
    assert_eq!(outcome, WarmOutcome::Completed);

    let memberships: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM postal_memberships WHERE postal = $1")
            .bind(&postal)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(memberships, 2);

    let view = freshness::check_postal(db.pool(), &postal, chrono::Duration::days(90))
        .await
        .unwrap();
    assert!(view.local_fresh);
    assert!(view.federal_fresh);
    assert!(view.state_fresh);
    assert_eq!(view.state.as_deref(), Some("IN"));

    // Second warm no longer observes official B: its membership expires.
    *provider.records.lock().unwrap() = vec![a.clone()];
    warm::warm_local(&db, &provider, &postal).await.unwrap();

    let remaining: Vec<Uuid> = sqlx::query_scalar(
        "SELECT official_id FROM postal_memberships WHERE postal = $1",
    )
    .bind(&postal)
    .fetch_all(db.pool())
    .await
    .unwrap();
    assert_eq!(remaining.len(), 1);

    let kept_external: String =
        sqlx::query_scalar("SELECT external_id FROM officials WHERE id = $1")
            .bind(remaining[0])
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(kept_external, a.external_id);
}

#[tokio::test]
async fn membership_only_for_local_types() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let nonce = Uuid::new_v4().simple().to_string();
    let postal = format!("{:05}", (std::process::id() + 7) % 100_000);

    let mut senator = make_record(&nonce, 20, DistrictType::NationalUpper);
    senator.office.title = "Senator".to_string();
    let mayor = make_record(&nonce, 21, DistrictType::LocalExec);
    let provider = StubProvider {
        records: Mutex::new(vec![senator, mayor.clone()]),
    };

    warm::warm_local(&db, &provider, &postal).await.unwrap();

    let rows: Vec<Uuid> =
        sqlx::query_scalar("SELECT official_id FROM postal_memberships WHERE postal = $1")
            .bind(&postal)
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(rows.len(), 1);

    let external: String =
        sqlx::query_scalar("SELECT external_id FROM officials WHERE id = $1")
            .bind(rows[0])
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(external, mayor.external_id);
}

#[tokio::test]
async fn advisory_locks_coalesce() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let key = format!("test-lock-{}", Uuid::new_v4().simple());

    let guard = locks::try_acquire(db.pool(), &key).await.unwrap();
    assert!(guard.is_some());

    // A second acquire from another connection is refused while held.
    let second = locks::try_acquire(db.pool(), &key).await.unwrap();
    assert!(second.is_none());
    assert!(locks::probe_held(db.pool(), &key).await.unwrap());

    guard.unwrap().release().await;
    assert!(!locks::probe_held(db.pool(), &key).await.unwrap());

    let third = locks::try_acquire(db.pool(), &key).await.unwrap();
    assert!(third.is_some());
    third.unwrap().release().await;
}

#[tokio::test]
async fn read_by_postal_unions_tiers() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let nonce = Uuid::new_v4().simple().to_string();
    let postal = format!("{:05}", (std::process::id() + 13) % 100_000);
    let t = Utc::now();

    let mut president = make_record(&nonce, 30, DistrictType::NationalExec);
    president.office.title = "President".to_string();
    let mut senator = make_record(&nonce, 31, DistrictType::NationalUpper);
    senator.office.title = "Senator".to_string();
    let council = make_record(&nonce, 32, DistrictType::Local);

    upsert::upsert_official(db.pool(), &president, t).await.unwrap();
    upsert::upsert_official(db.pool(), &senator, t).await.unwrap();
    let council_id = upsert::upsert_official(db.pool(), &council, t).await.unwrap();

    sqlx::query(
        "INSERT INTO postal_memberships (postal, official_id, last_seen, is_contained)
         VALUES ($1, $2, $3, TRUE)
         ON CONFLICT (postal, official_id) DO UPDATE SET last_seen = excluded.last_seen",
    )
    .bind(&postal)
    .bind(council_id)
    .bind(t)
    .execute(db.pool())
    .await
    .unwrap();

    let views = read::read_by_postal(db.pool(), &postal, Some("IN")).await.unwrap();
    let externals: Vec<&str> = views.iter().map(|v| v.external_id.as_str()).collect();
    assert!(externals.contains(&president.external_id.as_str()));
    assert!(externals.contains(&senator.external_id.as_str()));
    assert!(externals.contains(&council.external_id.as_str()));

    // National tiers order before locals.
    let pres_pos = externals
        .iter()
        .position(|e| *e == president.external_id)
        .unwrap();
    let council_pos = externals
        .iter()
        .position(|e| *e == council.external_id)
        .unwrap();
    assert!(pres_pos < council_pos);

    // Senators are elected by district type; the council member carries an
    // election frequency.
    let senator_view = views
        .iter()
        .find(|v| v.external_id == senator.external_id)
        .unwrap();
    assert!(senator_view.is_elected);

    // Children arrive batched.
    let council_view = views
        .iter()
        .find(|v| v.external_id == council.external_id)
        .unwrap();
    assert_eq!(council_view.committees.len(), 1);
}

#[tokio::test]
async fn candidacy_graph_upserts_with_parent_issues() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    use civica_lib::record::{
        CandidacyRecord, EndorsementRecord, IssueRecord, OrganizationRecord, PersonCandidacies,
        StanceRecord,
    };

    let nonce = Uuid::new_v4().simple().to_string();
    let record = make_record(&nonce, 40, DistrictType::Local);
    let official_id = upsert::upsert_official(db.pool(), &record, Utc::now())
        .await
        .unwrap();

    let person = PersonCandidacies {
        global_id: record.global_id.clone().unwrap(),
        candidacies: vec![CandidacyRecord {
            external_id: format!("cand-{}", nonce),
            election_name: Some("General Election".to_string()),
            election_day: Some("2026-11-03".to_string()),
            position_name: Some("Council Member".to_string()),
            status: Some("certified".to_string()),
            result: None,
            party: Some("Independent".to_string()),
            endorsements: vec![EndorsementRecord {
                organization: OrganizationRecord {
                    external_id: format!("org-{}", nonce),
                    name: "League of Example Voters".to_string(),
                    logo_url: None,
                    website_url: None,
                },
            }],
            stances: vec![StanceRecord {
                statement: Some("Supports more buses".to_string()),
                reference_url: None,
                issue: IssueRecord {
                    external_id: format!("issue-child-{}", nonce),
                    name: "Bus Service".to_string(),
                    parent: Some(Box::new(IssueRecord {
                        external_id: format!("issue-parent-{}", nonce),
                        name: "Transit".to_string(),
                        parent: None,
                    })),
                },
            }],
        }],
    };

    assert!(!candidacy::has_election_records(db.pool(), official_id)
        .await
        .unwrap());

    // Replay is idempotent.
    candidacy::upsert_candidacies(db.pool(), official_id, &person)
        .await
        .unwrap();
    candidacy::upsert_candidacies(db.pool(), official_id, &person)
        .await
        .unwrap();

    assert!(candidacy::has_election_records(db.pool(), official_id)
        .await
        .unwrap());

    let elections = candidacy::elections_for(db.pool(), official_id).await.unwrap();
    assert_eq!(elections.len(), 1);

    let endorsements = candidacy::endorsements_for(db.pool(), official_id)
        .await
        .unwrap();
    assert_eq!(endorsements.len(), 1);
    assert_eq!(endorsements[0].organization_name, "League of Example Voters");

    let stances = candidacy::stances_for(db.pool(), official_id).await.unwrap();
    assert_eq!(stances.len(), 1);
    assert_eq!(stances[0].issue_name, "Bus Service");
    assert_eq!(stances[0].parent_issue_name.as_deref(), Some("Transit"));
}

#[tokio::test]
async fn geofence_point_in_polygon_round_trip() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let nonce = Uuid::new_v4().simple().to_string();
    let geo_id = format!("geo-fence-{}", nonce);

    // Unit square around the origin.
    civica_lib::geo::upsert_geofence(
        db.pool(),
        &geo_id,
        "G4110",
        Some("Test Fence"),
        "POLYGON((-1 -1, -1 1, 1 1, 1 -1, -1 -1))",
    )
    .await
    .unwrap();

    let hits = civica_lib::geo::find_containing(db.pool(), 0.5, 0.5)
        .await
        .unwrap();
    assert!(hits.iter().any(|h| h.geo_id == geo_id));

    let misses = civica_lib::geo::find_containing(db.pool(), 45.0, -93.0)
        .await
        .unwrap();
    assert!(!misses.iter().any(|h| h.geo_id == geo_id));

    // Replays update in place under the (geo_id, mtfcc) key.
    civica_lib::geo::upsert_geofence(
        db.pool(),
        &geo_id,
        "G4110",
        Some("Test Fence v2"),
        "POLYGON((-2 -2, -2 2, 2 2, 2 -2, -2 -2))",
    )
    .await
    .unwrap();
    let hits = civica_lib::geo::find_containing(db.pool(), 1.5, 1.5)
        .await
        .unwrap();
    assert!(hits.iter().any(|h| h.geo_id == geo_id));
}
