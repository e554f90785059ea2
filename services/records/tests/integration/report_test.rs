use bson::{Bson, doc};

use pelfish_records::domain::types::{RoleCount, TimelinePoint};
use pelfish_records::usecase::reports::biodiversity::BiodiversityUseCase;
use pelfish_records::usecase::reports::geographic::GeographicUseCase;
use pelfish_records::usecase::reports::threat::ThreatDistributionUseCase;
use pelfish_records::usecase::reports::user_activity::UserActivityUseCase;
use pelfish_records_schema::{records, users};
use pelfish_testing::fixture::{RecordFixture, UserFixture};
use pelfish_testing::store::MemoryStore;

use crate::helpers::{at, test_now};

fn store_with(docs: Vec<bson::Document>) -> MemoryStore {
    MemoryStore::new().with(records::COLLECTION, docs)
}

// ── Threat distribution ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_split_five_records_by_threat() {
    let store = store_with(vec![
        RecordFixture::new("r1").threat("Harmless").build(),
        RecordFixture::new("r2").threat("Harmless").build(),
        RecordFixture::new("r3").threat("Unpredictable").build(),
        RecordFixture::new("r4").threat("Harmless").build(),
        RecordFixture::new("r5").set(records::THREAT, Bson::Null).build(),
    ]);

    let report = ThreatDistributionUseCase { store }.execute().await.unwrap();

    assert_eq!(report.total, 5);
    let rows: Vec<(&str, u64, &str)> = report
        .data
        .iter()
        .map(|s| (s.threat.as_str(), s.count, s.percentage.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Harmless", 3, "60.00"),
            ("Unknown", 1, "20.00"),
            ("Unpredictable", 1, "20.00"),
        ]
    );
}

#[tokio::test]
async fn should_report_zero_total_on_empty_store() {
    let report = ThreatDistributionUseCase {
        store: MemoryStore::new(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(report.total, 0);
    assert!(report.data.is_empty());
}

#[tokio::test]
async fn should_merge_missing_and_empty_threats_into_unknown() {
    let store = store_with(vec![
        RecordFixture::new("r1").build(),
        RecordFixture::new("r2").threat("").build(),
        RecordFixture::new("r3").threat("Harmless").build(),
    ]);

    let report = ThreatDistributionUseCase { store }.execute().await.unwrap();

    assert_eq!(report.data[0].threat, "Unknown");
    assert_eq!(report.data[0].count, 2);
    assert_eq!(report.data[0].percentage, "66.67");
    let sum: f64 = report
        .data
        .iter()
        .map(|s| s.percentage.parse::<f64>().unwrap())
        .sum();
    assert!((sum - 100.0).abs() < 0.05);
}

#[tokio::test]
async fn should_report_non_string_threats_verbatim() {
    let store = store_with(vec![
        RecordFixture::new("r1").set(records::THREAT, 3).build(),
        RecordFixture::new("r2").set(records::THREAT, 0).build(),
    ]);

    let report = ThreatDistributionUseCase { store }.execute().await.unwrap();

    let labels: Vec<&str> = report.data.iter().map(|s| s.threat.as_str()).collect();
    assert_eq!(labels, vec!["3", "Unknown"]);
    assert_eq!(report.total, 2);
}

#[tokio::test]
async fn should_ignore_inactive_and_legacy_records() {
    let store = store_with(vec![
        RecordFixture::new("r1").threat("Harmless").build(),
        RecordFixture::new("r2").threat("Harmless").inactive().build(),
        RecordFixture::new("r3").threat("Harmless").legacy().build(),
    ]);

    let report = ThreatDistributionUseCase { store }.execute().await.unwrap();

    assert_eq!(report.total, 1);
}

// ── Biodiversity ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sum_environment_counts_to_total() {
    let store = store_with(vec![
        RecordFixture::new("r1").environment("Freshwater").build(),
        RecordFixture::new("r2").environment("Marine").build(),
        RecordFixture::new("r3").environment("Freshwater").build(),
        RecordFixture::new("r4").environment("Brackish").build(),
        RecordFixture::new("r5").environment("Marine").inactive().build(),
    ]);

    let report = BiodiversityUseCase { store }.execute().await.unwrap();

    assert_eq!(report.total_species, 4);
    let sum: u64 = report.by_environment.iter().map(|e| e.count).sum();
    assert_eq!(sum, report.total_species);
    assert_eq!(report.by_environment[0].environment, "Freshwater");
    assert_eq!(report.by_environment[0].count, 2);
}

#[tokio::test]
async fn should_average_only_positive_sizes() {
    let store = store_with(vec![
        RecordFixture::new("r1").max(10.0).maturity(2.0).build(),
        RecordFixture::new("r2").max(0.0).maturity(50.0).build(),
        RecordFixture::new("r3").set(records::MAX, Bson::Null).build(),
        RecordFixture::new("r4").max(30.0).build(),
    ]);

    let report = BiodiversityUseCase { store }.execute().await.unwrap();
    let stats = report.size_maturity_stats;

    assert_eq!(stats.avg_max_size, 20.0);
    assert_eq!(stats.min_max_size, 10.0);
    assert_eq!(stats.max_max_size, 30.0);
    assert_eq!(stats.avg_maturity, Some(2.0));
}

#[tokio::test]
async fn should_count_conventional_threats_and_default_to_zero() {
    let store = store_with(vec![
        RecordFixture::new("r1").threat("Harmless").build(),
        RecordFixture::new("r2").threat("Dangerous if Provoked").build(),
        RecordFixture::new("r3").threat("Harmless").build(),
        RecordFixture::new("r4").threat("Spicy").build(),
    ]);

    let summary = BiodiversityUseCase { store }
        .execute()
        .await
        .unwrap()
        .threat_summary;

    assert_eq!(summary.harmless, 2);
    assert_eq!(summary.dangerous_if_provoked, 1);
    assert_eq!(summary.extremely_dangerous, 0);
}

#[tokio::test]
async fn should_cap_uses_at_ten() {
    let docs = (0..12)
        .map(|i| {
            RecordFixture::new(&format!("r{i}"))
                .uses(&format!("use-{i:02}"))
                .build()
        })
        .collect();

    let report = BiodiversityUseCase {
        store: store_with(docs),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(report.uses_distribution.len(), 10);
    assert_eq!(report.uses_distribution[0].use_, "use-00");
}

#[tokio::test]
async fn should_report_empty_biodiversity() {
    let report = BiodiversityUseCase {
        store: MemoryStore::new(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(report.total_species, 0);
    assert!(report.by_environment.is_empty());
    assert_eq!(report.threat_summary, Default::default());
    assert_eq!(report.size_maturity_stats.avg_max_size, 0.0);
}

// ── Geographic ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_rank_locations_and_list_points() {
    let store = store_with(vec![
        RecordFixture::new("r1")
            .country("Philippines")
            .municipality("Calapan")
            .barangay("Lalud")
            .location(13.41, 121.18)
            .image("big-blob")
            .build(),
        RecordFixture::new("r2")
            .country("Philippines")
            .municipality("Naujan")
            .build(),
        RecordFixture::new("r3").country("").build(),
    ]);

    let report = GeographicUseCase { store }.execute().await.unwrap();

    assert_eq!(report.by_country.len(), 1);
    assert_eq!(report.by_country[0].count, 2);
    assert_eq!(report.by_municipality.len(), 2);
    assert_eq!(report.by_barangay.len(), 1);
    assert_eq!(report.by_barangay[0].name, "Lalud");
    assert_eq!(report.location_data.len(), 1);
    let point = &report.location_data[0];
    assert_eq!(point["_id"], "r1");
    assert_eq!(point["latitude"], 13.41);
    assert!(point.get("image").is_none());
}

// ── User activity ────────────────────────────────────────────────────────────

fn activity_store() -> MemoryStore {
    MemoryStore::new()
        .with(
            users::COLLECTION,
            [
                UserFixture::new("u1").display_name("Ana").role("admin").build(),
                UserFixture::new("u2").names("Ben", "Cruz").build(),
            ],
        )
        .with(
            records::COLLECTION,
            [
                RecordFixture::new("r1").created_by("u1").created(at(2026, 9, 2)).build(),
                RecordFixture::new("r2").created_by("u1").created(at(2026, 9, 20)).build(),
                RecordFixture::new("r3").created_by("u2").created(at(2026, 3, 5)).build(),
                RecordFixture::new("r4").created_by("ghost").created(at(2025, 11, 1)).build(),
                RecordFixture::new("r5").created_by("u1").created(at(2024, 1, 1)).build(),
                RecordFixture::new("r6").created(at(2026, 9, 3)).inactive().build(),
            ],
        )
}

#[tokio::test]
async fn should_rank_contributors_with_names_and_roles() {
    let report = UserActivityUseCase {
        store: activity_store(),
    }
    .execute(test_now())
    .await
    .unwrap();

    let top: Vec<(Option<&str>, &str, &str, u64)> = report
        .top_contributors
        .iter()
        .map(|c| {
            (
                c.user_id.as_deref(),
                c.user_name.as_str(),
                c.role.as_str(),
                c.records_created,
            )
        })
        .collect();
    assert_eq!(
        top,
        vec![
            (Some("u1"), "Ana", "admin", 3),
            (Some("ghost"), "Unknown User", "unknown", 1),
            (Some("u2"), "Ben Cruz", "unknown", 1),
        ]
    );
}

#[tokio::test]
async fn should_survive_owner_with_malformed_profile() {
    let store = MemoryStore::new()
        .with(
            users::COLLECTION,
            [
                doc! { "_id": "u1", "profile": { "displayName": 42 } },
                doc! { "_id": "u2", "profile": { "displayName": [], "firstName": "Ben" }, "role": 5 },
            ],
        )
        .with(
            records::COLLECTION,
            [
                RecordFixture::new("r1").created_by("u1").created(at(2026, 9, 2)).build(),
                RecordFixture::new("r2").created_by("u2").created(at(2026, 9, 3)).build(),
                RecordFixture::new("r3").created_by("u2").created(at(2026, 9, 4)).build(),
            ],
        );

    let report = UserActivityUseCase { store }.execute(test_now()).await.unwrap();

    let top: Vec<(&str, &str, u64)> = report
        .top_contributors
        .iter()
        .map(|c| (c.user_name.as_str(), c.role.as_str(), c.records_created))
        .collect();
    assert_eq!(top, vec![("Ben", "unknown", 2), ("Unknown User", "unknown", 1)]);
}

#[tokio::test]
async fn should_build_ascending_timeline_within_twelve_months() {
    let report = UserActivityUseCase {
        store: activity_store(),
    }
    .execute(test_now())
    .await
    .unwrap();

    assert_eq!(
        report.timeline,
        vec![
            TimelinePoint {
                year: 2025,
                month: 11,
                count: 1,
                label: "2025-11".into(),
            },
            TimelinePoint {
                year: 2026,
                month: 3,
                count: 1,
                label: "2026-03".into(),
            },
            TimelinePoint {
                year: 2026,
                month: 9,
                count: 2,
                label: "2026-09".into(),
            },
        ]
    );
}

#[tokio::test]
async fn should_break_down_by_owner_role_dropping_unknown_owners() {
    let report = UserActivityUseCase {
        store: activity_store(),
    }
    .execute(test_now())
    .await
    .unwrap();

    assert_eq!(
        report.by_role,
        vec![
            RoleCount {
                role: "admin".into(),
                count: 3,
            },
            RoleCount {
                role: "Unknown".into(),
                count: 1,
            },
        ]
    );
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_fail_whole_report_on_store_error() {
    let store = store_with(vec![RecordFixture::new("r1").threat("Harmless").build()]);
    store.fail_all();

    assert!(ThreatDistributionUseCase { store: &store }.execute().await.is_err());
    assert!(BiodiversityUseCase { store: &store }.execute().await.is_err());
    assert!(
        UserActivityUseCase { store: &store }
            .execute(test_now())
            .await
            .is_err()
    );
}
