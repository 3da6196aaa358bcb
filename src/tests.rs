#[cfg(test)]
mod integration_tests {
    use crate::club::{milestone_progress, stats};
    use crate::storage::{
        ClubData, DynamoStore, Member, MemoryStore, Milestone, RunRecord, S3Store, Schedule,
        Store,
    };

    fn record_for(member: &Member, distance: f64, date: &str) -> RunRecord {
        RunRecord::new(
            member.id.clone(),
            distance,
            "00:30:00".to_string(),
            Some("5:30".to_string()),
            None,
            Some(date.to_string()),
        )
    }

    #[tokio::test]
    async fn member_lifecycle_keeps_counters_in_sync() {
        let store = MemoryStore::new();

        let mut member = Member::new("지우".to_string(), None, None, None);
        store.put_member(&member).await.unwrap();

        // Zwei Einträge anlegen, Zähler fortschreiben wie die API es tut
        let first = record_for(&member, 5.0, "2025-03-01");
        let second = record_for(&member, 7.5, "2025-03-03");
        for record in [&first, &second] {
            store.put_record(record).await.unwrap();
            member.apply_record(record.distance);
            store.put_member(&member).await.unwrap();
        }

        let stored = store.load_members().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_distance, 12.5);
        assert_eq!(stored[0].record_count, 2);

        // Neueste zuerst
        let records = store.load_member_records(&member.id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2025-03-03");

        // Eintrag löschen, Zähler zurücknehmen
        store.delete_record(&second.id).await.unwrap();
        member.revert_record(second.distance);
        store.put_member(&member).await.unwrap();

        let stored = store.load_members().await.unwrap();
        assert_eq!(stored[0].total_distance, 5.0);
        assert_eq!(stored[0].record_count, 1);
    }

    #[tokio::test]
    async fn member_delete_cascades_to_records() {
        let store = MemoryStore::new();

        let member = Member::new("하준".to_string(), None, None, None);
        let other = Member::new("서연".to_string(), None, None, None);
        store.put_member(&member).await.unwrap();
        store.put_member(&other).await.unwrap();

        store
            .put_record(&record_for(&member, 5.0, "2025-03-01"))
            .await
            .unwrap();
        store
            .put_record(&record_for(&member, 3.0, "2025-03-02"))
            .await
            .unwrap();
        store
            .put_record(&record_for(&other, 10.0, "2025-03-02"))
            .await
            .unwrap();

        // Kaskade wie im Members-Handler: erst die Einträge, dann das Mitglied
        let orphans = store.load_member_records(&member.id).await.unwrap();
        for record in &orphans {
            store.delete_record(&record.id).await.unwrap();
        }
        store.delete_member(&member.id).await.unwrap();

        let remaining = store.load_records().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].member_id, other.id);
        assert_eq!(store.load_members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn milestone_progress_over_store() {
        let store = MemoryStore::new();

        let member = Member::new("지우".to_string(), None, None, None);
        store.put_member(&member).await.unwrap();
        store
            .put_record(&record_for(&member, 60.0, "2025-03-01"))
            .await
            .unwrap();
        store
            .put_record(&record_for(&member, 45.0, "2025-03-05"))
            .await
            .unwrap();

        let reached = Milestone::new(100.0, "회식".to_string(), true);
        let open = Milestone::new(200.0, "단체 티셔츠".to_string(), true);
        let inactive = Milestone::new(50.0, "pausiert".to_string(), false);
        for m in [&reached, &open, &inactive] {
            store.put_milestone(m).await.unwrap();
        }

        let records = store.load_records().await.unwrap();
        let milestones = store.load_milestones().await.unwrap();
        let team_total: f64 = records.iter().map(|r| r.distance).sum();
        let progress = milestone_progress(&milestones, team_total);

        assert_eq!(progress.len(), 3);
        // Aufsteigend nach Ziel-km
        assert_eq!(progress[0].milestone.target_km, 50.0);
        assert!(!progress[0].achieved); // inaktiv zählt nicht
        assert!(progress[1].achieved);
        assert!(!progress[2].achieved);
        assert_eq!(progress[1].progress, 100.0);
    }

    #[tokio::test]
    async fn schedules_filter_by_date() {
        let store = MemoryStore::new();

        let run_day = Schedule::new(
            Some("2025-04-12".to_string()),
            "정기 러닝".to_string(),
            None,
            Some("한강공원".to_string()),
            Some("07:00".to_string()),
            None,
        );
        let other_day = Schedule::new(
            Some("2025-04-19".to_string()),
            "인터벌".to_string(),
            None,
            None,
            None,
            None,
        );
        store.put_schedule(&run_day).await.unwrap();
        store.put_schedule(&other_day).await.unwrap();

        let hits = store.load_schedules_by_date("2025-04-12").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "정기 러닝");

        assert!(store
            .load_schedules_by_date("2025-05-01")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn export_and_import_round_trip() {
        let source = MemoryStore::new();

        let member = Member::new("지우".to_string(), Some("j@example.com".to_string()), None, None);
        source.put_member(&member).await.unwrap();
        source
            .put_record(&record_for(&member, 8.0, "2025-03-10"))
            .await
            .unwrap();
        source
            .put_milestone(&Milestone::new(500.0, "회식".to_string(), true))
            .await
            .unwrap();

        let export = source.load_all().await.unwrap();
        assert_eq!(export.members.len(), 1);
        assert_eq!(export.records.len(), 1);

        // Restore in einen frischen Store
        let target = MemoryStore::new();
        target.replace_all(&export).await.unwrap();

        let restored = target.load_all().await.unwrap();
        assert_eq!(restored.members, export.members);
        assert_eq!(restored.records, export.records);
        assert_eq!(restored.milestones, export.milestones);

        // Reset löscht alles
        target.replace_all(&ClubData::empty()).await.unwrap();
        assert!(target.load_members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_summary_over_store() {
        let store = MemoryStore::new();

        let mut a = Member::new("지우".to_string(), None, None, None);
        let mut b = Member::new("하준".to_string(), None, None, None);

        let r1 = record_for(&a, 10.0, "2025-03-01");
        let r2 = record_for(&a, 5.0, "2025-03-02");
        let r3 = record_for(&b, 20.0, "2025-03-02");
        for r in [&r1, &r2, &r3] {
            store.put_record(r).await.unwrap();
        }
        a.apply_record(10.0);
        a.apply_record(5.0);
        b.apply_record(20.0);
        store.put_member(&a).await.unwrap();
        store.put_member(&b).await.unwrap();

        let members = store.load_members().await.unwrap();
        let records = store.load_records().await.unwrap();
        let summary = stats::summary(&members, &records);

        assert_eq!(summary.total_members, 2);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_distance, 35.0);

        let per_member: Vec<_> = members
            .iter()
            .map(|m| stats::member_stats(m, &records))
            .collect();
        let ranked = crate::club::member_ranks(per_member);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].member.name, "하준");
        assert_eq!(ranked[1].rank, 2);
    }

    #[tokio::test]
    async fn handler_maps_throttled_to_service_unavailable() {
        use crate::api::ClubState;
        use crate::storage::{MockStore, StorageError};
        use crate::utils::Metrics;
        use axum::extract::State;
        use axum::http::StatusCode;
        use std::sync::Arc;

        let mut store = MockStore::new();
        store
            .expect_load_members()
            .returning(|| Err(StorageError::Throttled));

        let state = Arc::new(ClubState {
            store: Arc::new(store),
            metrics: Arc::new(Metrics::new()),
        });

        let result = crate::api::members::list_members(State(state)).await;
        let (status, message) = result.err().expect("handler must fail");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(message.contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn record_for_unknown_member_is_not_found() {
        use crate::api::records::CreateRecordRequest;
        use crate::api::ClubState;
        use crate::utils::Metrics;
        use axum::extract::State;
        use axum::http::StatusCode;
        use axum::Json;
        use std::sync::Arc;

        let state = Arc::new(ClubState {
            store: Arc::new(MemoryStore::new()),
            metrics: Arc::new(Metrics::new()),
        });

        let payload = CreateRecordRequest {
            member_id: "member_missing".to_string(),
            distance: 5.0,
            time: "00:30:00".to_string(),
            pace: None,
            notes: None,
            date: None,
        };

        let result = crate::api::records::create_record(State(state), Json(payload)).await;
        let (status, _) = result.err().expect("handler must fail");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore] // Run mit: cargo test -- --ignored --nocapture
    async fn live_dynamodb_connection() {
        let prefix =
            std::env::var("DYNAMODB_TABLE_PREFIX").unwrap_or_else(|_| "RunningClub".to_string());
        let region = crate::utils::Config::from_env().sdk_region();

        match DynamoStore::new(&prefix, region).await {
            Ok(store) => {
                if store.check_connection().await {
                    println!("✓ DynamoDB connection successful");

                    let member = Member::new("integration-test".to_string(), None, None, None);
                    match store.put_member(&member).await {
                        Ok(_) => {
                            println!("✓ Member write successful: {}", member.id);
                            store.delete_member(&member.id).await.ok();
                        }
                        Err(e) => println!("✗ Member write failed: {}", e),
                    }
                } else {
                    println!("✗ DynamoDB unreachable");
                    println!("Make sure the tables exist and AWS credentials are set");
                }
            }
            Err(e) => println!("✗ DynamoDB client setup failed: {}", e),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn live_s3_connection() {
        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| "agrace-run-data".to_string());
        let region = crate::utils::Config::from_env().sdk_region();

        match S3Store::new(&bucket, region).await {
            Ok(store) => {
                if store.check_connection().await {
                    println!("✓ S3 connection successful");
                    match store.load_members().await {
                        Ok(members) => println!("  {} members stored", members.len()),
                        Err(e) => println!("✗ Document read failed: {}", e),
                    }
                } else {
                    println!("✗ S3 bucket {} unreachable", bucket);
                }
            }
            Err(e) => println!("✗ S3 client setup failed: {}", e),
        }
    }
}
