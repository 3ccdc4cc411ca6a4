//! Paging behaviour that every backend must share, exercised against the
//! backends that run in-process.

use chrono::{Duration as ChronoDuration, Utc};
use rstest::rstest;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use squash::models::Bug;
use squash::pagination::{PageOutcome, PageRequest};
use squash::repositories::{Backend, BugRepository, MemoryBugRepository, SqlBugRepository};
use squash::services::BugService;

// Titles are distinct: equal titles have no defined relative order on any backend
const TITLES: [&str; 12] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];

async fn service_for(backend: Backend) -> BugService {
    let repository: Arc<dyn BugRepository> = match backend {
        Backend::Memory => Arc::new(MemoryBugRepository::new()),
        Backend::Sql => {
            // A single, never-recycled connection keeps the in-memory database alive
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect("sqlite::memory:")
                .await
                .unwrap();
            Arc::new(SqlBugRepository::with_pool(pool))
        }
        other => panic!("{} is not available in-process", other),
    };
    let service = BugService::new(backend, repository);
    service.ensure_schema().await.unwrap();
    service
}

/// Insert the twelve titles out of order so that ordering comes from the store.
async fn seed(service: &BugService) {
    let now = Utc::now();
    for (i, title) in TITLES.iter().rev().enumerate() {
        let bug = Bug::new(
            title.to_string(),
            format!("Bug {}", title),
            now - ChronoDuration::minutes(i as i64),
        );
        service.repository().insert(&bug).await.unwrap();
    }
}

async fn titles_of(
    service: &BugService,
    page_number: i64,
    page_size: i64,
    ascending: bool,
) -> PageOutcome<String> {
    let request = PageRequest::normalize(Some(page_number), Some(page_size), Some(ascending));
    match service
        .get_paginated(request, &CancellationToken::new())
        .await
        .unwrap()
    {
        PageOutcome::Content(page) => PageOutcome::Content(page.map(|bug| bug.title)),
        PageOutcome::Empty { total } => PageOutcome::Empty { total },
    }
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_second_page_of_five_ascending(#[case] backend: Backend) {
    let service = service_for(backend).await;
    seed(&service).await;

    let PageOutcome::Content(page) = titles_of(&service, 2, 5, true).await else {
        panic!("expected content");
    };
    assert_eq!(page.items, vec!["F", "G", "H", "I", "J"]);
    assert_eq!(page.displayed, 5);
    assert_eq!(page.total, 12);
    assert_eq!(page.request.page_number, 2);
    assert_eq!(page.request.page_size, 5);
    assert!(page.request.sort_by_title());
    assert_eq!(page.request.total_pages(page.total), 3);
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_first_page_descending(#[case] backend: Backend) {
    let service = service_for(backend).await;
    seed(&service).await;

    let PageOutcome::Content(page) = titles_of(&service, 1, 5, false).await else {
        panic!("expected content");
    };
    assert_eq!(page.items, vec!["L", "K", "J", "I", "H"]);
    assert!(!page.request.sort_by_title());
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_last_page_is_partial(#[case] backend: Backend) {
    let service = service_for(backend).await;
    seed(&service).await;

    let PageOutcome::Content(page) = titles_of(&service, 3, 5, true).await else {
        panic!("expected content");
    };
    assert_eq!(page.items, vec!["K", "L"]);
    assert_eq!(page.displayed, 2);
    assert_eq!(page.total, 12);
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_page_past_the_end_is_empty(#[case] backend: Backend) {
    let service = service_for(backend).await;
    seed(&service).await;

    assert_eq!(
        titles_of(&service, 4, 5, true).await,
        PageOutcome::Empty { total: 12 }
    );
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_empty_store_is_empty_with_zero_total(#[case] backend: Backend) {
    let service = service_for(backend).await;

    assert_eq!(
        titles_of(&service, 1, 10, true).await,
        PageOutcome::Empty { total: 0 }
    );
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_descending_walk_is_reverse_of_ascending(#[case] backend: Backend) {
    let service = service_for(backend).await;
    seed(&service).await;

    let mut ascending = Vec::new();
    let mut descending = Vec::new();
    for page_number in 1..=3 {
        if let PageOutcome::Content(page) = titles_of(&service, page_number, 5, true).await {
            ascending.extend(page.items);
        }
        if let PageOutcome::Content(page) = titles_of(&service, page_number, 5, false).await {
            descending.extend(page.items);
        }
    }

    assert_eq!(ascending, TITLES.to_vec());
    descending.reverse();
    assert_eq!(descending, ascending);
}

#[rstest]
#[case(Backend::Memory, 0)]
#[case(Backend::Memory, 11)]
#[case(Backend::Memory, -3)]
#[case(Backend::Sql, 0)]
#[case(Backend::Sql, 11)]
#[tokio::test]
async fn test_out_of_range_page_size_falls_back_to_ten(
    #[case] backend: Backend,
    #[case] page_size: i64,
) {
    let service = service_for(backend).await;
    seed(&service).await;

    let PageOutcome::Content(page) = titles_of(&service, 1, page_size, true).await else {
        panic!("expected content");
    };
    assert_eq!(page.request.page_size, 10);
    assert_eq!(page.displayed, 10);
    assert_eq!(page.items.first().map(String::as_str), Some("A"));
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_non_positive_page_number_reads_from_the_start(#[case] backend: Backend) {
    let service = service_for(backend).await;
    seed(&service).await;

    let PageOutcome::Content(page) = titles_of(&service, -1, 5, true).await else {
        panic!("expected content");
    };
    assert_eq!(page.request.page_number, -1);
    assert_eq!(page.items, vec!["A", "B", "C", "D", "E"]);
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::Sql)]
#[tokio::test]
async fn test_stored_bug_round_trips(#[case] backend: Backend) {
    let service = service_for(backend).await;
    let bug = Bug::new("Crash".to_string(), "On start".to_string(), Utc::now());
    service.repository().insert(&bug).await.unwrap();

    let found = service
        .get_by_id(bug.id, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(found.id, bug.id);
    assert_eq!(found.title, "Crash");
    assert_eq!(found.description, "On start");
}
