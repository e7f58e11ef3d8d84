//! Integration tests for PgStorage.
//! Run with: DATABASE_URL=... cargo test -p coursesync-storage -- --ignored pg_
//!
//! Expects the `colleges` / `courses` schema documented on `PgStorage`.

#![cfg(feature = "postgres")]
#![allow(clippy::unwrap_used, reason = "integration test code")]

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use coursesync_core::{Institution, NewCourse};
use coursesync_storage::{CourseStore, InstitutionStore, PgStorage};

async fn create_pg_storage() -> PgStorage {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for PgStorage integration tests");
    PgStorage::new(&url).await.expect("Failed to connect to PostgreSQL")
}

fn unique_name() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("test-college-{nanos}")
}

fn make_institution(name: &str) -> Institution {
    Institution {
        name: name.to_owned(),
        subdomain: "test".to_owned(),
        filter: None,
        city: "Graham".to_owned(),
        zipcode: "27253".to_owned(),
        latitude: 36.0693,
        longitude: -79.4003,
    }
}

fn make_course(section: &str) -> NewCourse {
    NewCourse {
        section_id: section.to_owned(),
        course_code: "MSF-BRC".to_owned(),
        title: "Basic RiderCourse".to_owned(),
        start_date: NaiveDate::from_ymd_opt(2025, 3, 15),
        start_time: Some("8:00 AM".to_owned()),
        location: "Main Campus".to_owned(),
        seats_available: 4,
        seats_total: 12,
        price: Some("$225.00".to_owned()),
        waitlist_available: false,
        registration_url: format!("https://test-register.fundfive.com/section/{section}"),
    }
}

#[tokio::test]
#[ignore]
async fn pg_find_or_insert_institution() {
    let storage = create_pg_storage().await;
    let name = unique_name();

    assert_eq!(storage.find_institution_by_name(&name).await.unwrap(), None);
    let id = storage.insert_institution(&make_institution(&name)).await.unwrap();
    assert_eq!(storage.find_institution_by_name(&name).await.unwrap(), Some(id));

    let dup = storage.insert_institution(&make_institution(&name)).await.unwrap_err();
    assert!(dup.is_duplicate());
}

#[tokio::test]
#[ignore]
async fn pg_replace_courses_swaps_generation() {
    let storage = create_pg_storage().await;
    let id = storage.insert_institution(&make_institution(&unique_name())).await.unwrap();

    storage.replace_courses(id, &[make_course("1"), make_course("2")]).await.unwrap();
    assert_eq!(storage.list_courses(id).await.unwrap().len(), 2);

    storage.replace_courses(id, &[make_course("3")]).await.unwrap();
    let courses = storage.list_courses(id).await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].course, make_course("3"));
    assert_eq!(courses[0].institution_id, id);

    assert_eq!(storage.delete_courses_by_institution(id).await.unwrap(), 1);
    assert!(storage.list_courses(id).await.unwrap().is_empty());
}
