//! PostgREST storage backend (hosted Postgres behind a REST gateway).
//!
//! Same `colleges` / `courses` tables as [`crate::PgStorage`], reached over
//! HTTPS with an API key instead of a database connection.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use coursesync_core::{Course, Institution, InstitutionId, NewCourse};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::traits::{CourseStore, InstitutionStore};

const REST_PATH: &str = "/rest/v1";
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Serialize)]
struct InstitutionRow<'a> {
    name: &'a str,
    city: &'a str,
    zipcode: &'a str,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct IdRow {
    id: i64,
}

#[derive(Serialize)]
struct CourseRow<'a> {
    college_id: i64,
    section_id: &'a str,
    course_code: &'a str,
    title: &'a str,
    start_date: Option<NaiveDate>,
    start_time: Option<&'a str>,
    location: &'a str,
    seats_available: u32,
    seats_total: u32,
    price: Option<&'a str>,
    waitlist_available: bool,
    registration_url: &'a str,
}

impl<'a> CourseRow<'a> {
    fn new(institution_id: InstitutionId, course: &'a NewCourse) -> Self {
        Self {
            college_id: institution_id.0,
            section_id: &course.section_id,
            course_code: &course.course_code,
            title: &course.title,
            start_date: course.start_date,
            start_time: course.start_time.as_deref(),
            location: &course.location,
            seats_available: course.seats_available,
            seats_total: course.seats_total,
            price: course.price.as_deref(),
            waitlist_available: course.waitlist_available,
            registration_url: &course.registration_url,
        }
    }
}

#[derive(Deserialize)]
struct StoredCourseRow {
    id: i64,
    college_id: i64,
    #[serde(default)]
    section_id: Option<String>,
    #[serde(default)]
    course_code: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    seats_available: Option<u32>,
    #[serde(default)]
    seats_total: Option<u32>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    waitlist_available: Option<bool>,
    #[serde(default)]
    registration_url: Option<String>,
}

impl From<StoredCourseRow> for Course {
    fn from(row: StoredCourseRow) -> Self {
        Self {
            id: row.id,
            institution_id: InstitutionId(row.college_id),
            course: NewCourse {
                section_id: row.section_id.unwrap_or_default(),
                course_code: row.course_code.unwrap_or_default(),
                title: row.title.unwrap_or_default(),
                start_date: row.start_date,
                start_time: row.start_time,
                location: row.location.unwrap_or_default(),
                seats_available: row.seats_available.unwrap_or(0),
                seats_total: row.seats_total.unwrap_or(0),
                price: row.price,
                waitlist_available: row.waitlist_available.unwrap_or(false),
                registration_url: row.registration_url.unwrap_or_default(),
            },
        }
    }
}

/// Store client for a PostgREST endpoint.
#[derive(Clone)]
pub struct RestStorage {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for RestStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStorage")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

impl RestStorage {
    /// `project_url` is the gateway origin; `/rest/v1` is appended.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(project_url: &str, api_key: String, timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = format!("{}{REST_PATH}", project_url.trim_end_matches('/'));
        tracing::info!(%base_url, "RestStorage initialized");
        Ok(Self { client, base_url, api_key })
    }

    fn table(&self, table: &str) -> String {
        format!("{}/{table}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StorageError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        if status.as_u16() == 409 {
            return Err(StorageError::Duplicate(body));
        }
        Err(StorageError::Status { code: status.as_u16(), body })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, StorageError> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl InstitutionStore for RestStorage {
    async fn find_institution_by_name(
        &self,
        name: &str,
    ) -> Result<Option<InstitutionId>, StorageError> {
        let filter = format!("eq.{name}");
        let request = self.client.get(self.table("colleges")).query(&[
            ("select", "id"),
            ("name", filter.as_str()),
            ("order", "id.asc"),
            ("limit", "1"),
        ]);
        let rows: Vec<IdRow> = Self::read_json(self.send(request).await?).await?;
        Ok(rows.first().map(|r| InstitutionId(r.id)))
    }

    async fn insert_institution(
        &self,
        institution: &Institution,
    ) -> Result<InstitutionId, StorageError> {
        let body = InstitutionRow {
            name: &institution.name,
            city: &institution.city,
            zipcode: &institution.zipcode,
            latitude: institution.latitude,
            longitude: institution.longitude,
        };
        let request = self
            .client
            .post(self.table("colleges"))
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .json(&body);
        let rows: Vec<IdRow> = Self::read_json(self.send(request).await?).await?;
        rows.first().map(|r| InstitutionId(r.id)).ok_or_else(|| StorageError::NotFound {
            entity: "inserted institution",
            key: institution.name.clone(),
        })
    }
}

#[async_trait]
impl CourseStore for RestStorage {
    async fn delete_courses_by_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u64, StorageError> {
        let filter = format!("eq.{institution_id}");
        let request = self
            .client
            .delete(self.table("courses"))
            .query(&[("college_id", filter.as_str()), ("select", "id")])
            .header("Prefer", "return=representation");
        let rows: Vec<IdRow> = Self::read_json(self.send(request).await?).await?;
        Ok(u64::try_from(rows.len()).unwrap_or(u64::MAX))
    }

    async fn insert_course(
        &self,
        institution_id: InstitutionId,
        course: &NewCourse,
    ) -> Result<(), StorageError> {
        self.insert_courses(institution_id, std::slice::from_ref(course)).await.map(|_| ())
    }

    async fn list_courses(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Course>, StorageError> {
        let filter = format!("eq.{institution_id}");
        let request = self.client.get(self.table("courses")).query(&[
            ("select", "*"),
            ("college_id", filter.as_str()),
            ("order", "id.asc"),
        ]);
        let rows: Vec<StoredCourseRow> = Self::read_json(self.send(request).await?).await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    /// One request for the whole batch; PostgREST inserts it atomically.
    async fn insert_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        if courses.is_empty() {
            return Ok(0);
        }
        let rows: Vec<CourseRow<'_>> =
            courses.iter().map(|c| CourseRow::new(institution_id, c)).collect();
        let request = self
            .client
            .post(self.table("courses"))
            .header("Prefer", "return=minimal")
            .json(&rows);
        self.send(request).await?;
        Ok(courses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> RestStorage {
        RestStorage::new(&server.uri(), "service-key".to_owned(), Duration::from_secs(5)).unwrap()
    }

    fn institution() -> Institution {
        Institution {
            name: "Cape Fear Community College".to_owned(),
            subdomain: "cfcc".to_owned(),
            filter: Some("motorcycle".to_owned()),
            city: "Wilmington".to_owned(),
            zipcode: "28401".to_owned(),
            latitude: 34.2257,
            longitude: -77.9447,
        }
    }

    fn course() -> NewCourse {
        NewCourse {
            section_id: "482".to_owned(),
            course_code: "MSF-BRC".to_owned(),
            title: "Basic RiderCourse".to_owned(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 15),
            start_time: Some("8:00 AM".to_owned()),
            location: "Main Campus".to_owned(),
            seats_available: 7,
            seats_total: 12,
            price: Some("$225.00".to_owned()),
            waitlist_available: false,
            registration_url: "https://cfcc-register.fundfive.com/section/482".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_find_sends_auth_headers_and_name_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/colleges"))
            .and(query_param("name", "eq.Cape Fear Community College"))
            .and(header("apikey", "service-key"))
            .and(header("Authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 14}])))
            .expect(1)
            .mount(&server)
            .await;

        let id = store(&server).find_institution_by_name("Cape Fear Community College").await;
        assert_eq!(id.unwrap(), Some(InstitutionId(14)));
    }

    #[tokio::test]
    async fn test_find_returns_none_for_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/colleges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert_eq!(store(&server).find_institution_by_name("Nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_institution_returns_new_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/colleges"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(json!({
                "name": "Cape Fear Community College",
                "city": "Wilmington",
                "zipcode": "28401",
                "latitude": 34.2257,
                "longitude": -77.9447
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"id": 3}])))
            .expect(1)
            .mount(&server)
            .await;

        let id = store(&server).insert_institution(&institution()).await.unwrap();
        assert_eq!(id, InstitutionId(3));
    }

    #[tokio::test]
    async fn test_conflict_maps_to_duplicate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/colleges"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key value"))
            .mount(&server)
            .await;

        let err = store(&server).insert_institution(&institution()).await.unwrap_err();
        assert!(err.is_duplicate(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_insert_courses_posts_one_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/courses"))
            .and(body_json(json!([{
                "college_id": 3,
                "section_id": "482",
                "course_code": "MSF-BRC",
                "title": "Basic RiderCourse",
                "start_date": "2025-03-15",
                "start_time": "8:00 AM",
                "location": "Main Campus",
                "seats_available": 7,
                "seats_total": 12,
                "price": "$225.00",
                "waitlist_available": false,
                "registration_url": "https://cfcc-register.fundfive.com/section/482"
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let written = store(&server).insert_courses(InstitutionId(3), &[course()]).await.unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(201)).expect(0).mount(&server).await;

        let written = store(&server).insert_courses(InstitutionId(3), &[]).await.unwrap();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_delete_scopes_to_institution_and_counts_rows() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/courses"))
            .and(query_param("college_id", "eq.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
            .expect(1)
            .mount(&server)
            .await;

        let removed = store(&server).delete_courses_by_institution(InstitutionId(3)).await.unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_list_courses_tolerates_null_columns() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/courses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 10,
                "college_id": 3,
                "section_id": "",
                "title": "Motorcycle Safety Course",
                "start_date": null,
                "seats_available": 0,
                "waitlist_available": true,
                "registration_url": "https://cfcc-register.fundfive.com"
            }])))
            .mount(&server)
            .await;

        let courses = store(&server).list_courses(InstitutionId(3)).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, 10);
        assert_eq!(courses[0].course.start_date, None);
        assert!(courses[0].course.waitlist_available);
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = store(&server).delete_courses_by_institution(InstitutionId(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::Status { code: 503, .. }));
        assert!(err.is_transient());
    }
}
