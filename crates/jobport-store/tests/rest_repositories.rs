//! HTTP contract tests for the REST repositories.

use jobport_models::{
    JobFields, JobId, JobListParams, JobListQuery, JobType, NewJob,
};
use jobport_store::{
    JobRepository, JobStore, ProfileRepository, ProfileStore, StoreClient, StoreConfig, StoreError,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SELECT: &str =
    "id,title,location,job_type,description,company_id,created_at,profiles(company_name)";

fn client(server: &MockServer) -> StoreClient {
    StoreClient::new(StoreConfig::new(server.uri(), "service-key")).unwrap()
}

fn row(id: i64, location: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Engineer",
        "location": location,
        "job_type": "Full-Time",
        "description": "Build things",
        "company_id": "company-1",
        "created_at": "2024-05-01T12:00:00+00:00",
        "profiles": {"company_name": "Acme"}
    })
}

#[tokio::test]
async fn test_list_jobs_sends_filters_and_reads_exact_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(header("prefer", "count=exact"))
        .and(query_param("select", SELECT))
        .and(query_param("location", "imatch.austin"))
        .and(query_param(
            "job_type",
            "imatch.^[-_ ]*p[-_ ]*a[-_ ]*r[-_ ]*t[-_ ]*t[-_ ]*i[-_ ]*m[-_ ]*e[-_ ]*$",
        ))
        .and(query_param("order", "created_at.desc,id.desc"))
        .and(query_param("offset", "10"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "10-11/12")
                .set_body_json(json!([row(2, "Austin"), row(1, "Austin")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = JobListParams::parse(&JobListQuery {
        page: Some("2".into()),
        search: Some("austin".into()),
        job_type: Some("Part-time".into()),
        ..Default::default()
    })
    .unwrap();

    let listing = JobRepository::new(client(&server))
        .list_jobs(&params)
        .await
        .unwrap();

    assert_eq!(listing.total, 12);
    assert_eq!(listing.jobs.len(), 2);
    assert_eq!(listing.jobs[0].id, JobId::from("2"));
    assert_eq!(listing.jobs[0].company_name.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_list_jobs_type_filter_includes_legacy_spellings() {
    let server = MockServer::start().await;

    let mut legacy = row(3, "Remote");
    legacy["job_type"] = json!("Full-time");
    let mut spaced = row(2, "Remote");
    spaced["job_type"] = json!("full time");

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .and(query_param(
            "job_type",
            "imatch.^[-_ ]*f[-_ ]*u[-_ ]*l[-_ ]*l[-_ ]*t[-_ ]*i[-_ ]*m[-_ ]*e[-_ ]*$",
        ))
        .and(query_param("location", "imatch.a\\*n"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "0-2/3")
                .set_body_json(json!([legacy, spaced, row(1, "Remote")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = JobListParams::parse(&JobListQuery {
        search: Some("a*n".into()),
        job_type: Some("Full-Time".into()),
        ..Default::default()
    })
    .unwrap();

    let listing = JobRepository::new(client(&server))
        .list_jobs(&params)
        .await
        .unwrap();

    assert_eq!(listing.total, 3);
    assert!(listing
        .jobs
        .iter()
        .all(|job| job.job_type == Some(JobType::FullTime)));
}

#[tokio::test]
async fn test_list_jobs_past_end_is_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(416).insert_header("Content-Range", "*/3"))
        .mount(&server)
        .await;

    let params = JobListParams::parse(&JobListQuery {
        page: Some("9".into()),
        ..Default::default()
    })
    .unwrap();

    let listing = JobRepository::new(client(&server))
        .list_jobs(&params)
        .await
        .unwrap();
    assert!(listing.jobs.is_empty());
    assert_eq!(listing.total, 3);
}

#[tokio::test]
async fn test_server_error_is_not_partially_returned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = JobRepository::new(client(&server))
        .list_jobs(&JobListParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ServerError(503, _)));
}

#[tokio::test]
async fn test_insert_posts_array_and_returns_representation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([{
            "company_id": "company-1",
            "title": "Engineer",
            "location": "Austin",
            "job_type": "Full-Time",
            "description": "Build things"
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(5, "Austin")])))
        .expect(1)
        .mount(&server)
        .await;

    let new_job = NewJob {
        company_id: "company-1".into(),
        fields: JobFields {
            title: "Engineer".into(),
            location: "Austin".into(),
            job_type: Some(JobType::FullTime),
            description: "Build things".into(),
        },
    };

    let created = JobRepository::new(client(&server))
        .insert_job(&new_job)
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].company_id, "company-1");
}

#[tokio::test]
async fn test_update_and_delete_report_missing_rows() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/jobs"))
        .and(query_param("id", "eq.404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/jobs"))
        .and(query_param("id", "eq.404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = JobRepository::new(client(&server));
    let id = JobId::from("404");

    let updated = repo.update_job(&id, &JobFields::default()).await.unwrap();
    assert!(updated.is_none());
    assert!(!repo.delete_job(&id).await.unwrap());
}

#[tokio::test]
async fn test_profile_lookup_by_username() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("username", "eq.team@acme.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "company-1",
            "username": "team@acme.com",
            "company_name": "Acme",
            "full_name": null
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = ProfileRepository::new(client(&server));

    let profile = repo
        .find_profile_by_username("team@acme.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.id, "company-1");
    assert_eq!(profile.company_name.as_deref(), Some("Acme"));

    assert!(repo.get_profile("nobody").await.unwrap().is_none());
}
