//! Router tests against an in-memory SQLite store.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use census_core::{
  citizen::{Citizen, CitizenId, CitizenPage, CitizenSummary},
  fields::CitizenFields,
  filter::SearchFilter,
  statistics::StatisticsSnapshot,
  store::{CitizenStore, StatisticsRefresh},
};
use census_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiConfig, api_router};

// ─── Probe store ──────────────────────────────────────────────────────────────

/// Delegates to SQLite, counting searches and optionally stalling them.
#[derive(Clone)]
struct ProbeStore {
  inner:        SqliteStore,
  search_delay: Option<Duration>,
  searches:     Arc<AtomicUsize>,
}

impl CitizenStore for ProbeStore {
  type Error = census_store_sqlite::Error;

  async fn get_citizen(&self, id: CitizenId) -> Result<Option<Citizen>, Self::Error> {
    self.inner.get_citizen(id).await
  }

  async fn citizen_slice(
    &self,
    offset: u64,
    limit: u64,
  ) -> Result<CitizenPage<CitizenSummary>, Self::Error> {
    self.inner.citizen_slice(offset, limit).await
  }

  async fn search_citizens(&self, filter: SearchFilter) -> Result<Vec<Citizen>, Self::Error> {
    self.searches.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.search_delay {
      tokio::time::sleep(delay).await;
    }
    self.inner.search_citizens(filter).await
  }

  async fn create_citizen(
    &self,
    fields: CitizenFields,
    refresh: StatisticsRefresh,
  ) -> Result<Citizen, Self::Error> {
    self.inner.create_citizen(fields, refresh).await
  }

  async fn update_citizen(
    &self,
    id: CitizenId,
    fields: CitizenFields,
    refresh: StatisticsRefresh,
  ) -> Result<Option<Citizen>, Self::Error> {
    self.inner.update_citizen(id, fields, refresh).await
  }

  async fn recompute_statistics(&self) -> Result<StatisticsSnapshot, Self::Error> {
    self.inner.recompute_statistics().await
  }

  async fn latest_statistics(&self) -> Result<Option<StatisticsSnapshot>, Self::Error> {
    self.inner.latest_statistics().await
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

struct Harness {
  app:   Router,
  store: ProbeStore,
}

async fn harness_with(config: ApiConfig, search_delay: Option<Duration>) -> Harness {
  let store = ProbeStore {
    inner: SqliteStore::open_in_memory().await.unwrap(),
    search_delay,
    searches: Arc::new(AtomicUsize::new(0)),
  };
  let app = api_router(Arc::new(store.clone()), config);
  Harness { app, store }
}

async fn harness() -> Harness { harness_with(ApiConfig::default(), None).await }

impl Harness {
  async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  async fn create(&self, body: Value) -> Value {
    let (status, json) = self.send("POST", "/citizens", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json
  }

  fn searches(&self) -> usize { self.store.searches.load(Ordering::SeqCst) }
}

fn citizen(first_name: &str, city: &str, gender: &str) -> Value {
  json!({
    "first_name":      first_name,
    "last_name":       "Simpson",
    "birth_date":      "1990-06-15",
    "birth_place":     "Shelbyville",
    "gender":          gender,
    "address":         "742 Evergreen Terrace",
    "city":            city,
    "country":         "USA",
    "postal_code":     "49007",
    "phone_number":    "555-0100",
    "email":           "someone@example.com",
    "citizenship":     "US",
    "nationality":     "American",
    "marital_status":  "married",
    "children_count":  2,
    "native_language": "English",
    "education_level": "bachelor",
    "institution":     "Springfield University",
    "graduation_year": 2012,
    "specialization":  "Nuclear safety",
  })
}

// ─── Citizens ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_stored_record() {
  let h = harness().await;
  let body = citizen("Marge", "Springfield", "female");

  let created = h.create(body.clone()).await;
  assert!(created["id"].is_i64());
  for (key, value) in body.as_object().unwrap() {
    assert_eq!(&created[key], value, "{key}");
  }
  assert_eq!(created["salary"], Value::Null);
}

#[tokio::test]
async fn get_returns_created_record() {
  let h = harness().await;
  let created = h.create(citizen("Homer", "Springfield", "male")).await;

  let (status, fetched) =
    h.send("GET", &format!("/citizens/{}", created["id"]), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_is_404() {
  let h = harness().await;
  let (status, body) = h.send("GET", "/citizens/12345", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "citizen not found");
}

#[tokio::test]
async fn slice_returns_summaries_and_total() {
  let h = harness().await;
  for name in ["A", "B", "C", "D"] {
    h.create(citizen(name, "Springfield", "male")).await;
  }

  let (status, page) = h.send("GET", "/citizens/slice/1/3", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(page["totalCount"], 4);
  let citizens = page["citizens"].as_array().unwrap();
  assert_eq!(citizens.len(), 2);
  assert_eq!(citizens[0]["first_name"], "B");
  assert_eq!(citizens[1]["first_name"], "C");
  assert!(citizens[0].get("email").is_none());
}

#[tokio::test]
async fn zero_width_slice_is_empty_with_total() {
  let h = harness().await;
  for name in ["A", "B", "C", "D", "E", "F"] {
    h.create(citizen(name, "Springfield", "male")).await;
  }

  let (status, page) = h.send("GET", "/citizens/slice/5/5", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(page, json!({ "citizens": [], "totalCount": 6 }));
}

#[tokio::test]
async fn inverted_slice_is_empty() {
  let h = harness().await;
  h.create(citizen("A", "Springfield", "male")).await;

  let (status, page) = h.send("GET", "/citizens/slice/4/1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(page, json!({ "citizens": [], "totalCount": 1 }));
}

#[tokio::test]
async fn update_replaces_supplied_fields() {
  let h = harness().await;
  let created = h.create(citizen("Ned", "Springfield", "male")).await;

  let (status, updated) = h
    .send(
      "PUT",
      &format!("/citizens/{}", created["id"]),
      Some(json!({ "city": "Shelbyville", "skills": ["golf"] })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["city"], "Shelbyville");
  assert_eq!(updated["skills"], json!(["golf"]));
  assert_eq!(updated["first_name"], "Ned");
}

#[tokio::test]
async fn update_missing_is_404_and_keeps_statistics() {
  let h = harness().await;
  h.create(citizen("Moe", "Springfield", "male")).await;
  let (_, before) = h.send("GET", "/statistics", None).await;

  let (status, _) = h
    .send("PUT", "/citizens/999", Some(json!({ "gender": "female" })))
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, after) = h.send("GET", "/statistics", None).await;
  assert_eq!(before, after);
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_create_body_is_a_validation_error() {
  let h = harness().await;
  let (status, body) = h.send("POST", "/citizens", Some(json!({}))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "invalid request: no fields supplied");
}

#[tokio::test]
async fn unknown_field_is_rejected_before_the_store() {
  let h = harness().await;
  let mut body = citizen("Homer", "Springfield", "male");
  body["name); DROP TABLE citizens; --"] = json!("x");

  let (status, json) = h.send("POST", "/citizens", Some(body)).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(json["error"].as_str().unwrap().contains("unknown field"));

  let (_, page) = h.send("GET", "/citizens/slice/0/10", None).await;
  assert_eq!(page["totalCount"], 0);
}

#[tokio::test]
async fn store_errors_do_not_leak_details() {
  let h = harness().await;
  let mut body = citizen("Maggie", "Springfield", "female");
  body.as_object_mut().unwrap().remove("birth_place");

  let (status, json) = h.send("POST", "/citizens", Some(body)).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(json["error"], "an error occurred while creating the citizen");
}

#[tokio::test]
async fn non_object_body_gets_a_json_error() {
  let h = harness().await;
  for (method, uri) in [
    ("POST", "/citizens"),
    ("PUT", "/citizens/1"),
    ("POST", "/citizens/search"),
  ] {
    let (status, body) = h.send(method, uri, Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
    assert!(
      body["error"].as_str().unwrap().starts_with("invalid request: "),
      "{method} {uri}: {body}"
    );
  }
  assert_eq!(h.searches(), 0);
}

#[tokio::test]
async fn non_integer_path_gets_a_json_error() {
  let h = harness().await;
  for uri in ["/citizens/abc", "/citizens/slice/a/3", "/citizens/slice/0/-1"] {
    let (status, body) = h.send("GET", uri, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
    assert!(
      body["error"].as_str().unwrap().starts_with("invalid request: "),
      "{uri}: {body}"
    );
  }
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_without_usable_filters_skips_the_store() {
  let h = harness().await;
  h.create(citizen("Homer", "Springfield", "male")).await;

  for body in [json!({}), json!({ "city": "", "gender": null })] {
    let (status, page) = h.send("POST", "/citizens/search", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page, json!({ "citizens": [], "totalCount": 0 }));
  }
  assert_eq!(h.searches(), 0);
}

#[tokio::test]
async fn search_matches_partial_city() {
  let h = harness().await;
  h.create(citizen("Homer", "Springfield", "male")).await;
  h.create(citizen("Paul", "Boston", "male")).await;

  let (status, page) = h
    .send("POST", "/citizens/search", Some(json!({ "city": "Spring" })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(page["totalCount"], 1);
  assert_eq!(page["citizens"][0]["city"], "Springfield");
  assert_eq!(h.searches(), 1);
}

#[tokio::test]
async fn search_requires_every_filter() {
  let h = harness().await;
  h.create(citizen("Homer", "Springfield", "male")).await;
  h.create(citizen("Marge", "Springfield", "female")).await;

  let (status, page) = h
    .send(
      "POST",
      "/citizens/search",
      Some(json!({ "city": "Spring", "gender": "female" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(page["totalCount"], 1);
  assert_eq!(page["citizens"][0]["first_name"], "Marge");
}

#[tokio::test]
async fn slow_search_times_out_with_408() {
  let config = ApiConfig {
    search_timeout: Duration::from_millis(20),
    ..ApiConfig::default()
  };
  let h = harness_with(config, Some(Duration::from_secs(5))).await;

  let (status, body) = h
    .send("POST", "/citizens/search", Some(json!({ "city": "Spring" })))
    .await;
  assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
  assert!(body["error"].as_str().unwrap().contains("timed out"));
}

// ─── Statistics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn statistics_404_before_first_computation() {
  let h = harness().await;
  let (status, body) = h.send("GET", "/statistics", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "statistics not found");
}

#[tokio::test]
async fn transactional_writes_refresh_statistics_immediately() {
  let h = harness().await;
  h.create(citizen("Homer", "Springfield", "male")).await;
  h.create(citizen("Marge", "Springfield", "female")).await;

  let (status, stats) = h.send("GET", "/statistics", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["gender_distribution"], json!({ "male": 1, "female": 1 }));
  assert_eq!(stats["avg_children_count"], 2.0);
}

#[tokio::test]
async fn detached_writes_refresh_statistics_eventually() {
  let config = ApiConfig {
    statistics_refresh: StatisticsRefresh::Detached,
    ..ApiConfig::default()
  };
  let h = harness_with(config, None).await;
  h.create(citizen("Homer", "Springfield", "male")).await;
  h.create(citizen("Bart", "Springfield", "male")).await;

  let mut latest = Value::Null;
  for _ in 0..100 {
    let (status, stats) = h.send("GET", "/statistics", None).await;
    if status == StatusCode::OK && stats["gender_distribution"]["male"] == 2 {
      latest = stats;
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  assert_eq!(latest["gender_distribution"], json!({ "male": 2 }));
}
