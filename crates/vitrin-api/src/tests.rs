use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;
use vitrin_core::{
  campaign::NewCampaign,
  category::NewCategory,
  product::NewProduct,
  store::CatalogStore,
  user::NewUser,
};
use vitrin_store_sqlite::SqliteStore;

use crate::{ApiConfig, AppState, api_router, auth::hash_password};

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState {
    store:  Arc::new(store),
    config: Arc::new(ApiConfig::default()),
  }
}

async fn oneshot_raw(
  state:  AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  token:  Option<&str>,
  body:   Option<Value>,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  api_router(state).oneshot(req).await.unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
  let bytes =
    axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn seed_category(state: &AppState<SqliteStore>, name: &str) -> Uuid {
  state
    .store
    .add_category(NewCategory { name: name.to_owned(), description: None })
    .await
    .unwrap()
    .id
}

async fn seed_product(
  state: &AppState<SqliteStore>,
  category_id: Uuid,
  name: &str,
  price: f64,
) -> Uuid {
  state
    .store
    .add_product(NewProduct {
      name:        name.to_owned(),
      description: format!("{name} description"),
      price,
      image:       "/img/placeholder.jpg".to_owned(),
      category_id,
      stock:       5,
      rating:      0.0,
      num_reviews: 0,
    })
    .await
    .unwrap()
    .id
}

/// Register a user directly in the store and log in through the API,
/// returning the bearer token.
async fn login_as(
  state: &AppState<SqliteStore>,
  email: &str,
  is_admin: bool,
) -> String {
  state
    .store
    .add_user(NewUser {
      name:          "Test User".to_owned(),
      email:         email.to_owned(),
      password_hash: hash_password("hunter22").unwrap(),
      is_admin,
    })
    .await
    .unwrap();

  let resp = oneshot_raw(
    state.clone(),
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": email, "password": "hunter22" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  json_body(resp).await["data"]["token"].as_str().unwrap().to_owned()
}

// ── Homepage ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn home_carries_envelope_and_cache_header() {
  let state = make_state().await;
  let cat = seed_category(&state, "Mugs").await;
  seed_product(&state, cat, "Stoneware mug", 18.0).await;
  state
    .store
    .add_campaign(NewCampaign {
      title:     "Summer sale".to_owned(),
      subtitle:  None,
      cta_text:  "Shop now".to_owned(),
      cta_url:   "/sale".to_owned(),
      image:     None,
      active:    true,
      priority:  5,
      starts_at: None,
      ends_at:   None,
    })
    .await
    .unwrap();

  let resp = oneshot_raw(state, "GET", "/home", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    resp.headers().get(header::CACHE_CONTROL).unwrap(),
    "public, max-age=60, s-maxage=120, stale-while-revalidate=60"
  );

  let body = json_body(resp).await;
  assert_eq!(body["success"], json!(true));
  assert_eq!(body["data"]["hero"]["title"], json!("Summer sale"));
  assert_eq!(body["data"]["featuredCategories"][0]["name"], json!("Mugs"));
  assert_eq!(body["data"]["trustSignals"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn home_on_empty_store_has_null_hero_and_empty_shelves() {
  let state = make_state().await;
  let resp = oneshot_raw(state, "GET", "/home", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = json_body(resp).await;
  assert_eq!(body["data"]["hero"], Value::Null);
  assert_eq!(body["data"]["bestsellers"], json!([]));
  assert_eq!(body["data"]["deals"], json!([]));
}

// ── Products ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn product_listing_paginates_with_envelope() {
  let state = make_state().await;
  let cat = seed_category(&state, "Chairs").await;
  for i in 0..5 {
    seed_product(&state, cat, &format!("Chair {i}"), 100.0 + i as f64).await;
  }

  let resp =
    oneshot_raw(state, "GET", "/products?page=2&limit=2", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = json_body(resp).await;
  assert_eq!(body["success"], json!(true));
  assert_eq!(body["page"], json!(2));
  assert_eq!(body["limit"], json!(2));
  assert_eq!(body["total"], json!(5));
  assert_eq!(body["totalPages"], json!(3));
  assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn astronomical_page_numbers_are_rejected_not_wrapped() {
  let state = make_state().await;
  let resp = oneshot_raw(
    state,
    "GET",
    &format!("/products?page={}&limit=100", usize::MAX),
    None,
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_listing_filters_by_category_and_price() {
  let state = make_state().await;
  let chairs = seed_category(&state, "Chairs").await;
  let lamps = seed_category(&state, "Lamps").await;
  seed_product(&state, chairs, "Cheap chair", 40.0).await;
  seed_product(&state, chairs, "Fancy chair", 400.0).await;
  seed_product(&state, lamps, "Desk lamp", 45.0).await;

  let resp = oneshot_raw(
    state,
    "GET",
    &format!("/products?category={chairs}&maxPrice=100"),
    None,
    None,
  )
  .await;
  let body = json_body(resp).await;
  assert_eq!(body["total"], json!(1));
  assert_eq!(body["data"][0]["name"], json!("Cheap chair"));
}

#[tokio::test]
async fn unknown_product_is_404() {
  let state = make_state().await;
  let resp = oneshot_raw(
    state,
    "GET",
    &format!("/products/{}", Uuid::new_v4()),
    None,
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let body = json_body(resp).await;
  assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn blank_search_is_an_empty_success() {
  let state = make_state().await;
  let resp =
    oneshot_raw(state, "GET", "/products/search?q=%20", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = json_body(resp).await;
  assert_eq!(body["count"], json!(0));
  assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn search_finds_seeded_products() {
  let state = make_state().await;
  let cat = seed_category(&state, "Kitchen").await;
  seed_product(&state, cat, "Ceramic bowl", 24.0).await;
  seed_product(&state, cat, "Steel whisk", 9.0).await;

  let resp =
    oneshot_raw(state, "GET", "/products/search?q=ceramic", None, None).await;
  let body = json_body(resp).await;
  assert_eq!(body["count"], json!(1));
  assert_eq!(body["data"][0]["name"], json!("Ceramic bowl"));
}

#[tokio::test]
async fn inverted_price_range_is_rejected() {
  let state = make_state().await;
  let resp = oneshot_raw(
    state,
    "GET",
    "/products/price-range?min=50&max=10",
    None,
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn price_range_sorts_cheapest_first() {
  let state = make_state().await;
  let cat = seed_category(&state, "Lamps").await;
  seed_product(&state, cat, "Desk lamp", 45.0).await;
  seed_product(&state, cat, "Clip lamp", 15.0).await;
  seed_product(&state, cat, "Floor lamp", 120.0).await;

  let resp = oneshot_raw(
    state,
    "GET",
    "/products/price-range?min=10&max=50",
    None,
    None,
  )
  .await;
  let body = json_body(resp).await;
  assert_eq!(body["count"], json!(2));
  assert_eq!(body["data"][0]["name"], json!("Clip lamp"));
  assert_eq!(body["data"][1]["name"], json!("Desk lamp"));
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_login_and_profile_round_trip() {
  let state = make_state().await;

  let resp = oneshot_raw(
    state.clone(),
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "name": "Ada",
      "email": "ada@example.com",
      "password": "lovelace",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let registered = json_body(resp).await;
  assert_eq!(registered["data"]["isAdmin"], json!(false));
  let token = registered["data"]["token"].as_str().unwrap().to_owned();

  let resp =
    oneshot_raw(state, "GET", "/auth/me", Some(&token), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["data"]["email"], json!("ada@example.com"));
  assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
  let state = make_state().await;
  let body = json!({
    "name": "Ada",
    "email": "ada@example.com",
    "password": "lovelace",
  });

  let first = oneshot_raw(
    state.clone(),
    "POST",
    "/auth/register",
    None,
    Some(body.clone()),
  )
  .await;
  assert_eq!(first.status(), StatusCode::CREATED);

  let second =
    oneshot_raw(state, "POST", "/auth/register", None, Some(body)).await;
  assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_share_one_message() {
  let state = make_state().await;
  login_as(&state, "ada@example.com", false).await;

  let bad_password = oneshot_raw(
    state.clone(),
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "ada@example.com", "password": "wrong" })),
  )
  .await;
  let unknown_email = oneshot_raw(
    state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "nobody@example.com", "password": "wrong" })),
  )
  .await;

  assert_eq!(bad_password.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(
    json_body(bad_password).await["message"],
    json_body(unknown_email).await["message"],
  );
}

#[tokio::test]
async fn profile_without_token_is_401() {
  let state = make_state().await;
  let resp = oneshot_raw(state, "GET", "/auth/me", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_401() {
  let state = make_state().await;
  let resp =
    oneshot_raw(state, "GET", "/auth/me", Some("deadbeef"), None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ── Admin gating ────────────────────────────────────────────────────────────

#[tokio::test]
async fn product_create_requires_admin() {
  let state = make_state().await;
  let cat = seed_category(&state, "Rugs").await;
  let body = json!({
    "name": "Wool rug",
    "description": "Hand woven",
    "price": 240.0,
    "image": "/img/rug.jpg",
    "categoryId": cat,
  });

  let anonymous = oneshot_raw(
    state.clone(),
    "POST",
    "/products",
    None,
    Some(body.clone()),
  )
  .await;
  assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

  let customer = login_as(&state, "customer@example.com", false).await;
  let forbidden = oneshot_raw(
    state.clone(),
    "POST",
    "/products",
    Some(&customer),
    Some(body.clone()),
  )
  .await;
  assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

  let admin = login_as(&state, "admin@example.com", true).await;
  let created =
    oneshot_raw(state, "POST", "/products", Some(&admin), Some(body)).await;
  assert_eq!(created.status(), StatusCode::CREATED);
  let created = json_body(created).await;
  assert_eq!(created["data"]["name"], json!("Wool rug"));
  assert_eq!(created["data"]["numReviews"], json!(0));
}

#[tokio::test]
async fn stock_update_rejects_negative_values() {
  let state = make_state().await;
  let cat = seed_category(&state, "Rugs").await;
  let product = seed_product(&state, cat, "Wool rug", 240.0).await;
  let admin = login_as(&state, "admin@example.com", true).await;

  let resp = oneshot_raw(
    state.clone(),
    "PATCH",
    &format!("/products/{product}/stock"),
    Some(&admin),
    Some(json!({ "stock": -3 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = oneshot_raw(
    state,
    "PATCH",
    &format!("/products/{product}/stock"),
    Some(&admin),
    Some(json!({ "stock": 7 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["data"]["stock"], json!(7));
}

// ── Categories ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn categories_list_orders_by_product_count() {
  let state = make_state().await;
  let sparse = seed_category(&state, "Sparse").await;
  let busy = seed_category(&state, "Busy").await;
  seed_product(&state, sparse, "Lone item", 10.0).await;
  for i in 0..3 {
    seed_product(&state, busy, &format!("Item {i}"), 10.0).await;
  }

  let resp = oneshot_raw(state, "GET", "/categories", None, None).await;
  let body = json_body(resp).await;
  assert_eq!(body["data"][0]["name"], json!("Busy"));
  assert_eq!(body["data"][0]["productCount"], json!(3));
  assert_eq!(body["data"][1]["name"], json!("Sparse"));
}

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
  let state = make_state().await;
  seed_category(&state, "Mugs").await;
  let admin = login_as(&state, "admin@example.com", true).await;

  let resp = oneshot_raw(
    state,
    "POST",
    "/categories",
    Some(&admin),
    Some(json!({ "name": "mugs" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_connected_store() {
  let state = make_state().await;
  let resp = oneshot_raw(state, "GET", "/health", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = json_body(resp).await;
  assert_eq!(body["ok"], json!(true));
  assert_eq!(body["db"], json!("connected"));
  assert_eq!(body["environment"], json!("development"));
}
