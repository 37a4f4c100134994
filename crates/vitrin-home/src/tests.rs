//! Composer tests against an in-memory fake store.
//!
//! The fake honours the same query semantics as a real backend (filters,
//! sort keys, limits) and can be told to fail individual collection reads
//! to exercise shelf degradation.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use vitrin_core::{
  brand::{Brand, NewBrand},
  campaign::{Campaign, NewCampaign},
  category::{Category, CategoryRef, CategoryWithCount, NewCategory},
  deal::{ActiveDeal, Deal, NewDeal},
  product::{NewProduct, Product, ProductUpdate},
  store::{CampaignQuery, CatalogStore, ProductQuery, ProductSort},
  testimonial::{NewTestimonial, Testimonial},
  user::{NewUser, User, UserUpdate},
};

use crate::compose::{
  BESTSELLER_CAP, ComposeError, FEATURED_CATEGORY_CAP, compose_home, pick_hero,
  rank_categories,
};

// ─── Fake store ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("injected failure: {0}")]
struct FakeError(&'static str);

#[derive(Default)]
struct FakeStore {
  campaigns:    Vec<Campaign>,
  categories:   Vec<CategoryWithCount>,
  products:     Vec<Product>,
  deals:        Vec<ActiveDeal>,
  brands:       Vec<Brand>,
  testimonials: Vec<Testimonial>,
  /// Collection names whose reads should fail.
  fail:         HashSet<&'static str>,
}

impl FakeStore {
  fn fail_on(mut self, collection: &'static str) -> Self {
    self.fail.insert(collection);
    self
  }

  fn check(&self, collection: &'static str) -> Result<(), FakeError> {
    if self.fail.contains(collection) {
      Err(FakeError(collection))
    } else {
      Ok(())
    }
  }
}

impl CatalogStore for FakeStore {
  type Error = FakeError;

  async fn list_campaigns(&self, query: CampaignQuery) -> Result<Vec<Campaign>, FakeError> {
    self.check("campaigns")?;
    Ok(
      self
        .campaigns
        .iter()
        .filter(|c| query.active.is_none_or(|a| c.active == a))
        .filter(|c| query.live_at.is_none_or(|now| c.is_live(now)))
        .cloned()
        .collect(),
    )
  }

  async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, FakeError> {
    self.check("categories")?;
    Ok(self.categories.clone())
  }

  async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>, FakeError> {
    self.check("products")?;
    let mut products = self.products.clone();
    match query.sort {
      ProductSort::Newest => {
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
      }
      ProductSort::Bestselling => {
        products.sort_by(|a, b| {
          b.num_reviews
            .cmp(&a.num_reviews)
            .then(b.rating.total_cmp(&a.rating))
        });
      }
      ProductSort::PriceAsc => {
        products.sort_by(|a, b| a.price.total_cmp(&b.price));
      }
    }
    if let Some(limit) = query.limit {
      products.truncate(limit);
    }
    Ok(products)
  }

  async fn count_products(&self, _: ProductQuery) -> Result<u64, FakeError> {
    Ok(self.products.len() as u64)
  }

  async fn get_product(&self, _: Uuid) -> Result<Option<Product>, FakeError> {
    unimplemented!()
  }

  async fn search_products(&self, _: &str) -> Result<Vec<Product>, FakeError> {
    unimplemented!()
  }

  async fn list_deals(&self, live_at: DateTime<Utc>) -> Result<Vec<ActiveDeal>, FakeError> {
    self.check("deals")?;
    Ok(
      self
        .deals
        .iter()
        .filter(|d| d.is_live(live_at))
        .cloned()
        .collect(),
    )
  }

  async fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, FakeError> {
    self.check("brands")?;
    Ok(self.brands.iter().take(limit).cloned().collect())
  }

  async fn list_testimonials(&self, limit: usize) -> Result<Vec<Testimonial>, FakeError> {
    self.check("testimonials")?;
    let mut testimonials = self.testimonials.clone();
    testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    testimonials.truncate(limit);
    Ok(testimonials)
  }

  async fn ping(&self) -> Result<(), FakeError> { Ok(()) }

  async fn add_category(&self, _: NewCategory) -> Result<Category, FakeError> {
    unimplemented!()
  }

  async fn add_product(&self, _: NewProduct) -> Result<Product, FakeError> {
    unimplemented!()
  }

  async fn update_product(&self, _: Uuid, _: ProductUpdate) -> Result<Product, FakeError> {
    unimplemented!()
  }

  async fn set_product_stock(&self, _: Uuid, _: i64) -> Result<Product, FakeError> {
    unimplemented!()
  }

  async fn delete_product(&self, _: Uuid) -> Result<Uuid, FakeError> {
    unimplemented!()
  }

  async fn add_campaign(&self, _: NewCampaign) -> Result<Campaign, FakeError> {
    unimplemented!()
  }

  async fn add_deal(&self, _: NewDeal) -> Result<Deal, FakeError> {
    unimplemented!()
  }

  async fn add_brand(&self, _: NewBrand) -> Result<Brand, FakeError> {
    unimplemented!()
  }

  async fn add_testimonial(&self, _: NewTestimonial) -> Result<Testimonial, FakeError> {
    unimplemented!()
  }

  async fn add_user(&self, _: NewUser) -> Result<User, FakeError> {
    unimplemented!()
  }

  async fn get_user(&self, _: Uuid) -> Result<Option<User>, FakeError> {
    unimplemented!()
  }

  async fn find_user_by_email(&self, _: &str) -> Result<Option<User>, FakeError> {
    unimplemented!()
  }

  async fn update_user(&self, _: Uuid, _: UserUpdate) -> Result<User, FakeError> {
    unimplemented!()
  }

  async fn add_session(
    &self,
    _: Uuid,
    _: String,
    _: DateTime<Utc>,
  ) -> Result<(), FakeError> {
    unimplemented!()
  }

  async fn find_session(&self, _: &str) -> Result<Option<(User, DateTime<Utc>)>, FakeError> {
    unimplemented!()
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn day(d: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).unwrap()
}

fn campaign(
  title: &str,
  priority: i64,
  window: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
  created_at: DateTime<Utc>,
) -> Campaign {
  Campaign {
    id: Uuid::new_v4(),
    title: title.into(),
    subtitle: None,
    cta_text: "Shop now".into(),
    cta_url: "/".into(),
    image: None,
    active: true,
    priority,
    starts_at: window.0,
    ends_at: window.1,
    created_at,
  }
}

fn category(name: &str, product_count: u64) -> CategoryWithCount {
  CategoryWithCount {
    id: Uuid::new_v4(),
    name: name.into(),
    description: None,
    created_at: day(1),
    product_count,
  }
}

fn product(name: &str, num_reviews: i64, rating: f64, created_at: DateTime<Utc>) -> Product {
  Product {
    id: Uuid::new_v4(),
    name: name.into(),
    description: "a product".into(),
    price: 10.0,
    image: "https://example.com/p.jpg".into(),
    category: CategoryRef { id: Uuid::new_v4(), name: "Misc".into() },
    stock: 5,
    rating,
    num_reviews,
    created_at,
  }
}

fn deal(window: (DateTime<Utc>, DateTime<Utc>)) -> ActiveDeal {
  ActiveDeal {
    id: Uuid::new_v4(),
    discount_percent: 25,
    starts_at: window.0,
    ends_at: window.1,
    limited_stock: None,
    product: product("discounted", 1, 4.0, day(1)),
  }
}

fn brand(name: &str) -> Brand {
  Brand {
    id: Uuid::new_v4(),
    name: name.into(),
    logo: None,
    website: None,
    created_at: day(1),
  }
}

fn testimonial(name: &str, created_at: DateTime<Utc>) -> Testimonial {
  Testimonial {
    id: Uuid::new_v4(),
    name: name.into(),
    text: "great".into(),
    rating: 5.0,
    image: None,
    product_id: None,
    created_at,
  }
}

// ─── Hero selection ──────────────────────────────────────────────────────────

#[test]
fn hero_time_filters_before_priority() {
  // B outranks A on priority but its window excludes `now`.
  let a = campaign("A", 5, (None, None), day(1));
  let b = campaign("B", 10, (Some(day(1)), Some(day(5))), day(2));

  let hero = pick_hero(vec![a.clone(), b], day(10)).unwrap();
  assert_eq!(hero.id, a.id);
}

#[test]
fn hero_highest_priority_wins() {
  let low = campaign("low", 1, (None, None), day(1));
  let high = campaign("high", 9, (None, None), day(1));

  let hero = pick_hero(vec![low, high.clone()], day(10)).unwrap();
  assert_eq!(hero.id, high.id);
}

#[test]
fn hero_ties_break_on_later_created_at() {
  let older = campaign("older", 5, (None, None), day(1));
  let newer = campaign("newer", 5, (None, None), day(3));

  let hero = pick_hero(vec![newer.clone(), older], day(10)).unwrap();
  assert_eq!(hero.id, newer.id);
}

#[test]
fn no_live_candidate_means_no_hero() {
  let expired = campaign("expired", 10, (Some(day(1)), Some(day(5))), day(1));
  assert!(pick_hero(vec![expired], day(10)).is_none());
}

#[tokio::test]
async fn inactive_campaigns_never_become_hero() {
  let mut inactive = campaign("inactive", 10, (None, None), day(1));
  inactive.active = false;
  let store = FakeStore { campaigns: vec![inactive], ..Default::default() };

  let payload = compose_home(&store, day(10)).await.unwrap();
  assert!(payload.hero.is_none());
}

// ─── Featured categories ─────────────────────────────────────────────────────

#[test]
fn categories_ranked_by_derived_count_with_stable_ties() {
  let shelf = rank_categories(vec![
    category("Y", 3),
    category("X", 10),
    category("Z", 3),
  ]);

  let names: Vec<_> = shelf.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, ["X", "Y", "Z"]);
  assert_eq!(shelf[0].product_count, 10);
}

#[test]
fn featured_categories_capped_at_six() {
  let categories = (0..10).map(|i| category(&format!("c{i}"), i)).collect();
  assert_eq!(rank_categories(categories).len(), FEATURED_CATEGORY_CAP);
}

// ─── Product shelves ─────────────────────────────────────────────────────────

#[tokio::test]
async fn bestsellers_ordered_by_reviews_then_rating() {
  let store = FakeStore {
    products: vec![
      product("mid", 50, 3.0, day(1)),
      product("top-rated", 80, 4.9, day(1)),
      product("top-reviewed", 80, 4.2, day(1)),
    ],
    ..Default::default()
  };

  let payload = compose_home(&store, day(10)).await.unwrap();
  let names: Vec<_> = payload.bestsellers.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["top-rated", "top-reviewed", "mid"]);
}

#[tokio::test]
async fn bestsellers_capped_at_twelve() {
  let products = (0..20).map(|i| product(&format!("p{i}"), i, 4.0, day(1))).collect();
  let store = FakeStore { products, ..Default::default() };

  let payload = compose_home(&store, day(10)).await.unwrap();
  assert_eq!(payload.bestsellers.len(), BESTSELLER_CAP);
}

#[tokio::test]
async fn new_arrivals_newest_first() {
  let store = FakeStore {
    products: vec![
      product("old", 0, 0.0, day(2)),
      product("new", 0, 0.0, day(8)),
      product("mid", 0, 0.0, day(5)),
    ],
    ..Default::default()
  };

  let payload = compose_home(&store, day(10)).await.unwrap();
  let names: Vec<_> = payload.new_arrivals.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["new", "mid", "old"]);
}

// ─── Deals ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn expired_deals_never_appear() {
  let store = FakeStore {
    deals: vec![deal((day(1), day(5))), deal((day(8), day(20)))],
    ..Default::default()
  };

  let payload = compose_home(&store, day(10)).await.unwrap();
  assert_eq!(payload.deals.len(), 1);
  assert_eq!(payload.deals[0].starts_at, day(8));
}

// ─── Fixed and verbatim shelves ──────────────────────────────────────────────

#[tokio::test]
async fn trust_signals_are_the_fixed_four() {
  let store = FakeStore::default();
  let payload = compose_home(&store, day(10)).await.unwrap();

  let keys: Vec<_> = payload.trust_signals.iter().map(|t| t.key).collect();
  assert_eq!(keys, ["fastDelivery", "securePayment", "easyReturns", "support"]);
}

#[tokio::test]
async fn brands_keep_insertion_order() {
  let store = FakeStore {
    brands: vec![brand("b1"), brand("b2"), brand("b3")],
    ..Default::default()
  };

  let payload = compose_home(&store, day(10)).await.unwrap();
  let names: Vec<_> = payload.brands.iter().map(|b| b.name.as_str()).collect();
  assert_eq!(names, ["b1", "b2", "b3"]);
}

#[tokio::test]
async fn testimonials_newest_first_capped_at_six() {
  let testimonials = (1..=9).map(|d| testimonial(&format!("t{d}"), day(d))).collect();
  let store = FakeStore { testimonials, ..Default::default() };

  let payload = compose_home(&store, day(10)).await.unwrap();
  assert_eq!(payload.testimonials.len(), 6);
  assert_eq!(payload.testimonials[0].name, "t9");
}

// ─── Degradation and determinism ─────────────────────────────────────────────

#[tokio::test]
async fn failed_brand_read_degrades_to_empty_shelf() {
  let store = FakeStore {
    campaigns: vec![campaign("hero", 1, (None, None), day(1))],
    products: vec![product("p", 3, 4.0, day(1))],
    brands: vec![brand("never-seen")],
    ..Default::default()
  }
  .fail_on("brands");

  let payload = compose_home(&store, day(10)).await.unwrap();
  assert!(payload.brands.is_empty());
  assert!(payload.hero.is_some());
  assert_eq!(payload.bestsellers.len(), 1);
}

#[tokio::test]
async fn all_reads_failing_is_a_composition_error() {
  let store = FakeStore::default()
    .fail_on("campaigns")
    .fail_on("categories")
    .fail_on("products")
    .fail_on("deals")
    .fail_on("brands")
    .fail_on("testimonials");

  let result = compose_home(&store, day(10)).await;
  assert!(matches!(result, Err(ComposeError::AllShelvesFailed)));
}

#[tokio::test]
async fn unchanged_snapshot_composes_identically() {
  let store = FakeStore {
    campaigns: vec![campaign("hero", 2, (Some(day(1)), None), day(1))],
    categories: vec![category("X", 4), category("Y", 4)],
    products: vec![product("p1", 10, 4.5, day(2)), product("p2", 7, 3.9, day(3))],
    deals: vec![deal((day(5), day(15)))],
    brands: vec![brand("b")],
    testimonials: vec![testimonial("t", day(4))],
    ..Default::default()
  };

  let first = compose_home(&store, day(10)).await.unwrap();
  let second = compose_home(&store, day(10)).await.unwrap();

  assert_eq!(first, second);
  assert_eq!(
    serde_json::to_string(&first).unwrap(),
    serde_json::to_string(&second).unwrap(),
  );
}
