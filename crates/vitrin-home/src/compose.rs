//! The homepage composer.
//!
//! One call pulls from six independent collections, applies per-shelf
//! selection and ranking rules, and assembles a single [`HomePayload`].
//! The composer is a pure function of the store snapshot and `now`; it
//! holds no state and never memoises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use vitrin_core::{
  brand::Brand,
  campaign::Campaign,
  category::CategoryWithCount,
  deal::ActiveDeal,
  product::Product,
  store::{CampaignQuery, CatalogStore, ProductQuery, ProductSort},
  testimonial::Testimonial,
};

// ─── Shelf caps ──────────────────────────────────────────────────────────────

pub const FEATURED_CATEGORY_CAP: usize = 6;
pub const BESTSELLER_CAP: usize = 12;
pub const NEW_ARRIVAL_CAP: usize = 12;
pub const BRAND_CAP: usize = 20;
pub const TESTIMONIAL_CAP: usize = 6;

/// Number of store reads one composition issues. Used to detect the
/// everything-failed case.
const SHELF_QUERY_COUNT: u32 = 7;

// ─── Payload types ───────────────────────────────────────────────────────────

/// A static homepage trust badge. No query is involved; the fixed set in
/// [`trust_signals`] is included in every payload verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustSignal {
  pub key:   &'static str,
  pub label: &'static str,
  pub icon:  &'static str,
}

/// The fixed four trust signals shown on every homepage.
pub fn trust_signals() -> Vec<TrustSignal> {
  vec![
    TrustSignal { key: "fastDelivery", label: "Fast delivery", icon: "truck" },
    TrustSignal { key: "securePayment", label: "Secure payment", icon: "shield" },
    TrustSignal { key: "easyReturns", label: "Easy returns", icon: "repeat" },
    TrustSignal { key: "support", label: "24/7 support", icon: "headset" },
  ]
}

/// A category entry on the featured shelf: identity plus the derived
/// product count it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedCategory {
  pub id:            Uuid,
  pub name:          String,
  pub product_count: u64,
}

impl From<CategoryWithCount> for FeaturedCategory {
  fn from(c: CategoryWithCount) -> Self {
    Self { id: c.id, name: c.name, product_count: c.product_count }
  }
}

/// The composed homepage. Every shelf is independently computed; an empty
/// or absent shelf means that source had nothing to show (or its query
/// degraded), never that the whole composition failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePayload {
  pub hero:                Option<Campaign>,
  pub trust_signals:       Vec<TrustSignal>,
  pub featured_categories: Vec<FeaturedCategory>,
  pub bestsellers:         Vec<Product>,
  pub deals:               Vec<ActiveDeal>,
  pub new_arrivals:        Vec<Product>,
  pub brands:              Vec<Brand>,
  pub testimonials:        Vec<Testimonial>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ComposeError {
  /// Every shelf query failed; there is nothing worth returning.
  /// Individual shelf failures degrade to empty shelves instead.
  #[error("no homepage shelf could be produced")]
  AllShelvesFailed,
}

// ─── Composition ─────────────────────────────────────────────────────────────

/// Compose the homepage payload as of `now`.
///
/// The six collection reads are issued concurrently and fan in before any
/// ranking runs. A shelf whose query fails is logged and degraded to
/// empty; only when every query fails does the call return
/// [`ComposeError::AllShelvesFailed`]. Given an unchanged snapshot and the
/// same `now`, the output is byte-identical across calls.
pub async fn compose_home<S>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<HomePayload, ComposeError>
where
  S: CatalogStore,
{
  let hero_query = CampaignQuery { active: Some(true), live_at: Some(now) };
  let bestseller_query = ProductQuery {
    sort: ProductSort::Bestselling,
    limit: Some(BESTSELLER_CAP),
    ..Default::default()
  };
  let arrival_query = ProductQuery {
    sort: ProductSort::Newest,
    limit: Some(NEW_ARRIVAL_CAP),
    ..Default::default()
  };

  let (campaigns, categories, bestsellers, deals, arrivals, brands, testimonials) = tokio::join!(
    store.list_campaigns(hero_query),
    store.list_categories(),
    store.list_products(bestseller_query),
    store.list_deals(now),
    store.list_products(arrival_query),
    store.list_brands(BRAND_CAP),
    store.list_testimonials(TESTIMONIAL_CAP),
  );

  let mut failed = 0;
  let campaigns    = degrade("hero", campaigns, &mut failed).unwrap_or_default();
  let categories   = degrade("featuredCategories", categories, &mut failed).unwrap_or_default();
  let bestsellers  = degrade("bestsellers", bestsellers, &mut failed).unwrap_or_default();
  let deals        = degrade("deals", deals, &mut failed).unwrap_or_default();
  let new_arrivals = degrade("newArrivals", arrivals, &mut failed).unwrap_or_default();
  let brands       = degrade("brands", brands, &mut failed).unwrap_or_default();
  let testimonials = degrade("testimonials", testimonials, &mut failed).unwrap_or_default();

  if failed == SHELF_QUERY_COUNT {
    return Err(ComposeError::AllShelvesFailed);
  }

  Ok(HomePayload {
    hero: pick_hero(campaigns, now),
    trust_signals: trust_signals(),
    featured_categories: rank_categories(categories),
    bestsellers,
    deals,
    new_arrivals,
    brands,
    testimonials,
  })
}

/// Unwrap one shelf's query result, degrading a failure to `None`.
fn degrade<T, E>(shelf: &'static str, result: Result<T, E>, failed: &mut u32) -> Option<T>
where
  E: std::error::Error,
{
  match result {
    Ok(value) => Some(value),
    Err(error) => {
      *failed += 1;
      tracing::warn!(%error, shelf, "shelf query failed; serving shelf empty");
      None
    }
  }
}

/// Select the hero campaign: among campaigns live at `now`, the one with
/// the highest priority; on equal priority the most recently created wins.
/// No live candidate means no hero, which is not an error.
pub fn pick_hero(campaigns: Vec<Campaign>, now: DateTime<Utc>) -> Option<Campaign> {
  campaigns
    .into_iter()
    .filter(|c| c.is_live(now))
    .max_by(|a, b| {
      (a.priority, a.created_at).cmp(&(b.priority, b.created_at))
    })
}

/// Rank categories by derived product count, descending. Ties keep the
/// store's insertion order (stable sort), then the shelf is capped.
pub fn rank_categories(mut categories: Vec<CategoryWithCount>) -> Vec<FeaturedCategory> {
  categories.sort_by(|a, b| b.product_count.cmp(&a.product_count));
  categories.truncate(FEATURED_CATEGORY_CAP);
  categories.into_iter().map(FeaturedCategory::from).collect()
}
