//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, which also makes window
//! comparisons in SQL plain string comparisons. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vitrin_core::{
  brand::Brand,
  campaign::Campaign,
  category::{Category, CategoryRef, CategoryWithCount},
  deal::ActiveDeal,
  product::Product,
  testimonial::Testimonial,
  user::User,
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Raw row structs ──────────────────────────────────────────────────────────
//
// Columns come out of rusqlite as plain strings/numbers; each `Raw*` mirrors
// one SELECT's column list and converts fallibly into its domain type.

pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
}

impl RawCategory {
  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      id:          decode_uuid(&self.category_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCategoryWithCount {
  pub category_id:   String,
  pub name:          String,
  pub description:   Option<String>,
  pub created_at:    String,
  pub product_count: i64,
}

impl RawCategoryWithCount {
  pub fn into_category(self) -> Result<CategoryWithCount> {
    Ok(CategoryWithCount {
      id:            decode_uuid(&self.category_id)?,
      name:          self.name,
      description:   self.description,
      created_at:    decode_dt(&self.created_at)?,
      product_count: self.product_count.max(0) as u64,
    })
  }
}

/// A product row joined with its category's name.
pub struct RawProduct {
  pub product_id:    String,
  pub name:          String,
  pub description:   String,
  pub price:         f64,
  pub image:         String,
  pub category_id:   String,
  pub category_name: String,
  pub stock:         i64,
  pub rating:        f64,
  pub num_reviews:   i64,
  pub created_at:    String,
}

impl RawProduct {
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:    row.get(offset)?,
      name:          row.get(offset + 1)?,
      description:   row.get(offset + 2)?,
      price:         row.get(offset + 3)?,
      image:         row.get(offset + 4)?,
      category_id:   row.get(offset + 5)?,
      category_name: row.get(offset + 6)?,
      stock:         row.get(offset + 7)?,
      rating:        row.get(offset + 8)?,
      num_reviews:   row.get(offset + 9)?,
      created_at:    row.get(offset + 10)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      id:          decode_uuid(&self.product_id)?,
      name:        self.name,
      description: self.description,
      price:       self.price,
      image:       self.image,
      category:    CategoryRef {
        id:   decode_uuid(&self.category_id)?,
        name: self.category_name,
      },
      stock:       self.stock,
      rating:      self.rating,
      num_reviews: self.num_reviews,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCampaign {
  pub campaign_id: String,
  pub title:       String,
  pub subtitle:    Option<String>,
  pub cta_text:    String,
  pub cta_url:     String,
  pub image:       Option<String>,
  pub active:      bool,
  pub priority:    i64,
  pub starts_at:   Option<String>,
  pub ends_at:     Option<String>,
  pub created_at:  String,
}

impl RawCampaign {
  pub fn into_campaign(self) -> Result<Campaign> {
    Ok(Campaign {
      id:         decode_uuid(&self.campaign_id)?,
      title:      self.title,
      subtitle:   self.subtitle,
      cta_text:   self.cta_text,
      cta_url:    self.cta_url,
      image:      self.image,
      active:     self.active,
      priority:   self.priority,
      starts_at:  decode_opt_dt(self.starts_at.as_deref())?,
      ends_at:    decode_opt_dt(self.ends_at.as_deref())?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A deal row joined with its (still existing) product.
pub struct RawActiveDeal {
  pub deal_id:          String,
  pub discount_percent: i64,
  pub starts_at:        String,
  pub ends_at:          String,
  pub limited_stock:    Option<i64>,
  pub product:          RawProduct,
}

impl RawActiveDeal {
  pub fn into_deal(self) -> Result<ActiveDeal> {
    Ok(ActiveDeal {
      id:               decode_uuid(&self.deal_id)?,
      discount_percent: self.discount_percent,
      starts_at:        decode_dt(&self.starts_at)?,
      ends_at:          decode_dt(&self.ends_at)?,
      limited_stock:    self.limited_stock,
      product:          self.product.into_product()?,
    })
  }
}

pub struct RawBrand {
  pub brand_id:   String,
  pub name:       String,
  pub logo:       Option<String>,
  pub website:    Option<String>,
  pub created_at: String,
}

impl RawBrand {
  pub fn into_brand(self) -> Result<Brand> {
    Ok(Brand {
      id:         decode_uuid(&self.brand_id)?,
      name:       self.name,
      logo:       self.logo,
      website:    self.website,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawTestimonial {
  pub testimonial_id: String,
  pub name:           String,
  pub text:           String,
  pub rating:         f64,
  pub image:          Option<String>,
  pub product_id:     Option<String>,
  pub created_at:     String,
}

impl RawTestimonial {
  pub fn into_testimonial(self) -> Result<Testimonial> {
    Ok(Testimonial {
      id:         decode_uuid(&self.testimonial_id)?,
      name:       self.name,
      text:       self.text,
      rating:     self.rating,
      image:      self.image,
      product_id: self.product_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub is_admin:      bool,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      is_admin:      row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.user_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      is_admin:      self.is_admin,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
