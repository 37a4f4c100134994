//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use vitrin_core::{
  Error as CoreError,
  brand::{Brand, NewBrand},
  campaign::{Campaign, NewCampaign},
  category::{Category, CategoryRef, CategoryWithCount, NewCategory},
  deal::{ActiveDeal, Deal, NewDeal},
  product::{NewProduct, Product, ProductUpdate},
  store::{CampaignQuery, CatalogStore, ProductQuery, ProductSort},
  testimonial::{NewTestimonial, Testimonial},
  user::{NewUser, User, UserUpdate},
};

use crate::{
  Error, Result,
  encode::{
    RawActiveDeal, RawBrand, RawCampaign, RawCategoryWithCount, RawProduct,
    RawTestimonial, RawUser, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Shared column list for product reads; every product leaves the store
/// with its category reference already resolved.
const PRODUCT_SELECT: &str =
  "SELECT p.product_id, p.name, p.description, p.price, p.image,
          p.category_id, c.name, p.stock, p.rating, p.num_reviews, p.created_at
   FROM products p
   JOIN categories c ON c.category_id = p.category_id";

/// Optional-filter clause shared by product list and count queries.
const PRODUCT_FILTER: &str =
  "WHERE (?1 IS NULL OR p.category_id = ?1)
     AND (?2 IS NULL OR p.price >= ?2)
     AND (?3 IS NULL OR p.price <= ?3)";

fn product_order(sort: ProductSort) -> &'static str {
  // rowid tie-breaks keep every ordering fully deterministic.
  match sort {
    ProductSort::Newest => "p.created_at DESC, p.rowid DESC",
    ProductSort::Bestselling => "p.num_reviews DESC, p.rating DESC, p.rowid",
    ProductSort::PriceAsc => "p.price, p.rowid",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vitrin catalog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Look up a category's name, or `None` if the category does not exist.
  async fn category_name(&self, id: Uuid) -> Result<Option<String>> {
    let id_str = encode_uuid(id);
    let name = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name FROM categories WHERE category_id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }

  async fn query_products(
    &self,
    sql: String,
    pattern: Option<String>,
  ) -> Result<Vec<Product>> {
    let raws: Vec<RawProduct> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], |row| {
            RawProduct::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_campaigns(&self, query: CampaignQuery) -> Result<Vec<Campaign>> {
    let live_at_str = query.live_at.map(encode_dt);
    let active = query.active;

    let raws: Vec<RawCampaign> = self
      .conn
      .call(move |conn| {
        // Both window conditions must hold; absent bounds are unbounded.
        let mut stmt = conn.prepare(
          "SELECT campaign_id, title, subtitle, cta_text, cta_url, image,
                  active, priority, starts_at, ends_at, created_at
           FROM campaigns
           WHERE (?1 IS NULL OR active = ?1)
             AND (?2 IS NULL OR starts_at IS NULL OR starts_at <= ?2)
             AND (?2 IS NULL OR ends_at IS NULL OR ends_at >= ?2)
           ORDER BY rowid",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![active, live_at_str], |row| {
            Ok(RawCampaign {
              campaign_id: row.get(0)?,
              title:       row.get(1)?,
              subtitle:    row.get(2)?,
              cta_text:    row.get(3)?,
              cta_url:     row.get(4)?,
              image:       row.get(5)?,
              active:      row.get(6)?,
              priority:    row.get(7)?,
              starts_at:   row.get(8)?,
              ends_at:     row.get(9)?,
              created_at:  row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCampaign::into_campaign).collect()
  }

  async fn list_categories(&self) -> Result<Vec<CategoryWithCount>> {
    let raws: Vec<RawCategoryWithCount> = self
      .conn
      .call(|conn| {
        // Derived count; rowid ordering keeps tie-breaks stable upstream.
        let mut stmt = conn.prepare(
          "SELECT c.category_id, c.name, c.description, c.created_at,
                  COUNT(p.product_id)
           FROM categories c
           LEFT JOIN products p ON p.category_id = c.category_id
           GROUP BY c.category_id
           ORDER BY c.rowid",
        )?;

        let rows = stmt
          .query_map([], |row| {
            Ok(RawCategoryWithCount {
              category_id:   row.get(0)?,
              name:          row.get(1)?,
              description:   row.get(2)?,
              created_at:    row.get(3)?,
              product_count: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawCategoryWithCount::into_category)
      .collect()
  }

  async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>> {
    let category_str = query.category_id.map(encode_uuid);
    let (min_price, max_price) = (query.min_price, query.max_price);
    let limit = query.limit.map(|l| l as i64).unwrap_or(-1);
    let offset = query.offset.unwrap_or(0) as i64;
    let order = product_order(query.sort);

    let sql = format!(
      "{PRODUCT_SELECT} {PRODUCT_FILTER} ORDER BY {order} LIMIT ?4 OFFSET ?5"
    );

    let raws: Vec<RawProduct> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![category_str, min_price, max_price, limit, offset],
            |row| RawProduct::from_row(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  async fn count_products(&self, query: ProductQuery) -> Result<u64> {
    let category_str = query.category_id.map(encode_uuid);
    let (min_price, max_price) = (query.min_price, query.max_price);

    let sql = format!(
      "SELECT COUNT(*)
       FROM products p
       {PRODUCT_FILTER}"
    );

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params![category_str, min_price, max_price],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let id_str = encode_uuid(id);
    let sql = format!("{PRODUCT_SELECT} WHERE p.product_id = ?1");

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawProduct::from_row(row, 0)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn search_products(&self, terms: &str) -> Result<Vec<Product>> {
    // Primary tier: the FTS5 index. Terms are quoted so user input cannot
    // produce match-syntax errors; real database errors still propagate.
    let fts_query = terms
      .split_whitespace()
      .map(|t| format!("\"{}\"", t.replace('"', "")))
      .collect::<Vec<_>>()
      .join(" ");

    if fts_query.is_empty() {
      return Ok(Vec::new());
    }

    let sql = format!(
      "{PRODUCT_SELECT}
       JOIN products_fts ON products_fts.rowid = p.rowid
       WHERE products_fts MATCH ?1
       ORDER BY products_fts.rank"
    );
    let matched = self.query_products(sql, Some(fts_query)).await?;
    if !matched.is_empty() {
      return Ok(matched);
    }

    // Fallback tier: substring match over name and description.
    let escaped = terms
      .replace('\\', "\\\\")
      .replace('%', "\\%")
      .replace('_', "\\_");
    let pattern = format!("%{escaped}%");

    let sql = format!(
      "{PRODUCT_SELECT}
       WHERE (p.name LIKE ?1 ESCAPE '\\' OR p.description LIKE ?1 ESCAPE '\\')
       ORDER BY p.rowid"
    );
    self.query_products(sql, Some(pattern)).await
  }

  async fn list_deals(&self, live_at: DateTime<Utc>) -> Result<Vec<ActiveDeal>> {
    let live_at_str = encode_dt(live_at);

    let raws: Vec<RawActiveDeal> = self
      .conn
      .call(move |conn| {
        // Inner joins drop deals whose product (or its category) is gone.
        let mut stmt = conn.prepare(
          "SELECT d.deal_id, d.discount_percent, d.starts_at, d.ends_at,
                  d.limited_stock,
                  p.product_id, p.name, p.description, p.price, p.image,
                  p.category_id, c.name, p.stock, p.rating, p.num_reviews,
                  p.created_at
           FROM deals d
           JOIN products p ON p.product_id = d.product_id
           JOIN categories c ON c.category_id = p.category_id
           WHERE d.starts_at <= ?1 AND d.ends_at >= ?1
           ORDER BY d.rowid",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![live_at_str], |row| {
            Ok(RawActiveDeal {
              deal_id:          row.get(0)?,
              discount_percent: row.get(1)?,
              starts_at:        row.get(2)?,
              ends_at:          row.get(3)?,
              limited_stock:    row.get(4)?,
              product:          RawProduct::from_row(row, 5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActiveDeal::into_deal).collect()
  }

  async fn list_brands(&self, limit: usize) -> Result<Vec<Brand>> {
    let limit = limit as i64;

    let raws: Vec<RawBrand> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT brand_id, name, logo, website, created_at
           FROM brands ORDER BY rowid LIMIT ?1",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawBrand {
              brand_id:   row.get(0)?,
              name:       row.get(1)?,
              logo:       row.get(2)?,
              website:    row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBrand::into_brand).collect()
  }

  async fn list_testimonials(&self, limit: usize) -> Result<Vec<Testimonial>> {
    let limit = limit as i64;

    let raws: Vec<RawTestimonial> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT testimonial_id, name, text, rating, image, product_id,
                  created_at
           FROM testimonials
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?1",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawTestimonial {
              testimonial_id: row.get(0)?,
              name:           row.get(1)?,
              text:           row.get(2)?,
              rating:         row.get(3)?,
              image:          row.get(4)?,
              product_id:     row.get(5)?,
              created_at:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawTestimonial::into_testimonial)
      .collect()
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Catalog writes ────────────────────────────────────────────────────────

  async fn add_category(&self, input: NewCategory) -> Result<Category> {
    let category = Category {
      id:          Uuid::new_v4(),
      name:        input.name.trim().to_owned(),
      description: input.description,
      created_at:  Utc::now(),
    };

    let taken: bool = {
      let name = category.name.clone();
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM categories WHERE name = ?1",
                rusqlite::params![name],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?
    };
    if taken {
      return Err(Error::Core(CoreError::DuplicateCategoryName(category.name)));
    }

    let id_str = encode_uuid(category.id);
    let name = category.name.clone();
    let description = category.description.clone();
    let at_str = encode_dt(category.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO categories (category_id, name, description, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, description, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(category)
  }

  async fn add_product(&self, input: NewProduct) -> Result<Product> {
    let category_name = self
      .category_name(input.category_id)
      .await?
      .ok_or(Error::Core(CoreError::CategoryNotFound(input.category_id)))?;

    let product = Product {
      id:          Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      price:       input.price,
      image:       input.image,
      category:    CategoryRef { id: input.category_id, name: category_name },
      stock:       input.stock,
      rating:      input.rating,
      num_reviews: input.num_reviews,
      created_at:  Utc::now(),
    };

    let id_str = encode_uuid(product.id);
    let category_str = encode_uuid(product.category.id);
    let at_str = encode_dt(product.created_at);
    let (name, description, image) = (
      product.name.clone(),
      product.description.clone(),
      product.image.clone(),
    );
    let (price, stock) = (product.price, product.stock);
    let (rating, num_reviews) = (product.rating, product.num_reviews);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products (
             product_id, name, description, price, image,
             category_id, stock, rating, num_reviews, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            name,
            description,
            price,
            image,
            category_str,
            stock,
            rating,
            num_reviews,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(product)
  }

  async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product> {
    let mut product = self
      .get_product(id)
      .await?
      .ok_or(Error::Core(CoreError::ProductNotFound(id)))?;

    if let Some(name) = update.name {
      product.name = name;
    }
    if let Some(description) = update.description {
      product.description = description;
    }
    if let Some(price) = update.price {
      product.price = price;
    }
    if let Some(image) = update.image {
      product.image = image;
    }
    if let Some(category_id) = update.category_id {
      let name = self
        .category_name(category_id)
        .await?
        .ok_or(Error::Core(CoreError::CategoryNotFound(category_id)))?;
      product.category = CategoryRef { id: category_id, name };
    }
    if let Some(stock) = update.stock {
      product.stock = stock;
    }

    let id_str = encode_uuid(id);
    let category_str = encode_uuid(product.category.id);
    let (name, description, image) = (
      product.name.clone(),
      product.description.clone(),
      product.image.clone(),
    );
    let (price, stock) = (product.price, product.stock);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE products
           SET name = ?2, description = ?3, price = ?4, image = ?5,
               category_id = ?6, stock = ?7
           WHERE product_id = ?1",
          rusqlite::params![
            id_str,
            name,
            description,
            price,
            image,
            category_str,
            stock,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(product)
  }

  async fn set_product_stock(&self, id: Uuid, stock: i64) -> Result<Product> {
    let mut product = self
      .get_product(id)
      .await?
      .ok_or(Error::Core(CoreError::ProductNotFound(id)))?;
    product.stock = stock;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE products SET stock = ?2 WHERE product_id = ?1",
          rusqlite::params![id_str, stock],
        )?;
        Ok(())
      })
      .await?;

    Ok(product)
  }

  async fn delete_product(&self, id: Uuid) -> Result<Uuid> {
    let id_str = encode_uuid(id);
    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM products WHERE product_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(CoreError::ProductNotFound(id)));
    }
    Ok(id)
  }

  // ── Merchandising writes ──────────────────────────────────────────────────

  async fn add_campaign(&self, input: NewCampaign) -> Result<Campaign> {
    let campaign = Campaign {
      id:         Uuid::new_v4(),
      title:      input.title,
      subtitle:   input.subtitle,
      cta_text:   input.cta_text,
      cta_url:    input.cta_url,
      image:      input.image,
      active:     input.active,
      priority:   input.priority,
      starts_at:  input.starts_at,
      ends_at:    input.ends_at,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(campaign.id);
    let starts_str = campaign.starts_at.map(encode_dt);
    let ends_str = campaign.ends_at.map(encode_dt);
    let at_str = encode_dt(campaign.created_at);
    let (title, subtitle, cta_text, cta_url, image) = (
      campaign.title.clone(),
      campaign.subtitle.clone(),
      campaign.cta_text.clone(),
      campaign.cta_url.clone(),
      campaign.image.clone(),
    );
    let (active, priority) = (campaign.active, campaign.priority);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO campaigns (
             campaign_id, title, subtitle, cta_text, cta_url, image,
             active, priority, starts_at, ends_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str, title, subtitle, cta_text, cta_url, image, active,
            priority, starts_str, ends_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(campaign)
  }

  async fn add_deal(&self, input: NewDeal) -> Result<Deal> {
    let deal = Deal {
      id:               Uuid::new_v4(),
      product_id:       input.product_id,
      discount_percent: input.discount_percent,
      starts_at:        input.starts_at,
      ends_at:          input.ends_at,
      limited_stock:    input.limited_stock,
      created_at:       Utc::now(),
    };

    let id_str = encode_uuid(deal.id);
    let product_str = encode_uuid(deal.product_id);
    let starts_str = encode_dt(deal.starts_at);
    let ends_str = encode_dt(deal.ends_at);
    let at_str = encode_dt(deal.created_at);
    let (discount, limited) = (deal.discount_percent, deal.limited_stock);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO deals (
             deal_id, product_id, discount_percent, starts_at, ends_at,
             limited_stock, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, product_str, discount, starts_str, ends_str, limited, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(deal)
  }

  async fn add_brand(&self, input: NewBrand) -> Result<Brand> {
    let brand = Brand {
      id:         Uuid::new_v4(),
      name:       input.name,
      logo:       input.logo,
      website:    input.website,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(brand.id);
    let at_str = encode_dt(brand.created_at);
    let (name, logo, website) =
      (brand.name.clone(), brand.logo.clone(), brand.website.clone());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO brands (brand_id, name, logo, website, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, logo, website, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(brand)
  }

  async fn add_testimonial(&self, input: NewTestimonial) -> Result<Testimonial> {
    let testimonial = Testimonial {
      id:         Uuid::new_v4(),
      name:       input.name,
      text:       input.text,
      rating:     input.rating,
      image:      input.image,
      product_id: input.product_id,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(testimonial.id);
    let product_str = testimonial.product_id.map(encode_uuid);
    let at_str = encode_dt(testimonial.created_at);
    let (name, text, image) = (
      testimonial.name.clone(),
      testimonial.text.clone(),
      testimonial.image.clone(),
    );
    let rating = testimonial.rating;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO testimonials (
             testimonial_id, name, text, rating, image, product_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, text, rating, image, product_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(testimonial)
  }

  // ── Users and sessions ────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      id:            Uuid::new_v4(),
      name:          input.name,
      email:         input.email.trim().to_lowercase(),
      password_hash: input.password_hash,
      is_admin:      input.is_admin,
      created_at:    Utc::now(),
    };

    if self.find_user_by_email(&user.email).await?.is_some() {
      return Err(Error::Core(CoreError::DuplicateEmail(user.email)));
    }

    let id_str = encode_uuid(user.id);
    let at_str = encode_dt(user.created_at);
    let (name, email, password_hash) = (
      user.name.clone(),
      user.email.clone(),
      user.password_hash.clone(),
    );
    let is_admin = user.is_admin;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, email, password_hash, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, password_hash, is_admin, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, password_hash, is_admin, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, password_hash, is_admin, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User> {
    let mut user = self
      .get_user(id)
      .await?
      .ok_or(Error::Core(CoreError::UserNotFound(id)))?;

    if let Some(email) = update.email {
      let email = email.trim().to_lowercase();
      if email != user.email {
        if self.find_user_by_email(&email).await?.is_some() {
          return Err(Error::Core(CoreError::DuplicateEmail(email)));
        }
        user.email = email;
      }
    }
    if let Some(name) = update.name {
      user.name = name;
    }
    if let Some(password_hash) = update.password_hash {
      user.password_hash = password_hash;
    }

    let id_str = encode_uuid(id);
    let (name, email, password_hash) = (
      user.name.clone(),
      user.email.clone(),
      user.password_hash.clone(),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET name = ?2, email = ?3, password_hash = ?4
           WHERE user_id = ?1",
          rusqlite::params![id_str, name, email, password_hash],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn add_session(
    &self,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
  ) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let expires_str = encode_dt(expires_at);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, expires_at, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, user_str, expires_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_session(
    &self,
    token_hash: &str,
  ) -> Result<Option<(User, DateTime<Utc>)>> {
    let token_hash = token_hash.to_owned();
    let now_str = encode_dt(Utc::now());

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        // Expired sessions are dead weight; sweep them on every lookup so
        // the table stays bounded by the number of live tokens.
        conn.execute(
          "DELETE FROM sessions WHERE expires_at < ?1",
          rusqlite::params![now_str],
        )?;

        Ok(
          conn
            .query_row(
              "SELECT u.user_id, u.name, u.email, u.password_hash, u.is_admin,
                      u.created_at, s.expires_at
               FROM sessions s
               JOIN users u ON u.user_id = s.user_id
               WHERE s.token_hash = ?1",
              rusqlite::params![token_hash],
              |row| Ok((RawUser::from_row(row)?, row.get(6)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(user, expires)| {
        Ok((user.into_user()?, crate::encode::decode_dt(&expires)?))
      })
      .transpose()
  }
}
