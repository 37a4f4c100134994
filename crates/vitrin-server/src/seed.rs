//! Demo catalog for local development.
//!
//! Idempotence is not attempted; seeding an already-populated store will
//! fail on the unique category names, which is the desired signal.

use chrono::{Duration, Utc};
use vitrin_api::auth::hash_password;
use vitrin_core::{
  brand::NewBrand,
  campaign::NewCampaign,
  category::NewCategory,
  deal::NewDeal,
  product::NewProduct,
  store::CatalogStore,
  testimonial::NewTestimonial,
  user::NewUser,
};

/// Populate `store` with a small but representative storefront.
pub async fn seed_demo_catalog<S>(store: &S) -> anyhow::Result<()>
where
  S: CatalogStore,
{
  // Categories.
  let mut category_ids = Vec::new();
  for (name, description) in [
    ("Kitchen", "Cookware, tableware and small appliances"),
    ("Lighting", "Lamps and fixtures for every room"),
    ("Furniture", "Chairs, tables and storage"),
    ("Textiles", "Rugs, throws and cushions"),
  ] {
    let category = store
      .add_category(NewCategory {
        name:        name.to_owned(),
        description: Some(description.to_owned()),
      })
      .await?;
    category_ids.push(category.id);
  }

  // Products. (name, category index, price, stock, rating, reviews)
  let catalog: &[(&str, usize, f64, i64, f64, i64)] = &[
    ("Stoneware mug", 0, 18.0, 120, 4.7, 210),
    ("Cast iron skillet", 0, 64.0, 35, 4.9, 412),
    ("Ceramic mixing bowl", 0, 32.0, 58, 4.5, 96),
    ("Walnut serving board", 0, 44.0, 22, 4.6, 73),
    ("Brass desk lamp", 1, 89.0, 14, 4.4, 51),
    ("Paper floor lamp", 1, 129.0, 9, 4.2, 38),
    ("Oak dining chair", 2, 240.0, 16, 4.8, 164),
    ("Ash side table", 2, 180.0, 11, 4.3, 47),
    ("Wool area rug", 3, 320.0, 7, 4.6, 88),
    ("Linen throw", 3, 56.0, 64, 4.1, 29),
  ];

  let mut product_ids = Vec::new();
  for (name, category, price, stock, rating, num_reviews) in catalog {
    let product = store
      .add_product(NewProduct {
        name:        (*name).to_owned(),
        description: format!("{name}, made to last."),
        price:       *price,
        image:       format!(
          "/images/{}.jpg",
          name.to_lowercase().replace(' ', "-")
        ),
        category_id: category_ids[*category],
        stock:       *stock,
        rating:      *rating,
        num_reviews: *num_reviews,
      })
      .await?;
    product_ids.push(product.id);
  }

  // Campaigns. The autumn one outranks the evergreen banner while live.
  let now = Utc::now();
  store
    .add_campaign(NewCampaign {
      title:     "New season, new shelves".to_owned(),
      subtitle:  Some("Fresh arrivals across the whole store".to_owned()),
      cta_text:  "Shop now".to_owned(),
      cta_url:   "/products".to_owned(),
      image:     Some("/images/campaign-evergreen.jpg".to_owned()),
      active:    true,
      priority:  1,
      starts_at: None,
      ends_at:   None,
    })
    .await?;
  store
    .add_campaign(NewCampaign {
      title:     "Autumn sale".to_owned(),
      subtitle:  Some("Up to 30% off lighting and textiles".to_owned()),
      cta_text:  "See the deals".to_owned(),
      cta_url:   "/deals".to_owned(),
      image:     Some("/images/campaign-autumn.jpg".to_owned()),
      active:    true,
      priority:  10,
      starts_at: Some(now - Duration::days(1)),
      ends_at:   Some(now + Duration::days(30)),
    })
    .await?;

  // Deals on a couple of products.
  for (product, discount, limited_stock) in [
    (product_ids[4], 25, Some(10)),
    (product_ids[9], 30, None),
  ] {
    store
      .add_deal(NewDeal {
        product_id:       product,
        discount_percent: discount,
        starts_at:        now - Duration::days(1),
        ends_at:          now + Duration::days(14),
        limited_stock,
      })
      .await?;
  }

  // Brands.
  for name in ["Haven & Co", "Nordlys", "Atelier Marta", "Fern Studio"] {
    store
      .add_brand(NewBrand {
        name:    name.to_owned(),
        logo:    Some(format!(
          "/images/brands/{}.svg",
          name.to_lowercase().replace([' ', '&'], "-")
        )),
        website: None,
      })
      .await?;
  }

  // Testimonials.
  for (name, text, rating) in [
    ("Maya R.", "The skillet is the best thing in my kitchen.", 5.0),
    ("Jonas K.", "Fast delivery and the chair looks even better in person.", 4.5),
    ("Priya S.", "Returned a lamp with zero hassle. Will order again.", 5.0),
  ] {
    store
      .add_testimonial(NewTestimonial {
        name:       name.to_owned(),
        text:       text.to_owned(),
        rating,
        image:      None,
        product_id: None,
      })
      .await?;
  }

  // A default admin. Change the password before exposing the server.
  store
    .add_user(NewUser {
      name:          "Admin".to_owned(),
      email:         "admin@vitrin.local".to_owned(),
      password_hash: hash_password("admin123")?,
      is_admin:      true,
    })
    .await?;

  Ok(())
}
