//! Campaign — a merchandising banner eligible for the homepage hero slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A promotional campaign. At most one live campaign is shown as the
/// homepage hero, chosen by `priority` (and recency on ties).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
  pub id:         Uuid,
  pub title:      String,
  pub subtitle:   Option<String>,
  pub cta_text:   String,
  pub cta_url:    String,
  pub image:      Option<String>,
  pub active:     bool,
  pub priority:   i64,
  /// Start of the display window; `None` means unbounded on that side.
  pub starts_at:  Option<DateTime<Utc>>,
  /// End of the display window; `None` means unbounded on that side.
  pub ends_at:    Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

impl Campaign {
  /// Whether `now` falls inside the closed display window. Absent bounds
  /// are treated as unbounded on that side.
  pub fn is_live(&self, now: DateTime<Utc>) -> bool {
    self.active
      && self.starts_at.is_none_or(|s| s <= now)
      && self.ends_at.is_none_or(|e| e >= now)
  }
}

/// Input for creating a campaign (id and `created_at` are store-assigned).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
  pub title:     String,
  pub subtitle:  Option<String>,
  #[serde(default = "default_cta_text")]
  pub cta_text:  String,
  #[serde(default = "default_cta_url")]
  pub cta_url:   String,
  pub image:     Option<String>,
  #[serde(default)]
  pub active:    bool,
  #[serde(default)]
  pub priority:  i64,
  pub starts_at: Option<DateTime<Utc>>,
  pub ends_at:   Option<DateTime<Utc>>,
}

fn default_cta_text() -> String { "Shop now".to_owned() }

fn default_cta_url() -> String { "/".to_owned() }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn campaign(
    active: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
  ) -> Campaign {
    Campaign {
      id: Uuid::new_v4(),
      title: "test".into(),
      subtitle: None,
      cta_text: "go".into(),
      cta_url: "/".into(),
      image: None,
      active,
      priority: 0,
      starts_at,
      ends_at,
      created_at: Utc::now(),
    }
  }

  fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, d, 12, 0, 0).unwrap()
  }

  #[test]
  fn unbounded_window_is_always_live() {
    assert!(campaign(true, None, None).is_live(day(10)));
  }

  #[test]
  fn inactive_campaign_is_never_live() {
    assert!(!campaign(false, None, None).is_live(day(10)));
  }

  #[test]
  fn window_bounds_are_inclusive() {
    let c = campaign(true, Some(day(10)), Some(day(10)));
    assert!(c.is_live(day(10)));
  }

  #[test]
  fn both_window_conditions_must_hold() {
    // Started but already ended.
    assert!(!campaign(true, Some(day(1)), Some(day(5))).is_live(day(10)));
    // Not yet started.
    assert!(!campaign(true, Some(day(15)), None).is_live(day(10)));
    // Half-open windows.
    assert!(campaign(true, Some(day(1)), None).is_live(day(10)));
    assert!(campaign(true, None, Some(day(15))).is_live(day(10)));
  }
}
