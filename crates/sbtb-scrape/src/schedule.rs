//! Fight schedule page parser.
//!
//! Unlike the rankings page, each card here is self-contained, so a card
//! with unreadable fields is dropped on its own and the rest still parse.
//! Only a missing schedule container fails the page.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use sbtb_core::raw::RawFightCard;

use crate::error::{ParseError, Result};

const CONTAINER: &str = ".fight-schedule";
const CARD: &str = "div.fight-card";
const DATE: &str = ".fight-card__date";
const TITLE: &str = ".fight-card__title";
const UNDERCARD: &str = ".fight-card__undercard li";
const LOCATION: &str = ".fight-card__location";
const NETWORK: &str = ".fight-card__network";

/// Applied after the weekday and the zone label have been removed.
const DATE_FORMAT: &str = "%b %d, %Y %I:%M %p";

const VERSUS: &str = " vs ";

struct Selectors {
  container: Selector,
  card:      Selector,
  date:      Selector,
  title:     Selector,
  undercard: Selector,
  location:  Selector,
  network:   Selector,
}

impl Selectors {
  fn new() -> Result<Self> {
    Ok(Self {
      container: Selector::parse(CONTAINER)?,
      card:      Selector::parse(CARD)?,
      date:      Selector::parse(DATE)?,
      title:     Selector::parse(TITLE)?,
      undercard: Selector::parse(UNDERCARD)?,
      location:  Selector::parse(LOCATION)?,
      network:   Selector::parse(NETWORK)?,
    })
  }
}

/// Parse every fight card on a schedule page. Dates are read in `zone` and
/// returned in UTC.
pub fn parse_schedule(markup: &str, zone: Tz) -> Result<Vec<RawFightCard>> {
  let sel = Selectors::new()?;
  let document = Html::parse_document(markup);

  let container = document.select(&sel.container).next().ok_or(
    ParseError::MissingElement { context: "schedule page", selector: CONTAINER },
  )?;

  let mut cards = Vec::new();
  for (idx, element) in container.select(&sel.card).enumerate() {
    match read_card(&sel, element, zone) {
      Ok(card) => cards.push(card),
      Err(reason) => warn!(card = idx, reason, "skipping fight card"),
    }
  }

  debug!(cards = cards.len(), "parsed schedule");
  Ok(cards)
}

fn read_card(
  sel: &Selectors,
  card: ElementRef<'_>,
  zone: Tz,
) -> std::result::Result<RawFightCard, &'static str> {
  let date_text = first_text(card, &sel.date).ok_or("missing date")?;
  let event_date = parse_event_date(&date_text, zone).ok_or("unreadable date")?;

  let title = first_text(card, &sel.title).ok_or("missing title")?;
  let title_fighters = split_bout(&title).ok_or("title is not a bout")?;

  let location = first_text(card, &sel.location)
    .filter(|l| !l.is_empty())
    .ok_or("missing location")?;

  // Participants are replaced wholesale downstream, so a half-read
  // undercard would drop fighters from a stored card.
  let mut undercard_fighters = Vec::new();
  for li in card.select(&sel.undercard) {
    let row = text_of(li);
    let Some((a, b)) = split_bout(&row) else {
      warn!(row = %row.trim(), "undercard row is not a bout");
      return Err("unreadable undercard row");
    };
    undercard_fighters.extend([a, b]);
  }

  Ok(RawFightCard {
    event_date,
    title_fighters,
    undercard_fighters,
    location,
    network: first_text(card, &sel.network).filter(|n| !n.is_empty()),
  })
}

/// `"Friday | Apr 18, 2025 | 12:00 AM EST"` read in `zone`.
pub fn parse_event_date(text: &str, zone: Tz) -> Option<DateTime<Utc>> {
  let parts: Vec<&str> = text.split('|').map(str::trim).collect();
  let [_weekday, date, time] = parts.as_slice() else {
    return None;
  };

  // Drop the trailing zone label; the zone is supplied by the caller.
  let mut time_tokens: Vec<&str> = time.split_whitespace().collect();
  if time_tokens
    .last()
    .is_some_and(|t| !t.eq_ignore_ascii_case("am") && !t.eq_ignore_ascii_case("pm"))
  {
    time_tokens.pop();
  }

  let local = format!("{date} {}", time_tokens.join(" "));
  let naive = NaiveDateTime::parse_from_str(&local, DATE_FORMAT).ok()?;
  zone
    .from_local_datetime(&naive)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
}

/// `"A vs B"` → `("A", "B")`, both sides trimmed and non-empty.
fn split_bout(text: &str) -> Option<(String, String)> {
  let (a, b) = text.split_once(VERSUS)?;
  let (a, b) = (a.trim(), b.trim());
  (!a.is_empty() && !b.is_empty()).then(|| (a.to_owned(), b.to_owned()))
}

fn first_text(el: ElementRef<'_>, selector: &Selector) -> Option<String> {
  el.select(selector).next().map(|e| text_of(e).trim().to_owned())
}

fn text_of(el: ElementRef<'_>) -> String { el.text().collect() }
