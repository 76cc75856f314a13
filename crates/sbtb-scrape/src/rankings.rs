//! Rankings page parser.
//!
//! The page lists divisions as a flat run of sibling `div`s: a label section
//! (division name and weight) followed by a content section (one block per
//! organization). Nothing in the markup ties a label to its content except
//! position, so the scan is an explicit two-phase walk over pairs and any
//! deviation from that shape is a [`ParseError`].

use std::collections::{BTreeMap, btree_map::Entry};

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info};

use sbtb_core::raw::{INTERIM_RANK, RawDivision, RawFighterEntry, RawRankings};

use crate::error::{ParseError, Result};

const WRAPPER: &str = "div.card.card-wrapper.bg-black";
const DIVISION_NAME: &str = "h3";
const DIVISION_WEIGHT: &str = "span.tex";
const ORGANIZATION_NAME: &str = "h5";
const FIGHTER_NAME: &str = "span";

/// The only division printed without a weight limit.
const OPEN_DIVISION: &str = "heavyweight";

struct Selectors {
  wrapper:           Selector,
  division_name:     Selector,
  division_weight:   Selector,
  organization_name: Selector,
  fighter_name:      Selector,
}

impl Selectors {
  fn new() -> Result<Self> {
    Ok(Self {
      wrapper:           Selector::parse(WRAPPER)?,
      division_name:     Selector::parse(DIVISION_NAME)?,
      division_weight:   Selector::parse(DIVISION_WEIGHT)?,
      organization_name: Selector::parse(ORGANIZATION_NAME)?,
      fighter_name:      Selector::parse(FIGHTER_NAME)?,
    })
  }
}

/// Parse a rankings page into weight class → organization → ordered entries.
pub fn parse_rankings(markup: &str) -> Result<RawRankings> {
  let sel = Selectors::new()?;
  let document = Html::parse_document(markup);

  let wrapper = document.select(&sel.wrapper).next().ok_or(
    ParseError::MissingElement { context: "rankings page", selector: WRAPPER },
  )?;
  let root = child_divs(wrapper).next().ok_or(ParseError::MissingElement {
    context:  "rankings wrapper",
    selector: "div",
  })?;

  let sections: Vec<ElementRef<'_>> = child_divs(root).collect();
  if sections.is_empty() {
    return Err(ParseError::EmptyLayout("no division sections"));
  }
  if sections.len() % 2 != 0 {
    return Err(ParseError::UnpairedSection { index: sections.len() - 1 });
  }

  let mut rankings = RawRankings::new();
  for pair in sections.chunks_exact(2) {
    let (name, pounds) = read_label(&sel, pair[0])?;
    info!(weight_class = %name, ?pounds, "parsing weight class");
    let organizations = read_content(&sel, pair[1], &name)?;
    match rankings.entry(name) {
      Entry::Vacant(slot) => {
        slot.insert(RawDivision { pounds, organizations });
      }
      Entry::Occupied(taken) => {
        return Err(ParseError::DuplicateDivision(taken.key().clone()));
      }
    }
  }

  Ok(rankings)
}

// ─── Label phase ─────────────────────────────────────────────────────────────

fn read_label(sel: &Selectors, section: ElementRef<'_>) -> Result<(String, Option<u32>)> {
  let name = section
    .select(&sel.division_name)
    .next()
    .map(|h3| text_of(h3).trim().to_lowercase())
    .ok_or(ParseError::MissingElement {
      context:  "division label",
      selector: DIVISION_NAME,
    })?;

  if name == OPEN_DIVISION {
    return Ok((name, None));
  }

  let weight = section.select(&sel.division_weight).next().ok_or(
    ParseError::MissingElement { context: "division label", selector: DIVISION_WEIGHT },
  )?;
  Ok((name, Some(extract_pounds(&text_of(weight))?)))
}

/// `"175 lbs"` → `175`.
fn extract_pounds(text: &str) -> Result<u32> {
  text
    .split_whitespace()
    .next()
    .and_then(|token| token.parse().ok())
    .ok_or_else(|| ParseError::InvalidPounds(text.trim().to_owned()))
}

// ─── Content phase ───────────────────────────────────────────────────────────

fn read_content(
  sel: &Selectors,
  section: ElementRef<'_>,
  division: &str,
) -> Result<BTreeMap<String, Vec<RawFighterEntry>>> {
  let mut organizations = BTreeMap::new();

  for block in child_divs(section) {
    let org = block
      .select(&sel.organization_name)
      .next()
      .map(|h5| text_of(h5).trim().to_uppercase())
      .ok_or(ParseError::MissingElement {
        context:  "organization block",
        selector: ORGANIZATION_NAME,
      })?;
    let slots = child_divs(block).next().ok_or(ParseError::MissingElement {
      context:  "organization block",
      selector: "div",
    })?;

    let mut entries = Vec::new();
    for (idx, slot) in child_divs(slots).enumerate() {
      entries.extend(read_slot(sel, slot, idx)?);
    }
    if entries.is_empty() {
      return Err(ParseError::EmptyLayout("organization without fighters"));
    }
    debug!(organization = %org, entries = entries.len(), "parsed organization");

    if organizations.contains_key(&org) {
      return Err(ParseError::DuplicateOrganization {
        division:     division.to_owned(),
        organization: org,
      });
    }
    organizations.insert(org, entries);
  }

  if organizations.is_empty() {
    return Err(ParseError::EmptyLayout("rankings section without organizations"));
  }
  Ok(organizations)
}

/// Read one fighter slot. Position 0 is the champion and holds its name
/// directly; later positions wrap it in one more `div`.
fn read_slot(
  sel: &Selectors,
  slot: ElementRef<'_>,
  idx: usize,
) -> Result<Vec<RawFighterEntry>> {
  let container = if idx == 0 {
    slot
  } else {
    child_divs(slot).next().ok_or(ParseError::MissingElement {
      context:  "fighter slot",
      selector: "div",
    })?
  };
  let span = container.select(&sel.fighter_name).next().ok_or(
    ParseError::MissingElement { context: "fighter slot", selector: FIGHTER_NAME },
  )?;

  let rank = idx as f64;
  let segments = split_on_break(span);
  match segments.as_slice() {
    // Champion and interim champion share the slot.
    [primary, secondary] => Ok(vec![
      RawFighterEntry { name: clean_name(primary), rank, is_champion: true },
      RawFighterEntry {
        name:        clean_name(secondary),
        rank:        INTERIM_RANK,
        is_champion: true,
      },
    ]),
    [_, _, _, ..] => Err(ParseError::CrowdedSlot { segments: segments.len() }),
    _ => Ok(vec![RawFighterEntry {
      name:        clean_name(&text_of(span)),
      rank,
      is_champion: idx == 0,
    }]),
  }
}

/// Text of `span` cut at each `<br>`, empty pieces dropped.
fn split_on_break(span: ElementRef<'_>) -> Vec<String> {
  let mut segments = vec![String::new()];
  for node in span.children() {
    match node.value() {
      Node::Element(el) if el.name() == "br" => segments.push(String::new()),
      Node::Text(text) => {
        if let Some(current) = segments.last_mut() {
          current.push_str(text);
        }
      }
      Node::Element(_) => {
        if let (Some(current), Some(el)) = (segments.last_mut(), ElementRef::wrap(node)) {
          current.push_str(&text_of(el));
        }
      }
      _ => {}
    }
  }
  segments.retain(|s| !s.trim().is_empty());
  segments
}

/// `" Joseph Parker (Interim) "` → `"joseph parker"`.
fn clean_name(raw: &str) -> String {
  raw.split('(').next().unwrap_or_default().trim().to_lowercase()
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn child_divs<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
  el.children()
    .filter_map(ElementRef::wrap)
    .filter(|child| child.value().name() == "div")
}

fn text_of(el: ElementRef<'_>) -> String { el.text().collect() }

#[cfg(test)]
mod tests {
  use super::*;

  const FIXTURE: &str = include_str!("../fixtures/rankings.html");

  fn names(entries: &[RawFighterEntry]) -> Vec<(&str, f64, bool)> {
    entries
      .iter()
      .map(|e| (e.name.as_str(), e.rank, e.is_champion))
      .collect()
  }

  #[test]
  fn fixture_yields_one_division_per_label() {
    let rankings = parse_rankings(FIXTURE).unwrap();
    let divisions: Vec<_> = rankings.keys().map(String::as_str).collect();
    assert_eq!(divisions, vec!["heavyweight", "middleweight", "welterweight"]);

    assert_eq!(rankings["heavyweight"].pounds, None);
    assert_eq!(rankings["middleweight"].pounds, Some(160));
    assert_eq!(rankings["welterweight"].pounds, Some(147));
  }

  #[test]
  fn organization_labels_are_upper_cased() {
    let rankings = parse_rankings(FIXTURE).unwrap();
    let orgs: Vec<_> = rankings["heavyweight"]
      .organizations
      .keys()
      .map(String::as_str)
      .collect();
    assert_eq!(orgs, vec!["IBF", "WBC"]);
  }

  #[test]
  fn slots_keep_order_and_clean_names() {
    let rankings = parse_rankings(FIXTURE).unwrap();
    let wbc = &rankings["heavyweight"].organizations["WBC"];
    assert_eq!(names(wbc), vec![
      ("oleksandr usyk", 0.0, true),
      ("tyson fury", 1.0, false),
      ("zhilei zhang", 2.0, false),
    ]);
  }

  #[test]
  fn split_slot_emits_interim_champion() {
    let rankings = parse_rankings(FIXTURE).unwrap();
    let ibf = &rankings["heavyweight"].organizations["IBF"];
    assert_eq!(names(ibf), vec![
      ("daniel dubois", 0.0, true),
      ("joseph parker", 0.5, true),
      ("filip hrgovic", 1.0, false),
    ]);
  }

  fn page(sections: &str) -> String {
    format!(
      r#"<div class="card card-wrapper bg-black text-white p-2.5 md:p-5"><div>{sections}</div></div>"#
    )
  }

  const LABEL: &str = r#"<div><h3>Lightweight</h3><span class="tex">135 lbs</span></div>"#;
  const CONTENT: &str = r#"<div><div><h5>WBC</h5><div><div><span>Shakur Stevenson</span></div></div></div></div>"#;

  #[test]
  fn minimal_pair_parses() {
    let rankings = parse_rankings(&page(&format!("{LABEL}{CONTENT}"))).unwrap();
    assert_eq!(rankings["lightweight"].pounds, Some(135));
    assert_eq!(
      names(&rankings["lightweight"].organizations["WBC"]),
      vec![("shakur stevenson", 0.0, true)]
    );
  }

  #[test]
  fn odd_section_count_is_structural_error() {
    let err = parse_rankings(&page(&format!("{LABEL}{CONTENT}{LABEL}"))).unwrap_err();
    assert!(matches!(err, ParseError::UnpairedSection { index: 2 }));
  }

  #[test]
  fn label_without_h3_is_structural_error() {
    let label = r#"<div><span class="tex">135 lbs</span></div>"#;
    let err = parse_rankings(&page(&format!("{label}{CONTENT}"))).unwrap_err();
    assert!(matches!(
      err,
      ParseError::MissingElement { selector: "h3", .. }
    ));
  }

  #[test]
  fn label_without_weight_is_structural_error_except_heavyweight() {
    let label = r#"<div><h3>Lightweight</h3></div>"#;
    let err = parse_rankings(&page(&format!("{label}{CONTENT}"))).unwrap_err();
    assert!(matches!(
      err,
      ParseError::MissingElement { selector: "span.tex", .. }
    ));

    let heavy = r#"<div><h3>Heavyweight</h3></div>"#;
    let rankings = parse_rankings(&page(&format!("{heavy}{CONTENT}"))).unwrap();
    assert_eq!(rankings["heavyweight"].pounds, None);
  }

  #[test]
  fn unreadable_weight_is_rejected() {
    let label = r#"<div><h3>Lightweight</h3><span class="tex">TBD</span></div>"#;
    let err = parse_rankings(&page(&format!("{label}{CONTENT}"))).unwrap_err();
    assert!(matches!(err, ParseError::InvalidPounds(ref s) if s == "TBD"));
  }

  #[test]
  fn missing_wrapper_or_sections_fail() {
    assert!(matches!(
      parse_rankings("<html><body><p>maintenance</p></body></html>"),
      Err(ParseError::MissingElement { context: "rankings page", .. })
    ));
    assert!(matches!(
      parse_rankings(&page("")),
      Err(ParseError::EmptyLayout(_))
    ));
  }

  #[test]
  fn ranked_slot_without_wrapper_div_fails() {
    let content = r#"<div><div><h5>WBC</h5><div>
      <div><span>Champ</span></div>
      <div><span>Contender</span></div>
    </div></div></div>"#;
    let err = parse_rankings(&page(&format!("{LABEL}{content}"))).unwrap_err();
    assert!(matches!(
      err,
      ParseError::MissingElement { context: "fighter slot", selector: "div" }
    ));
  }

  #[test]
  fn repeated_weight_class_fails_instead_of_overwriting() {
    let other = r#"<div><div><h5>WBC</h5><div><div><span>Gervonta Davis</span></div></div></div></div>"#;
    let err = parse_rankings(&page(&format!("{LABEL}{CONTENT}{LABEL}{other}"))).unwrap_err();
    assert!(matches!(err, ParseError::DuplicateDivision(ref name) if name == "lightweight"));
  }

  #[test]
  fn repeated_organization_in_a_division_fails() {
    let content = r#"<div>
      <div><h5>WBC</h5><div><div><span>Shakur Stevenson</span></div></div></div>
      <div><h5>wbc</h5><div><div><span>Gervonta Davis</span></div></div></div>
    </div>"#;
    let err = parse_rankings(&page(&format!("{LABEL}{content}"))).unwrap_err();
    assert!(matches!(
      err,
      ParseError::DuplicateOrganization { ref division, ref organization }
        if division == "lightweight" && organization == "WBC"
    ));
  }

  #[test]
  fn organization_without_slots_is_empty_layout() {
    let content = r#"<div><div><h5>WBC</h5><div></div></div></div>"#;
    let err = parse_rankings(&page(&format!("{LABEL}{content}"))).unwrap_err();
    assert!(matches!(err, ParseError::EmptyLayout("organization without fighters")));
  }

  #[test]
  fn slot_with_three_names_is_rejected() {
    let content = r#"<div><div><h5>WBC</h5><div>
      <div><span>Champ<br>Interim (Interim)<br>Someone Else</span></div>
    </div></div></div>"#;
    let err = parse_rankings(&page(&format!("{LABEL}{content}"))).unwrap_err();
    assert!(matches!(err, ParseError::CrowdedSlot { segments: 3 }));
  }

  #[test]
  fn pounds_take_leading_token() {
    assert_eq!(extract_pounds("175 lbs").unwrap(), 175);
    assert!(extract_pounds("").is_err());
  }
}
