//! Reference data the reconciler resolves against.
//!
//! Organizations and weight classes are never created from scraped text (an
//! unknown name is a resolution failure), so a fresh store has to be seeded
//! once. Seeding is idempotent.

use strum::IntoEnumIterator;
use tracing::info;

use crate::{
  model::{NewWeightClass, OrganizationName},
  store::BoxingStore,
};

/// `(name, pounds, kilos)` for the professional boxing divisions, heaviest
/// first. Heavyweight has no upper limit; its `pounds` is the lower bound.
const WEIGHT_CLASSES: &[(&str, i64, i64)] = &[
  ("heavyweight", 200, 91),
  ("cruiserweight", 200, 91),
  ("light heavyweight", 175, 79),
  ("super middleweight", 168, 76),
  ("middleweight", 160, 73),
  ("super welterweight", 154, 70),
  ("welterweight", 147, 67),
  ("super lightweight", 140, 64),
  ("lightweight", 135, 61),
  ("super featherweight", 130, 59),
  ("featherweight", 126, 57),
  ("super bantamweight", 122, 55),
  ("bantamweight", 118, 54),
  ("super flyweight", 115, 52),
  ("flyweight", 112, 51),
  ("light flyweight", 108, 49),
  ("minimumweight", 105, 48),
];

/// The standard weight classes with limits filled in.
pub fn standard_weight_classes() -> Vec<NewWeightClass> {
  WEIGHT_CLASSES
    .iter()
    .enumerate()
    .map(|(i, &(name, pounds, kilos))| {
      let lighter = WEIGHT_CLASSES.get(i + 1).map(|&(_, lbs, _)| lbs);
      if name == "heavyweight" {
        NewWeightClass {
          name:        name.to_owned(),
          pounds:      None,
          kilos:       None,
          upper_limit: None,
          lower_limit: Some(pounds),
        }
      } else {
        NewWeightClass {
          name:        name.to_owned(),
          pounds:      Some(pounds),
          kilos:       Some(kilos),
          upper_limit: Some(pounds),
          lower_limit: lighter,
        }
      }
    })
    .collect()
}

/// Create every organization and standard weight class that is missing, and
/// refresh the limits of those that exist.
pub async fn seed_reference_data<S: BoxingStore>(store: &S) -> Result<(), S::Error> {
  for name in OrganizationName::iter() {
    store.get_or_create_organization(name).await?;
  }

  let classes = standard_weight_classes();
  let count = classes.len();
  for class in classes {
    store.upsert_weight_class(class).await?;
  }

  info!(
    organizations = OrganizationName::iter().count(),
    weight_classes = count,
    "seeded reference data"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn heavyweight_is_open_ended() {
    let classes = standard_weight_classes();
    let heavy = classes.iter().find(|c| c.name == "heavyweight").unwrap();
    assert_eq!(heavy.pounds, None);
    assert_eq!(heavy.upper_limit, None);
    assert_eq!(heavy.lower_limit, Some(200));
  }

  #[test]
  fn lower_limit_is_next_lighter_class() {
    let classes = standard_weight_classes();
    let welter = classes.iter().find(|c| c.name == "welterweight").unwrap();
    assert_eq!(welter.upper_limit, Some(147));
    assert_eq!(welter.lower_limit, Some(140));

    let minimum = classes.last().unwrap();
    assert_eq!(minimum.name, "minimumweight");
    assert_eq!(minimum.lower_limit, None);
  }
}
