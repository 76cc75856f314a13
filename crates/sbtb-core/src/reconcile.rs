//! Turns raw parser output into stored domain records.
//!
//! Resolution is strictly sequential: each lookup or get-or-create completes
//! before the next one starts, because later entries may refer to fighters
//! created earlier in the same run.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
  ResolutionError,
  model::{
    FightCard, FightOrganization, NewFightCard, NewRank, OrganizationName,
    Rank, RankStanding, WeightClass, event_name, normalize_name,
  },
  raw::{RawFightCard, RawRankings},
  store::BoxingStore,
};

/// What a rankings reconciliation wrote.
#[derive(Debug, Clone, Default)]
pub struct RankingsOutcome {
  /// One standing per merged rank, in scrape order.
  pub standings: Vec<RankStanding>,
  /// The stored rank rows, aligned with `standings`.
  pub ranks:     Vec<Rank>,
  /// Entries dropped because their weight class or organization is unknown.
  pub skipped:   usize,
}

/// Pre-loaded reference rows for one run.
struct References<'r> {
  weight_classes: HashMap<String, &'r WeightClass>,
  organizations:  HashMap<OrganizationName, &'r FightOrganization>,
}

impl<'r> References<'r> {
  fn new(
    weight_classes: &'r [WeightClass],
    organizations: &'r [FightOrganization],
  ) -> Self {
    Self {
      weight_classes: weight_classes
        .iter()
        .map(|wc| (normalize_name(&wc.name), wc))
        .collect(),
      organizations:  organizations.iter().map(|o| (o.name, o)).collect(),
    }
  }

  /// Case-insensitive.
  fn weight_class(&self, raw: &str) -> Result<&'r WeightClass, ResolutionError> {
    self
      .weight_classes
      .get(&normalize_name(raw))
      .copied()
      .ok_or_else(|| ResolutionError::UnknownWeightClass(raw.to_owned()))
  }

  /// Case-sensitive against the enumeration values.
  fn organization(
    &self,
    raw: &str,
  ) -> Result<&'r FightOrganization, ResolutionError> {
    OrganizationName::parse(raw)
      .ok()
      .and_then(|name| self.organizations.get(&name).copied())
      .ok_or_else(|| ResolutionError::UnknownOrganization(raw.to_owned()))
  }
}

/// Reconciles one run's parser output against a [`BoxingStore`].
pub struct Reconciler<'s, S> {
  store: &'s S,
}

impl<'s, S: BoxingStore> Reconciler<'s, S> {
  pub fn new(store: &'s S) -> Self { Self { store } }

  /// Resolve every `(weight class, organization, entry)` triple and merge the
  /// resulting ranks with a single bulk upsert.
  ///
  /// Unknown weight classes or organizations skip the affected entries; the
  /// run carries on. Fighters are get-or-created for every entry that
  /// resolves.
  pub async fn reconcile_rankings(
    &self,
    rankings: &RawRankings,
  ) -> Result<RankingsOutcome, S::Error> {
    let organizations = self.store.list_organizations().await?;
    let weight_classes = self.store.list_weight_classes().await?;
    let refs = References::new(&weight_classes, &organizations);

    let mut outcome = RankingsOutcome::default();
    let mut pending: Vec<NewRank> = Vec::new();

    for (division_name, division) in rankings {
      for (org_name, entries) in &division.organizations {
        let resolved = refs
          .weight_class(division_name)
          .and_then(|wc| refs.organization(org_name).map(|org| (wc, org)));

        let (weight_class, organization) = match resolved {
          Ok(pair) => pair,
          Err(e) => {
            warn!(
              weight_class = %division_name,
              organization = %org_name,
              skipped = entries.len(),
              "{e}; skipping entries"
            );
            outcome.skipped += entries.len();
            continue;
          }
        };

        for entry in entries {
          let fighter = self.store.get_or_create_fighter(&entry.name).await?;
          debug!(
            fighter = %fighter.name,
            rank = entry.rank,
            weight_class = %weight_class.name,
            organization = %organization.name,
            "resolved rank entry"
          );

          pending.push(NewRank {
            rank:            entry.rank,
            fighter_id:      fighter.id,
            weight_class_id: weight_class.id,
            organization_id: organization.id,
          });
          outcome.standings.push(RankStanding {
            rank:              entry.rank,
            fighter_name:      fighter.name,
            weight_class_name: weight_class.name.clone(),
            organization_name: organization.name,
            is_champion:       entry.is_champion,
          });
        }
      }
    }

    outcome.ranks = self.store.bulk_upsert_ranks(pending).await?;
    info!(
      merged = outcome.ranks.len(),
      skipped = outcome.skipped,
      "reconciled rankings"
    );
    Ok(outcome)
  }

  /// Upsert every card by event name and re-derive its participant set.
  ///
  /// The participant list is replaced, not extended, so a later run corrects
  /// an earlier mis-scrape.
  pub async fn reconcile_fight_cards(
    &self,
    cards: &[RawFightCard],
  ) -> Result<Vec<FightCard>, S::Error> {
    let mut saved = Vec::with_capacity(cards.len());

    for (i, raw) in cards.iter().enumerate() {
      let fighter_a = normalize_name(&raw.title_fighters.0);
      let fighter_b = normalize_name(&raw.title_fighters.1);
      let event = event_name(&fighter_a, &fighter_b);
      info!(event = %event, "updating fight card {}/{}", i + 1, cards.len());

      let card = self
        .store
        .upsert_fight_card(NewFightCard {
          event_name: event,
          location:   raw.location.trim().to_owned(),
          event_date: raw.event_date,
          network:    raw.network.clone(),
        })
        .await?;

      let participants = [fighter_a, fighter_b]
        .into_iter()
        .chain(raw.undercard_fighters.iter().map(|n| normalize_name(n)))
        .filter(|n| !n.is_empty());

      let mut fighter_ids: Vec<i64> = Vec::new();
      for name in participants {
        let fighter = self.store.get_or_create_fighter(&name).await?;
        if !fighter_ids.contains(&fighter.id) {
          fighter_ids.push(fighter.id);
        }
      }

      let card = self
        .store
        .replace_fight_card_fighters(card.id, &fighter_ids)
        .await?;
      saved.push(card);
    }

    info!(cards = saved.len(), "reconciled fight cards");
    Ok(saved)
  }
}
