//! Population registry - living citizens and the family registry
//!
//! All membership changes go through here so a citizen is never listed in
//! two cities or two families at once: moves are always remove-then-append.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{CitizenId, DeathCause};
use crate::galaxy::citizen::Citizen;
use crate::galaxy::city::City;
use crate::galaxy::family::Family;

const SURNAMES: [&str; 12] = [
    "Chen", "Lin", "Huang", "Wu", "Liu", "Tsai", "Yang", "Hsu", "Cheng", "Hsieh", "Kuo", "Hung",
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Population {
    /// Living citizens only; the dead leave a grave record in their city
    citizens: AHashMap<CitizenId, Citizen>,
    /// Family registry keyed by family name
    pub families: AHashMap<String, Family>,
    next_citizen_id: u32,
    family_seq: u32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CitizenId) -> Option<&Citizen> {
        self.citizens.get(&id)
    }

    pub fn get_mut(&mut self, id: CitizenId) -> Option<&mut Citizen> {
        self.citizens.get_mut(&id)
    }

    pub fn is_alive(&self, id: CitizenId) -> bool {
        self.citizens.get(&id).map_or(false, |c| c.alive)
    }

    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.values()
    }

    pub fn next_id(&mut self) -> CitizenId {
        let id = CitizenId(self.next_citizen_id);
        self.next_citizen_id += 1;
        id
    }

    /// Residents of a city, in list order
    pub fn residents<'a>(&'a self, city: &'a City) -> impl Iterator<Item = &'a Citizen> + 'a {
        city.citizens.iter().filter_map(move |id| self.citizens.get(id))
    }

    /// Register a citizen as a resident of `city` and a member of its family
    pub fn spawn(&mut self, city: &mut City, mut citizen: Citizen) -> CitizenId {
        let id = citizen.id;
        citizen.city = city.name.clone();
        if let Some(name) = citizen.family.clone() {
            self.families
                .entry(name.clone())
                .or_insert_with(|| Family::new(name, 0.3))
                .add_member(id);
        }
        self.citizens.insert(id, citizen);
        if !city.has_resident(id) {
            city.citizens.push(id);
        }
        id
    }

    /// Kill a resident of `city`: leave a grave record, free the partner and
    /// drop the family membership. Returns false if the citizen was not alive.
    pub fn bury(&mut self, city: &mut City, id: CitizenId, cause: DeathCause) -> bool {
        let Some(mut citizen) = self.citizens.remove(&id) else {
            return false;
        };
        citizen.die(cause);

        city.citizens.retain(|c| *c != id);
        city.death_count += 1;
        if let Some(record) = citizen.grave_record() {
            city.graveyard.push(record);
        }

        if let Some(partner_id) = citizen.partner {
            if let Some(partner) = self.citizens.get_mut(&partner_id) {
                if partner.partner == Some(id) {
                    partner.partner = None;
                }
            }
        }

        if let Some(family) = citizen.family.as_ref().and_then(|f| self.families.get_mut(f)) {
            family.remove_member(id);
        }

        true
    }

    /// Move a citizen from one city's roll to another's
    pub fn relocate(&mut self, from: &mut City, to: &mut City, id: CitizenId) -> bool {
        if !from.has_resident(id) || !self.citizens.contains_key(&id) {
            return false;
        }
        from.citizens.retain(|c| *c != id);
        from.emigration_count += 1;

        if let Some(citizen) = self.citizens.get_mut(&id) {
            citizen.city = to.name.clone();
        }
        to.citizens.push(id);
        to.immigration_count += 1;
        true
    }

    /// Partner id if the partner is still alive; a dead partner is released
    pub fn living_partner(&mut self, id: CitizenId) -> Option<CitizenId> {
        let partner = self.citizens.get(&id)?.partner?;
        if self.is_alive(partner) {
            return Some(partner);
        }
        if let Some(citizen) = self.citizens.get_mut(&id) {
            citizen.partner = None;
        }
        None
    }

    /// Wed two single citizens and settle their family. Returns the family name.
    pub fn marry<R: Rng + ?Sized>(&mut self, a: CitizenId, b: CitizenId, rng: &mut R) -> Option<String> {
        if a == b {
            return None;
        }
        let fa = {
            let ca = self.citizens.get(&a)?;
            if !ca.alive || !ca.is_single() {
                return None;
            }
            ca.family.clone()
        };
        let fb = {
            let cb = self.citizens.get(&b)?;
            if !cb.alive || !cb.is_single() {
                return None;
            }
            cb.family.clone()
        };

        if let Some(ca) = self.citizens.get_mut(&a) {
            ca.partner = Some(b);
        }
        if let Some(cb) = self.citizens.get_mut(&b) {
            cb.partner = Some(a);
        }

        let family = match (fa, fb) {
            (Some(x), Some(y)) if x == y => x,
            (Some(x), Some(y)) => {
                let rep_x = self.families.get(&x).map_or(0.0, |f| f.reputation);
                let rep_y = self.families.get(&y).map_or(0.0, |f| f.reputation);
                if rep_y > rep_x {
                    self.merge_families(&y, &x);
                    y
                } else {
                    self.merge_families(&x, &y);
                    x
                }
            }
            (Some(x), None) => {
                self.join_family(b, &x);
                x
            }
            (None, Some(y)) => {
                self.join_family(a, &y);
                y
            }
            (None, None) => {
                let name = self.found_family(rng);
                self.join_family(a, &name);
                self.join_family(b, &name);
                name
            }
        };

        Some(family)
    }

    /// Put a citizen in a family, leaving any previous one first
    pub fn join_family(&mut self, id: CitizenId, name: &str) {
        let Some(citizen) = self.citizens.get_mut(&id) else {
            return;
        };
        if let Some(old) = citizen.family.replace(name.to_string()) {
            if old != name {
                if let Some(family) = self.families.get_mut(&old) {
                    family.remove_member(id);
                }
            }
        }
        self.families
            .entry(name.to_string())
            .or_insert_with(|| Family::new(name.to_string(), 0.3))
            .add_member(id);
    }

    /// Move every member of `absorbed` into `absorber` and retire `absorbed`
    pub fn merge_families(&mut self, absorber: &str, absorbed: &str) {
        if absorber == absorbed {
            return;
        }
        let Some(old) = self.families.remove(absorbed) else {
            return;
        };
        for member in old.members {
            if let Some(citizen) = self.citizens.get_mut(&member) {
                citizen.family = Some(absorber.to_string());
            }
            self.families
                .entry(absorber.to_string())
                .or_insert_with(|| Family::new(absorber.to_string(), 0.3))
                .add_member(member);
        }
    }

    /// Create a new, empty family with a fresh name
    pub fn found_family<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())];
        let mut name = surname.to_string();
        while self.families.contains_key(&name) {
            self.family_seq += 1;
            name = format!("{} {}", surname, self.family_seq);
        }
        let reputation = rng.gen_range(0.1..0.5);
        self.families.insert(name.clone(), Family::new(name.clone(), reputation));
        name
    }

    /// Yearly reputation pass over every family; families with no living
    /// member are dissolved
    pub fn update_family_reputations(&mut self) {
        self.families.retain(|_, f| !f.members.is_empty());
        let citizens = &self.citizens;
        for family in self.families.values_mut() {
            let members: Vec<&Citizen> = family.members.iter().filter_map(|id| citizens.get(id)).collect();
            family.update_reputation(members.into_iter());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GovernmentType, Specialization};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Population, City, ChaCha8Rng) {
        (
            Population::new(),
            City::new("Taipei", GovernmentType::Democratic, Specialization::Agriculture),
            ChaCha8Rng::seed_from_u64(11),
        )
    }

    fn add(pop: &mut Population, city: &mut City, rng: &mut ChaCha8Rng, family: Option<&str>) -> CitizenId {
        let id = pop.next_id();
        let mut c = Citizen::generate(id, format!("C{}", id.0), &city.name, rng);
        c.family = family.map(String::from);
        pop.spawn(city, c)
    }

    #[test]
    fn test_marriage_founds_family_for_familyless_pair() {
        let (mut pop, mut city, mut rng) = setup();
        let a = add(&mut pop, &mut city, &mut rng, None);
        let b = add(&mut pop, &mut city, &mut rng, None);

        let family = pop.marry(a, b, &mut rng).unwrap();
        assert_eq!(pop.get(a).unwrap().partner, Some(b));
        assert_eq!(pop.get(b).unwrap().partner, Some(a));
        assert_eq!(pop.get(a).unwrap().family.as_deref(), Some(family.as_str()));
        assert_eq!(pop.get(b).unwrap().family.as_deref(), Some(family.as_str()));
        assert_eq!(pop.families[&family].members.len(), 2);
    }

    #[test]
    fn test_marriage_higher_reputation_absorbs() {
        let (mut pop, mut city, mut rng) = setup();
        let a = add(&mut pop, &mut city, &mut rng, Some("Wang"));
        let b = add(&mut pop, &mut city, &mut rng, Some("Li"));
        let c = add(&mut pop, &mut city, &mut rng, Some("Li"));
        pop.families.get_mut("Wang").unwrap().reputation = 0.2;
        pop.families.get_mut("Li").unwrap().reputation = 0.8;

        let family = pop.marry(a, b, &mut rng).unwrap();
        assert_eq!(family, "Li");
        assert!(!pop.families.contains_key("Wang"));
        assert_eq!(pop.families["Li"].members.len(), 3);
        assert_eq!(pop.get(a).unwrap().family.as_deref(), Some("Li"));
        assert_eq!(pop.get(c).unwrap().family.as_deref(), Some("Li"));
    }

    #[test]
    fn test_married_citizen_cannot_remarry() {
        let (mut pop, mut city, mut rng) = setup();
        let a = add(&mut pop, &mut city, &mut rng, None);
        let b = add(&mut pop, &mut city, &mut rng, None);
        let c = add(&mut pop, &mut city, &mut rng, None);
        pop.marry(a, b, &mut rng).unwrap();
        assert!(pop.marry(a, c, &mut rng).is_none());
        assert!(pop.get(c).unwrap().is_single());
    }

    #[test]
    fn test_bury_cleans_every_reference() {
        let (mut pop, mut city, mut rng) = setup();
        let a = add(&mut pop, &mut city, &mut rng, Some("Zhang"));
        let b = add(&mut pop, &mut city, &mut rng, Some("Zhang"));
        pop.marry(a, b, &mut rng).unwrap();

        assert!(pop.bury(&mut city, a, DeathCause::Natural));
        assert!(!city.has_resident(a));
        assert!(pop.get(a).is_none());
        assert_eq!(city.death_count, 1);
        assert_eq!(city.graveyard.len(), 1);
        assert_eq!(city.graveyard[0].cause, DeathCause::Natural);
        assert!(pop.get(b).unwrap().partner.is_none());
        assert!(!pop.families["Zhang"].members.contains(&a));

        assert!(!pop.bury(&mut city, a, DeathCause::War));
        assert_eq!(city.graveyard.len(), 1);
    }

    #[test]
    fn test_relocate_is_remove_then_append() {
        let (mut pop, mut from, mut rng) = setup();
        let mut to = City::new("Tokyo", GovernmentType::Republican, Specialization::Industry);
        let a = add(&mut pop, &mut from, &mut rng, None);

        assert!(pop.relocate(&mut from, &mut to, a));
        assert!(!from.has_resident(a));
        assert!(to.has_resident(a));
        assert_eq!(pop.get(a).unwrap().city, "Tokyo");
        assert_eq!(from.emigration_count, 1);
        assert_eq!(to.immigration_count, 1);

        // already gone from the source city
        assert!(!pop.relocate(&mut from, &mut to, a));
        assert_eq!(to.citizens.len(), 1);
    }

    #[test]
    fn test_family_without_living_members_is_dissolved() {
        let (mut pop, mut city, mut rng) = setup();
        let a = add(&mut pop, &mut city, &mut rng, Some("Wang"));
        let b = add(&mut pop, &mut city, &mut rng, Some("Li"));
        pop.bury(&mut city, a, DeathCause::Accident);

        pop.update_family_reputations();
        assert!(!pop.families.contains_key("Wang"));
        assert!(pop.families["Li"].members.contains(&b));
    }

    #[test]
    fn test_join_family_leaves_previous() {
        let (mut pop, mut city, mut rng) = setup();
        let a = add(&mut pop, &mut city, &mut rng, Some("Wang"));
        pop.join_family(a, "Li");
        assert!(!pop.families["Wang"].members.contains(&a));
        assert!(pop.families["Li"].members.contains(&a));
    }
}
