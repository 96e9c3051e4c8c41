//! Upplösning av par- och föräldrareferenser till familjer
//!
//! Parfragment med samma föräldrapar slås ihop till en familj, hängande
//! referenser loggas och släpps. Löpnumren är deterministiska: personer
//! numreras i stigande ursprungs-id-ordning, familjer i samma ordning
//! som sina första fragment.

use std::collections::HashMap;

use crate::ftz::{FtzData, FtzPerson};
use crate::models::{Event, Family, Person, TreeData};
use crate::utils::error::ConvertError;

/// Resultatet av upplösningen: trädet plus de varningar som samlades in
#[derive(Debug)]
pub struct ResolveResult {
    pub data: TreeData,
    pub warnings: Vec<String>,
}

/// Nyckel för hopslagning av parfragment. Fragment utan upplösbara
/// föräldrar behåller sitt eget id så att obesläktade fragment aldrig
/// slås ihop av misstag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FamilyKey {
    Pair(i64, i64),
    Single(i64),
    Orphan(i64),
}

struct FamilyGroup {
    first_couple_id: i64,
    husband: Option<i64>,
    wife: Option<i64>,
    children: Vec<i64>,
    marriage: Option<Event>,
    divorced: bool,
    notes: Vec<String>,
}

impl FamilyGroup {
    fn new(first_couple_id: i64, husband: Option<i64>, wife: Option<i64>) -> Self {
        Self {
            first_couple_id,
            husband,
            wife,
            children: Vec::new(),
            marriage: None,
            divorced: false,
            notes: Vec::new(),
        }
    }
}

/// Bygger det kanoniska trädet ur råposterna
pub struct RelationshipResolver;

impl RelationshipResolver {
    pub fn resolve(data: &FtzData) -> ResolveResult {
        let mut warnings = Vec::new();

        let mut persons: Vec<Person> = Vec::with_capacity(data.persons.len());
        let mut person_index: HashMap<i64, i64> = HashMap::new();
        for (idx, (native_id, ftz_person)) in data.persons.iter().enumerate() {
            let id = idx as i64;
            person_index.insert(*native_id, id);
            persons.push(Self::build_person(id, ftz_person));
        }

        let mut groups: Vec<FamilyGroup> = Vec::new();
        let mut key_index: HashMap<FamilyKey, usize> = HashMap::new();
        let mut couple_group: HashMap<i64, usize> = HashMap::new();

        for (native_id, couple) in &data.couples {
            let husband =
                Self::checked_spouse(couple.male_id, "make", *native_id, &person_index, &mut warnings);
            let wife =
                Self::checked_spouse(couple.female_id, "maka", *native_id, &person_index, &mut warnings);

            let key = match (husband, wife) {
                (Some(a), Some(b)) => FamilyKey::Pair(a.min(b), a.max(b)),
                (Some(a), None) | (None, Some(a)) => FamilyKey::Single(a),
                (None, None) => FamilyKey::Orphan(*native_id),
            };

            let group_idx = match key_index.get(&key) {
                Some(&idx) => {
                    tracing::debug!(
                        "Par {} har samma föräldrar som par {}, slås ihop",
                        native_id,
                        groups[idx].first_couple_id
                    );
                    idx
                }
                None => {
                    groups.push(FamilyGroup::new(*native_id, husband, wife));
                    key_index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            let group = &mut groups[group_idx];
            if group.marriage.is_none() {
                group.marriage = couple.marriage.clone();
            }
            group.divorced |= couple.divorced;
            group.notes.extend(couple.notes.iter().cloned());
            couple_group.insert(*native_id, group_idx);
        }

        // Barnen hämtas från personernas föräldrareferens, i id-ordning
        for (idx, (native_id, ftz_person)) in data.persons.iter().enumerate() {
            let Some(parent_couple) = ftz_person.parent_couple_id else {
                continue;
            };
            match couple_group.get(&parent_couple) {
                Some(&group_idx) => groups[group_idx].children.push(idx as i64),
                None => {
                    Self::warn(
                        &mut warnings,
                        format!(
                            "person {} hänvisar till okänt föräldrapar {}",
                            native_id, parent_couple
                        ),
                    );
                }
            }
        }

        // Fragment utan både barn och vigsel blir ingen familj
        let mut families: Vec<Family> = Vec::new();
        for group in groups {
            if group.children.is_empty() && group.marriage.is_none() && !group.divorced {
                if group.notes.is_empty() {
                    tracing::debug!(
                        "Par {} utan barn och utan vigsel utelämnas",
                        group.first_couple_id
                    );
                } else {
                    let msg = format!(
                        "Par {} utan barn och utan vigsel utelämnas, anteckningarna går förlorade",
                        group.first_couple_id
                    );
                    tracing::warn!("{}", msg);
                    warnings.push(msg);
                }
                continue;
            }

            let id = families.len() as i64;
            let mut family = Family::new(id);
            family.husband_id = group.husband;
            family.wife_id = group.wife;
            family.children_ids = group.children;
            family.marriage = group.marriage;
            family.divorced = group.divorced;
            family.notes = group.notes;

            for child in &family.children_ids {
                persons[*child as usize].family_child = Some(id);
            }
            for spouse in [family.husband_id, family.wife_id].into_iter().flatten() {
                persons[spouse as usize].family_spouse.push(id);
            }
            families.push(family);
        }

        let mut tree = TreeData::new();
        tree.persons = persons;
        tree.families = families;
        ResolveResult {
            data: tree,
            warnings,
        }
    }

    fn build_person(id: i64, source: &FtzPerson) -> Person {
        let mut person = Person::new(id, source.native_id);
        person.given_name = source.given_name.clone();
        person.surname = source.surname.clone();
        person.sex = source.sex;
        person.birth = source.birth.clone();
        person.death = source.death.clone();
        person.baptism = source.baptism.clone();
        person.burial = source.burial.clone();
        person.notes = source.notes.clone();
        person.media = source.media.clone();
        person
    }

    /// Slå upp en make/maka-referens. Okända referenser ger en varning
    /// och behandlas som frånvarande.
    fn checked_spouse(
        spouse: Option<i64>,
        role: &str,
        couple_id: i64,
        person_index: &HashMap<i64, i64>,
        warnings: &mut Vec<String>,
    ) -> Option<i64> {
        let native = spouse?;
        match person_index.get(&native) {
            Some(&id) => Some(id),
            None => {
                Self::warn(
                    warnings,
                    format!("par {} hänvisar till okänd {} {}", couple_id, role, native),
                );
                None
            }
        }
    }

    fn warn(warnings: &mut Vec<String>, msg: String) {
        let warning = ConvertError::relationship(msg).to_string();
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftz::{FtzCouple, PayloadVersion};
    use crate::models::EventKind;

    fn child_of(native_id: i64, parent_couple: i64) -> FtzPerson {
        let mut p = FtzPerson::new(native_id);
        p.parent_couple_id = Some(parent_couple);
        p
    }

    fn couple(native_id: i64, male: Option<i64>, female: Option<i64>) -> FtzCouple {
        let mut c = FtzCouple::new(native_id);
        c.male_id = male;
        c.female_id = female;
        c
    }

    fn data(persons: Vec<FtzPerson>, couples: Vec<FtzCouple>) -> FtzData {
        let mut d = FtzData::new(PayloadVersion::V2);
        for p in persons {
            d.persons.insert(p.native_id, p);
        }
        for c in couples {
            d.couples.insert(c.native_id, c);
        }
        d
    }

    #[test]
    fn test_person_ids_follow_native_order() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(10), FtzPerson::new(3), FtzPerson::new(7)],
            vec![],
        ));

        let persons = &result.data.persons;
        assert_eq!(persons.len(), 3);
        assert_eq!(
            persons.iter().map(|p| (p.id, p.native_id)).collect::<Vec<_>>(),
            vec![(0, 3), (1, 7), (2, 10)]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_family_links_are_symmetric() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2), child_of(3, 5), child_of(4, 5)],
            vec![couple(5, Some(1), Some(2))],
        ));

        let tree = &result.data;
        assert_eq!(tree.family_count(), 1);
        let family = &tree.families[0];
        assert_eq!(family.husband_id, Some(0));
        assert_eq!(family.wife_id, Some(1));
        assert_eq!(family.children_ids, vec![2, 3]);

        // FAMC och FAMS speglar varandra
        for child in &family.children_ids {
            assert_eq!(tree.person(*child).unwrap().family_child, Some(family.id));
        }
        for spouse in [family.husband_id, family.wife_id].into_iter().flatten() {
            assert!(tree.person(spouse).unwrap().family_spouse.contains(&family.id));
        }
    }

    #[test]
    fn test_duplicate_couples_merge() {
        let mut first = couple(5, Some(1), Some(2));
        first.notes.push("Första".to_string());
        let mut second = couple(9, Some(1), Some(2));
        second.divorced = true;
        second.marriage = Some(Event::new(EventKind::Marriage));

        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2), child_of(3, 5), child_of(4, 9)],
            vec![first, second],
        ));

        let tree = &result.data;
        assert_eq!(tree.family_count(), 1);
        let family = &tree.families[0];
        // Barn från båda fragmenten hamnar i samma familj
        assert_eq!(family.children_ids, vec![2, 3]);
        assert!(family.divorced);
        assert!(family.marriage.is_some());
        assert_eq!(family.notes, vec!["Första"]);
    }

    #[test]
    fn test_swapped_pair_still_merges() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2), child_of(3, 5), child_of(4, 9)],
            vec![couple(5, Some(1), Some(2)), couple(9, Some(2), Some(1))],
        ));

        assert_eq!(result.data.family_count(), 1);
        // Första fragmentets roller gäller
        assert_eq!(result.data.families[0].husband_id, Some(0));
        assert_eq!(result.data.families[0].wife_id, Some(1));
    }

    #[test]
    fn test_single_parent_fragments_merge() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), child_of(3, 5), child_of(4, 9)],
            vec![couple(5, Some(1), None), couple(9, Some(1), None)],
        ));

        assert_eq!(result.data.family_count(), 1);
        assert_eq!(result.data.families[0].children_ids, vec![1, 2]);
    }

    #[test]
    fn test_orphan_fragments_never_merge() {
        let result = RelationshipResolver::resolve(&data(
            vec![child_of(1, 5), child_of(2, 9)],
            vec![couple(5, None, None), couple(9, None, None)],
        ));

        // Två fragment utan föräldrar ger två skilda familjer
        let tree = &result.data;
        assert_eq!(tree.family_count(), 2);
        assert_eq!(tree.families[0].children_ids, vec![0]);
        assert_eq!(tree.families[1].children_ids, vec![1]);
        assert_eq!(tree.person(0).unwrap().family_child, Some(0));
        assert_eq!(tree.person(1).unwrap().family_child, Some(1));
    }

    #[test]
    fn test_childless_marriageless_fragment_is_dropped() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2)],
            vec![couple(5, Some(1), Some(2))],
        ));

        let tree = &result.data;
        assert_eq!(tree.family_count(), 0);
        assert!(tree.person(0).unwrap().family_spouse.is_empty());
        assert!(tree.person(1).unwrap().family_spouse.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_dropped_fragment_with_notes_warns() {
        let mut c = couple(5, Some(1), Some(2));
        c.notes.push("Förlovade 1899".to_string());

        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2)],
            vec![c],
        ));

        // Paret blir ingen familj men anteckningsförlusten ska synas
        assert_eq!(result.data.family_count(), 0);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Par 5"));
        assert!(result.warnings[0].contains("anteckningarna går förlorade"));
    }

    #[test]
    fn test_divorce_alone_keeps_family() {
        let mut c = couple(5, Some(1), Some(2));
        c.divorced = true;

        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2)],
            vec![c],
        ));

        // Skilsmässa förutsätter vigsel, familjen behålls
        assert_eq!(result.data.family_count(), 1);
        assert!(result.data.families[0].divorced);
    }

    #[test]
    fn test_shared_child_without_marriage_forms_one_family() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), FtzPerson::new(2), child_of(3, 5)],
            vec![couple(5, Some(1), Some(2))],
        ));

        let tree = &result.data;
        assert_eq!(tree.family_count(), 1);
        assert!(tree.families[0].marriage.is_none());
        assert_eq!(tree.families[0].children_ids, vec![2]);
    }

    #[test]
    fn test_dangling_references_warn_and_continue() {
        let result = RelationshipResolver::resolve(&data(
            vec![FtzPerson::new(1), child_of(2, 5), child_of(3, 42)],
            vec![couple(5, Some(1), Some(99))],
        ));

        // Okänd maka 99 och okänt föräldrapar 42
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("Inkonsekvent relation"));
        assert!(result.warnings.iter().any(|w| w.contains("99")));
        assert!(result.warnings.iter().any(|w| w.contains("42")));

        let tree = &result.data;
        assert_eq!(tree.family_count(), 1);
        let family = &tree.families[0];
        assert_eq!(family.husband_id, Some(0));
        assert_eq!(family.wife_id, None);
        assert_eq!(family.children_ids, vec![1]);
        // Barnet med okänt föräldrapar står utan FAMC men finns kvar
        assert_eq!(tree.person(2).unwrap().family_child, None);
    }

    #[test]
    fn test_family_ids_follow_first_fragment_order() {
        let result = RelationshipResolver::resolve(&data(
            vec![
                FtzPerson::new(1),
                FtzPerson::new(2),
                FtzPerson::new(3),
                child_of(4, 20),
                child_of(5, 10),
            ],
            vec![couple(10, Some(1), Some(2)), couple(20, Some(3), None)],
        ));

        let tree = &result.data;
        assert_eq!(tree.family_count(), 2);
        // Par 10 kom först och blir familj 0
        assert_eq!(tree.families[0].husband_id, Some(0));
        assert_eq!(tree.families[1].husband_id, Some(2));
        assert_eq!(tree.person(4).unwrap().family_child, Some(0));
        assert_eq!(tree.person(3).unwrap().family_child, Some(1));
    }
}
