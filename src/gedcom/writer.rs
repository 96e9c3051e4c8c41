//! Serialisering av trädmodellen till GEDCOM 5.5.1
//!
//! Utdatan är deterministisk: samma träd ger samma byte varje gång.
//! Huvudet innehåller därför inget tidsstämpel.

use std::io::Write;
use std::path::Path;

use crate::models::{Event, Family, Person, TreeData};
use crate::utils::error::{ConvertError, ConvertResult};

use super::line::LineWriter;

/// Skriver ett kanoniskt träd som GEDCOM 5.5.1
pub struct GedcomWriter;

impl GedcomWriter {
    /// Rendera hela dokumentet till en sträng
    pub fn render(tree: &TreeData) -> String {
        let mut w = LineWriter::new();
        Self::write_header(&mut w);
        for person in &tree.persons {
            Self::write_person(&mut w, person);
        }
        for family in &tree.families {
            Self::write_family(&mut w, family);
        }
        w.tag(0, "TRLR");
        w.finish()
    }

    /// Skriv dokumentet atomiskt: först till en tempfil i målkatalogen,
    /// sedan på plats. Ett misslyckande lämnar aldrig en halv fil.
    pub fn write_file(tree: &TreeData, path: &Path) -> ConvertResult<()> {
        let content = Self::render(tree);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            ConvertError::write_failure(format!(
                "kunde inte skapa tempfil i {}: {}",
                dir.display(),
                e
            ))
        })?;
        tmp.write_all(content.as_bytes()).map_err(|e| {
            ConvertError::write_failure(format!("kunde inte skriva {}: {}", path.display(), e))
        })?;
        tmp.persist(path).map_err(|e| {
            ConvertError::write_failure(format!("kunde inte ersätta {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    fn write_header(w: &mut LineWriter) {
        w.tag(0, "HEAD");
        w.tag(1, "GEDC");
        w.value(2, "VERS", "5.5.1");
        w.value(2, "FORM", "LINEAGE-LINKED");
        w.value(1, "CHAR", "UTF-8");
        w.value(1, "SOUR", "ftz2ged");
        w.value(2, "NAME", "ftz2ged");
        w.value(2, "VERS", env!("CARGO_PKG_VERSION"));
        w.value(1, "LANG", "English");
        w.value(1, "SUBM", "@U1@");
        w.record("@U1@", "SUBM");
        w.value(1, "NAME", "ftz2ged");
    }

    fn write_person(w: &mut LineWriter, person: &Person) {
        w.record(&Self::person_xref(person.id), "INDI");

        let given = person.given_name.as_deref().unwrap_or("");
        let surname = person.surname.as_deref().unwrap_or("");
        let name = if given.is_empty() {
            format!("/{}/", surname)
        } else {
            format!("{} /{}/", given, surname)
        };
        w.value(1, "NAME", &name);
        if !given.is_empty() {
            w.value(2, "GIVN", given);
        }
        if !surname.is_empty() {
            w.value(2, "SURN", surname);
        }
        w.value(1, "SEX", person.sex.gedcom_value());

        let events = [&person.birth, &person.death, &person.burial, &person.baptism];
        for event in events.into_iter().flatten() {
            Self::write_event(w, event);
        }

        for note in &person.notes {
            w.value(1, "NOTE", note);
        }
        if let Some(family_id) = person.family_child {
            w.value(1, "FAMC", &Self::family_xref(family_id));
        }
        for family_id in &person.family_spouse {
            w.value(1, "FAMS", &Self::family_xref(*family_id));
        }
    }

    fn write_family(w: &mut LineWriter, family: &Family) {
        w.record(&Self::family_xref(family.id), "FAM");

        if let Some(id) = family.husband_id {
            w.value(1, "HUSB", &Self::person_xref(id));
        }
        if let Some(id) = family.wife_id {
            w.value(1, "WIFE", &Self::person_xref(id));
        }
        for id in &family.children_ids {
            w.value(1, "CHIL", &Self::person_xref(*id));
        }
        if let Some(marriage) = &family.marriage {
            Self::write_event(w, marriage);
        }
        if family.divorced {
            w.value(1, "DIV", "Y");
        }
        for note in &family.notes {
            w.value(1, "NOTE", note);
        }
    }

    /// Händelsetaggen följs av DATE, PLAC och NOTE i den ordningen.
    /// En händelse utan detaljer blir en ensam tagg.
    fn write_event(w: &mut LineWriter, event: &Event) {
        w.tag(1, event.kind.gedcom_tag());
        if let Some(date) = &event.date {
            w.value(2, "DATE", &date.to_gedcom());
        }
        if let Some(place) = &event.place {
            w.value(2, "PLAC", place);
        }
        if let Some(note) = &event.note {
            w.value(2, "NOTE", note);
        }
    }

    fn person_xref(id: i64) -> String {
        format!("@I{:04}@", id)
    }

    fn family_xref(id: i64) -> String {
        format!("@F{:04}@", id)
    }
}
