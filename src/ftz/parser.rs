//! Tolkning av node.ftt-nyttolasten
//!
//! Nyttolasten är UTF-8-text (eventuellt med BOM), tabbseparerad, en post per
//! icke-tom rad. Huvudraden anger antal personer och par; schemaversionen
//! känns igen på antalet huvudfält. Korta rader fylls ut med tomma fält,
//! de förkastas aldrig för att vara korta.

use chrono::NaiveDate;

use crate::models::{DateQualifier, Event, EventDate, EventKind, MediaRef, PartialDate, Sex};
use crate::utils::error::{ConvertError, ConvertResult};

use super::archive::FtzArchive;
use super::models::{AdditionKind, FtzCouple, FtzData, FtzPerson, PayloadVersion};

/// Tolkar nyttolasten till råa poster
pub struct FtzParser;

impl FtzParser {
    /// Tolka nyttolasten i ett öppnat arkiv
    pub fn parse(archive: &FtzArchive) -> ConvertResult<FtzData> {
        let text = Self::decode_payload(&archive.payload)?;
        let mut data = Self::parse_text(text)?;
        Self::attach_faces(&mut data, &archive.face_files);
        Ok(data)
    }

    /// Tolka nyttolasttext utan arkivkontext
    pub fn parse_text(text: &str) -> ConvertResult<FtzData> {
        let mut rows = text.lines().filter(|line| !line.trim().is_empty());

        let header = rows
            .next()
            .ok_or_else(|| ConvertError::schema_mismatch("tom nyttolast"))?;
        let header_fields: Vec<&str> = header.split('\t').collect();
        if header_fields.len() < 2 {
            return Err(ConvertError::schema_mismatch(format!(
                "huvudraden har {} fält, minst 2 krävs",
                header_fields.len()
            )));
        }

        let n_people = Self::parse_count(header_fields[0], "personantal")?;
        let n_couples = Self::parse_count(header_fields[1], "parantal")?;
        let version = if header_fields.len() == 2 {
            PayloadVersion::V1
        } else {
            PayloadVersion::V2
        };
        tracing::debug!(
            "Nyttolast {:?}: {} personer, {} par",
            version,
            n_people,
            n_couples
        );

        let mut data = FtzData::new(version);

        for _ in 0..n_people {
            let line = rows.next().ok_or_else(|| {
                ConvertError::schema_mismatch(format!(
                    "{} personrader utlovades men nyttolasten tog slut",
                    n_people
                ))
            })?;
            let person = Self::parse_person_row(line, version)?;
            if data.persons.contains_key(&person.native_id) {
                tracing::warn!(
                    "Dubblerat person-id {}, första raden gäller",
                    person.native_id
                );
                continue;
            }
            data.persons.insert(person.native_id, person);
        }

        for _ in 0..n_couples {
            let line = rows.next().ok_or_else(|| {
                ConvertError::schema_mismatch(format!(
                    "{} parrader utlovades men nyttolasten tog slut",
                    n_couples
                ))
            })?;
            let couple = Self::parse_couple_row(line)?;
            if data.couples.contains_key(&couple.native_id) {
                tracing::warn!("Dubblerat par-id {}, första raden gäller", couple.native_id);
                continue;
            }
            data.couples.insert(couple.native_id, couple);
        }

        match version {
            PayloadVersion::V2 => {
                for line in rows {
                    Self::apply_addition(line, &mut data);
                }
            }
            PayloadVersion::V1 => {
                let extra = rows.count();
                if extra > 0 {
                    tracing::warn!("{} oväntade rader efter paren ignoreras", extra);
                }
            }
        }

        Ok(data)
    }

    fn decode_payload(payload: &[u8]) -> ConvertResult<&str> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| ConvertError::schema_mismatch("nyttolasten är inte giltig UTF-8"))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }

    fn parse_count(field: &str, what: &str) -> ConvertResult<usize> {
        field.trim().parse::<usize>().map_err(|_| {
            ConvertError::schema_mismatch(format!("ogiltigt {} i huvudraden: {:?}", what, field))
        })
    }

    fn parse_person_row(line: &str, version: PayloadVersion) -> ConvertResult<FtzPerson> {
        let fields = Self::split_person_fields(line, version);

        let native_id = fields[0].parse::<i64>().map_err(|_| {
            ConvertError::schema_mismatch(format!("ogiltigt person-id: {:?}", fields[0]))
        })?;

        let mut person = FtzPerson::new(native_id);
        person.parent_couple_id = Self::opt_id(&fields[2]);
        person.surname = Self::opt_text(&fields[12]);
        person.given_name = Self::opt_text(&fields[13]);

        let birth_place = Self::opt_text(&fields[14]);
        let death_place = Self::opt_text(&fields[15]);

        let birth_code = fields[16].parse::<i64>().unwrap_or(0);
        let birth_date = Self::build_event_date(
            &fields[17],
            &fields[18],
            &fields[19],
            birth_code,
            &format!("födelsedatum för person {}", native_id),
        );
        if birth_code != 0 && birth_date.is_some() {
            person.birth = Some(Event {
                kind: EventKind::Birth,
                date: birth_date,
                place: birth_place,
                note: None,
            });
        }

        let death_code = fields[20].parse::<i64>().unwrap_or(0);
        let death_date = Self::build_event_date(
            &fields[21],
            &fields[22],
            &fields[23],
            death_code,
            &format!("dödsdatum för person {}", native_id),
        );
        // kod 128: döden är känd även om datum saknas
        if death_code != 0 && (death_date.is_some() || death_code == 128) {
            person.death = Some(Event {
                kind: EventKind::Death,
                date: death_date,
                place: death_place,
                note: None,
            });
        }

        person.sex = Sex::from_code(fields[24].parse::<i64>().unwrap_or(0));

        // kolumn 28 är den primära anteckningen, kolumn 25 är äldre fritext
        if let Some(note) = Self::opt_note(&fields[28]) {
            person.notes.push(note);
        }
        if let Some(addition) = Self::opt_note(&fields[25]) {
            person.notes.push(addition);
        }

        Ok(person)
    }

    fn parse_couple_row(line: &str) -> ConvertResult<FtzCouple> {
        let fields = Self::split_padded(line, 12);

        let native_id = fields[0].parse::<i64>().map_err(|_| {
            ConvertError::schema_mismatch(format!("ogiltigt par-id: {:?}", fields[0]))
        })?;

        let mut couple = FtzCouple::new(native_id);
        couple.divorced = fields[1] == "1";
        couple.male_id = Self::opt_id(&fields[2]);
        couple.female_id = Self::opt_id(&fields[4]);
        Ok(couple)
    }

    /// Knyt en tilläggsrad till sin ägare. Felaktiga rader hoppas över,
    /// de avbryter aldrig konverteringen.
    fn apply_addition(line: &str, data: &mut FtzData) {
        let fields = Self::split_padded(line, 13);

        let (Ok(_), Ok(owner_kind), Ok(owner_id), Ok(kind_code)) = (
            fields[0].parse::<i64>(),
            fields[1].parse::<i64>(),
            fields[2].parse::<i64>(),
            fields[3].parse::<i64>(),
        ) else {
            tracing::warn!("Felaktig tilläggsrad hoppas över: {:?}", line);
            return;
        };

        let kind = AdditionKind::from_code(kind_code);
        let qualifier_code = fields[4].parse::<i64>().unwrap_or(0);
        let owner_name = if owner_kind == 0 { "person" } else { "par" };
        let what = format!("tillägg för {} {}", owner_name, owner_id);

        let date = Self::build_addition_date(&fields, qualifier_code, &what);
        let place = Self::opt_text(&fields[11]);
        let text = Self::opt_note(&fields[12]);

        match owner_kind {
            0 => {
                let Some(person) = data.persons.get_mut(&owner_id) else {
                    tracing::warn!("Tillägg pekar på okänd person {}, hoppas över", owner_id);
                    return;
                };
                match kind {
                    AdditionKind::Birth => {
                        Self::set_event(&mut person.birth, EventKind::Birth, date, place, text, &what)
                    }
                    AdditionKind::Death => {
                        Self::set_event(&mut person.death, EventKind::Death, date, place, text, &what)
                    }
                    AdditionKind::Baptism => Self::set_event(
                        &mut person.baptism,
                        EventKind::Baptism,
                        date,
                        place,
                        text,
                        &what,
                    ),
                    AdditionKind::Burial => Self::set_event(
                        &mut person.burial,
                        EventKind::Burial,
                        date,
                        place,
                        text,
                        &what,
                    ),
                    AdditionKind::Note => {
                        if let Some(text) = text {
                            person.notes.push(text);
                        }
                    }
                    AdditionKind::Media => {
                        if let Some(file) = text {
                            person.media.push(MediaRef::new(file));
                        }
                    }
                    AdditionKind::Marriage => {
                        tracing::warn!("Vigseltillägg kan inte knytas till person {}, hoppas över", owner_id);
                    }
                    AdditionKind::Other => {
                        tracing::debug!("Okänd tilläggstyp {} ignoreras", kind_code);
                    }
                }
            }
            1 => {
                let Some(couple) = data.couples.get_mut(&owner_id) else {
                    tracing::warn!("Tillägg pekar på okänt par {}, hoppas över", owner_id);
                    return;
                };
                match kind {
                    AdditionKind::Marriage => Self::set_event(
                        &mut couple.marriage,
                        EventKind::Marriage,
                        date,
                        place,
                        text,
                        &what,
                    ),
                    AdditionKind::Note => {
                        if let Some(text) = text {
                            couple.notes.push(text);
                        }
                    }
                    AdditionKind::Media => {
                        if let Some(file) = text {
                            couple.media.push(MediaRef::new(file));
                        }
                    }
                    AdditionKind::Other => {
                        tracing::debug!("Okänd tilläggstyp {} ignoreras", kind_code);
                    }
                    _ => {
                        tracing::warn!(
                            "Tilläggstyp {} kan inte knytas till par {}, hoppas över",
                            kind_code,
                            owner_id
                        );
                    }
                }
            }
            _ => {
                tracing::warn!("Okänd ägartyp {} i tilläggsrad, hoppas över", owner_kind);
            }
        }
    }

    fn set_event(
        slot: &mut Option<Event>,
        kind: EventKind,
        date: Option<EventDate>,
        place: Option<String>,
        note: Option<String>,
        owner: &str,
    ) {
        if slot.is_some() {
            tracing::debug!(
                "Dubblerad händelse ({}) i {}, tillägget ignoreras",
                kind.display_name(),
                owner
            );
            return;
        }
        *slot = Some(Event {
            kind,
            date,
            place,
            note,
        });
    }

    fn build_addition_date(
        fields: &[String],
        qualifier_code: i64,
        what: &str,
    ) -> Option<EventDate> {
        let start = Self::build_partial(&fields[5], &fields[6], &fields[7], what)?;

        let qualifier = match qualifier_code {
            1 => Some(DateQualifier::About),
            2 => Some(DateQualifier::Before),
            3 => Some(DateQualifier::After),
            4 => Some(DateQualifier::Between),
            _ => None,
        };

        if qualifier == Some(DateQualifier::Between) {
            return match Self::build_partial(&fields[8], &fields[9], &fields[10], what) {
                Some(end) => Some(EventDate::between(start, end)),
                None => {
                    tracing::warn!(
                        "Intervall utan slutdatum i {}, datumet behandlas som exakt",
                        what
                    );
                    Some(EventDate::exact(start))
                }
            };
        }

        Some(EventDate {
            qualifier,
            date: start,
            end: None,
        })
    }

    fn build_event_date(
        year: &str,
        month: &str,
        day: &str,
        code: i64,
        what: &str,
    ) -> Option<EventDate> {
        let date = Self::build_partial(year, month, day, what)?;
        Some(EventDate {
            qualifier: Self::event_code_qualifier(code),
            date,
            end: None,
        })
    }

    /// Händelsekoder på personrader: 2=omkring, 3=före, 4=efter, annars exakt
    fn event_code_qualifier(code: i64) -> Option<DateQualifier> {
        match code {
            2 => Some(DateQualifier::About),
            3 => Some(DateQualifier::Before),
            4 => Some(DateQualifier::After),
            _ => None,
        }
    }

    /// Bygg ett partiellt datum. Ogiltiga kalenderdatum degraderas
    /// dag → månad → år med en loggad varning.
    fn build_partial(year: &str, month: &str, day: &str, what: &str) -> Option<PartialDate> {
        let year = year.parse::<i32>().ok().filter(|y| *y != 0)?;
        let mut month = month.parse::<u32>().ok().filter(|m| *m != 0);
        let mut day = day.parse::<u32>().ok().filter(|d| *d != 0);

        if day.is_some() && month.is_none() {
            tracing::warn!("Dag utan månad i {} ignoreras", what);
            day = None;
        }
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                tracing::warn!("Ogiltig månad {} i {} ignoreras", m, what);
                month = None;
                day = None;
            }
        }
        if let (Some(m), Some(d)) = (month, day) {
            if NaiveDate::from_ymd_opt(year, m, d).is_none() {
                tracing::warn!("Ogiltig dag {} i {} ignoreras", d, what);
                day = None;
            }
        }

        Some(PartialDate::new(year, month, day))
    }

    /// Dela upp en personrad och normalisera till v2-layouten
    fn split_person_fields(line: &str, version: PayloadVersion) -> Vec<String> {
        let mut fields: Vec<String> = line.split('\t').map(|f| f.trim().to_string()).collect();

        // v1 saknar ortkolumnerna 14-15, senare kolumner ligger två steg tidigare
        if version == PayloadVersion::V1 && fields.len() > 14 {
            fields.insert(14, String::new());
            fields.insert(14, String::new());
        }

        if fields.len() < PayloadVersion::V2.person_columns() {
            fields.resize(PayloadVersion::V2.person_columns(), String::new());
        }
        fields
    }

    fn split_padded(line: &str, min_fields: usize) -> Vec<String> {
        let mut fields: Vec<String> = line.split('\t').map(|f| f.trim().to_string()).collect();
        if fields.len() < min_fields {
            fields.resize(min_fields, String::new());
        }
        fields
    }

    fn opt_text(field: &str) -> Option<String> {
        (!field.is_empty()).then(|| field.to_string())
    }

    fn opt_note(field: &str) -> Option<String> {
        (!field.is_empty()).then(|| Self::decode_newlines(field))
    }

    fn opt_id(field: &str) -> Option<i64> {
        field.parse::<i64>().ok().filter(|id| *id > 0)
    }

    /// Appen sparar radbrytningar i fritext som tvåteckenssekvensen `\n`
    fn decode_newlines(field: &str) -> String {
        field.replace("\\n", "\n")
    }

    fn attach_faces(data: &mut FtzData, face_files: &[String]) {
        for entry in face_files {
            let owner = Self::face_owner_id(entry).and_then(|id| data.persons.get_mut(&id));
            match owner {
                Some(person) => person.media.push(MediaRef::new(entry.clone())),
                None => {
                    tracing::debug!("Bilden {} matchar ingen person", entry);
                    data.loose_media.push(MediaRef::new(entry.clone()));
                }
            }
        }
    }

    /// Bildens ägare utläses ur filnamnet:
    /// `faces/12.jpg` och `faces/12_2.jpg` hör båda till person 12
    fn face_owner_id(entry: &str) -> Option<i64> {
        let file_name = entry.rsplit('/').next()?;
        let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);
        let lead = stem.split('_').next()?;
        lead.parse::<i64>().ok()
    }
}
