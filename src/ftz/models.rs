//! Råa poster från node.ftt-nyttolasten
//!
//! Posterna speglar TSV-schemat och är ännu inte länkade till varandra.
//! Länkningen till familjer görs av relationsupplösaren.

use std::collections::BTreeMap;

use crate::models::{Event, MediaRef, Sex};

/// Schemaversion, igenkänd på antalet fält i huvudraden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadVersion {
    /// Två huvudfält, 27 kolumner per personrad
    V1,
    /// Tre eller fler huvudfält, 29 kolumner per personrad och
    /// en valfri tilläggssektion efter paren
    V2,
}

impl PayloadVersion {
    /// Antal kolumner i en personrad
    pub fn person_columns(&self) -> usize {
        match self {
            Self::V1 => 27,
            Self::V2 => 29,
        }
    }
}

/// Typkod för en tilläggspost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionKind {
    Birth,
    Death,
    Baptism,
    Burial,
    Marriage,
    Note,
    Media,
    Other,
}

impl AdditionKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Birth,
            2 => Self::Death,
            3 => Self::Baptism,
            4 => Self::Burial,
            5 => Self::Marriage,
            6 => Self::Note,
            7 => Self::Media,
            _ => Self::Other,
        }
    }
}

/// En person som den står i nyttolasten
#[derive(Debug, Clone)]
pub struct FtzPerson {
    pub native_id: i64,
    /// Paret personen är barn till
    pub parent_couple_id: Option<i64>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub sex: Sex,
    pub birth: Option<Event>,
    pub death: Option<Event>,
    pub baptism: Option<Event>,
    pub burial: Option<Event>,
    pub notes: Vec<String>,
    pub media: Vec<MediaRef>,
}

impl FtzPerson {
    pub fn new(native_id: i64) -> Self {
        Self {
            native_id,
            parent_couple_id: None,
            surname: None,
            given_name: None,
            sex: Sex::Unknown,
            birth: None,
            death: None,
            baptism: None,
            burial: None,
            notes: Vec::new(),
            media: Vec::new(),
        }
    }
}

/// Ett parfragment som det står i nyttolasten
#[derive(Debug, Clone)]
pub struct FtzCouple {
    pub native_id: i64,
    pub male_id: Option<i64>,
    pub female_id: Option<i64>,
    pub divorced: bool,
    pub marriage: Option<Event>,
    pub notes: Vec<String>,
    pub media: Vec<MediaRef>,
}

impl FtzCouple {
    pub fn new(native_id: i64) -> Self {
        Self {
            native_id,
            male_id: None,
            female_id: None,
            divorced: false,
            marriage: None,
            notes: Vec::new(),
            media: Vec::new(),
        }
    }
}

/// Hela den tolkade nyttolasten
///
/// `BTreeMap` ger iteration i stigande nativt id, vilket gör
/// id-tilldelningen i upplösaren deterministisk.
#[derive(Debug)]
pub struct FtzData {
    pub version: PayloadVersion,
    pub persons: BTreeMap<i64, FtzPerson>,
    pub couples: BTreeMap<i64, FtzCouple>,
    /// Ansiktsbilder som inte kunde knytas till någon person
    pub loose_media: Vec<MediaRef>,
}

impl FtzData {
    pub fn new(version: PayloadVersion) -> Self {
        Self {
            version,
            persons: BTreeMap::new(),
            couples: BTreeMap::new(),
            loose_media: Vec::new(),
        }
    }

    /// Totalt antal mediareferenser i arkivet
    pub fn media_count(&self) -> usize {
        let person_media: usize = self.persons.values().map(|p| p.media.len()).sum();
        let couple_media: usize = self.couples.values().map(|c| c.media.len()).sum();
        person_media + couple_media + self.loose_media.len()
    }
}
