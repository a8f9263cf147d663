//! The instrument catalog: records, JSON ingestion and the read-only store.
//!
//! The catalog is fetched once at startup. Song roles and per-locale
//! descriptions are settled here, at ingestion, so the rest of the program
//! never has to inspect display names.

use std::collections::HashSet;

use {
    serde::Deserialize,
    tracing::{error, info, warn},
};

use crate::{
    assets::{AssetLocator, fetch_text},
    error::CatalogError,
    locale::{Locale, LocalizedText},
};

pub type InstrumentId = i64;

/// Whether a song is a music sample or a spoken reading of the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongRole {
    #[default]
    Music,
    Narration,
}

/// One playable audio sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    pub id: String,
    pub name: String,
    pub performer: Option<String>,
    pub audio_ref: String,
    pub role: SongRole,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentRecord {
    pub id: InstrumentId,
    pub name: String,
    pub description: LocalizedText,
    pub image_ref: String,
    pub songs: Vec<SongRecord>,
}

impl InstrumentRecord {
    pub fn description(&self, locale: Locale) -> &str {
        self.description.get(locale)
    }

    pub fn narration(&self) -> Option<&SongRecord> {
        self.songs.iter().find(|s| s.role == SongRole::Narration)
    }
}

#[derive(Deserialize)]
struct RawSong {
    id: String,
    name: String,
    #[serde(default)]
    player: Option<String>,
    path: String,
    #[serde(default)]
    role: Option<SongRole>,
}

#[derive(Deserialize)]
struct RawInstrument {
    code: InstrumentId,
    name: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    text_en: Option<String>,
    #[serde(default)]
    picture: String,
    #[serde(default)]
    songs: Vec<RawSong>,
}

/// Settles the role of a song that carries no explicit one.
fn classify(name: &str, markers: &[String]) -> SongRole {
    let name = name.to_lowercase();
    if markers
        .iter()
        .any(|m| !m.is_empty() && name.contains(&m.to_lowercase()))
    {
        SongRole::Narration
    } else {
        SongRole::Music
    }
}

impl RawInstrument {
    fn into_record(self, markers: &[String]) -> InstrumentRecord {
        let description = match self.text_en {
            Some(en) => LocalizedText::new(self.text).with(Locale::En, en),
            None => LocalizedText::new(self.text),
        };
        let songs = self
            .songs
            .into_iter()
            .map(|s| SongRecord {
                role: s.role.unwrap_or_else(|| classify(&s.name, markers)),
                id: s.id,
                name: s.name,
                performer: s.player.filter(|p| !p.trim().is_empty()),
                audio_ref: s.path,
            })
            .collect();
        InstrumentRecord {
            id: self.code,
            name: self.name,
            description,
            image_ref: self.picture,
            songs,
        }
    }
}

/// Parses a catalog document.
pub fn parse_catalog(json: &str, markers: &[String]) -> Result<Vec<InstrumentRecord>, CatalogError> {
    let raw: Vec<RawInstrument> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.len());
    for instrument in raw {
        if !seen.insert(instrument.code) {
            warn!(
                "Duplicate instrument id {} ({}), keeping the first",
                instrument.code, instrument.name
            );
            continue;
        }
        records.push(instrument.into_record(markers));
    }
    Ok(records)
}

/// Read-only holder of the loaded catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    instruments: Vec<InstrumentRecord>,
}

impl CatalogStore {
    pub fn new(instruments: Vec<InstrumentRecord>) -> Self {
        Self { instruments }
    }

    pub fn try_load(source: &AssetLocator, markers: &[String]) -> Result<Self, CatalogError> {
        let body = fetch_text(source)?;
        Ok(Self::new(parse_catalog(&body, markers)?))
    }

    /// Loads the catalog, degrading to an empty one on any failure.
    pub fn load(source: &AssetLocator, markers: &[String]) -> Self {
        match Self::try_load(source, markers) {
            Ok(store) => {
                info!("Loaded {} instruments from {source}", store.len());
                store
            }
            Err(e) => {
                error!("Error loading instruments from {source}: {e}");
                Self::default()
            }
        }
    }

    pub fn instruments(&self) -> &[InstrumentRecord] {
        &self.instruments
    }

    pub fn get(&self, id: InstrumentId) -> Option<&InstrumentRecord> {
        self.instruments.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::tempdir;

    use super::{CatalogStore, SongRole, parse_catalog};
    use crate::{assets::AssetLocator, error::CatalogError, locale::Locale};

    const SAMPLE: &str = r##"[
      {
        "code": 1,
        "name": "Davul",
        "text": "Davul bir vurmalı çalgıdır.",
        "text_en": "The drum is a percussion instrument.",
        "picture": "images/davul.png",
        "backround": "#ffcc00",
        "songs": [
          { "id": "s1", "name": "Davul Açıklama", "path": "sounds/davul_aciklama.mp3", "playing": false, "pButton": "" },
          { "id": "s2", "name": "Zeybek", "player": "Ali Usta", "path": "sounds/zeybek.mp3", "playing": false, "pButton": "" },
          { "id": "s3", "name": "Ritim", "player": "", "path": "sounds/ritim.mp3", "role": "narration" }
        ]
      },
      { "code": 2, "name": "Ney", "text": "Ney üflemeli bir çalgıdır.", "picture": "images/ney.png", "songs": [] }
    ]"##;

    fn markers() -> Vec<String> {
        vec!["açıklama".to_string(), "description".to_string()]
    }

    #[test]
    fn parses_original_wire_format() {
        let records = parse_catalog(SAMPLE, &markers()).unwrap();
        assert_eq!(records.len(), 2);

        let davul = &records[0];
        assert_eq!(davul.id, 1);
        assert_eq!(davul.image_ref, "images/davul.png");
        assert_eq!(davul.description(Locale::En), "The drum is a percussion instrument.");
        assert_eq!(davul.songs[1].performer.as_deref(), Some("Ali Usta"));
        assert_eq!(davul.songs[2].performer, None);

        let ney = &records[1];
        assert_eq!(ney.description(Locale::En), "Ney üflemeli bir çalgıdır.");
    }

    #[test]
    fn roles_are_settled_at_ingestion() {
        let records = parse_catalog(SAMPLE, &markers()).unwrap();
        let roles: Vec<SongRole> = records[0].songs.iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![SongRole::Narration, SongRole::Music, SongRole::Narration]
        );
        assert_eq!(records[0].narration().map(|s| s.id.as_str()), Some("s1"));
    }

    #[test]
    fn duplicate_ids_keep_the_first_record() {
        let json = r#"[
          { "code": 7, "name": "Saz", "songs": [] },
          { "code": 7, "name": "Bağlama", "songs": [] }
        ]"#;
        let records = parse_catalog(json, &[]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Saz");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(
            parse_catalog("{ not json", &[]),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, SAMPLE).unwrap();

        let store = CatalogStore::load(&AssetLocator::File(path), &markers());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).map(|i| i.name.as_str()), Some("Ney"));
        assert!(store.get(99).is_none());
    }

    #[test]
    fn load_failure_yields_empty_catalog() {
        let store = CatalogStore::load(
            &AssetLocator::File(PathBuf::from("/definitely/not/here/data.json")),
            &markers(),
        );
        assert!(store.is_empty());
    }
}
