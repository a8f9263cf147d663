//! Display languages, per-locale record text and translated UI strings.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Active display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Turkish, the language the catalog is authored in.
    #[default]
    Tr,
    /// English.
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Tr, Locale::En];

    pub fn code(self) -> &'static str {
        match self {
            Locale::Tr => "tr",
            Locale::En => "en",
        }
    }

    /// The language after this one, wrapping around.
    pub fn next(self) -> Self {
        let idx = Locale::ALL.iter().position(|&l| l == self).unwrap_or(0);
        Locale::ALL[(idx + 1) % Locale::ALL.len()]
    }

    /// Name of this language as shown in the header badge.
    pub fn display_name(self) -> &'static str {
        match self {
            Locale::Tr => "Türkçe",
            Locale::En => "English",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Text available in one or more locales.
///
/// Lookup falls back from the requested locale to the default locale and
/// then to whatever entry is present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalizedText {
    entries: BTreeMap<Locale, String>,
}

impl LocalizedText {
    pub fn new(default_text: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(Locale::default(), default_text.into());
        Self { entries }
    }

    pub fn with(mut self, locale: Locale, text: impl Into<String>) -> Self {
        self.insert(locale, text);
        self
    }

    /// Adds a translation. Blank text is ignored so it never shadows a fallback.
    pub fn insert(&mut self, locale: Locale, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.entries.insert(locale, text);
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        self.entries
            .get(&locale)
            .or_else(|| self.entries.get(&Locale::default()))
            .or_else(|| self.entries.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Keys for every piece of fixed UI copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiText {
    AppTitle,
    Footer,
    Loading,
    SearchTitle,
    SearchPlaceholder,
    ResultsFor,
    NoResultsTitle,
    NoResultsBody,
    EmptyCatalog,
    SoundSamples,
    Description,
    PlayedBy,
    NowPlaying,
    SoundOff,
    AudioLoadFailed,
    PhaseLoading,
    PhasePlaying,
    PhasePaused,
    PhaseError,
    Back,
}

/// Looks up the translation of `key` for `locale`.
pub fn tr(locale: Locale, key: UiText) -> &'static str {
    use UiText::*;
    match locale {
        Locale::Tr => match key {
            AppTitle => "Müziğim ve Ben",
            Footer => "Çocuklar için eğitici müzik aletleri uygulaması",
            Loading => "Müzik aletleri yükleniyor...",
            SearchTitle => "Arama",
            SearchPlaceholder => "Müzik aleti ara...",
            ResultsFor => "sonuç bulundu",
            NoResultsTitle => "Sonuç bulunamadı",
            NoResultsBody => "Aradığınız müzik aleti bulunamadı. Farklı bir terim deneyin.",
            EmptyCatalog => "Henüz müzik aleti yok",
            SoundSamples => "ses örneği",
            Description => "Açıklama",
            PlayedBy => "Çalan",
            NowPlaying => "Çalıyor",
            SoundOff => "Ses örneklerini dinlemek için ses ayarlarını açın",
            AudioLoadFailed => "Ses yüklenemedi",
            PhaseLoading => "Yükleniyor",
            PhasePlaying => "Çalıyor",
            PhasePaused => "Duraklatıldı",
            PhaseError => "Hata",
            Back => "Geri Dön",
        },
        Locale::En => match key {
            AppTitle => "My Music and Me",
            Footer => "An educational musical instruments app for children",
            Loading => "Loading instruments...",
            SearchTitle => "Search",
            SearchPlaceholder => "Search instruments...",
            ResultsFor => "results found",
            NoResultsTitle => "No results",
            NoResultsBody => "We couldn't find that instrument. Try another word.",
            EmptyCatalog => "No instruments yet",
            SoundSamples => "sound samples",
            Description => "Description",
            PlayedBy => "Played by",
            NowPlaying => "Playing",
            SoundOff => "Turn sound on to listen to the samples",
            AudioLoadFailed => "Could not load audio",
            PhaseLoading => "Loading",
            PhasePlaying => "Playing",
            PhasePaused => "Paused",
            PhaseError => "Error",
            Back => "Back",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{Locale, LocalizedText, UiText, tr};

    #[test]
    fn localized_text_falls_back_to_default_locale() {
        let text = LocalizedText::new("Davul bir vurmalı çalgıdır.");
        assert_eq!(text.get(Locale::En), "Davul bir vurmalı çalgıdır.");
    }

    #[test]
    fn localized_text_prefers_requested_locale() {
        let text = LocalizedText::new("Davul").with(Locale::En, "Drum");
        assert_eq!(text.get(Locale::En), "Drum");
        assert_eq!(text.get(Locale::Tr), "Davul");
    }

    #[test]
    fn blank_translation_does_not_shadow_fallback() {
        let text = LocalizedText::new("Kemençe").with(Locale::En, "   ");
        assert_eq!(text.get(Locale::En), "Kemençe");
    }

    #[test]
    fn empty_text_yields_empty_string() {
        assert_eq!(LocalizedText::default().get(Locale::Tr), "");
    }

    #[test]
    fn locales_cycle() {
        assert_eq!(Locale::Tr.next(), Locale::En);
        assert_eq!(Locale::En.next(), Locale::Tr);
    }

    #[test]
    fn every_locale_has_a_title() {
        for locale in Locale::ALL {
            assert!(!tr(locale, UiText::AppTitle).is_empty());
        }
    }
}
