//! Localized lookup tables.
//!
//! The engine needs three language-dependent lists: the table-of-contents
//! title, the names of sections that belong in front matter, and the titles
//! under which bibliographies appear. They are plain data handed to the
//! classifier and detector, so tests can substitute their own tables.
//!
//! Bibliography titles are matched across all languages at once: a German
//! book citing an English source list titled "References" should still be
//! recognized. Front-matter names are per language.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Fallback language '{0}' has no table")]
    MissingFallback(String),
}

/// Tables for a single language.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    pub toc_title: String,
    /// Word used in chapter labels ("Chapter", "Kapitel", ...)
    pub chapter_word: String,
    /// Whether chapter numbers may be spelled out as English words.
    pub number_words: bool,
    /// Lowercased names of recognized front-matter sections.
    pub front_matter_names: BTreeSet<String>,
    /// Lowercased bibliography/reference section titles.
    pub bibliography_titles: BTreeSet<String>,
}

impl LocaleTable {
    fn new(
        toc_title: &str,
        chapter_word: &str,
        front_matter: &[&str],
        bibliography: &[&str],
    ) -> Self {
        Self {
            toc_title: toc_title.to_string(),
            chapter_word: chapter_word.to_string(),
            number_words: false,
            front_matter_names: front_matter.iter().map(|s| s.to_lowercase()).collect(),
            bibliography_titles: bibliography.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Whether a heading names a recognized front-matter section.
    pub fn is_front_matter_name(&self, heading: &str) -> bool {
        self.front_matter_names
            .contains(&normalize_section_name(heading))
    }
}

/// All known languages plus the fallback language.
#[derive(Debug, Clone)]
pub struct Locales {
    tables: BTreeMap<String, LocaleTable>,
    fallback: String,
}

impl Locales {
    /// Create from explicit tables. `fallback` must be a key of `tables`.
    pub fn new(tables: BTreeMap<String, LocaleTable>, fallback: &str) -> Result<Self, LocaleError> {
        if !tables.contains_key(fallback) {
            return Err(LocaleError::MissingFallback(fallback.to_string()));
        }
        Ok(Self {
            tables,
            fallback: fallback.to_string(),
        })
    }

    /// Built-in tables for en, de, fr, es, it, pt and nl, falling back to en.
    pub fn builtin() -> Self {
        let mut tables = BTreeMap::new();

        let mut en = LocaleTable::new(
            "Contents",
            "Chapter",
            &[
                "Title Page",
                "Half Title",
                "Copyright",
                "Dedication",
                "Epigraph",
                "Foreword",
                "Preface",
                "Introduction",
                "Prologue",
                "Acknowledgments",
                "Acknowledgements",
                "Author's Note",
                "A Note to the Reader",
                "Table of Contents",
                "Contents",
            ],
            &[
                "References",
                "Bibliography",
                "Works Cited",
                "Sources",
                "Further Reading",
                "Citations",
                "Notes and References",
                "Select Bibliography",
            ],
        );
        en.number_words = true;
        tables.insert("en".to_string(), en);

        tables.insert(
            "de".to_string(),
            LocaleTable::new(
                "Inhaltsverzeichnis",
                "Kapitel",
                &[
                    "Titelseite",
                    "Impressum",
                    "Widmung",
                    "Vorwort",
                    "Geleitwort",
                    "Einleitung",
                    "Einführung",
                    "Prolog",
                    "Danksagung",
                    "Inhalt",
                    "Inhaltsverzeichnis",
                ],
                &[
                    "Literaturverzeichnis",
                    "Literatur",
                    "Quellen",
                    "Quellenverzeichnis",
                    "Bibliographie",
                    "Bibliografie",
                ],
            ),
        );
        tables.insert(
            "fr".to_string(),
            LocaleTable::new(
                "Table des matières",
                "Chapitre",
                &[
                    "Page de titre",
                    "Dédicace",
                    "Épigraphe",
                    "Avant-propos",
                    "Préface",
                    "Introduction",
                    "Prologue",
                    "Remerciements",
                    "Table des matières",
                ],
                &["Bibliographie", "Références", "Sources", "Ouvrages cités"],
            ),
        );
        tables.insert(
            "es".to_string(),
            LocaleTable::new(
                "Índice",
                "Capítulo",
                &[
                    "Portada",
                    "Dedicatoria",
                    "Epígrafe",
                    "Prólogo",
                    "Prefacio",
                    "Introducción",
                    "Agradecimientos",
                    "Índice",
                ],
                &["Bibliografía", "Referencias", "Fuentes", "Obras citadas"],
            ),
        );
        tables.insert(
            "it".to_string(),
            LocaleTable::new(
                "Indice",
                "Capitolo",
                &[
                    "Frontespizio",
                    "Dedica",
                    "Epigrafe",
                    "Prefazione",
                    "Premessa",
                    "Introduzione",
                    "Prologo",
                    "Ringraziamenti",
                    "Indice",
                ],
                &["Bibliografia", "Riferimenti", "Fonti", "Riferimenti bibliografici"],
            ),
        );
        tables.insert(
            "pt".to_string(),
            LocaleTable::new(
                "Sumário",
                "Capítulo",
                &[
                    "Folha de rosto",
                    "Dedicatória",
                    "Epígrafe",
                    "Prefácio",
                    "Introdução",
                    "Prólogo",
                    "Agradecimentos",
                    "Sumário",
                ],
                &["Bibliografia", "Referências", "Fontes", "Obras citadas"],
            ),
        );
        tables.insert(
            "nl".to_string(),
            LocaleTable::new(
                "Inhoudsopgave",
                "Hoofdstuk",
                &[
                    "Titelpagina",
                    "Opdracht",
                    "Motto",
                    "Voorwoord",
                    "Inleiding",
                    "Proloog",
                    "Dankwoord",
                    "Inhoud",
                    "Inhoudsopgave",
                ],
                &["Bibliografie", "Literatuurlijst", "Referenties", "Bronnen"],
            ),
        );

        Self {
            tables,
            fallback: "en".to_string(),
        }
    }

    /// Table for a language code such as `"de"` or `"de-AT"`.
    ///
    /// Region suffixes are ignored; unknown languages get the fallback table.
    pub fn table(&self, language: &str) -> &LocaleTable {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match self.tables.get(&primary) {
            Some(table) => table,
            None => {
                log::warn!(
                    "no localized tables for language '{}', using '{}'",
                    language,
                    self.fallback
                );
                &self.tables[&self.fallback]
            }
        }
    }

    /// Whether tables exist for the language (ignoring region suffixes).
    pub fn supports(&self, language: &str) -> bool {
        let primary = language.split(['-', '_']).next().unwrap_or_default();
        self.tables.contains_key(&primary.to_lowercase())
    }

    /// Union of bibliography titles across every language.
    pub fn bibliography_titles(&self) -> BTreeSet<String> {
        self.tables
            .values()
            .flat_map(|t| t.bibliography_titles.iter().cloned())
            .collect()
    }
}

impl Default for Locales {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Normalize a heading for name matching: trimmed, lowercased, trailing
/// `:` or `.` removed, typographic apostrophes folded to ASCII.
pub fn normalize_section_name(heading: &str) -> String {
    heading
        .trim()
        .trim_end_matches([':', '.'])
        .trim()
        .replace('\u{2019}', "'")
        .to_lowercase()
}
