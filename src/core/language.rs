//! Active UI language and the layout direction it implies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

/// Supported UI locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Screen corner where notices are anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    BottomLeft,
    BottomRight,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Language::En => Direction::Ltr,
            Language::Ar => Direction::Rtl,
        }
    }

    /// Notices sit in the trailing corner for the reading direction
    pub fn notification_anchor(self) -> Anchor {
        match self.direction() {
            Direction::Ltr => Anchor::BottomRight,
            Direction::Rtl => Anchor::BottomLeft,
        }
    }

    pub fn other(self) -> Language {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    /// Pick the variant of a bilingual field for this language,
    /// falling back to the other one when missing
    pub fn pick<'a>(self, en: Option<&'a str>, ar: Option<&'a str>) -> Option<&'a str> {
        match self {
            Language::En => en.or(ar),
            Language::Ar => ar.or(en),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            other => Err(format!("unsupported language '{other}' (expected en or ar)")),
        }
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Anchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

/// Settable holder of the active language
pub struct LanguageStore {
    tx: watch::Sender<Language>,
}

impl LanguageStore {
    pub fn new(initial: Language) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn language(&self) -> Language {
        *self.tx.borrow()
    }

    pub fn direction(&self) -> Direction {
        self.language().direction()
    }

    pub fn notification_anchor(&self) -> Anchor {
        self.language().notification_anchor()
    }

    /// Returns true when the language actually changed
    pub fn set_language(&self, language: Language) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });
        if changed {
            tracing::debug!("Language set to {} ({})", language, language.direction());
        }
        changed
    }

    pub fn toggle_language(&self) -> Language {
        let next = self.language().other();
        self.set_language(next);
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.tx.subscribe()
    }
}

impl Default for LanguageStore {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
