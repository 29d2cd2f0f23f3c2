//! Review records, label sets and training examples.
//!
//! A [`ReviewRecord`] is the unit of input. Its canonical text field, the
//! `revue`, is the title and the body joined by `". "`; records whose title
//! and body are both blank have no `revue` and are dropped before
//! featurization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TriageError};

/// Separator placed between title and text when building the `revue`.
pub const REVUE_SEPARATOR: &str = ". ";

/// Opaque record key.
///
/// Sources hand out either textual or numeric keys; both are kept verbatim
/// as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        RecordId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RecordId(s),
            RawId::Signed(n) => RecordId(n.to_string()),
            RawId::Unsigned(n) => RecordId(n.to_string()),
        })
    }
}

/// Treat a missing or null text field as the empty string.
pub(crate) fn null_as_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A customer review to classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// Star rating; only the exact values 1 to 5 are accepted downstream.
    pub rating: i64,
}

impl ReviewRecord {
    pub fn new<I, T, X>(id: I, title: T, text: X, rating: i64) -> Self
    where
        I: Into<RecordId>,
        T: Into<String>,
        X: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            rating,
        }
    }

    /// The combined `title + ". " + text` field, or `None` when both parts are empty.
    pub fn revue(&self) -> Option<String> {
        let revue = format!("{}{}{}", self.title, REVUE_SEPARATOR, self.text);
        if revue == REVUE_SEPARATOR {
            None
        } else {
            Some(revue)
        }
    }
}

/// The nine problem categories, in their fixed output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NonTenu,
    ProduitNonConforme,
    MauvaiseQualite,
    ProduitEndommage,
    RetourClient,
    ProduitDangereux,
    AucunProbleme,
    AutreProbleme,
    SavSallerProbleme,
}

impl Label {
    /// Number of labels.
    pub const COUNT: usize = 9;

    /// Every label in column order.
    pub const ALL: [Label; Label::COUNT] = [
        Label::NonTenu,
        Label::ProduitNonConforme,
        Label::MauvaiseQualite,
        Label::ProduitEndommage,
        Label::RetourClient,
        Label::ProduitDangereux,
        Label::AucunProbleme,
        Label::AutreProbleme,
        Label::SavSallerProbleme,
    ];

    /// Column position of this label.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name of this label.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::NonTenu => "non_tenu",
            Label::ProduitNonConforme => "produit_non_conforme",
            Label::MauvaiseQualite => "mauvaise_qualite",
            Label::ProduitEndommage => "produit_endommage",
            Label::RetourClient => "retour_client",
            Label::ProduitDangereux => "produit_dangereux",
            Label::AucunProbleme => "aucun_probleme",
            Label::AutreProbleme => "autre_probleme",
            Label::SavSallerProbleme => "sav_saller_probleme",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        Label::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| TriageError::invalid_argument(format!("unknown label '{s}'")))
    }
}

/// Nine independent flags, one per [`Label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct LabelSet {
    pub non_tenu: bool,
    pub produit_non_conforme: bool,
    pub mauvaise_qualite: bool,
    pub produit_endommage: bool,
    pub retour_client: bool,
    pub produit_dangereux: bool,
    pub aucun_probleme: bool,
    pub autre_probleme: bool,
    pub sav_saller_probleme: bool,
}

impl LabelSet {
    /// A label set with every flag cleared.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from flags given in [`Label::ALL`] order.
    pub fn from_array(flags: [bool; Label::COUNT]) -> Self {
        let mut set = Self::empty();
        for (label, flag) in Label::ALL.into_iter().zip(flags) {
            set.set(label, flag);
        }
        set
    }

    /// Flags in [`Label::ALL`] order.
    pub fn to_array(&self) -> [bool; Label::COUNT] {
        Label::ALL.map(|label| self.get(label))
    }

    pub fn get(&self, label: Label) -> bool {
        match label {
            Label::NonTenu => self.non_tenu,
            Label::ProduitNonConforme => self.produit_non_conforme,
            Label::MauvaiseQualite => self.mauvaise_qualite,
            Label::ProduitEndommage => self.produit_endommage,
            Label::RetourClient => self.retour_client,
            Label::ProduitDangereux => self.produit_dangereux,
            Label::AucunProbleme => self.aucun_probleme,
            Label::AutreProbleme => self.autre_probleme,
            Label::SavSallerProbleme => self.sav_saller_probleme,
        }
    }

    pub fn set(&mut self, label: Label, value: bool) {
        let slot = match label {
            Label::NonTenu => &mut self.non_tenu,
            Label::ProduitNonConforme => &mut self.produit_non_conforme,
            Label::MauvaiseQualite => &mut self.mauvaise_qualite,
            Label::ProduitEndommage => &mut self.produit_endommage,
            Label::RetourClient => &mut self.retour_client,
            Label::ProduitDangereux => &mut self.produit_dangereux,
            Label::AucunProbleme => &mut self.aucun_probleme,
            Label::AutreProbleme => &mut self.autre_probleme,
            Label::SavSallerProbleme => &mut self.sav_saller_probleme,
        };
        *slot = value;
    }

    /// Number of raised flags.
    pub fn count(&self) -> usize {
        self.to_array().iter().filter(|&&flag| flag).count()
    }

    /// Iterate over `(label, flag)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, bool)> + '_ {
        Label::ALL.into_iter().map(move |label| (label, self.get(label)))
    }
}

/// A review together with its ground-truth labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    #[serde(flatten)]
    pub record: ReviewRecord,
    #[serde(flatten)]
    pub labels: LabelSet,
}

impl TrainingExample {
    pub fn new(record: ReviewRecord, labels: LabelSet) -> Self {
        Self { record, labels }
    }
}

/// A surviving input record with its corrected labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReview {
    #[serde(flatten)]
    pub record: ReviewRecord,
    #[serde(flatten)]
    pub labels: LabelSet,
}
