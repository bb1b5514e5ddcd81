//! Landmark catalog: the known landmarks, their classification labels, and
//! the default question for each.
//!
//! Catalogs are authored in TOML. The reference catalog is embedded at build
//! time so a session is always playable offline.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::model::{ClassificationOptions, Landmark, Question};

/// TOML source of the reference catalog.
pub const REFERENCE_CATALOG: &str = include_str!("../catalog/reference.toml");

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    landmarks: Vec<TomlLandmark>,
}

#[derive(Debug, Deserialize)]
struct TomlLandmark {
    name: String,
    #[serde(default)]
    classification: Option<[String; 2]>,
    #[serde(default)]
    default_question: Option<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    text: String,
    correct_answer: String,
    options: Vec<String>,
}

/// The fixed, ordered set of landmarks for a session plus per-landmark data.
#[derive(Debug, Clone)]
pub struct LandmarkCatalog {
    landmarks: Vec<Landmark>,
    classification: HashMap<Landmark, ClassificationOptions>,
    defaults: HashMap<Landmark, Question>,
}

impl LandmarkCatalog {
    /// Build a catalog, rejecting duplicates and malformed default questions.
    ///
    /// Landmarks without a default question are allowed; see
    /// [`validate_catalog`] for the warning this produces.
    pub fn new(
        landmarks: Vec<Landmark>,
        classification: HashMap<Landmark, ClassificationOptions>,
        defaults: HashMap<Landmark, Question>,
    ) -> Result<Self, CatalogError> {
        if landmarks.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for landmark in &landmarks {
            if !seen.insert(landmark) {
                return Err(CatalogError::DuplicateLandmark(landmark.to_string()));
            }
        }

        for (landmark, question) in &defaults {
            question
                .check_shape()
                .map_err(|reason| CatalogError::InvalidQuestion {
                    landmark: landmark.to_string(),
                    reason,
                })?;
        }

        for (landmark, opts) in &classification {
            if opts.expected == opts.other {
                return Err(CatalogError::InvalidClassification(landmark.to_string()));
            }
        }

        Ok(Self {
            landmarks,
            classification,
            defaults,
        })
    }

    /// The embedded reference catalog (thyroid cartilage, cricoid cartilage,
    /// trachea).
    pub fn reference() -> Result<Self, CatalogError> {
        parse_catalog_str(REFERENCE_CATALOG)
    }

    /// Known landmarks in catalog order.
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn contains(&self, landmark: &Landmark) -> bool {
        self.landmarks.contains(landmark)
    }

    /// Classification labels for a landmark, `Normal`/`Abnormal` when none
    /// are configured.
    pub fn classification_for(&self, landmark: &Landmark) -> ClassificationOptions {
        self.classification
            .get(landmark)
            .cloned()
            .unwrap_or_default()
    }

    pub fn default_question(&self, landmark: &Landmark) -> Option<&Question> {
        self.defaults.get(landmark)
    }

    /// One point each for location, classification, and MCQ per landmark.
    pub fn max_score(&self) -> u32 {
        u32::try_from(self.landmarks.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(3)
    }
}

/// Load a catalog from a TOML file.
pub fn load_catalog(path: &Path) -> Result<LandmarkCatalog, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog_str(&content)
}

/// Parse a catalog from a TOML string.
pub fn parse_catalog_str(content: &str) -> Result<LandmarkCatalog, CatalogError> {
    let parsed: TomlCatalog = toml::from_str(content)?;

    let mut landmarks = Vec::with_capacity(parsed.landmarks.len());
    let mut classification = HashMap::new();
    let mut defaults = HashMap::new();

    for entry in parsed.landmarks {
        let landmark = Landmark::new(entry.name);
        if let Some([expected, other]) = entry.classification {
            classification.insert(landmark.clone(), ClassificationOptions::new(expected, other));
        }
        if let Some(q) = entry.default_question {
            defaults.insert(
                landmark.clone(),
                Question::new(q.text, q.correct_answer, q.options),
            );
        }
        landmarks.push(landmark);
    }

    LandmarkCatalog::new(landmarks, classification, defaults)
}

/// A non-fatal issue found while validating a catalog.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub landmark: Option<String>,
    pub message: String,
}

/// Check a catalog for gaps that degrade a session without breaking it.
pub fn validate_catalog(catalog: &LandmarkCatalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for landmark in catalog.landmarks() {
        if catalog.default_question(landmark).is_none() {
            warnings.push(ValidationWarning {
                landmark: Some(landmark.to_string()),
                message: "no default question; offline sessions will show a placeholder".into(),
            });
        }
        if !catalog.classification.contains_key(landmark) {
            warnings.push(ValidationWarning {
                landmark: Some(landmark.to_string()),
                message: "no classification labels; using Normal/Abnormal".into(),
            });
        }
    }

    for landmark in catalog.defaults.keys() {
        if !catalog.contains(landmark) {
            warnings.push(ValidationWarning {
                landmark: Some(landmark.to_string()),
                message: "default question for a landmark that is not in the catalog".into(),
            });
        }
    }

    warnings
}
