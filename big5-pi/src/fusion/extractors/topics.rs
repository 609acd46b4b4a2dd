//! Topic distribution estimator
//!
//! Bag-of-words counts from a pre-fitted vocabulary, projected onto the
//! topic simplex with the variational E-step of online LDA.
//!
//! Estimation is fail-closed: [`TopicEstimator::try_estimate`] returns a
//! typed [`ExtractionError`], and [`TopicEstimator::estimate`] is the one
//! place that turns any failure into the zero vector.

use crate::error::{ExtractionError, FatalConfigError};
use crate::fusion::TOPIC_DIM;
use ndarray::{Array1, Array2, Axis};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use statrs::function::gamma::digamma;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// Default scikit-learn token pattern: runs of two or more word characters
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("valid token pattern"));

const EPS: f64 = f64::EPSILON;

pub(super) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, FatalConfigError> {
    if !path.exists() {
        return Err(FatalConfigError::MissingArtifact(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| FatalConfigError::invalid(path, e.to_string()))
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

/// Pre-fitted count vectorizer (term → column)
#[derive(Debug, Clone, Deserialize)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
}

impl CountVectorizer {
    pub fn new(vocabulary: HashMap<String, usize>, ngram_range: (usize, usize)) -> Self {
        Self {
            vocabulary,
            ngram_range,
            lowercase: true,
        }
    }

    pub fn load(path: &Path) -> Result<Self, FatalConfigError> {
        let vectorizer: Self = read_json(path)?;
        let (min_n, max_n) = vectorizer.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(FatalConfigError::invalid(
                path,
                format!("invalid ngram_range ({}, {})", min_n, max_n),
            ));
        }
        if let Some(bad) = vectorizer
            .vocabulary
            .values()
            .find(|&&col| col >= vectorizer.vocabulary.len())
        {
            return Err(FatalConfigError::invalid(
                path,
                format!("column {} out of range", bad),
            ));
        }
        info!(
            path = %path.display(),
            terms = vectorizer.vocabulary.len(),
            "Loaded topic vocabulary"
        );
        Ok(vectorizer)
    }

    /// Vocabulary width (number of count columns)
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sparse term counts, ordered by column
    pub fn transform(&self, text: &str) -> BTreeMap<usize, f64> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&text).map(|m| m.as_str()).collect();

        let mut counts = BTreeMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&col) = self.vocabulary.get(&term) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }
        }
        counts
    }
}

#[derive(Debug, Deserialize)]
struct LdaArtifact {
    components: Vec<Vec<f64>>,
    doc_topic_prior: f64,
    #[serde(default = "default_max_doc_update_iter")]
    max_doc_update_iter: usize,
    #[serde(default = "default_mean_change_tol")]
    mean_change_tol: f64,
}

fn default_max_doc_update_iter() -> usize {
    100
}

fn default_mean_change_tol() -> f64 {
    1e-3
}

/// Pre-fitted LDA topic-word model
#[derive(Debug, Clone)]
pub struct LdaModel {
    /// exp(E[log beta]), topics × terms
    exp_topic_word: Array2<f64>,
    doc_topic_prior: f64,
    max_doc_update_iter: usize,
    mean_change_tol: f64,
}

/// Row-wise E[log theta] for a Dirichlet with parameters `alpha`
fn dirichlet_expectation(alpha: &Array1<f64>) -> Array1<f64> {
    let total = digamma(alpha.sum());
    alpha.mapv(|a| digamma(a) - total)
}

impl LdaModel {
    pub fn from_components(
        components: Array2<f64>,
        doc_topic_prior: f64,
        max_doc_update_iter: usize,
        mean_change_tol: f64,
    ) -> Result<Self, String> {
        if components.nrows() != TOPIC_DIM {
            return Err(format!(
                "expected {} topics, found {}",
                TOPIC_DIM,
                components.nrows()
            ));
        }
        if components.ncols() == 0 {
            return Err("topic model has no terms".to_string());
        }
        if components.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err("topic-word weights must be finite and positive".to_string());
        }
        if !(doc_topic_prior.is_finite() && doc_topic_prior > 0.0) {
            return Err(format!("invalid doc_topic_prior {}", doc_topic_prior));
        }

        let mut exp_topic_word = components;
        for mut row in exp_topic_word.axis_iter_mut(Axis(0)) {
            let expected = dirichlet_expectation(&row.to_owned());
            row.assign(&expected.mapv(f64::exp));
        }

        Ok(Self {
            exp_topic_word,
            doc_topic_prior,
            max_doc_update_iter,
            mean_change_tol,
        })
    }

    pub fn load(path: &Path) -> Result<Self, FatalConfigError> {
        let artifact: LdaArtifact = read_json(path)?;
        let n_topics = artifact.components.len();
        let n_terms = artifact.components.first().map(Vec::len).unwrap_or(0);
        if artifact.components.iter().any(|row| row.len() != n_terms) {
            return Err(FatalConfigError::invalid(path, "ragged components matrix"));
        }
        let flat: Vec<f64> = artifact.components.into_iter().flatten().collect();
        let components = Array2::from_shape_vec((n_topics, n_terms), flat)
            .map_err(|e| FatalConfigError::invalid(path, e.to_string()))?;

        let model = Self::from_components(
            components,
            artifact.doc_topic_prior,
            artifact.max_doc_update_iter,
            artifact.mean_change_tol,
        )
        .map_err(|msg| FatalConfigError::invalid(path, msg))?;

        info!(
            path = %path.display(),
            topics = n_topics,
            terms = n_terms,
            "Loaded topic model"
        );
        Ok(model)
    }

    /// Vocabulary width this model was fitted on
    pub fn width(&self) -> usize {
        self.exp_topic_word.ncols()
    }

    /// Normalized document-topic distribution for sparse counts
    pub fn project(&self, counts: &BTreeMap<usize, f64>) -> Result<Array1<f64>, ExtractionError> {
        let n_topics = self.exp_topic_word.nrows();
        if counts.is_empty() {
            return Ok(Array1::from_elem(n_topics, 1.0 / n_topics as f64));
        }

        let ids: Vec<usize> = counts.keys().copied().collect();
        if let Some(&bad) = ids.iter().find(|&&id| id >= self.width()) {
            return Err(ExtractionError::Projection(format!(
                "term column {} outside topic model width {}",
                bad,
                self.width()
            )));
        }
        let cnts = Array1::from_iter(counts.values().copied());
        let exp_topic_word_d = self.exp_topic_word.select(Axis(1), &ids);

        let mut doc_topic = Array1::<f64>::ones(n_topics);
        let mut exp_doc_topic = dirichlet_expectation(&doc_topic).mapv(f64::exp);

        for _ in 0..self.max_doc_update_iter {
            let last = doc_topic.clone();
            let norm_phi = exp_doc_topic.dot(&exp_topic_word_d) + EPS;
            let weighted = (&cnts / &norm_phi).dot(&exp_topic_word_d.t());
            doc_topic = &exp_doc_topic * &weighted + self.doc_topic_prior;
            exp_doc_topic = dirichlet_expectation(&doc_topic).mapv(f64::exp);

            let mean_change = (&doc_topic - &last).mapv(f64::abs).mean().unwrap_or(0.0);
            if mean_change < self.mean_change_tol {
                break;
            }
        }

        let total = doc_topic.sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ExtractionError::Projection(format!(
                "degenerate document-topic total {}",
                total
            )));
        }
        Ok(doc_topic / total)
    }
}

/// Topic distribution estimator (zero-vector mode when artifacts are absent)
#[derive(Debug, Clone, Default)]
pub struct TopicEstimator {
    vectorizer: Option<CountVectorizer>,
    model: Option<LdaModel>,
}

impl TopicEstimator {
    pub fn new(vectorizer: Option<CountVectorizer>, model: Option<LdaModel>) -> Self {
        if let (Some(v), Some(m)) = (&vectorizer, &model) {
            if v.width() != m.width() {
                warn!(
                    vocabulary = v.width(),
                    topic_model = m.width(),
                    "Topic vocabulary and model widths disagree; topic features will be zero"
                );
            }
        }
        Self { vectorizer, model }
    }

    /// Estimator without artifacts (always yields the zero vector)
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.vectorizer.is_some() && self.model.is_some()
    }

    pub fn try_estimate(&self, text: &str) -> Result<[f32; TOPIC_DIM], ExtractionError> {
        let vectorizer = self
            .vectorizer
            .as_ref()
            .ok_or(ExtractionError::ArtifactUnavailable("vocabulary"))?;
        let model = self
            .model
            .as_ref()
            .ok_or(ExtractionError::ArtifactUnavailable("topic model"))?;
        if vectorizer.width() != model.width() {
            return Err(ExtractionError::VocabularyMismatch {
                vocabulary: vectorizer.width(),
                topic_model: model.width(),
            });
        }

        let distribution = model.project(&vectorizer.transform(text))?;
        let mut out = [0.0f32; TOPIC_DIM];
        for (slot, p) in out.iter_mut().zip(distribution.iter()) {
            *slot = *p as f32;
        }
        Ok(out)
    }

    /// Topic distribution, or the zero vector on any failure
    pub fn estimate(&self, text: &str) -> [f32; TOPIC_DIM] {
        match self.try_estimate(text) {
            Ok(distribution) => distribution,
            Err(ExtractionError::ArtifactUnavailable(_)) => [0.0; TOPIC_DIM],
            Err(e) => {
                warn!(error = %e, "Topic estimation failed, using zero vector");
                [0.0; TOPIC_DIM]
            }
        }
    }
}
