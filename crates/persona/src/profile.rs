//! Loading the background material the persona answers from.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;
use thiserror::Error;

/// Directory the profile files are read from when nothing else is set.
pub const DEFAULT_PROFILE_DIR: &str = "me";

/// The three texts that describe the persona.
///
/// Every field may be empty: a missing source is not an error, the persona
/// simply knows less about itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    /// A short summary, written by the person.
    pub summary: String,
    /// The text of an exported LinkedIn profile.
    pub profile_text: String,
    /// The text of a resume.
    pub resume_text: String,
}

/// Error reading a profile source.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The file couldn't be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file isn't a PDF document we understand.
    #[error("failed to parse PDF {path}: {source}")]
    Pdf {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: lopdf::Error,
    },
}

/// One place a profile text can come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileSource {
    /// A value supplied directly, usually from an environment variable.
    Value(Option<String>),
    /// A PDF document whose page texts are concatenated.
    Pdf(PathBuf),
    /// A UTF-8 text file.
    Text(PathBuf),
}

impl ProfileSource {
    /// Reads the value of an environment variable, unset or not unicode
    /// reading as absent.
    pub fn env(key: &str) -> Self {
        Self::Value(env::var(key).ok())
    }

    /// Reads the source. `Ok(None)` means there is nothing here and the
    /// next source should be tried.
    pub fn read(&self) -> Result<Option<String>, ProfileError> {
        let text = match self {
            Self::Value(value) => value.clone(),
            Self::Pdf(path) => {
                if !path.is_file() {
                    return Ok(None);
                }
                Some(extract_pdf_text(path)?)
            }
            Self::Text(path) => {
                if !path.is_file() {
                    return Ok(None);
                }
                let text = fs::read_to_string(path).map_err(|source| {
                    ProfileError::Io {
                        path: path.clone(),
                        source,
                    }
                })?;
                Some(text)
            }
        };
        Ok(text.filter(|text| !text.is_empty()))
    }
}

/// Resolves a [`Profile`] from ordered chains of sources.
///
/// For each field the first source yielding a non-empty text wins. Sources
/// that fail are logged and skipped, so loading never fails.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileStore {
    summary: Vec<ProfileSource>,
    profile_text: Vec<ProfileSource>,
    resume_text: Vec<ProfileSource>,
}

impl ProfileStore {
    /// Creates a store with no sources at all. Loading it yields an empty
    /// profile.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual chains: `SUMMARY_TEXT` then `<dir>/summary.txt`,
    /// `PROFILE_TEXT` then `<dir>/linkedin.pdf`, and `RESUME_TEXT` then
    /// `<dir>/resume.pdf`.
    pub fn from_env(dir: impl AsRef<Path>) -> Self {
        Self::default_chains(
            dir.as_ref(),
            ProfileSource::env("SUMMARY_TEXT"),
            ProfileSource::env("PROFILE_TEXT"),
            ProfileSource::env("RESUME_TEXT"),
        )
    }

    /// The usual chains, with the direct values given by the caller.
    pub fn with_defaults(
        dir: impl AsRef<Path>,
        summary: Option<String>,
        profile_text: Option<String>,
        resume_text: Option<String>,
    ) -> Self {
        Self::default_chains(
            dir.as_ref(),
            ProfileSource::Value(summary),
            ProfileSource::Value(profile_text),
            ProfileSource::Value(resume_text),
        )
    }

    fn default_chains(
        dir: &Path,
        summary: ProfileSource,
        profile_text: ProfileSource,
        resume_text: ProfileSource,
    ) -> Self {
        Self::new()
            .with_summary_source(summary)
            .with_summary_source(ProfileSource::Text(dir.join("summary.txt")))
            .with_profile_source(profile_text)
            .with_profile_source(ProfileSource::Pdf(dir.join("linkedin.pdf")))
            .with_resume_source(resume_text)
            .with_resume_source(ProfileSource::Pdf(dir.join("resume.pdf")))
    }

    /// Appends a source for the summary.
    pub fn with_summary_source(mut self, source: ProfileSource) -> Self {
        self.summary.push(source);
        self
    }

    /// Appends a source for the LinkedIn profile text.
    pub fn with_profile_source(mut self, source: ProfileSource) -> Self {
        self.profile_text.push(source);
        self
    }

    /// Appends a source for the resume text.
    pub fn with_resume_source(mut self, source: ProfileSource) -> Self {
        self.resume_text.push(source);
        self
    }

    /// Resolves every field.
    pub fn load(&self) -> Profile {
        Profile {
            summary: resolve("summary", &self.summary),
            profile_text: resolve("profile", &self.profile_text),
            resume_text: resolve("resume", &self.resume_text),
        }
    }
}

fn resolve(field: &str, sources: &[ProfileSource]) -> String {
    for source in sources {
        match source.read() {
            Ok(Some(text)) => {
                debug!("{field} loaded from {source:?}");
                return text;
            }
            Ok(None) => {}
            Err(err) => warn!("skipping {field} source: {err}"),
        }
    }
    info!("no {field} found, using an empty one");
    String::new()
}

fn extract_pdf_text(path: &Path) -> Result<String, ProfileError> {
    let document = Document::load(path).map_err(|source| ProfileError::Pdf {
        path: path.to_owned(),
        source,
    })?;
    let mut text = String::new();
    for page in document.get_pages().into_keys() {
        // Pages without extractable text contribute nothing.
        match document.extract_text(&[page]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(err) => {
                debug!("no text on page {page} of {}: {err}", path.display())
            }
        }
    }
    Ok(text)
}
