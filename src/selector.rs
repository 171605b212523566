use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::error::AppError;
use crate::models::{
    ArchMatch, Candidate, ContentType, PlatformDescriptor, RequestParams, SelectionResult, Status,
    TagSummary,
};
use crate::version::compare_tags;

/// Tags carrying these markers are never considered usable.
const PRERELEASE_PATTERN: &str = "beta|rc|latest";

/// Why a tag was turned down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NameMismatch(String),
    PreRelease,
    MissingArchitecture(String),
    MissingOs(String),
    Inactive,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NameMismatch(pattern) => write!(f, "no tag matches '{}'", pattern),
            Rejection::PreRelease => write!(f, "tag matches {}", PRERELEASE_PATTERN),
            Rejection::MissingArchitecture(arch) => {
                write!(f, "missing image for {} architecture", arch)
            }
            Rejection::MissingOs(os) => write!(f, "missing image for {} OS", os),
            Rejection::Inactive => write!(f, "status: inactive"),
        }
    }
}

#[derive(Debug)]
enum ArchFilter {
    Exact(String),
    Pattern(Regex),
}

impl ArchFilter {
    fn matches(&self, architecture: &str) -> bool {
        match self {
            ArchFilter::Exact(wanted) => wanted == architecture,
            ArchFilter::Pattern(re) => re.is_match(architecture),
        }
    }

    fn label(&self) -> &str {
        match self {
            ArchFilter::Exact(wanted) => wanted.as_str(),
            ArchFilter::Pattern(re) => re.as_str(),
        }
    }
}

/// Filter chain deciding which tags are usable candidates.
///
/// Patterns are compiled once in [`Selector::new`] and reused for every tag.
/// The most recent rejection is remembered so that an empty result can be
/// explained to the user.
#[derive(Debug)]
pub struct Selector {
    name_filter: Regex,
    prerelease: Regex,
    architecture: ArchFilter,
    operating_system: String,
    last_rejection: Option<Rejection>,
}

impl Selector {
    pub fn new(params: &RequestParams) -> Result<Self, AppError> {
        let architecture = match params.arch_match {
            ArchMatch::Exact => ArchFilter::Exact(params.architecture.clone()),
            ArchMatch::Regex => ArchFilter::Pattern(Regex::new(&params.architecture)?),
        };

        Ok(Self {
            name_filter: Regex::new(&params.tag_pattern)?,
            prerelease: Regex::new(PRERELEASE_PATTERN)?,
            architecture,
            operating_system: params.operating_system.clone(),
            last_rejection: None,
        })
    }

    /// Reason the most recently rejected tag was turned down
    pub fn last_rejection(&self) -> Option<&Rejection> {
        self.last_rejection.as_ref()
    }

    /// Run every tag of one page through the filter chain, in page order.
    pub fn filter_page(&mut self, tags: &[TagSummary]) -> Result<Vec<Candidate>, AppError> {
        let mut candidates = Vec::new();
        for tag in tags {
            if let Some(candidate) = self.evaluate(tag)? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }

    /// Decide whether a single tag is a usable candidate.
    ///
    /// Fails only when the tag has a content type other than image or plugin.
    pub fn evaluate(&mut self, tag: &TagSummary) -> Result<Option<Candidate>, AppError> {
        match self.check(tag)? {
            Ok(()) => Ok(Some(Candidate::from(tag))),
            Err(rejection) => {
                debug!("Rejected tag {}: {}", tag.name, rejection);
                self.last_rejection = Some(rejection);
                Ok(None)
            }
        }
    }

    fn check(&self, tag: &TagSummary) -> Result<Result<(), Rejection>, AppError> {
        if !self.name_filter.is_match(&tag.name) {
            return Ok(Err(Rejection::NameMismatch(
                self.name_filter.as_str().to_string(),
            )));
        }
        if self.prerelease.is_match(&tag.name) {
            return Ok(Err(Rejection::PreRelease));
        }

        match &tag.content_type {
            ContentType::Plugin => Ok(Ok(())),
            ContentType::Image => Ok(self.check_platforms(&tag.images)),
            ContentType::Other(kind) => Err(AppError::UnsupportedContentType(kind.clone())),
        }
    }

    /// A single descriptor must match architecture, OS and be active at once.
    fn check_platforms(&self, images: &[PlatformDescriptor]) -> Result<(), Rejection> {
        let mut architecture_seen = false;
        let mut os_seen = false;

        for image in images {
            if !self.architecture.matches(&image.architecture) {
                continue;
            }
            architecture_seen = true;

            if image.os != self.operating_system {
                continue;
            }
            os_seen = true;

            if image.status == Status::Active {
                return Ok(());
            }
        }

        if !architecture_seen {
            Err(Rejection::MissingArchitecture(
                self.architecture.label().to_string(),
            ))
        } else if !os_seen {
            Err(Rejection::MissingOs(self.operating_system.clone()))
        } else {
            Err(Rejection::Inactive)
        }
    }
}

/// Sort candidates by version precedence, highest first.
///
/// The sort is stable: candidates of equal precedence keep registry order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| compare_tags(&b.name, &a.name));
}

/// Rank the candidates and return the highest one, if any.
pub fn pick_winner(repository: &str, mut candidates: Vec<Candidate>) -> Option<SelectionResult> {
    rank(&mut candidates);
    candidates.into_iter().next().map(|winner| SelectionResult {
        repository: repository.to_string(),
        tag: winner.name,
        last_updated: winner.last_updated,
    })
}
