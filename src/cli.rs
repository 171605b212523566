use clap::Parser;

use crate::config::{host_architecture, DEFAULT_OS};
use crate::error::AppError;
use crate::models::{ArchMatch, RequestParams};
use crate::registry::{DEFAULT_PAGE_SIZE, DEFAULT_REGISTRY};

/// ldi — Latest Docker Image
///
/// Show the latest usable tag of a Docker Hub image for a platform.
#[derive(Parser, Debug)]
#[command(name = "ldi", version, about)]
pub struct Cli {
    /// Image name with an optional tag filter: IMAGE[:TAG]
    pub image: Option<String>,

    /// Architecture (defaults to the host architecture)
    #[arg(long, env = "LDI_ARCH")]
    pub arch: Option<String>,

    /// Operating system
    #[arg(long, env = "LDI_OS", default_value = DEFAULT_OS)]
    pub os: String,

    /// Regular expression the tag name must match (empty matches all)
    #[arg(long, env = "LDI_TAG", default_value = "")]
    pub tag: String,

    /// How --arch is compared against image architectures
    #[arg(long, value_enum, env = "LDI_ARCH_MATCH", default_value_t = ArchMatch::Exact)]
    pub arch_match: ArchMatch,

    /// Registry base URL
    #[arg(long, env = "LDI_REGISTRY", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Number of tags requested per page
    #[arg(long, env = "LDI_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Options the original tool spelled with a single dash.
const SINGLE_DASH_OPTIONS: [&str; 3] = ["arch", "os", "tag"];

/// Rewrite `-arch`, `-os` and `-tag` (with or without `=value`) to their
/// double-dash form so clap accepts them.
pub fn normalize_single_dash_options<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            let single_dash = arg
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
                .map(|rest| rest.split_once('=').map_or(rest, |(name, _)| name))
                .is_some_and(|name| SINGLE_DASH_OPTIONS.contains(&name));
            if single_dash {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

impl Cli {
    /// Build the resolver input. `IMAGE:TAG` splits at the first colon and
    /// the tag part replaces `--tag`.
    pub fn request_params(&self) -> Result<RequestParams, AppError> {
        let image = self
            .image
            .as_deref()
            .filter(|image| !image.is_empty())
            .ok_or(AppError::Usage)?;

        let (repository, tag_pattern) = match image.split_once(':') {
            Some((repository, tag)) => (repository, tag),
            None => (image, self.tag.as_str()),
        };
        if repository.is_empty() {
            return Err(AppError::Usage);
        }

        let architecture = match self.arch.as_deref() {
            Some(arch) if !arch.is_empty() => arch,
            _ => host_architecture(),
        };
        let operating_system = if self.os.is_empty() {
            DEFAULT_OS
        } else {
            self.os.as_str()
        };

        Ok(
            RequestParams::new(repository, architecture, operating_system, tag_pattern)
                .with_arch_match(self.arch_match),
        )
    }
}
