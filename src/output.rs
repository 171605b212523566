use std::io::{self, Write};

use colored::Colorize;

use crate::models::{RequestParams, SelectionResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

const USAGE: &str = r"
Repository name not specified
Usage:  ldi  [OPTIONS] IMAGE[:TAG]
Show information about the latest version of a Docker IMAGE in the Docker Hub.

Options:
  --arch string        Architecture, default: host architecture (env LDI_ARCH or arch)
  --os string          Operating System, default: linux (env LDI_OS or os)
  --tag string         Tag filter (env LDI_TAG or tag)
  --arch-match MODE    exact (default) or regex
  Single-dash -arch, -os and -tag are accepted too.

TAG filter options:
  empty for latest tag
  regular expression for tag filter

example:
 ldi grafana/grafana-oss
 ldi grafana/grafana-oss:'(\d+)\.(\d+)\.(\d+)'
 ldi portainer/portainer-ee:'(\d+)\.(\d+)\.(\d+)-alpine$'
";

/// Print the banner and usage text to stderr
pub fn print_usage() {
    eprintln!(
        "\n_   __   _\n|   | \\  |\n|__ |_/  |  v{}\n{}",
        env!("CARGO_PKG_VERSION"),
        "Latest Docker Image".bold()
    );
    eprintln!("{}", USAGE);
}

/// Summary prefix shared by success and failure reports
pub fn request_summary(params: &RequestParams) -> String {
    format!(
        "Repo.: {}, Arch.: {}, OS: {}, Filter: {}",
        params.repository.bold(),
        params.architecture,
        params.operating_system,
        params.tag_pattern
    )
}

/// Registry timestamp for display; unparsable values are shown verbatim.
pub fn format_last_updated(result: &SelectionResult) -> String {
    match result.last_updated_at() {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => result.last_updated.clone().unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Print the summary line to stderr and `repository:tag` to stdout
pub fn print_result(params: &RequestParams, result: &SelectionResult) -> io::Result<()> {
    eprintln!(
        "\n{}, Tag: {},  Update: {}",
        request_summary(params),
        result.tag.green().bold(),
        format_last_updated(result).dimmed()
    );

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", result.reference())?;
    stdout.flush()
}

/// Print a failure diagnostic with its context chain to stderr
pub fn print_failure(err: &anyhow::Error) {
    eprintln!("\n{} {:#}", "Error:".red().bold(), err);
}
