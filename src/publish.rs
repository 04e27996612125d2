//! Rendering resolved jobs, and publishing them to a directory

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use jobs_done_job::{Repository, ResolvedJob};
use miette::IntoDiagnostic;

use crate::opt::OutputFormat;

/// Serialize one value in the requested format
pub fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> miette::Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).into_diagnostic(),
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(value).into_diagnostic()?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// All jobs as one document, keyed by job name
pub fn render_jobs(
    jobs: &[ResolvedJob],
    repository: &Repository,
    format: OutputFormat,
) -> miette::Result<String> {
    let by_name: IndexMap<String, &ResolvedJob> = jobs
        .iter()
        .map(|job| (job.job_name(repository), job))
        .collect();
    render(&by_name, format)
}

/// What a directory publish changed. Each list is sorted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub new: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

/// The directory that holds the job files of one repository branch: `<output_dir>/<group>`
pub fn group_directory(output_dir: &Path, repository: &Repository) -> PathBuf {
    output_dir.join(ResolvedJob::job_group(repository))
}

/// Write one `<job name>.<ext>` file per job into the group directory of the repository
/// branch (see [`group_directory`]).
///
/// Files with the same extension in that directory that this run did not write are left
/// over from an earlier run of the same group, and are removed. Other groups live in
/// their own directories and are never touched.
pub fn publish_to_directory(
    jobs: &[ResolvedJob],
    repository: &Repository,
    output_dir: &Path,
    format: OutputFormat,
) -> miette::Result<PublishReport> {
    let group_dir = group_directory(output_dir, repository);
    fs_err::create_dir_all(&group_dir).into_diagnostic()?;

    let extension = format.extension();

    let mut existing = Vec::new();
    for entry in fs_err::read_dir(&group_dir).into_diagnostic()? {
        let path = entry.into_diagnostic()?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            existing.push(stem.to_string());
        }
    }

    let mut report = PublishReport::default();
    let mut written = Vec::with_capacity(jobs.len());
    for job in jobs {
        let name = job.job_name(repository);
        let path = group_dir.join(format!("{name}.{extension}"));
        fs_err::write(&path, render(job, format)?).into_diagnostic()?;
        tracing::debug!("wrote {}", path.display());

        if existing.contains(&name) {
            report.updated.push(name.clone());
        } else {
            report.new.push(name.clone());
        }
        written.push(name);
    }

    for stale in existing.into_iter().filter(|name| !written.contains(name)) {
        let path = group_dir.join(format!("{stale}.{extension}"));
        fs_err::remove_file(&path).into_diagnostic()?;
        report.deleted.push(stale);
    }

    report.new.sort();
    report.updated.sort();
    report.deleted.sort();
    Ok(report)
}
