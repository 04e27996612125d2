//! The `jobs-done` command line: reads a `.jobs_done.yaml` file, resolves it for a repository
//! branch and prints or publishes the resulting jobs.

pub mod console_utils;
pub mod opt;
pub mod publish;
pub mod source_code;

use jobs_done_job::{JobsDoneError, Repository, ResolvedJob};
use jobs_done_yaml::{WithSource, load_document};

use crate::{
    opt::{ListOpts, RepositoryOpts, ResolveOpts},
    source_code::Source,
};

/// Read and resolve the jobs file named by the options
pub fn load_jobs(opts: &RepositoryOpts) -> miette::Result<(Repository, Vec<ResolvedJob>)> {
    let source = Source::from_path(&opts.file).map_err(|err| {
        miette::miette!("could not read the jobs file {}: {err}", opts.file.display())
    })?;
    let repository = opts.repository();
    tracing::debug!("resolving {} for {:?}", source.name(), repository);

    let jobs = load_document(source.as_ref())
        .map_err(JobsDoneError::from)
        .and_then(|document| {
            jobs_done_job::resolve(&document, &repository).map_err(JobsDoneError::from)
        })
        .map_err(|err| WithSource::new(source.clone(), err))?;

    Ok((repository, jobs))
}

/// `jobs-done resolve`
pub fn resolve_from_args(args: ResolveOpts) -> miette::Result<()> {
    let (repository, jobs) = load_jobs(&args.repository)?;

    let Some(output_dir) = &args.output_dir else {
        print!("{}", publish::render_jobs(&jobs, &repository, args.format)?);
        return Ok(());
    };

    let report = publish::publish_to_directory(&jobs, &repository, output_dir, args.format)?;
    for (label, names) in [
        ("new", &report.new),
        ("updated", &report.updated),
        ("deleted", &report.deleted),
    ] {
        for name in names {
            tracing::info!("{} {name}", console::style(format!("{label:>7}")).bold());
        }
    }
    tracing::info!(
        "{} job(s) written to {}",
        jobs.len(),
        publish::group_directory(output_dir, &repository).display()
    );
    Ok(())
}

/// `jobs-done list`
pub fn list_from_args(args: ListOpts) -> miette::Result<()> {
    let (repository, jobs) = load_jobs(&args.repository)?;
    println!("{}", jobs_table(&jobs, &repository));
    tracing::info!("{} job(s)", jobs.len());
    Ok(())
}

/// A table with one line per job: its name and its matrix row
pub fn jobs_table(jobs: &[ResolvedJob], repository: &Repository) -> comfy_table::Table {
    let axes: Vec<&String> = jobs
        .first()
        .map(|job| job.matrix().keys().collect())
        .unwrap_or_default();

    let mut header = vec!["Job".to_string()];
    header.extend(axes.iter().map(|axis| axis.to_string()));

    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_header(header);
    for job in jobs {
        let mut row = vec![job.job_name(repository)];
        row.extend(
            axes.iter()
                .map(|axis| job.matrix_row().get(*axis).cloned().unwrap_or_default()),
        );
        table.add_row(row);
    }
    table
}
