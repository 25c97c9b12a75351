use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bundler_core::normalize_user_url;
use bundler_engine::{
    bundle_dir_name, ensure_dir, write_report, AtomicFileWriter, BundleOutput, Credentials,
    EngineEvent, EngineHandle, JobId, JobReport, RunReport, BUNDLE_FILENAME,
};
use chrono::Utc;
use engine_logging::{engine_error, engine_info, engine_warn, LogDestination};

use crate::cli::Args;
use crate::config::AppConfig;

/// What the process exit code is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub failed_jobs: usize,
    pub total_errors: usize,
}

pub fn run(args: &Args) -> anyhow::Result<RunSummary> {
    let (mut config, config_problem) = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(problem) => (AppConfig::default(), Some(problem)),
    };
    config.apply_args(args);

    let destination = match &config.log_file {
        Some(path) => LogDestination::TerminalAndFile(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, engine_logging::level_for_verbosity(args.verbose));
    if let Some(problem) = config_problem {
        engine_warn!("{}; using defaults", problem);
    }

    ensure_dir(&config.cache_dir)
        .with_context(|| format!("cache directory {}", config.cache_dir.display()))?;
    ensure_dir(&config.output_dir)
        .with_context(|| format!("output directory {}", config.output_dir.display()))?;

    let credentials = match (&args.username, &args.password) {
        (Some(user), Some(pass)) => Some(Credentials::new(user.as_str(), pass.as_str())),
        _ => None,
    };

    let urls: Vec<String> = args.urls.iter().map(|u| normalize_user_url(u)).collect();
    let engine = EngineHandle::new(config.engine_config()).context("starting engine")?;
    let mut pending: HashMap<JobId, String> = HashMap::new();
    for (index, url) in urls.iter().enumerate() {
        let job_id = index as JobId + 1;
        engine_info!("EnqueueUrl job_id={} url={}", job_id, url);
        engine.enqueue(job_id, url.clone(), credentials.clone())?;
        pending.insert(job_id, url.clone());
    }

    let writer = AtomicFileWriter::new(config.output_dir.clone());
    let multiple = urls.len() > 1;
    let mut report = RunReport::new(Utc::now().to_rfc3339());

    while !pending.is_empty() {
        match engine.recv()? {
            EngineEvent::Started { job_id, url } => {
                engine_info!("Job {} started: {}", job_id, url);
            }
            EngineEvent::JobCompleted { job_id, result } => {
                let Some(url) = pending.remove(&job_id) else {
                    engine_warn!("Completion for unknown job {}", job_id);
                    continue;
                };
                let job = match result {
                    Ok(output) => deliver(&writer, &config.output_dir, output, multiple),
                    Err(err) => {
                        engine_error!("Job {} failed: {}", job_id, err);
                        JobReport {
                            url,
                            output_path: None,
                            bytes: 0,
                            errors: Vec::new(),
                            failure: Some(err.to_string()),
                        }
                    }
                };
                print_job(&job);
                report.jobs.push(job);
            }
        }
    }

    let report_path = write_report(&config.output_dir, &report).context("writing report")?;
    engine_info!("Report written to {:?}", report_path);

    Ok(summarize(&report))
}

fn summarize(report: &RunReport) -> RunSummary {
    RunSummary {
        failed_jobs: report.failed_jobs(),
        total_errors: report.total_errors(),
    }
}

/// Where a bundle lands below the output directory.
pub fn bundle_path(url: &str, multiple: bool) -> PathBuf {
    if multiple {
        Path::new(&bundle_dir_name(url)).join(BUNDLE_FILENAME)
    } else {
        PathBuf::from(BUNDLE_FILENAME)
    }
}

fn deliver(
    writer: &AtomicFileWriter,
    output_dir: &Path,
    output: BundleOutput,
    multiple: bool,
) -> JobReport {
    let relative = bundle_path(&output.source_url, multiple);
    let bytes = output.html.len() as u64;
    match writer.write(&relative, &output.html) {
        Ok(path) => JobReport {
            url: output.source_url,
            output_path: Some(path),
            bytes,
            errors: output.errors,
            failure: None,
        },
        Err(err) => {
            engine_error!(
                "Failed to write {:?}: {}",
                output_dir.join(&relative),
                err
            );
            JobReport {
                url: output.source_url,
                output_path: None,
                bytes: 0,
                errors: output.errors,
                failure: Some(err.to_string()),
            }
        }
    }
}

fn print_job(job: &JobReport) {
    match (&job.output_path, &job.failure) {
        (Some(path), _) => println!("{} -> {} ({} bytes)", job.url, path.display(), job.bytes),
        (None, Some(failure)) => eprintln!("{}: {}", job.url, failure),
        (None, None) => {}
    }
    if !job.errors.is_empty() {
        eprintln!("{} resource(s) could not be bundled for {}:", job.errors.len(), job.url);
        for error in &job.errors {
            eprintln!("  {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bundler_engine::{JobReport, RunReport};

    use super::{bundle_path, summarize, RunSummary};

    #[test]
    fn single_url_writes_index_at_root() {
        assert_eq!(
            bundle_path("https://example.com/page", false),
            PathBuf::from("index.html")
        );
    }

    #[test]
    fn several_urls_get_their_own_directory() {
        let path = bundle_path("https://example.com/page", true);
        let dir = path.parent().unwrap().to_string_lossy().into_owned();
        assert!(dir.starts_with("example.com--"));
        assert!(path.ends_with("index.html"));
        assert_ne!(path, bundle_path("https://example.com/other", true));
    }

    #[test]
    fn summary_counts_failed_pages_and_resource_errors() {
        let mut report = RunReport::new("now");
        report.jobs.push(JobReport {
            url: "https://a.example/".to_string(),
            output_path: Some(PathBuf::from("out/index.html")),
            bytes: 10,
            errors: vec!["Failed to fetch x".to_string(), "Failed to fetch y".to_string()],
            failure: None,
        });
        report.jobs.push(JobReport {
            url: "https://b.example/".to_string(),
            output_path: None,
            bytes: 0,
            errors: Vec::new(),
            failure: Some("job aborted: panic".to_string()),
        });

        assert_eq!(
            summarize(&report),
            RunSummary {
                failed_jobs: 1,
                total_errors: 2,
            }
        );
    }
}
