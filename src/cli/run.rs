// src/cli/run.rs — `run` / `once`: one control loop per subject

use std::sync::Arc;

use tokio::sync::watch;

use super::progress::TerminalProgress;
use crate::core::planner::Planner;
use crate::core::policy::PolicyStore;
use crate::core::{ControlLoop, LoopReport};
use crate::evaluator::Evaluator;
use crate::infra::config::{Config, SubjectConfig};
use crate::notify::{self, EventSink};
use crate::worker::Worker;
use crate::{classifier, source};

/// Subjects to monitor: CLI keywords win over configured subjects. A keyword
/// that matches a configured subject keeps that subject's settings.
pub fn resolve_subjects(config: &Config, keywords: &[String]) -> Vec<SubjectConfig> {
    if keywords.is_empty() {
        return config.subjects.clone();
    }
    keywords
        .iter()
        .map(|k| {
            config
                .subjects
                .iter()
                .find(|s| &s.keyword == k)
                .cloned()
                .unwrap_or_else(|| SubjectConfig::new(k.clone()))
        })
        .collect()
}

/// Build a loop per subject from config. Loops share the classifier and
/// sink; each owns its source and policy store, so one subject's fetches
/// never shift another's.
pub fn build_loops(
    config: &Config,
    subjects: Vec<SubjectConfig>,
    sink: Arc<dyn EventSink>,
    max_cycles: Option<u64>,
) -> anyhow::Result<Vec<ControlLoop>> {
    let classifier = classifier::from_config(&config.classifier)?;

    let mut loops = Vec::with_capacity(subjects.len());
    for subject in subjects {
        subject.validate()?;
        let source = source::from_config(&config.source)?;
        let store = PolicyStore::from_subject(&subject, config.policy.clone());
        let planner = Planner::new(subject, config.policy.clone());
        let worker = Worker::from_config(source, classifier.clone(), config);
        let evaluator = Evaluator::new(config.evaluator.clone());

        let mut cl = ControlLoop::new(planner, store, worker, evaluator).with_sink(sink.clone());
        if let Some(n) = max_cycles {
            cl = cl.with_max_cycles(n);
        }
        loops.push(cl);
    }
    Ok(loops)
}

/// Run every subject concurrently until Ctrl+C or `max_cycles`.
pub async fn run_monitor(
    config: &Config,
    keywords: &[String],
    max_cycles: Option<u64>,
    quiet: bool,
) -> anyhow::Result<Vec<LoopReport>> {
    config.validate()?;
    let subjects = resolve_subjects(config, keywords);
    if subjects.is_empty() {
        anyhow::bail!(
            "No subjects to monitor. Pass --keyword or add [[subjects]] to config.toml \
             (`pulsewatch config` prints a starter file)."
        );
    }

    let mut fanout = notify::from_config(&config.notify);
    if !quiet {
        fanout = fanout.with(Arc::new(TerminalProgress));
    }
    let sink: Arc<dyn EventSink> = Arc::new(fanout);

    let mut loops = build_loops(config, subjects, sink, max_cycles)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown_tx.send_replace(true);
        }
    });

    let results =
        futures::future::join_all(loops.iter_mut().map(|cl| cl.run(shutdown_rx.clone()))).await;

    let mut reports = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (cl, result) in loops.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(subject = cl.subject(), "Loop stopped on error: {}", e);
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e.into());
    }
    Ok(reports)
}

/// One line per report, for humans.
pub fn print_summary(reports: &[LoopReport]) {
    for r in reports {
        println!(
            "{}: {} cycle(s), {} alert(s), {} failed, sample_limit={}{:+}, rev {}",
            r.subject,
            r.cycles,
            r.alerts,
            r.failed_cycles,
            r.policy.sample_limit,
            r.policy.deltas.sample_size_delta.unwrap_or(0),
            r.policy.revision,
        );
    }
}
