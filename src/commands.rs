use crate::infra::{load_documents, load_parameters, parse_choice, parse_priority};
use chrono::{DateTime, Utc};
use clap::Args;
use credit_engine::assessment::{AssessmentResult, CreditCatalog, UnitSystem};
use credit_engine::config::AppConfig;
use credit_engine::consolidation::{ConsolidatedDataset, StructuralError};
use credit_engine::error::AppError;
use credit_engine::recommendations::Recommendation;
use credit_engine::{AssessmentPipeline, CreditReport, ResolutionPolicy};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Credit id, e.g. EAc6
    #[arg(long)]
    pub(crate) credit: String,
    /// Parameter values as a JSON object or a `Parameter,Value` CSV
    #[arg(long)]
    pub(crate) parameters: PathBuf,
    /// Unit system for thresholds (IP or SI). Defaults to ASSESSMENT_UNIT_SYSTEM.
    #[arg(long)]
    pub(crate) units: Option<UnitSystem>,
    /// Print JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PolicyArgs {
    /// Conflict strategy: priority, latest or manual. Defaults to CONSOLIDATION_STRATEGY.
    #[arg(long)]
    pub(crate) strategy: Option<String>,
    /// Document priority override as `label=score`; repeatable
    #[arg(long, value_parser = parse_priority)]
    pub(crate) priority: Vec<(String, i32)>,
    /// Manual choice as `parameter=document label`; repeatable
    #[arg(long, value_parser = parse_choice)]
    pub(crate) choose: Vec<(String, String)>,
}

impl PolicyArgs {
    fn resolve(self, config: &AppConfig) -> ResolutionPolicy {
        let mut spec = config.consolidation.policy_spec();
        if let Some(strategy) = self.strategy {
            spec.strategy = strategy;
        }
        spec.priorities.extend(self.priority);
        spec.manual_choices.extend(self.choose);
        ResolutionPolicy::from_spec(&spec, config.consolidation.default_priority)
    }
}

#[derive(Args, Debug)]
pub(crate) struct ConsolidateArgs {
    /// Credit id, e.g. EAc6
    #[arg(long)]
    pub(crate) credit: String,
    /// Document extractions as JSON or a `Document,Credit,Parameter,Value` CSV
    #[arg(long)]
    pub(crate) documents: PathBuf,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
    /// Print JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Credit id, e.g. EAc6
    #[arg(long)]
    pub(crate) credit: String,
    /// Document extractions as JSON or a `Document,Credit,Parameter,Value` CSV
    #[arg(long)]
    pub(crate) documents: PathBuf,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
    /// Unit system for thresholds (IP or SI). Defaults to ASSESSMENT_UNIT_SYSTEM.
    #[arg(long)]
    pub(crate) units: Option<UnitSystem>,
    /// Print JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Serialize)]
struct StampedReport<'a> {
    generated_at: DateTime<Utc>,
    skipped_entries: Vec<String>,
    #[serde(flatten)]
    report: &'a CreditReport,
}

pub(crate) fn run_credits(catalog: &CreditCatalog) -> Result<(), AppError> {
    println!("Credit catalog ({} credits)", catalog.len());
    for credit in catalog.credits() {
        println!(
            "- {} {} | up to {} point{} | {} group{} ({:?})",
            credit.id,
            credit.name,
            credit.max_points,
            plural(credit.max_points as usize),
            credit.groups.len(),
            plural(credit.groups.len()),
            credit.strategy
        );
        for (index, group) in credit.groups.iter().enumerate() {
            println!(
                "    {} {}: {}",
                credit.strategy.group_label(),
                index + 1,
                group.label
            );
        }
    }
    Ok(())
}

pub(crate) fn run_evaluate(
    catalog: &CreditCatalog,
    config: &AppConfig,
    args: EvaluateArgs,
) -> Result<(), AppError> {
    let EvaluateArgs {
        credit,
        parameters,
        units,
        json,
    } = args;

    let unit_system = units.unwrap_or(config.assessment.unit_system);
    let parameters = load_parameters(&parameters)?;
    let pipeline = AssessmentPipeline::new(catalog.clone());
    let result = pipeline.evaluate_parameters(&credit, &parameters, unit_system)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_assessment(&result, unit_system);
    }
    Ok(())
}

pub(crate) fn run_consolidate(
    catalog: &CreditCatalog,
    config: &AppConfig,
    args: ConsolidateArgs,
) -> Result<(), AppError> {
    let ConsolidateArgs {
        credit,
        documents,
        policy,
        json,
    } = args;

    let (documents, skipped) = load_documents(&documents)?;
    let policy = policy.resolve(config);
    let pipeline = AssessmentPipeline::new(catalog.clone());
    let dataset = pipeline.consolidate(&documents, &credit, &policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dataset)?);
    } else {
        render_skipped(&skipped);
        render_consolidation(&dataset);
    }
    Ok(())
}

pub(crate) fn run_assess(
    catalog: &CreditCatalog,
    config: &AppConfig,
    args: AssessArgs,
) -> Result<(), AppError> {
    let AssessArgs {
        credit,
        documents,
        policy,
        units,
        json,
    } = args;

    let unit_system = units.unwrap_or(config.assessment.unit_system);
    let (documents, skipped) = load_documents(&documents)?;
    let policy = policy.resolve(config);
    let pipeline = AssessmentPipeline::new(catalog.clone());
    let report = pipeline.run(&documents, &credit, &policy, unit_system)?;
    let generated_at = Utc::now();
    info!(
        credit = %credit,
        status = report.assessment.status.label(),
        skipped = skipped.len(),
        "assessment complete"
    );

    if json {
        let stamped = StampedReport {
            generated_at,
            skipped_entries: skipped.iter().map(ToString::to_string).collect(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&stamped)?);
        return Ok(());
    }

    println!(
        "Credit assessment report | generated {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    render_skipped(&skipped);
    render_consolidation(&report.consolidation);
    println!();
    render_assessment(&report.assessment, report.unit_system);
    render_recommendations(&report.recommendations);
    Ok(())
}

fn render_skipped(skipped: &[StructuralError]) {
    if skipped.is_empty() {
        return;
    }
    println!("Skipped document entries");
    for error in skipped {
        println!("- {error}");
    }
}

fn render_consolidation(dataset: &ConsolidatedDataset) {
    println!(
        "Consolidated {} parameter{} for {} from {} document{}",
        dataset.parameters.len(),
        plural(dataset.parameters.len()),
        dataset.credit_id,
        dataset.documents_processed.len(),
        plural(dataset.documents_processed.len())
    );
    for (parameter, value) in &dataset.parameters {
        println!(
            "- {parameter}: {value} ({})",
            dataset.source_of(parameter).unwrap_or("unknown source")
        );
    }

    if dataset.conflicts.is_empty() {
        println!("Conflicts: none");
        return;
    }
    println!("Conflicts");
    for conflict in &dataset.conflicts {
        let candidates: Vec<String> = conflict
            .candidates
            .iter()
            .map(|candidate| format!("{} = {}", candidate.document, candidate.value))
            .collect();
        let state = if conflict.resolved {
            "resolved"
        } else {
            "unresolved"
        };
        println!(
            "- {} [{state}]: {}",
            conflict.parameter,
            candidates.join(" | ")
        );
    }
    for entry in &dataset.resolution_log {
        println!(
            "  {} -> {} from {} ({})",
            entry.parameter, entry.value, entry.source, entry.method
        );
    }
}

fn render_assessment(result: &AssessmentResult, unit_system: UnitSystem) {
    println!("{} ({} units)", result.summary(), unit_system);
    if let Some(option) = result.option {
        println!("Option evaluated: {option}");
    }
    if let Some(error) = &result.error {
        println!("Evaluation error: {error}");
    }
    if !result.gaps.is_empty() {
        println!("Missing data");
        for gap in &result.gaps {
            println!("- {gap}");
        }
    }
    if !result.non_compliant.is_empty() {
        println!("Non-compliance");
        for finding in &result.non_compliant {
            println!("- {finding}");
        }
    }
    if !result.calculations.is_empty() {
        println!("Calculations");
        for (key, value) in &result.calculations {
            match value.as_f64() {
                Some(number) if value.is_f64() => println!("- {key}: {number:.2}"),
                _ => println!("- {key}: {value}"),
            }
        }
    }
}

fn render_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        return;
    }
    println!("\nRecommendations");
    for recommendation in recommendations {
        println!(
            "- [{:?}] {}\n  Next step: {}",
            recommendation.priority, recommendation.message, recommendation.action
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
