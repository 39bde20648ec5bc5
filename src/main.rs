use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use veritas::pipeline::mocks::{
    HeuristicAssessor, HeuristicValidator, MockAssessor, MockComposer, MockValidator,
    TemplateComposer,
};
use veritas::{
    DocumentRef, DocumentValidator, FanoutRegistry, Identity, InMemoryReportStore,
    MessageComposer, Notifier, PipelineOrchestrator, PipelineOutcome, ReportKind, ReportService,
    ReportStateMachine, RiskAssessor, Role, TracingAuditSink,
};

#[derive(Parser)]
#[command(name = "veritas")]
#[command(about = "Supervised financial-report assessment pipeline")]
#[command(long_about = "Veritas routes financial-report submissions through a three-stage \
                       assessment pipeline (validation, risk analysis, notification), gates the \
                       approval workflow by role, and fans status updates out to live channels. \
                       Run 'veritas demo' to watch a full submission-to-approval workflow.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full submit -> assess -> review workflow against stub capabilities
    Demo {
        /// Entity reference to submit for
        #[arg(long, default_value = "MBANK001")]
        entity: String,
        /// Report kind: liquidity, aml, capital, governance
        #[arg(long, default_value = "liquidity")]
        kind: String,
        /// Simulate capability outages to show the fallback policy
        #[arg(long, help = "Fail the validate/assess/compose capabilities")]
        degraded: bool,
    },
    /// Print the resolved configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default behavior: run the demo workflow with its defaults
        None => run_demo("MBANK001".to_string(), "liquidity".to_string(), false),
        Some(Commands::Demo {
            entity,
            kind,
            degraded,
        }) => run_demo(entity, kind, degraded),
        Some(Commands::Config) => config_command(),
    }
}

fn run_demo(entity: String, kind: String, degraded: bool) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(async { demo_command(entity, kind, degraded).await })
}

async fn demo_command(entity: String, kind: String, degraded: bool) -> Result<()> {
    veritas::telemetry::init_telemetry_pretty()?;
    let config = veritas::config()?;

    let kind = ReportKind::parse(&kind)
        .ok_or_else(|| anyhow::anyhow!("unknown report kind: {kind} (expected liquidity, aml, capital or governance)"))?;

    // Wire the core against stub capabilities. With --degraded every
    // capability fails, which shows the fallback policy keeping the
    // workflow alive.
    let validator: Arc<dyn DocumentValidator> = if degraded {
        Arc::new(MockValidator::failing("validator offline"))
    } else {
        Arc::new(HeuristicValidator)
    };
    let assessor: Arc<dyn RiskAssessor> = if degraded {
        Arc::new(MockAssessor::failing("assessor offline"))
    } else {
        Arc::new(HeuristicAssessor)
    };
    let composer: Arc<dyn MessageComposer> = if degraded {
        Arc::new(MockComposer::failing("notifier offline"))
    } else {
        Arc::new(TemplateComposer)
    };

    let store = Arc::new(InMemoryReportStore::new());
    let state_machine = Arc::new(ReportStateMachine::new(store.clone()));
    let registry = Arc::new(FanoutRegistry::new());
    let audit = Arc::new(TracingAuditSink::new());
    let notifier = Arc::new(Notifier::new(
        composer,
        registry.clone(),
        audit.clone(),
        config.compose_timeout(),
    ));
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        validator,
        assessor,
        state_machine.clone(),
        notifier.clone(),
        audit,
        config.pipeline_policy(),
    ));
    let service = ReportService::new(
        store,
        state_machine,
        orchestrator,
        notifier,
        config.review_policy(),
    );

    let officer = Identity::new("officer-001", "Entity Officer", Role::Submitter)
        .with_scope(vec![entity.clone()]);
    let supervisor_id = config
        .notifications
        .supervisor_recipients
        .first()
        .cloned()
        .unwrap_or_else(|| "supervisor-001".to_string());
    let supervisor = Identity::new(supervisor_id.as_str(), "Duty Supervisor", Role::Supervisor);

    // Live channels, as a connected client would hold them.
    let (officer_channel, mut officer_inbox) = registry.register(&officer.user_id).await;
    let (_sup_channel, mut supervisor_inbox) = registry.register(&supervisor_id).await;

    let report = service
        .submit_report(
            &officer,
            &entity,
            kind,
            DocumentRef::new("q3-report.xlsx", 48_128),
        )
        .await?;
    println!("submitted report {} for {} [{}]", report.id, entity, report.status);

    let outcome = service.process_report(report.id).await?;
    let processed = outcome.report();
    println!("pipeline finished in status {}", processed.status);
    if let Some(validation) = &processed.validation {
        println!(
            "  validation: valid={} confidence={:.2} errors={}",
            validation.is_valid,
            validation.confidence,
            validation.errors.len()
        );
    }
    if let Some(risk) = &processed.risk {
        println!(
            "  risk: score={:.1} category={} urgency={}",
            risk.score, risk.category, risk.urgency
        );
    }

    while let Ok(message) = supervisor_inbox.try_recv() {
        println!("supervisor notification: {} - {}", message.title, message.body);
    }

    if matches!(outcome, PipelineOutcome::Completed(_)) {
        let approved = service
            .approve_report(&supervisor, report.id, Some("reviewed, all in order".to_string()))
            .await?;
        println!("supervisor approved report [{}]", approved.status);
    }

    while let Ok(message) = officer_inbox.try_recv() {
        println!("submitter notification: {} - {}", message.title, message.body);
    }

    registry.unregister(&officer.user_id, officer_channel).await;
    Ok(())
}

fn config_command() -> Result<()> {
    let config = veritas::config()?;
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
