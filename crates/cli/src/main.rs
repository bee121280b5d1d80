use clap::{Parser, Subcommand};
use hith_core::render::{
    render_dashboard, render_graph, render_importance, render_rationale, render_similar,
    render_snippets,
};
use hith_core::{config_from_env_values, demo, Dataset, DashboardService, HighlightMode};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hith")]
#[command(about = "Hospital-in-the-Home eligibility explainability CLI")]
struct Cli {
    /// Fixture file to load (overrides HITH_FIXTURE_PATH)
    #[arg(long, global = true)]
    fixture: Option<String>,
    /// Use the built-in demo patients instead of a fixture
    #[arg(long, global = true, conflicts_with = "fixture")]
    demo: bool,
    /// Print JSON instead of markdown
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show the full dashboard for a patient
    Show {
        /// Patient id or name
        patient: String,
        /// Highlight mode: impact or concept
        #[arg(long, default_value = "impact")]
        mode: HighlightMode,
    },
    /// Show what the prediction is based on
    Rationale {
        /// Patient id or name
        patient: String,
    },
    /// Show highlighted EMR snippets
    Snippets {
        /// Patient id or name
        patient: String,
        /// Highlight mode: impact or concept
        #[arg(long, default_value = "impact")]
        mode: HighlightMode,
    },
    /// Show ranked feature importances
    Importance {
        /// Patient id or name
        patient: String,
        /// Number of features to show, at least 1 (defaults to HITH_TOP_FEATURES)
        #[arg(long)]
        top: Option<NonZeroUsize>,
    },
    /// Show similar past patients
    Similar {
        /// Patient id or name
        patient: String,
    },
    /// Show the concept graph layout
    Graph {
        /// Patient id or name
        patient: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("hith=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'hith --help' for commands");
        return Ok(());
    };

    let cfg = config_from_env_values(
        cli.fixture.or_else(|| std::env::var("HITH_FIXTURE_PATH").ok()),
        std::env::var("HITH_SNIPPET_LIMIT").ok(),
        std::env::var("HITH_TOP_FEATURES").ok(),
        std::env::var("HITH_LAYOUT_SEED").ok(),
        std::env::var("HITH_KEY_TERMS").ok(),
    )?;
    let dataset = if cli.demo {
        demo::demo_dataset(cfg.layout_seed())?
    } else {
        Dataset::load(&cfg)?
    };
    let service = DashboardService::new(Arc::new(cfg), Arc::new(dataset));

    let output = match run(&service, command, cli.json) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    print!("{output}");

    Ok(())
}

fn run(
    service: &DashboardService,
    command: Commands,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Commands::List => {
            let picker = service.picker();
            if json {
                serde_json::to_string_pretty(&picker)?
            } else if picker.is_empty() {
                "No patients found.".to_string()
            } else {
                picker
                    .iter()
                    .map(|p| format!("ID: {}, Name: {}, Prediction: {}", p.id, p.name, p.eligibility))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Commands::Show { patient, mode } => {
            let view = service.dashboard(&patient, mode)?;
            if json {
                serde_json::to_string_pretty(&view)?
            } else {
                render_dashboard(&view)
            }
        }
        Commands::Rationale { patient } => {
            let lines = service.rationale(&patient)?;
            if json {
                serde_json::to_string_pretty(&lines)?
            } else {
                render_rationale(&lines)
            }
        }
        Commands::Snippets { patient, mode } => {
            let snippets = service.snippets(&patient, mode)?;
            if json {
                serde_json::to_string_pretty(&snippets)?
            } else {
                render_snippets(&snippets)
            }
        }
        Commands::Importance { patient, top } => {
            let features = service.importance(&patient, top.map(NonZeroUsize::get))?;
            if json {
                serde_json::to_string_pretty(&features)?
            } else {
                render_importance(&features)
            }
        }
        Commands::Similar { patient } => {
            let panel = service.similar(&patient)?;
            if json {
                serde_json::to_string_pretty(&panel)?
            } else {
                render_similar(&panel)
            }
        }
        Commands::Graph { patient } => match service.graph(&patient)? {
            Some(layout) if json => serde_json::to_string_pretty(&layout)?,
            Some(layout) => render_graph(&layout),
            None => "No concept graph for this patient.".to_string(),
        },
    };

    Ok(if output.ends_with('\n') {
        output
    } else {
        format!("{output}\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hith_core::CoreConfig;

    fn demo_service() -> DashboardService {
        let cfg = CoreConfig::default();
        let dataset = demo::demo_dataset(cfg.layout_seed()).expect("demo");
        DashboardService::new(Arc::new(cfg), Arc::new(dataset))
    }

    #[test]
    fn parses_show_with_mode() {
        let cli = Cli::try_parse_from(["hith", "--demo", "show", "P001", "--mode", "concept"])
            .expect("parse");
        assert!(cli.demo);
        assert!(matches!(
            cli.command,
            Some(Commands::Show { mode: HighlightMode::Concept, .. })
        ));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["hith", "snippets", "P001", "--mode", "loud"]).is_err());
    }

    #[test]
    fn rejects_zero_top() {
        assert!(Cli::try_parse_from(["hith", "importance", "P001", "--top", "0"]).is_err());
        assert!(Cli::try_parse_from(["hith", "importance", "P001", "--top", "3"]).is_ok());
    }

    #[test]
    fn rationale_lists_condition_first() {
        let out = run(
            &demo_service(),
            Commands::Rationale {
                patient: "P001".into(),
            },
            false,
        )
        .expect("rationale");
        assert!(out.starts_with("#### Prediction based on:\n- **Condition**: Community acquired pneumonia"));
    }

    #[test]
    fn demo_and_fixture_conflict() {
        assert!(Cli::try_parse_from(["hith", "--demo", "--fixture", "x.json", "list"]).is_err());
    }

    #[test]
    fn lists_demo_patients() {
        let out = run(&demo_service(), Commands::List, false).expect("list");
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("ID: P002, Name: Mary Jones, Prediction: Not Eligible"));
    }

    #[test]
    fn importance_respects_top() {
        let out = run(
            &demo_service(),
            Commands::Importance {
                patient: "P001".into(),
                top: NonZeroUsize::new(2),
            },
            true,
        )
        .expect("importance");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn unknown_patient_is_an_error() {
        let err = run(
            &demo_service(),
            Commands::Similar {
                patient: "nobody".into(),
            },
            false,
        );
        assert!(err.is_err());
    }
}
