//! CLI binary for uiwalk: recognize requirement modules and generate UI walk-through cases.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::MultiProgress;
use std::path::{Path, PathBuf};
use uiwalk_core::config::UiwalkConfig;
use uiwalk_core::storage::{self, HistoryEntry};
use uiwalk_core::{Category, Module, ModuleSet, Priority, ReviewType};
use uiwalk_export::{OutputNames, split_by_module, summarize, write_sheets};
use uiwalk_gen::{
    CaseGenerator, Coordinator, GenerationProgress, GenerationRequest, NoopObserver,
    SuspendedStderr, estimate_cost,
};
use uiwalk_parser::{DocumentFormat, DocumentStats};

#[derive(Parser)]
#[command(name = "uiwalk", about = "UI walk-through test case generator")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize page-level modules in a requirements document
    Recognize {
        /// Requirements document (.md, .markdown or .txt)
        file: PathBuf,

        /// Input format: markdown, plaintext, word (inferred from the extension if omitted)
        #[arg(short, long)]
        format: Option<String>,

        /// Only list modules whose name or description contains this keyword
        #[arg(long)]
        filter: Option<String>,

        /// Print modules as JSON
        #[arg(long)]
        json: bool,

        /// Use the heading scan only, even when a model is configured
        #[arg(long)]
        no_ai: bool,
    },

    /// Generate walk-through cases for a requirements document
    Generate {
        /// Requirements document (.md, .markdown or .txt)
        file: PathBuf,

        /// Input format: markdown, plaintext, word (inferred from the extension if omitted)
        #[arg(short, long)]
        format: Option<String>,

        /// Module to generate for, by name (repeatable; defaults to every recognized module)
        #[arg(short, long = "module")]
        modules: Vec<String>,

        /// Enhancement category (repeatable): global-page, scenario-flow,
        /// exception-scenario, upstream-downstream
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Review type: standard, competitive (defaults to generation.review_type)
        #[arg(long)]
        review_type: Option<String>,

        /// Output directory (defaults to the project root)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write one CSV per module
        #[arg(long)]
        split: bool,

        /// Skip the review-plan document
        #[arg(long)]
        no_plan: bool,

        /// Generate modules in parallel
        #[arg(long)]
        parallel: bool,

        /// Use template cases only, even when a model is configured
        #[arg(long)]
        no_ai: bool,

        /// Print a cost estimate and exit without generating
        #[arg(long)]
        estimate: bool,
    },

    /// Split a case CSV into one CSV per module and print the module summary
    Split {
        /// Case CSV produced by `generate`
        csv: PathBuf,

        /// Output directory (defaults to a directory named after the CSV)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show recent generation runs
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List the enhancement categories
    Categories,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    // Log lines are printed with the progress bars suspended.
    let multi = MultiProgress::new();
    let log_multi = multi.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(move || SuspendedStderr::new(log_multi.clone()))
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;

    match cli.command {
        Commands::Recognize {
            file,
            format,
            filter,
            json,
            no_ai,
        } => cmd_recognize(&project_root, &file, format.as_deref(), filter.as_deref(), json, no_ai),
        Commands::Generate {
            file,
            format,
            modules,
            categories,
            review_type,
            out,
            split,
            no_plan,
            parallel,
            no_ai,
            estimate,
        } => cmd_generate(
            &project_root,
            &multi,
            &GenerateArgs {
                file,
                format,
                modules,
                categories,
                review_type,
                out,
                split,
                no_plan,
                parallel,
                no_ai,
                estimate,
            },
        ),
        Commands::Split { csv, out } => cmd_split(&csv, out.as_deref()),
        Commands::History { limit } => cmd_history(&project_root, limit),
        Commands::Categories => {
            cmd_categories();
            Ok(())
        }
    }
}

/// Read a requirements document and decide its format.
fn read_document(path: &Path, format: Option<&str>) -> Result<(String, DocumentFormat)> {
    let is_docx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx") || e.eq_ignore_ascii_case("doc"));
    if is_docx {
        bail!(
            "{} is a binary Word document; convert it to text first (save as .txt or .md) \
             and pass --format word",
            path.display()
        );
    }

    let format = match format {
        Some(f) => f.parse::<DocumentFormat>()?,
        None => DocumentFormat::from_path(path)?,
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((text, format))
}

/// Build the generator for this run. Rules are only loaded when a model is in use.
fn build_generator(project_root: &Path, config: &UiwalkConfig, no_ai: bool) -> Result<CaseGenerator> {
    if no_ai {
        return Ok(CaseGenerator::template_only());
    }
    let generator = CaseGenerator::from_config(&config.llm, String::new())?;
    if generator.provider().is_none() {
        return Ok(generator);
    }
    let rules = storage::load_rules(project_root, &config.llm.rules_path)?;
    if !rules.trim().is_empty() {
        tracing::info!(path = %config.llm.rules_path.display(), "loaded review rules");
    }
    Ok(generator.with_rules(rules))
}

fn recognize_modules(
    generator: &CaseGenerator,
    config: &UiwalkConfig,
    text: &str,
    format: DocumentFormat,
) -> Vec<Module> {
    if config.recognition.use_ai {
        generator.analyze_requirement(text, format, config.recognition.max_modules)
    } else {
        CaseGenerator::template_only().analyze_requirement(
            text,
            format,
            config.recognition.max_modules,
        )
    }
}

fn cmd_recognize(
    project_root: &Path,
    file: &Path,
    format: Option<&str>,
    filter: Option<&str>,
    json: bool,
    no_ai: bool,
) -> Result<()> {
    let config = UiwalkConfig::load(project_root)?;
    let (text, format) = read_document(file, format)?;
    let generator = build_generator(project_root, &config, no_ai)?;
    let modules = ModuleSet::new(recognize_modules(&generator, &config, &text, format));
    let shown = modules.filter(filter.unwrap_or_default());

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let stats = DocumentStats::compute(&text, format);
    eprintln!(
        "Document: {} lines, {} words, {} headings, ~{} tables{}",
        stats.lines,
        stats.words,
        stats.headings,
        stats.tables,
        if stats.has_images { ", has images" } else { "" }
    );
    if modules.is_empty() {
        println!("No modules recognized.");
        return Ok(());
    }
    println!("Recognized {} module(s):", modules.len());
    for (i, m) in shown.iter().enumerate() {
        let page_type = if m.page_type.is_unknown() {
            "-".to_string()
        } else {
            m.page_type.to_string()
        };
        println!("{:>3}. [L{}] {:<8} {}", i + 1, m.level, page_type, m.name);
        if !m.description.is_empty() {
            println!("       {}", m.description);
        }
    }
    Ok(())
}

struct GenerateArgs {
    file: PathBuf,
    format: Option<String>,
    modules: Vec<String>,
    categories: Vec<String>,
    review_type: Option<String>,
    out: Option<PathBuf>,
    split: bool,
    no_plan: bool,
    parallel: bool,
    no_ai: bool,
    estimate: bool,
}

fn parse_categories(names: &[String]) -> Result<Vec<Category>> {
    names
        .iter()
        .map(|n| {
            n.parse::<Category>().with_context(|| {
                let known: Vec<_> = Category::ALL.iter().map(|c| c.slug()).collect();
                format!("expected one of: {}", known.join(", "))
            })
        })
        .collect()
}

/// Pick the modules to generate for: all of them, or exactly the named ones.
fn select_modules(modules: Vec<Module>, names: &[String]) -> Result<Vec<Module>> {
    let mut set = ModuleSet::new(modules);
    if names.is_empty() {
        set.select_all();
        return Ok(set.selected());
    }
    set.select_by_name(names);
    let selected = set.selected();
    let missing: Vec<_> = names
        .iter()
        .filter(|n| !selected.iter().any(|m| &m.name == *n))
        .collect();
    if !missing.is_empty() {
        let available: Vec<_> = set.iter().map(|m| m.name.as_str()).collect();
        bail!(
            "unknown module(s): {:?}. Recognized: {}",
            missing,
            available.join(", ")
        );
    }
    Ok(selected)
}

fn cmd_generate(project_root: &Path, multi: &MultiProgress, args: &GenerateArgs) -> Result<()> {
    let config = UiwalkConfig::load(project_root)?;
    let (text, format) = read_document(&args.file, args.format.as_deref())?;
    let categories = parse_categories(&args.categories)?;
    let review_type = match &args.review_type {
        Some(t) => t.parse::<ReviewType>()?,
        None => config.generation.review_type,
    };
    let generator = build_generator(project_root, &config, args.no_ai)?;

    let recognized = recognize_modules(&generator, &config, &text, format);
    let modules = select_modules(recognized, &args.modules)?;
    if modules.is_empty() && categories.is_empty() {
        bail!("no modules recognized in {}; nothing to generate", args.file.display());
    }

    if args.estimate {
        match generator.provider() {
            Some(provider) => {
                let estimate = estimate_cost(
                    provider,
                    &text,
                    generator.rules(),
                    &modules,
                    &categories,
                    generator.limits(),
                );
                println!("{estimate}");
            }
            None => println!(
                "No language model configured: {} module(s) will use template cases at no cost.",
                modules.len()
            ),
        }
        return Ok(());
    }

    eprintln!(
        "Generating cases for {} module(s){}...",
        modules.len(),
        if categories.is_empty() {
            String::new()
        } else {
            let labels: Vec<_> = Category::dedup(&categories).iter().map(|c| c.label()).collect();
            format!(" with {}", labels.join("、"))
        }
    );

    let request = GenerationRequest {
        content: &text,
        modules: &modules,
        categories: &categories,
        review_type,
        parallel: args.parallel || config.generation.parallel,
    };
    let coordinator = Coordinator::new(&generator);
    let report = if generator.provider().is_some() {
        let progress = GenerationProgress::with_multi(multi);
        coordinator.generate(&request, &progress)?
    } else {
        coordinator.generate(&request, &NoopObserver)?
    };

    let out_dir = args.out.clone().unwrap_or_else(|| project_root.to_path_buf());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let base = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let names = OutputNames::new(base, review_type, &chrono::Local::now());

    let cases_path = out_dir.join(&names.cases);
    std::fs::write(&cases_path, uiwalk_export::export_csv(&report.cases))
        .with_context(|| format!("failed to write {}", cases_path.display()))?;

    let module_names: Vec<String> = modules.iter().map(|m| m.name.clone()).collect();
    let plan_path = if args.no_plan {
        None
    } else {
        let path = out_dir.join(&names.plan);
        std::fs::write(&path, uiwalk_export::render_plan(&module_names, &report.cases, review_type))
            .with_context(|| format!("failed to write {}", path.display()))?;
        Some(path)
    };

    let sheets_dir = if args.split {
        let dir = out_dir.join(&names.sheets_dir);
        write_sheets(&dir, &split_by_module(&report.cases))
            .with_context(|| format!("failed to write sheets to {}", dir.display()))?;
        Some(dir)
    } else {
        None
    };

    let high = report.high_priority_count();
    // The outputs are already written; a broken history file must not fail the run.
    if let Err(e) = storage::record_history(
        project_root,
        HistoryEntry {
            timestamp: chrono::Utc::now(),
            source: base.to_string(),
            review_type,
            case_count: report.cases.len(),
            module_count: modules.len(),
            high_priority: high,
            fallback_modules: report.fallback_count(),
            output_file: Some(names.cases.clone()),
        },
        config.history.max_entries,
    ) {
        tracing::warn!(error = %e, "failed to record generation history");
    }

    eprintln!("\n{} generated:", review_type.output_label());
    eprintln!("  Cases: {}", report.cases.len());
    eprintln!("  Modules: {}", modules.len());
    eprintln!("  High priority: {high}");
    if report.fallback_count() > 0 && generator.provider().is_some() {
        eprintln!(
            "  Template fallback: {} module(s) (see warnings above)",
            report.fallback_count()
        );
    }
    if report.total_input_tokens > 0 {
        eprintln!(
            "  Tokens: {} input, {} output (${:.4})",
            report.total_input_tokens, report.total_output_tokens, report.total_cost_usd
        );
    }
    eprintln!("  Cases: {}", cases_path.display());
    if let Some(path) = plan_path {
        eprintln!("  Plan: {}", path.display());
    }
    if let Some(dir) = sheets_dir {
        eprintln!("  Sheets: {}", dir.display());
    }
    Ok(())
}

fn cmd_split(csv: &Path, out: Option<&Path>) -> Result<()> {
    let text = std::fs::read_to_string(csv)
        .with_context(|| format!("failed to read {}", csv.display()))?;
    let cases = uiwalk_export::import_csv(&text)
        .with_context(|| format!("failed to parse {}", csv.display()))?;

    let dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => csv.with_extension(""),
    };
    let paths = write_sheets(&dir, &split_by_module(&cases))
        .with_context(|| format!("failed to write sheets to {}", dir.display()))?;
    std::fs::write(
        dir.join("用例汇总.csv"),
        uiwalk_export::export_summary_csv(&summarize(&cases)),
    )
    .with_context(|| format!("failed to write summary to {}", dir.display()))?;

    print!("{}", uiwalk_export::format_summary_table(&summarize(&cases)));
    let high = cases.iter().filter(|c| c.priority == Priority::High).count();
    eprintln!(
        "\n{} case(s), {} high priority, {} sheet(s) written to {}",
        cases.len(),
        high,
        paths.len(),
        dir.display()
    );
    Ok(())
}

fn cmd_history(project_root: &Path, limit: usize) -> Result<()> {
    let history = storage::load_history(project_root)?;
    if history.is_empty() {
        println!("No generation history.");
        return Ok(());
    }
    for entry in history.iter().take(limit) {
        println!(
            "{}  {:<11}  {:>4} cases  {:>3} modules  {:>4} high  {}{}",
            entry
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            entry.review_type.to_string(),
            entry.case_count,
            entry.module_count,
            entry.high_priority,
            entry.source,
            entry
                .output_file
                .as_deref()
                .map(|f| format!(" -> {f}"))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

fn cmd_categories() {
    for c in Category::ALL {
        println!(
            "{:<20} {:<33} {}  {}",
            c.slug(),
            c.english_name(),
            c.label(),
            c.description()
        );
    }
}
