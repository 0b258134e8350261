//! vidsub - Video Subtitle Translation Workflow
//!
//! Command-line entry point: sets up logging, loads the configuration and
//! dispatches to the workflow steps.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidsub::cli::{Args, Commands, ConfigAction, WorkflowCommand};
use vidsub::config::Config;
use vidsub::session::Step;
use vidsub::translate::language::SUPPORTED_LANGUAGES;
use vidsub::workflow::{segment_file, Workflow};

const DEFAULT_CONFIG_FILE: &str = "vidsub.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Dropping the guard flushes the file log, so it lives until main returns
    let _log_guard = setup_logging(args.verbose)?;

    info!("Starting vidsub - Video Subtitle Translation Workflow");

    let config = load_config(args.config.as_deref(), args.workspace.as_deref())?;

    match args.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                Config::default().save_to_file(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        },
        Commands::Segment { input, output } => {
            let srt = segment_file(&input, output.as_deref(), &config.subtitle).await?;
            match output {
                Some(path) => println!("Subtitles written to {}", path.display()),
                None => print!("{}", srt),
            }
        }
        Commands::Workflow(command) => run_workflow_command(command, config).await?,
    }

    Ok(())
}

async fn run_workflow_command(command: WorkflowCommand, config: Config) -> Result<()> {
    let workflow = Workflow::new(config)?;

    match command {
        WorkflowCommand::Import { video } => {
            let path = workflow.import_video(&video).await?;
            println!("Imported video: {}", path.display());
        }
        WorkflowCommand::Download { url } => {
            let download = workflow.download(&url).await?;
            println!("Downloaded video: {}", download.video_path.display());
            for subtitle in &download.subtitle_paths {
                println!("Downloaded subtitles: {}", subtitle.display());
            }
        }
        WorkflowCommand::ExtractAudio => {
            let audio = workflow.extract_audio().await?;
            println!("Extracted audio: {}", audio.display());
        }
        WorkflowCommand::Transcribe => {
            let text = workflow.transcribe().await?;
            println!("{}", text.trim());
        }
        WorkflowCommand::Edit { from, show } => match (from, show) {
            (Some(path), _) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let saved = workflow.save_edited_text(&text).await?;
                println!("Saved edited text to {}", saved.display());
            }
            (None, true) => println!("{}", workflow.edited_text().await?.trim()),
            (None, false) => anyhow::bail!("edit needs --from <file> or --show"),
        },
        WorkflowCommand::Translate { lang } => {
            let path = workflow.translate(&lang).await?;
            println!("{}", std::fs::read_to_string(&path)?.trim());
        }
        WorkflowCommand::Render { output_dir } => {
            let output = workflow.render(output_dir.as_deref()).await?;
            println!("Output video: {}", output.display());
        }
        WorkflowCommand::Status => print_status(&workflow).await?,
        WorkflowCommand::Reset => {
            if workflow.reset().await? {
                println!("Session cleared");
            } else {
                println!("No session to clear");
            }
        }
        WorkflowCommand::Run {
            input,
            lang,
            output_dir,
        } => {
            let output = workflow.run(&input, &lang, output_dir.as_deref()).await?;
            println!("Output video: {}", output.display());
        }
        WorkflowCommand::Subtitle {
            video,
            lang,
            layout,
            no_auto_generate,
            output_dir,
        } => {
            let output = workflow
                .process_existing_subtitles(&video, &lang, layout, !no_auto_generate, output_dir.as_deref())
                .await?;
            println!("Output video: {}", output.display());
        }
        WorkflowCommand::Batch {
            input_dir,
            lang,
            output_dir,
        } => {
            let summary = workflow.batch(&input_dir, &lang, output_dir.as_deref()).await?;
            println!(
                "Processed {} video(s), {} failed",
                summary.processed.len(),
                summary.failed.len()
            );
            for (video, error) in &summary.failed {
                println!("  {}: {}", video.display(), error);
            }
        }
        WorkflowCommand::Embed {
            video,
            subtitles,
            output,
        } => {
            workflow.embed(&video, &subtitles, &output).await?;
            println!("Output video: {}", output.display());
        }
        WorkflowCommand::Check => {
            for (tool, result) in workflow.check().await {
                match result {
                    Ok(version) => println!("{:<12} ok   {}", tool, first_line(&version)),
                    Err(e) => println!("{:<12} FAIL {}", tool, e),
                }
            }
            let languages: Vec<&str> = SUPPORTED_LANGUAGES.iter().map(|(code, _)| *code).collect();
            println!("{:<12} {}", "languages", languages.join(", "));
        }
    }

    Ok(())
}

async fn print_status(workflow: &Workflow) -> Result<()> {
    let state = workflow.status().await?;
    let show = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    println!("Session {} (started {})", state.id, state.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  workspace:       {}", workflow.workspace().dir().display());
    println!("  video:           {}", show(&state.video_path));
    println!("  audio:           {}", show(&state.audio_path));
    println!("  recognized text: {}", show(&state.recognized_text_path));
    println!("  edited text:     {}", show(&state.edited_text_path));
    println!(
        "  translated text: {} ({})",
        show(&state.translated_text_path),
        state.target_language.as_deref().unwrap_or("-")
    );
    println!("  subtitles:       {}", show(&state.subtitle_path));
    println!("  output video:    {}", show(&state.output_video_path));

    println!("Steps:");
    for step in Step::ALL {
        let missing = state.missing_for(step);
        if missing.is_empty() {
            println!("  {:<14} ready", step.name());
        } else {
            println!("  {:<14} needs {}", step.name(), missing.join(", "));
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, workspace: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
            Config::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => Config::default(),
    };

    config.apply_env_overrides();
    if let Some(dir) = workspace {
        config.workspace.dir = dir.to_path_buf();
    }
    config.validate()?;
    Ok(config)
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Console plus daily-rolling file logging; the returned guard must be kept alive
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".vidsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "vidsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("vidsub.log").display()
    );

    Ok(guard)
}
