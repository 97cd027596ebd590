// src/cli.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use crate::core::{ConfigManager, EnhancerConfig, Poller, ResumeBackend, ServiceClient};
use crate::error::{EnhancerError, ErrorKind};
use crate::normalize::normalize_bullet;
use crate::types::{AnalysisResult, ResumeFile};
use crate::wizard::{Step, Wizard};

#[derive(Parser)]
#[command(name = "resume-enhancer")]
#[command(about = "Tailor a resume to a job description using the enhancement backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL, overrides config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to an enhancer.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload, analyze and generate in one go
    Enhance {
        /// Resume file (PDF, DOCX or DOC)
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        job: JobSource,

        /// Where enhanced_resume.txt is written
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Walk through the wizard step by step
    Interactive {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Check that the backend is reachable
    Health,
    /// Print a bullet point the way it is sent to the backend
    Normalize { text: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct JobSource {
    /// Job description text
    #[arg(long)]
    pub job: Option<String>,

    /// File containing the job description
    #[arg(long)]
    pub job_file: Option<PathBuf>,
}

impl JobSource {
    async fn read(&self) -> Result<String> {
        match (&self.job, &self.job_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read job description {}", path.display())),
            (None, None) => anyhow::bail!("Either --job or --job-file is required"),
        }
    }
}

impl Cli {
    /// Fold the command-line overrides into `config`
    pub fn apply_overrides(&self, config: &mut EnhancerConfig) {
        if let Some(url) = &self.api_url {
            config.service.api_url = url.clone();
        }
        match &self.command {
            Command::Enhance {
                output_dir: Some(dir),
                ..
            }
            | Command::Interactive {
                output_dir: Some(dir),
            } => config.output_dir = dir.clone(),
            _ => {}
        }
    }
}

/// Load configuration and fold in the command-line overrides
pub fn load_config(cli: &Cli) -> Result<EnhancerConfig> {
    let mut config = ConfigManager::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

fn connect(config: &EnhancerConfig) -> Result<Arc<dyn ResumeBackend>> {
    let client = ServiceClient::new(
        config.service.api_url.clone(),
        config.service.request_timeout,
    )
    .context("Failed to build HTTP client")?;
    info!("Using backend at {}", client.base_url());
    Ok(Arc::new(client))
}

pub async fn handle_command(cli: Cli, config: EnhancerConfig) -> Result<()> {
    match cli.command {
        Command::Normalize { text } => {
            println!("{}", normalize_bullet(&text));
        }

        Command::Health => {
            let health = connect(&config)?
                .health()
                .await
                .with_context(|| format!("Backend at {} is unreachable", config.service.api_url))?;
            match health.message {
                Some(message) => println!("✅ Backend {}: {}", health.status, message),
                None => println!("✅ Backend {}", health.status),
            }
        }

        Command::Enhance { file, job, .. } => {
            let job_description = job.read().await?;
            let mut wizard = new_wizard(connect(&config)?, &config);
            run_enhance(&mut wizard, &file, job_description, &config.output_dir).await?;
        }

        Command::Interactive { .. } => {
            let mut wizard = new_wizard(connect(&config)?, &config);
            run_interactive(&mut wizard, &config.output_dir).await?;
        }
    }

    Ok(())
}

fn new_wizard(backend: Arc<dyn ResumeBackend>, config: &EnhancerConfig) -> Wizard {
    Wizard::new(backend, Poller::new(config.polling), config.timeouts)
        .with_progress_listener(|message| println!("⏳ {}", message))
}

async fn run_enhance(
    wizard: &mut Wizard,
    path: &Path,
    job_description: String,
    output_dir: &Path,
) -> Result<()> {
    let file = ResumeFile::load(path)
        .await
        .with_context(|| format!("Failed to read resume {}", path.display()))?;

    wizard.select_file(file)?;
    wizard.upload().await.context("Upload failed")?;
    println!("✅ Resume uploaded");

    wizard.set_job_description(job_description)?;
    wizard.analyze().await.context("Analysis failed")?;
    if let Some(analysis) = wizard.session().analysis() {
        print_analysis(analysis);
    }

    wizard.generate().await.context("Generation failed")?;
    let saved = wizard.download(output_dir).await?;
    println!("✅ Enhanced resume saved to {}", saved.display());

    Ok(())
}

type InputLines = Lines<BufReader<Stdin>>;

async fn prompt(lines: &mut InputLines, message: &str) -> Result<Option<String>> {
    println!("{}", message);
    Ok(lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
        .map(|line| line.trim().to_string()))
}

/// Read lines until an empty one; `None` on end of input
async fn read_block(lines: &mut InputLines) -> Result<Option<String>> {
    let mut block = Vec::new();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            return Ok(Some(block.join("\n")));
        }
        block.push(line);
    }
    Ok(if block.is_empty() {
        None
    } else {
        Some(block.join("\n"))
    })
}

async fn run_interactive(wizard: &mut Wizard, output_dir: &Path) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let step = wizard.step();
        println!("\n── Step {}/4: {} ──", step.number(), step);

        match step {
            Step::Upload => {
                let Some(input) =
                    prompt(&mut lines, "Path to your resume (PDF, DOCX or DOC), or 'quit':").await?
                else {
                    break;
                };
                if input == "quit" {
                    break;
                }
                match ResumeFile::load(Path::new(&input)).await {
                    Ok(file) => wizard.select_file(file)?,
                    Err(e) => {
                        println!("❌ {}", e);
                        continue;
                    }
                }
                report(wizard.upload().await);
            }

            Step::JobDescription => {
                println!("Paste the job description and finish with an empty line.");
                println!("Type 'back' to choose another file or 'quit' to exit.");
                let Some(input) = read_block(&mut lines).await? else {
                    break;
                };
                match input.trim() {
                    "quit" => break,
                    "back" => {
                        wizard.back()?;
                    }
                    _ => {
                        wizard.set_job_description(input)?;
                        report(wizard.analyze().await);
                    }
                }
            }

            Step::Review => {
                if let Some(analysis) = wizard.session().analysis() {
                    print_analysis(analysis);
                }
                let Some(input) =
                    prompt(&mut lines, "Type 'generate', 'back' or 'quit':").await?
                else {
                    break;
                };
                match input.as_str() {
                    "generate" => report(wizard.generate().await),
                    "back" => {
                        wizard.back()?;
                    }
                    "quit" => break,
                    other => println!("Unknown command '{}'", other),
                }
            }

            Step::Download => {
                match wizard.download(output_dir).await {
                    Ok(path) => println!("✅ Enhanced resume saved to {}", path.display()),
                    Err(e) => println!("❌ {}", e),
                }
                let Some(input) =
                    prompt(&mut lines, "Type 'restart' to enhance another resume or 'quit':")
                        .await?
                else {
                    break;
                };
                match input.as_str() {
                    "restart" => {
                        wizard.restart()?;
                    }
                    _ => break,
                }
            }
        }
    }

    Ok(())
}

fn report(outcome: crate::Result<Step>) {
    match outcome {
        Ok(step) => println!("✅ Moved to {}", step),
        Err(e) if e.kind() == ErrorKind::Validation => println!("⚠️  {}", e),
        Err(e) => {
            error!("Step failed: {}", e);
            println!("❌ {}", e);
            if let Some(hint) = failure_hint(&e) {
                println!("   {}", hint);
            }
        }
    }
}

fn failure_hint(err: &EnhancerError) -> Option<&'static str> {
    match err.kind() {
        ErrorKind::Transport => Some("Check that the backend is running and reachable."),
        ErrorKind::Timeout => Some("The backend is busy, try again in a moment."),
        ErrorKind::Validation | ErrorKind::Backend | ErrorKind::Local => None,
    }
}

fn print_analysis(analysis: &AnalysisResult) {
    println!("Match score: {:.0}%", analysis.match_score);

    if !analysis.missing_keywords.is_empty() {
        println!("Missing keywords:");
        for keyword in &analysis.missing_keywords {
            println!("   • {} ({})", keyword.keyword, keyword.importance);
        }
    }

    if !analysis.has_improvements() {
        println!("No bullet improvements suggested");
    } else {
        println!("Suggested improvements:");
        for bullet in &analysis.improved_bullets {
            let bullet = bullet.normalized();
            println!("   - {}", bullet.original);
            println!("   + {}", bullet.improved);
            println!("     {}", bullet.reason);
        }
    }

    for suggestion in &analysis.suggestions {
        println!("Tip: {}", suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_requires_one_job_source() {
        assert!(Cli::try_parse_from(["resume-enhancer", "enhance", "--file", "cv.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "resume-enhancer",
            "enhance",
            "--file",
            "cv.pdf",
            "--job",
            "Rust engineer",
            "--job-file",
            "jd.txt",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "resume-enhancer",
            "--api-url",
            "http://backend:9000",
            "enhance",
            "--file",
            "cv.pdf",
            "--job",
            "Rust engineer",
            "--output-dir",
            "out",
        ])
        .unwrap();

        let mut config = EnhancerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.service.api_url, "http://backend:9000");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_overrides_keep_config_without_flags() {
        let cli = Cli::try_parse_from(["resume-enhancer", "interactive"]).unwrap();

        let mut config = EnhancerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, EnhancerConfig::default());
    }

    #[test]
    fn test_failure_hint_follows_error_kind() {
        assert!(failure_hint(&EnhancerError::Transport("refused".into())).is_some());
        assert!(failure_hint(&EnhancerError::PollTimeout { attempts: 20 }).is_some());
        assert!(failure_hint(&EnhancerError::EmptyJobDescription).is_none());
        assert!(failure_hint(&EnhancerError::Backend {
            status: 500,
            detail: "boom".into(),
        })
        .is_none());
    }

    #[tokio::test]
    async fn test_job_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jd.txt");
        std::fs::write(&path, "Senior Rust engineer").unwrap();

        let source = JobSource {
            job: None,
            job_file: Some(path),
        };
        assert_eq!(source.read().await.unwrap(), "Senior Rust engineer");
    }
}
