//! `bookalign`: snap the pictures of a photo-book project to the page grid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bookalign::GridConfig;
use bookalign::document::{self, Project};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bookalign",
    version,
    about = "Align the pictures of a photo-book project file to an implicit page grid"
)]
struct Cli {
    /// Project file (.json) to align in place
    project: PathBuf,
    /// Do not write a timestamped backup copy before overwriting
    #[arg(long)]
    no_backup: bool,
    /// Align and report, but leave the project file untouched
    #[arg(long)]
    dry_run: bool,
    /// Write one SVG preview per aligned page into this directory
    #[cfg(feature = "svg")]
    #[arg(long, value_name = "DIR")]
    svg: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookalign=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = GridConfig::DEFAULT;
    config.validate().context("invalid grid configuration")?;

    let mut project = Project::load(&cli.project)
        .with_context(|| format!("failed to load {}", cli.project.display()))?;
    let report = project.align(&config).context("failed to align project")?;
    tracing::info!(
        pages = report.pages,
        pictures = report.pictures.len(),
        skipped = report.skipped,
        "alignment finished"
    );

    #[cfg(feature = "svg")]
    if let Some(dir) = &cli.svg {
        write_previews(dir, &project, &report, &config)?;
    }

    if cli.dry_run {
        tracing::info!("dry run, project file left unchanged");
        return Ok(());
    }
    if !cli.no_backup {
        document::backup(&cli.project).context("failed to back up project file")?;
    }
    project
        .save(&cli.project)
        .with_context(|| format!("failed to write {}", cli.project.display()))?;
    Ok(())
}

#[cfg(feature = "svg")]
fn write_previews(
    dir: &std::path::Path,
    project: &Project,
    report: &document::AlignReport,
    config: &GridConfig,
) -> Result<()> {
    use std::fs;

    use bookalign::PageGrid;
    use bookalign::svg::{FrameChange, render_page_svg};

    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    for index in 1..project.page_count() {
        let Some(size) = project.page_size(index) else {
            continue;
        };
        let frames: Vec<FrameChange> = report.on_page(index).map(FrameChange::from).collect();
        let grid = PageGrid::new(size, config);
        let svg = render_page_svg(&grid, &format!("Page {}", index + 1), &frames);
        let path = dir.join(format!("page-{:03}.svg", index + 1));
        fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote preview");
    }
    Ok(())
}
