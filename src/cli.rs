//! Command-line interface.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use slidekit_document::{
    key_for_name, Bounds, DirectoryStore, DocumentStore, Element, Presentation, PresentationFile,
    PresentationRepository, Slide,
};
use slidekit_export::{ExportQuality, PageLayout, PdfExporter};
use slidekit_render::ThumbnailStrip;
use slidekit_settings::EditorConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::BusNotifier;

#[derive(Parser)]
#[command(name = "slidekit")]
#[command(author, version, about)]
#[command(long_about = "Headless tools for SlideKit presentations.\n\n\
    Examples:\n  \
    slidekit new \"Q3 Review\" --slides 5 --out q3.json\n  \
    slidekit info q3.json\n  \
    slidekit export q3.json --quality high --notes\n  \
    slidekit thumbnails q3.json --scale 0.25")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (.toml or .json); defaults to the platform config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write log events as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a presentation with blank titled slides
    New {
        name: String,

        /// Number of slides
        #[arg(long, default_value = "1")]
        slides: usize,

        /// Write to this file instead of the storage directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List presentations in the storage directory
    List,

    /// Print a summary of a presentation
    Info {
        /// Presentation file, or a key in the storage directory
        source: String,
    },

    /// Export a presentation to PDF
    Export {
        /// Presentation file, or a key in the storage directory
        source: String,

        /// low, medium or high
        #[arg(long)]
        quality: Option<ExportQuality>,

        /// landscape or portrait
        #[arg(long)]
        layout: Option<PageLayout>,

        /// Print speaker notes under each slide
        #[arg(long)]
        notes: bool,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Render slide thumbnails as PNG files
    Thumbnails {
        /// Presentation file, or a key in the storage directory
        source: String,

        /// Thumbnail size relative to the slide
        #[arg(long)]
        scale: Option<f64>,

        #[arg(short, long, default_value = "thumbnails")]
        out_dir: PathBuf,
    },

    /// Show the effective settings
    Config {
        /// Save them to the settings file
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => EditorConfig::default_path()?,
        };
        let config = EditorConfig::load_or_default(&config_path)
            .with_context(|| format!("loading settings from {}", config_path.display()))?;

        match self.command {
            Commands::New { name, slides, out } => {
                let path = create(&config, &name, slides, out.as_deref())?;
                println!("{}", path.display());
            }
            Commands::List => {
                for key in list(&config)? {
                    println!("{}", key);
                }
            }
            Commands::Info { source } => {
                let presentation = open(&config, &source)?;
                print!("{}", summary(&presentation));
            }
            Commands::Export {
                source,
                quality,
                layout,
                notes,
                out_dir,
            } => {
                let presentation = open(&config, &source)?;
                let mut settings = config.clone();
                if let Some(quality) = quality {
                    settings.export.quality = quality;
                }
                if let Some(layout) = layout {
                    settings.export.layout = layout;
                }
                settings.export.include_notes |= notes;
                let path = export(&settings, &presentation, &out_dir).await?;
                println!("{}", path.display());
            }
            Commands::Thumbnails {
                source,
                scale,
                out_dir,
            } => {
                let presentation = open(&config, &source)?;
                let scale = scale.unwrap_or(config.render.thumbnail_scale);
                for path in thumbnails(&presentation, scale, &out_dir).await? {
                    println!("{}", path.display());
                }
            }
            Commands::Config { write } => {
                print!("{}", toml::to_string_pretty(&config)?);
                if write {
                    config.save_to_file(&config_path)?;
                    eprintln!("Saved to {}", config_path.display());
                }
            }
        }
        Ok(())
    }
}

fn repository(config: &EditorConfig) -> anyhow::Result<PresentationRepository<DirectoryStore>> {
    let store = DirectoryStore::open(config.storage_directory()?)?;
    Ok(PresentationRepository::new(store).with_notifications(Arc::new(BusNotifier)))
}

/// A presentation with `slides` slides, each carrying a title box.
pub fn sample_presentation(name: &str, slides: usize) -> Presentation {
    (1..=slides).fold(Presentation::empty(name), |p, n| {
        let title = Element::text(Bounds::new(80.0, 60.0, 800.0, 100.0), format!("Slide {}", n));
        p.with_slide(Slide::new().with_element(title))
    })
}

/// Creates a presentation and returns where it was written.
pub fn create(
    config: &EditorConfig,
    name: &str,
    slides: usize,
    out: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    if slides == 0 {
        bail!("a presentation needs at least one slide");
    }
    let presentation = sample_presentation(name, slides);
    match out {
        Some(path) => {
            std::fs::write(path, PresentationFile::new(presentation).to_json()?)
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(path.to_path_buf())
        }
        None => {
            let mut repo = repository(config)?;
            let key = key_for_name(name);
            repo.save(&key, &presentation)
                .into_result()
                .map_err(anyhow::Error::msg)?;
            Ok(repo.store().root().join(format!("{}.json", key)))
        }
    }
}

pub fn list(config: &EditorConfig) -> anyhow::Result<Vec<String>> {
    let keys = repository(config)?
        .list()
        .into_result()
        .map_err(anyhow::Error::msg)?;
    Ok(keys.unwrap_or_default())
}

/// Reads `source` as a file path when it exists, otherwise as a storage key.
pub fn open(config: &EditorConfig, source: &str) -> anyhow::Result<Presentation> {
    let path = Path::new(source);
    if path.is_file() {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        return Ok(PresentationFile::from_json(&json)?.presentation);
    }
    repository(config)?
        .load(source)
        .into_result()
        .map_err(anyhow::Error::msg)?
        .with_context(|| format!("no presentation '{}'", source))
}

pub fn summary(presentation: &Presentation) -> String {
    let mut out = format!(
        "{}\n  slides: {}\n  updated: {}\n",
        presentation.name,
        presentation.slide_count(),
        presentation.updated_at.format("%Y-%m-%d %H:%M")
    );
    for (i, slide) in presentation.slides.iter().enumerate() {
        let notes = if slide.notes.trim().is_empty() { "" } else { ", notes" };
        out.push_str(&format!(
            "  {:>3}. {} element(s){}\n",
            i + 1,
            slide.elements.len(),
            notes
        ));
    }
    out
}

pub async fn export(
    config: &EditorConfig,
    presentation: &Presentation,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let exporter =
        PdfExporter::new(config.export_options()).with_notifications(Arc::new(BusNotifier));
    let pdf = exporter
        .export(presentation, |percent| {
            tracing::debug!("Export {:.0}%", percent);
        })
        .await?;
    Ok(pdf.write_to_dir(out_dir).await?)
}

/// Writes one `slide-NNN.png` per slide and returns the paths in slide order.
pub async fn thumbnails(
    presentation: &Presentation,
    scale: f64,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let pid = presentation.id;
    let store = DocumentStore::with_presentation(presentation.clone());
    let strip = ThumbnailStrip::attach(&store, pid, scale)?;
    let report = strip.preload().await;
    for failure in &report.failed {
        tracing::warn!("Image '{}' skipped: {}", failure.source, failure.reason);
    }

    tokio::fs::create_dir_all(out_dir).await?;
    let mut written = Vec::new();
    for (i, thumb) in strip.thumbnails().iter().enumerate() {
        let path = out_dir.join(format!("slide-{:03}.png", i + 1));
        thumb
            .image
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> EditorConfig {
        let mut config = EditorConfig::new();
        config.storage.directory = Some(dir.join("store"));
        config
    }

    #[test]
    fn test_cli_parses_export_flags() {
        let cli = Cli::try_parse_from([
            "slidekit", "export", "deck.json", "--quality", "low", "--layout", "portrait",
            "--notes",
        ])
        .expect("parse");
        match cli.command {
            Commands::Export {
                quality,
                layout,
                notes,
                ..
            } => {
                assert_eq!(quality, Some(ExportQuality::Low));
                assert_eq!(layout, Some(PageLayout::Portrait));
                assert!(notes);
            }
            _ => panic!("expected export"),
        }
        assert!(Cli::try_parse_from(["slidekit", "export", "deck.json", "--quality", "ultra"]).is_err());
    }

    #[test]
    fn test_create_and_open_by_file_and_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path());

        let file = dir.path().join("deck.json");
        create(&config, "Deck", 3, Some(&file)).expect("create file");
        let loaded = open(&config, file.to_str().expect("utf8")).expect("open file");
        assert_eq!(loaded.slide_count(), 3);
        assert!(summary(&loaded).contains("slides: 3"));

        let stored = create(&config, "Team Sync", 2, None).expect("create stored");
        assert!(stored.ends_with("team_sync.json"));
        assert_eq!(list(&config).expect("list"), vec!["team_sync".to_string()]);
        assert_eq!(open(&config, "team_sync").expect("open key").name, "Team Sync");
        assert!(open(&config, "missing").is_err());
        assert!(create(&config, "Empty", 0, None).is_err());
    }

    #[tokio::test]
    async fn test_export_and_thumbnails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config_in(dir.path());
        config.export.quality = ExportQuality::Low;
        let deck = sample_presentation("Launch Plan", 2);

        let pdf = export(&config, &deck, dir.path()).await.expect("export");
        assert!(pdf.ends_with("launch_plan_presentation.pdf"));
        assert!(std::fs::read(&pdf).expect("read").starts_with(b"%PDF"));

        let thumbs = thumbnails(&deck, 0.1, &dir.path().join("thumbs"))
            .await
            .expect("thumbnails");
        assert_eq!(thumbs.len(), 2);
        let first = image::open(&thumbs[0]).expect("png");
        assert_eq!((first.width(), first.height()), (96, 54));
    }
}
