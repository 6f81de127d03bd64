//! Subcommand implementations.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Args, Subcommand};
use timeline_core::defaults::{EXPORT_FILE, TAG_COLOR};
use timeline_core::{generate_report, DateRange, Entry, Error, EventBus, ReportFormat, Tag};
use timeline_inference::{AiError, OpenAIBackend, TagClassifier};
use timeline_jobs::{
    apply_outcome, capture, ClassificationPipeline, OutcomeReceiver, PipelineSettings,
};
use timeline_store::Store;
use tracing::{debug, info};

use crate::render::{entry_block, match_entry_id, tag_line};
use crate::settings::Settings;

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a new entry
    Add {
        /// Entry text; inline #hashtags become tags
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,

        /// Tag to attach (repeatable); tagged entries skip AI classification
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Return immediately instead of waiting for AI tags
        #[arg(long)]
        no_wait: bool,
    },

    /// List entries, newest first
    List(Filter),

    /// Replace the text or tags of an entry
    Edit {
        /// Entry id or unique prefix
        id: String,

        /// New text (default: keep)
        content: Vec<String>,

        /// Replace the entry's tags with these (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Remove every tag from the entry
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Delete entries
    Delete {
        /// Entry ids or unique prefixes
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Manage tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Generate a work report
    Report {
        /// summary, detailed or bullet
        #[arg(short, long, default_value = "summary")]
        format: ReportFormat,

        #[command(flatten)]
        filter: Filter,
    },

    /// Write all entries and tags to one JSON document
    Export {
        /// Output path (default: ./mytimeline_export.json)
        path: Option<PathBuf>,
    },

    /// Delete every entry and reset tags to the built-in set
    Clear {
        /// Required; nothing is deleted without it
        #[arg(long)]
        yes: bool,
    },

    /// Check that the configured AI endpoint answers
    TestConnection,

    /// Print the data directory
    Path,
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// List registry tags with usage counts
    List,

    /// Register a tag
    Add {
        name: String,

        /// Colour as RRGGBB
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Rename or recolour a tag everywhere
    Rename {
        name: String,
        new_name: String,

        /// New colour as RRGGBB (default: keep)
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a tag
    Delete {
        name: String,

        /// Also delete every entry holding the tag
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct Filter {
    /// all, today, week or month
    #[arg(short, long, default_value = "all")]
    pub range: DateRange,

    /// First day of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Only entries holding one of these tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Case-insensitive text search over content and tag names
    #[arg(short, long)]
    pub search: Option<String>,
}

impl Filter {
    /// The effective date range; `--from/--to` override `--range`.
    pub fn date_range(&self) -> anyhow::Result<DateRange> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                if from > to {
                    bail!("--from {} is after --to {}", from, to);
                }
                Ok(DateRange::Custom {
                    start: local_instant(from, 0, 0, 0)?,
                    end: local_instant(to, 23, 59, 59)?,
                })
            }
            _ => Ok(self.range),
        }
    }

    /// Apply range, tag and search filters to the store's entries.
    pub fn select(&self, store: &Store, range: &DateRange) -> anyhow::Result<Vec<Entry>> {
        let mut tag_ids = Vec::new();
        for name in &self.tags {
            let name = name.trim().trim_start_matches('#');
            let tag_id = store
                .find_tag_by_name(name)
                .map(|t| t.id)
                .or_else(|| {
                    store
                        .all_tags()
                        .into_iter()
                        .find(|t| t.name == name)
                        .map(|t| t.id)
                })
                .ok_or_else(|| anyhow!("unknown tag: {}", name))?;
            tag_ids.push(tag_id);
        }

        let in_range = store.entries_in_range(range);
        let tagged = store.entries_with_any_tag(&tag_ids);
        let searched = store.search(self.search.as_deref().unwrap_or(""));

        Ok(in_range
            .into_iter()
            .filter(|e| tagged.iter().any(|t| t.id == e.id))
            .filter(|e| searched.iter().any(|s| s.id == e.id))
            .collect())
    }
}

fn local_instant(day: NaiveDate, h: u32, m: u32, s: u32) -> anyhow::Result<DateTime<Utc>> {
    let naive = day
        .and_hms_opt(h, m, s)
        .ok_or_else(|| anyhow!("invalid time on {}", day))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("{} does not exist in the local time zone", naive))?;
    Ok(local.with_timezone(&Utc))
}

/// Everything a command needs: the store and the AI backend, or the reason
/// it could not be built.
pub struct App {
    pub store: Store,
    backend: Result<Arc<OpenAIBackend>, AiError>,
    pipeline: ClassificationPipeline,
    outcomes: OutcomeReceiver,
}

impl App {
    pub fn open(settings: &Settings) -> Self {
        let events = Arc::new(EventBus::new(settings.event_capacity));
        let store = Store::open_dir(&settings.data_dir, events.clone());

        let backend = OpenAIBackend::from_env().map(Arc::new);
        if let Err(e) = &backend {
            debug!(subsystem = "cli", error = %e, "AI classification unavailable");
        }
        let classifier = backend
            .as_ref()
            .ok()
            .map(|b| Arc::clone(b) as Arc<dyn TagClassifier>);
        let (pipeline, outcomes) =
            ClassificationPipeline::new(classifier, PipelineSettings::from_env(), events);

        Self {
            store,
            backend,
            pipeline,
            outcomes,
        }
    }

    pub async fn run(&mut self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Add {
                content,
                tags,
                no_wait,
            } => self.add(&content.join(" "), &tags, no_wait).await,
            Commands::List(filter) => self.list(&filter),
            Commands::Edit {
                id,
                content,
                tags,
                clear_tags,
            } => self.edit(&id, &content.join(" "), &tags, clear_tags),
            Commands::Delete { ids } => self.delete(&ids),
            Commands::Tags { command } => self.tags(command),
            Commands::Report { format, filter } => self.report(format, &filter),
            Commands::Export { path } => self.export(path),
            Commands::Clear { yes } => self.clear(yes),
            Commands::TestConnection => self.test_connection().await,
            Commands::Path => {
                println!("{}", self.store.location());
                Ok(())
            }
        }
    }

    async fn add(&mut self, content: &str, tags: &[String], no_wait: bool) -> anyhow::Result<()> {
        let pipeline = (!no_wait).then_some(&self.pipeline);
        let captured = capture(&mut self.store, pipeline, content, tags)?;
        let now = Local::now();

        let Some(task) = captured.classification else {
            println!("{}", entry_block(&captured.entry, now));
            return Ok(());
        };

        eprintln!("Classifying...");
        task.await.context("classification task panicked")?;
        if let Some(outcome) = self.outcomes.recv().await {
            if let Err(e) = &outcome.result {
                eprintln!("AI classification failed: {}", e);
            }
            apply_outcome(&mut self.store, outcome);
        }

        let entry = self
            .store
            .entry(captured.entry.id)
            .cloned()
            .unwrap_or(captured.entry);
        println!("{}", entry_block(&entry, now));
        Ok(())
    }

    fn list(&self, filter: &Filter) -> anyhow::Result<()> {
        let range = filter.date_range()?;
        let entries = filter.select(&self.store, &range)?;
        if entries.is_empty() {
            println!("No entries.");
            return Ok(());
        }
        let now = Local::now();
        for entry in &entries {
            println!("{}\n", entry_block(entry, now));
        }
        info!(subsystem = "cli", op = "list", result_count = entries.len(), "Listed entries");
        Ok(())
    }

    /// Replace text, tags, or both. Retagging by hand leaves the AI flag as
    /// it was.
    fn edit(
        &mut self,
        id: &str,
        content: &str,
        tags: &[String],
        clear_tags: bool,
    ) -> anyhow::Result<()> {
        let content = content.trim();
        if content.is_empty() && tags.is_empty() && !clear_tags {
            bail!("nothing to change: give new text, --tag or --clear-tags");
        }
        let entry_id = match_entry_id(self.store.entries(), id).map_err(|e| anyhow!(e))?;
        let current = self
            .store
            .entry(entry_id)
            .ok_or(Error::EntryNotFound(entry_id))?;
        let mut entry = if content.is_empty() {
            current.edited(current.content.clone())
        } else {
            current.edited(content)
        };
        if clear_tags || !tags.is_empty() {
            entry.tags = self.resolve_tags(tags);
        }
        self.store.update_entry(entry.clone());
        println!("{}", entry_block(&entry, Local::now()));
        Ok(())
    }

    fn resolve_tags(&mut self, names: &[String]) -> Vec<Tag> {
        let mut resolved: Vec<Tag> = Vec::new();
        for name in names {
            let name = name.trim().trim_start_matches('#');
            if let Some(tag) = self.store.resolve_tag(name) {
                if !resolved.iter().any(|t| t.id == tag.id) {
                    resolved.push(tag);
                }
            }
        }
        resolved
    }

    fn delete(&mut self, ids: &[String]) -> anyhow::Result<()> {
        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            targets.push(match_entry_id(self.store.entries(), id).map_err(|e| anyhow!(e))?);
        }
        let removed = self.store.delete_entries(&targets);
        println!("Deleted {} entries.", removed);
        Ok(())
    }

    fn tags(&mut self, command: TagCommands) -> anyhow::Result<()> {
        match command {
            TagCommands::List => {
                let color = std::io::stdout().is_terminal();
                for tag in self.store.tags() {
                    println!("{}", tag_line(tag, self.store.tag_count(tag.id), color));
                }
            }
            TagCommands::Add { name, color } => {
                let name = name.trim().trim_start_matches('#');
                if name.is_empty() {
                    bail!("tag name is empty");
                }
                let color = match color {
                    Some(c) => parse_color(&c)?,
                    None => TAG_COLOR.to_string(),
                };
                if !self.store.add_tag(Tag::new(name, color)) {
                    bail!("tag {} already exists", name);
                }
                println!("Added tag {}.", name);
            }
            TagCommands::Rename {
                name,
                new_name,
                color,
            } => {
                let tag = self.registry_tag(&name)?;
                let new_name = new_name.trim().trim_start_matches('#');
                if new_name.is_empty() {
                    bail!("tag name is empty");
                }
                if new_name != tag.name && self.store.find_tag_by_name(new_name).is_some() {
                    bail!("tag {} already exists", new_name);
                }
                let color = match color {
                    Some(c) => parse_color(&c)?,
                    None => tag.color_hex.clone(),
                };
                let touched = self.store.update_tag(tag.id, new_name, &color);
                println!("Renamed {} to {} ({} entries updated).", tag.name, new_name, touched);
            }
            TagCommands::Delete { name, cascade } => {
                let tag = self.registry_tag(&name)?;
                let held_by = self.store.tag_count(tag.id);
                self.store.delete_tag(tag.id, cascade);
                if cascade {
                    println!("Deleted tag {} and {} entries.", tag.name, held_by);
                } else {
                    println!("Deleted tag {} from {} entries.", tag.name, held_by);
                }
            }
        }
        Ok(())
    }

    fn registry_tag(&self, name: &str) -> anyhow::Result<Tag> {
        let name = name.trim().trim_start_matches('#');
        self.store
            .find_tag_by_name(name)
            .cloned()
            .ok_or_else(|| anyhow!("unknown tag: {}", name))
    }

    fn report(&self, format: ReportFormat, filter: &Filter) -> anyhow::Result<()> {
        let range = filter.date_range()?;
        let entries = filter.select(&self.store, &range)?;
        println!("{}", generate_report(&entries, format, &range));
        Ok(())
    }

    fn export(&self, path: Option<PathBuf>) -> anyhow::Result<()> {
        let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE));
        self.store
            .export_to(&path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        println!("Exported to {}", path.display());
        Ok(())
    }

    fn clear(&mut self, yes: bool) -> anyhow::Result<()> {
        if !yes {
            bail!(
                "refusing to delete {} entries without --yes",
                self.store.entries().len()
            );
        }
        let removed = self.store.clear();
        println!("Deleted {} entries; tags reset to defaults.", removed);
        Ok(())
    }

    /// Fails with the backend construction error when there is one.
    async fn test_connection(&self) -> anyhow::Result<()> {
        let backend = self.backend.as_ref().map_err(|e| e.clone())?;
        eprintln!(
            "Testing {} (model {})...",
            backend.endpoint(),
            backend.config().model_name
        );
        let reply = backend.test_connection().await?;
        println!("{}", reply);
        Ok(())
    }
}

/// Accept `RRGGBB` with or without a leading `#`, stored upper-case.
fn parse_color(input: &str) -> anyhow::Result<String> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid colour {}, expected RRGGBB", input);
    }
    Ok(hex.to_uppercase())
}
