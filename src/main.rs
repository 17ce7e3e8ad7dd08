use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gutlog::models::date::{format_clock, format_day};
use gutlog::utils::{ensure_database_directory, get_database_path};
use gutlog::{
    BowelMovement, Database, EntryService, FilterEngine, MonthProjector, NoteDetails,
    StatsReporter, Tag, TagError, TagFilter, TagService, export,
};

/// gutlog - local-first gut-health diary with calendar day tags
#[derive(Parser)]
#[command(name = "gutlog")]
#[command(about = "A local-first gut-health diary with calendar day tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Manage reusable day tags
    #[command(subcommand)]
    Tag(TagCommands),
    /// Tag or untag a calendar day
    #[command(subcommand)]
    Day(DayCommands),
    /// Show which days of a month are tagged, and with what
    Month(MonthCommand),
    /// Record a diary entry
    #[command(subcommand)]
    Log(LogCommands),
    /// List entries on days matching a tag filter
    Filter(FilterCommand),
    /// Show per-tag statistics over bowel-movement entries
    Stats(StatsCommand),
    /// Export filtered entries as JSON
    Export(ExportCommand),
}

#[derive(Subcommand)]
enum TagCommands {
    /// Create a tag, or fetch it if the name is already taken
    Add(TagAddCommand),
    /// List all tags, most used first
    List,
    /// Set or clear a tag's description
    Describe(TagDescribeCommand),
    /// Delete a tag and every day association it has
    Delete(TagDeleteCommand),
}

#[derive(Parser)]
struct TagAddCommand {
    /// The tag name
    #[arg(value_name = "NAME")]
    name: String,

    /// Optional description
    #[arg(short, long, value_name = "TEXT")]
    description: Option<String>,
}

#[derive(Parser)]
struct TagDescribeCommand {
    /// The tag name
    #[arg(value_name = "NAME")]
    name: String,

    /// New description; omit to clear
    #[arg(value_name = "TEXT")]
    description: Option<String>,
}

#[derive(Parser)]
struct TagDeleteCommand {
    /// The tag name
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Subcommand)]
enum DayCommands {
    /// Apply a tag to a day, creating the tag if needed
    Tag(DayTagCommand),
    /// Remove a tag from a day (a no-op if it is not there)
    Untag(DayTagCommand),
    /// Show the tags a day carries
    Show(DayShowCommand),
}

#[derive(Parser)]
struct DayTagCommand {
    /// The day, as YYYY-MM-DD
    #[arg(value_name = "DAY")]
    day: String,

    /// The tag name
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Parser)]
struct DayShowCommand {
    /// The day, as YYYY-MM-DD
    #[arg(value_name = "DAY")]
    day: String,
}

#[derive(Parser)]
struct MonthCommand {
    /// Year, e.g. 2025
    #[arg(value_name = "YEAR")]
    year: i32,

    /// Month, 1-12
    #[arg(value_name = "MONTH")]
    month: u8,
}

#[derive(Subcommand)]
enum LogCommands {
    /// Record a bowel-movement observation
    Movement(LogMovementCommand),
    /// Record a free-form note
    Note(LogNoteCommand),
}

#[derive(Parser)]
struct LogMovementCommand {
    /// The day, as YYYY-MM-DD
    #[arg(value_name = "DAY")]
    day: String,

    /// Clock time, as HH:MM
    #[arg(value_name = "TIME")]
    time: String,

    /// Bristol stool scale, 1-7
    #[arg(value_name = "CONSISTENCY")]
    consistency: u8,

    /// Urgency scale, 1-4
    #[arg(value_name = "URGENCY")]
    urgency: u8,

    /// Optional observation notes
    #[arg(short, long, value_name = "TEXT")]
    notes: Option<String>,
}

#[derive(Parser)]
struct LogNoteCommand {
    /// The day, as YYYY-MM-DD
    #[arg(value_name = "DAY")]
    day: String,

    /// Clock time, as HH:MM
    #[arg(value_name = "TIME")]
    time: String,

    /// Note category, e.g. diet or symptom
    #[arg(value_name = "CATEGORY")]
    category: String,

    /// The note text
    #[arg(value_name = "CONTENT")]
    content: String,

    /// Comma-separated inline labels for the note itself
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

#[derive(Parser)]
struct FilterCommand {
    /// Comma-separated tag names
    #[arg(short, long, value_name = "TAGS")]
    tags: String,

    /// Require every tag (AND); the default matches any tag (OR)
    #[arg(long)]
    all: bool,

    /// Range start, as YYYY-MM-DD
    #[arg(long, value_name = "DAY")]
    from: String,

    /// Range end, as YYYY-MM-DD
    #[arg(long, value_name = "DAY")]
    to: String,
}

#[derive(Parser)]
struct StatsCommand {
    /// The tag name
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Parser)]
struct ExportCommand {
    /// Comma-separated tag names
    #[arg(short, long, value_name = "TAGS")]
    tags: String,

    /// Require every tag (AND); the default matches any tag (OR)
    #[arg(long)]
    all: bool,

    /// Range start, as YYYY-MM-DD
    #[arg(long, value_name = "DAY")]
    from: String,

    /// Range end, as YYYY-MM-DD
    #[arg(long, value_name = "DAY")]
    to: String,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli.command) {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures, unknown tags, duplicate
/// associations, and full days. Internal errors include database
/// failures and I/O errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<TagError>()
        .is_some_and(TagError::is_user_error)
}

fn run(command: &Commands) -> Result<()> {
    let db_path = get_database_path()?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    let service = TagService::new(db);

    match command {
        Commands::Tag(cmd) => run_tag(&service, cmd),
        Commands::Day(cmd) => run_day(&service, cmd),
        Commands::Month(cmd) => run_month(&service, cmd),
        Commands::Log(cmd) => run_log(&service, cmd),
        Commands::Filter(cmd) => run_filter(&service, cmd),
        Commands::Stats(cmd) => run_stats(&service, cmd),
        Commands::Export(cmd) => run_export(&service, cmd),
    }
}

fn run_tag(service: &TagService, command: &TagCommands) -> Result<()> {
    match command {
        TagCommands::Add(cmd) => {
            let tag = service.create_or_get_tag(&cmd.name, cmd.description.as_deref())?;
            println!("Tag '{}' (id: {})", tag.display_name, tag.id);
        }
        TagCommands::List => {
            let tags = service.list_tags()?;
            if tags.is_empty() {
                println!("No tags yet");
            }
            for tag in tags {
                match &tag.description {
                    Some(description) => {
                        println!("{} ({} days) - {}", tag.display_name, tag.usage_count, description)
                    }
                    None => println!("{} ({} days)", tag.display_name, tag.usage_count),
                }
            }
        }
        TagCommands::Describe(cmd) => {
            let tag = lookup_tag(service, &cmd.name)?;
            let updated = service.update_description(tag.id, cmd.description.as_deref())?;
            match &updated.description {
                Some(description) => {
                    println!("'{}' described as: {}", updated.display_name, description)
                }
                None => println!("Cleared description of '{}'", updated.display_name),
            }
        }
        TagCommands::Delete(cmd) => {
            let tag = lookup_tag(service, &cmd.name)?;
            service.delete_tag(tag.id)?;
            println!("Deleted tag '{}' and its day associations", tag.display_name);
        }
    }
    Ok(())
}

fn run_day(service: &TagService, command: &DayCommands) -> Result<()> {
    match command {
        DayCommands::Tag(cmd) => {
            let tag = service.create_or_get_tag(&cmd.name, None)?;
            service.add_tag_to_day(tag.id, &cmd.day)?;
            println!("Tagged {} with '{}'", cmd.day, tag.display_name);
        }
        DayCommands::Untag(cmd) => {
            // Reconciliation flow: a missing tag or association is a
            // successful no-op here, not an error.
            match service.tag_by_name(&cmd.name)? {
                Some(tag) => {
                    if service.remove_tag_from_day(tag.id, &cmd.day)? {
                        println!("Removed '{}' from {}", tag.display_name, cmd.day);
                    } else {
                        println!("{} was not tagged with '{}'", cmd.day, tag.display_name);
                    }
                }
                None => println!("No tag named '{}'; nothing to remove", cmd.name),
            }
        }
        DayCommands::Show(cmd) => {
            let tags = service.tags_for_day(&cmd.day)?;
            if tags.is_empty() {
                println!("{} has no tags", cmd.day);
            } else {
                let names: Vec<&str> = tags.iter().map(|t| t.display_name.as_str()).collect();
                println!("{}: {}", cmd.day, names.join(", "));
            }
        }
    }
    Ok(())
}

fn run_month(service: &TagService, command: &MonthCommand) -> Result<()> {
    let projector = MonthProjector::new(service);
    let view = projector.month(command.year, command.month)?;

    if view.days.is_empty() {
        println!("No tagged days in {:04}-{:02}", command.year, command.month);
        return Ok(());
    }
    for (day, names) in &view.days {
        println!("{}: {}", format_day(*day), names.join(", "));
    }
    Ok(())
}

fn run_log(service: &TagService, command: &LogCommands) -> Result<()> {
    let entries = EntryService::new(service.database());

    match command {
        LogCommands::Movement(cmd) => {
            let movement = BowelMovement {
                consistency: cmd.consistency,
                urgency: cmd.urgency,
                notes: cmd.notes.clone(),
            };
            let entry = entries.log_movement(&cmd.day, &cmd.time, movement)?;
            println!("Logged movement entry (id: {})", entry.id);
        }
        LogCommands::Note(cmd) => {
            let note = NoteDetails {
                category: cmd.category.clone(),
                content: cmd.content.clone(),
                tags: cmd.tags.as_deref().map(parse_tags).filter(|t| !t.is_empty()),
            };
            let entry = entries.log_note(&cmd.day, &cmd.time, note)?;
            println!("Logged note entry (id: {})", entry.id);
        }
    }
    Ok(())
}

fn run_filter(service: &TagService, command: &FilterCommand) -> Result<()> {
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(service, &entries);

    let filter = build_filter(&command.tags, command.all);
    let matched = engine.entries_by_tags(&filter, &command.from, &command.to)?;

    if matched.is_empty() {
        println!("No entries on matching days");
        return Ok(());
    }
    for tagged in &matched {
        let entry = &tagged.entry;
        let names: Vec<&str> = tagged.day_tags.iter().map(|t| t.display_name.as_str()).collect();
        let summary = match (&entry.bowel_movement, &entry.note) {
            (Some(movement), _) => format!(
                "movement consistency={} urgency={}",
                movement.consistency, movement.urgency
            ),
            (_, Some(note)) => format!("note [{}] {}", note.category, note.content),
            _ => entry.kind.to_string(),
        };
        println!(
            "{} {}  {}  (tags: {})",
            format_day(entry.day),
            format_clock(entry.clock),
            summary,
            names.join(", ")
        );
    }
    Ok(())
}

fn run_stats(service: &TagService, command: &StatsCommand) -> Result<()> {
    let entries = EntryService::new(service.database());
    let reporter = StatsReporter::new(service, &entries);

    let tag = lookup_tag(service, &command.name)?;
    let Some(stats) = reporter.statistics_for_tag(tag.id)? else {
        println!("No tag named '{}'", command.name);
        return Ok(());
    };

    println!("Statistics for '{}'", stats.tag.display_name);
    println!("  tagged days:      {}", stats.tagged_days);
    println!("  movement entries: {}", stats.movement_entries);
    println!("  entries per day:  {:.2}", stats.entries_per_day);
    if let Some(mean) = stats.mean_consistency {
        println!("  mean consistency: {mean:.2}");
    }
    if let Some(mean) = stats.mean_urgency {
        println!("  mean urgency:     {mean:.2}");
    }
    if let (Some(first), Some(last)) = (&stats.first_day, &stats.last_day) {
        println!("  range:            {first} to {last}");
    }
    for (value, count) in &stats.consistency_distribution {
        println!("  consistency {value}: {count}");
    }
    for (value, count) in &stats.urgency_distribution {
        println!("  urgency {value}: {count}");
    }
    Ok(())
}

fn run_export(service: &TagService, command: &ExportCommand) -> Result<()> {
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(service, &entries);

    let filter = build_filter(&command.tags, command.all);
    export::write_json(&command.out, &engine, &filter, &command.from, &command.to)?;
    println!("Exported to {}", command.out.display());
    Ok(())
}

fn lookup_tag(service: &TagService, name: &str) -> Result<Tag> {
    Ok(service
        .tag_by_name(name)?
        .ok_or_else(|| TagError::UnknownTag(name.to_string()))?)
}

fn build_filter(tags: &str, all: bool) -> TagFilter {
    let names = parse_tags(tags);
    if all {
        TagFilter::all(names)
    } else {
        TagFilter::any(names)
    }
}

/// Parses comma-separated tags from a string.
///
/// Splits on commas, trims whitespace from each tag, and filters out empty strings.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
