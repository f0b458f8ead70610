//! `abcld` command-line front end for the board editor.
//!
//! # Responsibility
//! - Apply one editing command to the saved board and persist the result.
//! - Print the re-rendered board, or a one-line notice on failure.
//!
//! # Invariants
//! - A failed command exits non-zero and leaves the saved board untouched.

use abcld_core::db::{open_db, DbError};
use abcld_core::{
    decode, default_log_level, delete_week_prompt, export_filename, export_json, init_logging,
    AssessmentType, Autosave, BoardChange, BoardError, BoardService, BoardView, CardFields,
    CodecError, ConfigError, DeliveryStyle, EditorConfig, EntityRef, ExportError, ExportKind,
    LearningType, MoveDirection, SqliteBoardStore, StoreError,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "abcld", version)]
#[command(about = "Plan learning activities week by week on an ABC learning design board")]
struct Cli {
    /// Board store file
    #[arg(long, global = true, env = "ABCLD_DB", default_value = "abcld.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true, env = "ABCLD_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "ABCLD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the board
    Show,
    /// Rename the board (blank restores the default title)
    Title { title: String },
    /// Append a week at the end
    AddWeek,
    /// Edit a week's title or start date
    EditWeek {
        week_id: String,
        #[arg(long)]
        title: Option<String>,
        /// YYYY-MM-DD, or "" to clear
        #[arg(long)]
        start_date: Option<String>,
    },
    /// Delete a week and every activity in it
    DeleteWeek {
        week_id: String,
        /// Skip the confirmation notice and delete
        #[arg(long)]
        yes: bool,
    },
    /// Swap a week with its neighbour
    MoveWeek {
        week_id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Add an activity card to a week
    AddCard {
        week_id: String,
        #[command(flatten)]
        fields: CardArgs,
    },
    /// Edit an activity card; omitted options keep their current value
    EditCard {
        card_id: String,
        #[command(flatten)]
        fields: CardArgs,
    },
    /// Delete an activity card
    DeleteCard { card_id: String },
    /// Move an activity card to the end of another week
    MoveCard { card_id: String, week_id: String },
    /// Renumber a week's cards 1..N in display order
    NormalizeCards { week_id: String },
    /// Write the board as a JSON download
    ExportJson {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Replace the board with a JSON file
    ImportJson { path: PathBuf },
    /// Print the download file name for an export kind
    Filename {
        #[arg(value_enum, default_value = "png")]
        kind: Kind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Left,
    Right,
}

impl From<Direction> for MoveDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Left => MoveDirection::Left,
            Direction::Right => MoveDirection::Right,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Png,
    Pdf,
    Json,
}

impl From<Kind> for ExportKind {
    fn from(value: Kind) -> Self {
        match value {
            Kind::Png => ExportKind::Png,
            Kind::Pdf => ExportKind::Pdf,
            Kind::Json => ExportKind::Json,
        }
    }
}

/// Card form fields. Text options accept "" to clear the field.
#[derive(Args, Default)]
struct CardArgs {
    #[arg(long)]
    title: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    delivery_date: Option<String>,
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    delivered_by: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Comma separated, e.g. acquisition,practice ("" clears)
    #[arg(long)]
    learning_types: Option<String>,
    #[arg(long)]
    delivery_style: Option<String>,
    #[arg(long)]
    assessment: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl CardArgs {
    /// Overlays the given options on `base`.
    fn apply_to(self, mut base: CardFields) -> Result<CardFields, CliError> {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(raw) = self.delivery_date {
            base.delivery_date = parse_optional::<NaiveDate>(&raw)?;
        }
        if let Some(duration) = self.duration {
            base.duration = Some(duration);
        }
        if let Some(delivered_by) = self.delivered_by {
            base.delivered_by = Some(delivered_by);
        }
        if let Some(description) = self.description {
            base.description = Some(description);
        }
        if let Some(raw) = self.learning_types {
            base.learning_types = raw
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(LearningType::from_str)
                .collect::<Result<BTreeSet<_>, _>>()
                .map_err(|err| CliError::Input(err.to_string()))?;
        }
        if let Some(raw) = self.delivery_style {
            base.delivery_style = parse_optional::<DeliveryStyle>(&raw)?;
        }
        if let Some(raw) = self.assessment {
            base.assessment_type = parse_optional::<AssessmentType>(&raw)?;
        }
        if let Some(notes) = self.notes {
            base.notes = Some(notes);
        }
        Ok(base)
    }
}

/// Blank input means "no value".
fn parse_optional<T>(raw: &str) -> Result<Option<T>, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|err| CliError::Input(format!("`{trimmed}`: {err}")))
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Db(DbError),
    Store(StoreError),
    Board(BoardError),
    Codec(CodecError),
    Export(ExportError),
    Io(std::io::Error),
    Input(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "cannot open board store: {err}"),
            Self::Store(err) => write!(f, "board store error: {err}"),
            Self::Board(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "error importing file: {err}"),
            Self::Export(err) => write!(f, "export failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Input(message) => write!(f, "invalid input {message}"),
        }
    }
}

impl Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BoardError> for CliError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<CodecError> for CliError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<ExportError> for CliError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("abcld: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("abcld: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = EditorConfig::default();
    config.validate()?;

    let conn = open_db(&cli.db)?;
    let store = SqliteBoardStore::try_new(&conn)?;
    let mut autosave = Autosave::new(store, &config);
    let saved = autosave.load_board();
    let first_run = saved.is_none();
    let mut service = BoardService::from_saved_or_default(saved, &config);

    let change = execute(&mut service, cli.command, Local::now().date_naive())?;
    info!(
        "event=cli_command module=cli status=ok changed={}",
        change.requires_render()
    );

    if change.requires_render() {
        print!("{}", BoardView::project(service.board()).render_text());
    }
    if change.requires_render() || first_run {
        autosave.mark_dirty();
    }
    autosave.flush_on_exit(&mut service)?;
    Ok(())
}

fn execute(
    service: &mut BoardService,
    command: Command,
    today: NaiveDate,
) -> Result<BoardChange, CliError> {
    let change = match command {
        Command::Show => {
            print!("{}", BoardView::project(service.board()).render_text());
            BoardChange::Unchanged
        }
        Command::Title { title } => service.set_title(title),
        Command::AddWeek => service.add_week(),
        Command::EditWeek {
            week_id,
            title,
            start_date,
        } => {
            let week = service
                .board()
                .week(&week_id)
                .ok_or_else(|| BoardError::NotFound(EntityRef::Week(week_id.clone())))?;
            let title = title.unwrap_or_else(|| week.title.clone());
            let start_date = match start_date {
                Some(raw) => parse_optional::<NaiveDate>(&raw)?,
                None => week.start_date,
            };
            service.update_week(&week_id, title, start_date)?
        }
        Command::DeleteWeek { week_id, yes } => {
            let prompt = delete_week_prompt(service.board(), &week_id);
            match (prompt, yes) {
                (Some(prompt), false) => {
                    println!("{prompt} Re-run with --yes to confirm.");
                    BoardChange::Unchanged
                }
                _ => service.delete_week(&week_id)?,
            }
        }
        Command::MoveWeek { week_id, direction } => {
            service.move_week(&week_id, direction.into())?
        }
        Command::AddCard { week_id, fields } => {
            let fields = fields.apply_to(CardFields::default())?;
            service.add_card(&week_id, fields)?
        }
        Command::EditCard { card_id, fields } => {
            let current = service
                .board()
                .card(&card_id)
                .map(|card| card.fields())
                .ok_or_else(|| BoardError::NotFound(EntityRef::Card(card_id.clone())))?;
            let fields = fields.apply_to(current)?;
            service.update_card(&card_id, fields)?
        }
        Command::DeleteCard { card_id } => service.delete_card(&card_id)?,
        Command::MoveCard { card_id, week_id } => service.move_card_to_week(&card_id, &week_id)?,
        Command::NormalizeCards { week_id } => service.normalize_card_order(&week_id)?,
        Command::ExportJson { out_dir } => {
            let artifact = export_json(service.board(), today)?;
            let path = artifact.write_to(&out_dir)?;
            println!("{}", path.display());
            BoardChange::Unchanged
        }
        Command::ImportJson { path } => {
            let text = std::fs::read_to_string(&path)?;
            let board = decode(&text)?;
            service.replace_board(board)
        }
        Command::Filename { kind } => {
            println!("{}", export_filename(&service.board().title, today, kind.into()));
            BoardChange::Unchanged
        }
    };
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::{execute, CardArgs, Cli, Command, Direction};
    use abcld_core::{BoardChange, BoardService, EditorConfig, LearningType};
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_move_week_direction() {
        let cli = Cli::try_parse_from(["abcld", "move-week", "id_1", "left"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::MoveWeek {
                direction: Direction::Left,
                ..
            }
        ));
    }

    #[test]
    fn card_args_overlay_and_clear() {
        let mut service = BoardService::with_default_board(&EditorConfig::default());
        let week = service.board().sorted_weeks()[0].id.clone();
        let args = CardArgs {
            title: Some("Lab".to_string()),
            learning_types: Some("practice, production".to_string()),
            delivery_style: Some("lab".to_string()),
            ..CardArgs::default()
        };
        let change = execute(
            &mut service,
            Command::AddCard {
                week_id: week,
                fields: args,
            },
            today(),
        )
        .unwrap();
        let card_id = match &change {
            BoardChange::CardAdded { card_id, .. } => card_id.clone(),
            other => panic!("unexpected change: {other:?}"),
        };

        let clear = CardArgs {
            delivery_style: Some(String::new()),
            ..CardArgs::default()
        };
        execute(
            &mut service,
            Command::EditCard {
                card_id: card_id.clone(),
                fields: clear,
            },
            today(),
        )
        .unwrap();

        let card = service.board().card(&card_id).unwrap();
        assert_eq!(card.title, "Lab");
        assert_eq!(card.delivery_style, None);
        assert!(card.learning_types.contains(&LearningType::Production));
    }

    #[test]
    fn delete_week_without_yes_only_prompts() {
        let mut service = BoardService::with_default_board(&EditorConfig::default());
        let week = service.board().sorted_weeks()[0].id.clone();
        let change = execute(
            &mut service,
            Command::DeleteWeek {
                week_id: week,
                yes: false,
            },
            today(),
        )
        .unwrap();
        assert_eq!(change, BoardChange::Unchanged);
        assert_eq!(service.board().weeks.len(), 8);
    }

    #[test]
    fn bad_date_is_input_error() {
        let mut service = BoardService::with_default_board(&EditorConfig::default());
        let week = service.board().sorted_weeks()[0].id.clone();
        let err = execute(
            &mut service,
            Command::EditWeek {
                week_id: week,
                title: None,
                start_date: Some("31/02/2025".to_string()),
            },
            today(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid input"));
    }
}
