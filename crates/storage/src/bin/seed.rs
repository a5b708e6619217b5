use std::fmt;

use chrono::{DateTime, Utc};
use civic_core::model::{
    Category, Institution, InstitutionDraft, InstitutionId, Module, ModuleId, Question,
    QuestionId, UserId,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: Option<UserId>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value (expected UUID): {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("CIVIC_DB_URL").unwrap_or_else(|_| "sqlite:civic.sqlite3".into());
        let mut user: Option<UserId> = None;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUser { raw: value.clone() })?;
                    user = Some(parsed);
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, user, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:civic.sqlite3)");
    eprintln!("  --user <uuid>             Also complete the first module for this user");
    eprintln!("  --now <rfc3339>           Fixed completion time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CIVIC_DB_URL, RUST_LOG");
}

type SampleQuestion = (&'static str, [&'static str; 3], &'static str);

/// Starter catalog: one module per category, each with a short quiz, plus one
/// reading-only module without questions.
fn sample_catalog() -> Result<(Vec<Module>, Vec<Question>), civic_core::Error> {
    let entries: [(Category, &str, &str, &str, &[SampleQuestion]); 4] = [
        (
            Category::Civic,
            "beginner",
            "Know Your Rights",
            "Every citizen has the right to vote, to free expression and to a fair trial.",
            &[
                (
                    "Which right lets you choose your representatives?",
                    ["Voting", "Taxation", "Conscription"],
                    "Voting",
                ),
                (
                    "A fair trial includes the right to...",
                    ["Legal counsel", "A secret verdict", "No appeal"],
                    "Legal counsel",
                ),
            ],
        ),
        (
            Category::Mental,
            "beginner",
            "Managing Stress",
            "Stress is a normal response. Breathing, rest and talking to someone all help.",
            &[
                (
                    "Which is a healthy way to handle stress?",
                    ["Deep breathing", "Skipping sleep", "Isolating yourself"],
                    "Deep breathing",
                ),
                (
                    "Talking to a trusted person about worries is...",
                    ["Helpful", "A sign of weakness", "Pointless"],
                    "Helpful",
                ),
            ],
        ),
        (
            Category::Drugs,
            "intermediate",
            "Substance Awareness",
            "Substance misuse affects health, relationships and the law. Help is available.",
            &[(
                "Where can you find confidential support?",
                ["A local support institution", "Nowhere", "Only the police"],
                "A local support institution",
            )],
        ),
        (
            Category::Civic,
            "advanced",
            "How Local Government Works",
            "Councils manage local services. Meetings are usually open to the public.",
            &[],
        ),
    ];

    let mut modules = Vec::with_capacity(entries.len());
    let mut questions = Vec::new();
    let mut next_question = 1_u64;

    for (idx, (category, level, title, content, quiz)) in entries.into_iter().enumerate() {
        let module_id = ModuleId::new(idx as u64 + 1);
        modules.push(Module::new(module_id, category, level, title, content)?);

        for (text, options, correct) in quiz {
            let options = options.iter().map(|o| (*o).to_owned()).collect();
            questions.push(Question::new(
                QuestionId::new(next_question),
                module_id,
                *text,
                options,
                *correct,
            )?);
            next_question += 1;
        }
    }

    Ok((modules, questions))
}

/// A few directory entries, free and paid.
fn sample_institutions() -> Result<Vec<Institution>, civic_core::Error> {
    let entries = [
        (
            "Youth Support Line",
            "Nationwide",
            "Free confidential phone counselling",
            Some("0800 123 456"),
            None,
            false,
        ),
        (
            "Community Legal Aid Centre",
            "City Centre",
            "Advice on civil rights, housing and employment",
            Some("021 555 0101"),
            Some("info@legalaid.example.org"),
            false,
        ),
        (
            "Harbour Recovery Clinic",
            "Harbour District",
            "Outpatient addiction treatment and family support",
            None,
            Some("intake@harbour-clinic.example.org"),
            true,
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (name, location, services, phone, email, paid))| {
            let draft = InstitutionDraft {
                name: name.to_owned(),
                location: Some(location.to_owned()),
                services: Some(services.to_owned()),
                phone: phone.map(str::to_owned),
                email: email.map(str::to_owned),
                paid,
            };
            draft
                .validate(InstitutionId::new(idx as u64 + 1))
                .map_err(civic_core::Error::from)
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let (modules, questions) = sample_catalog()?;
    for module in &modules {
        storage.catalog.upsert_module(module).await?;
    }
    for question in &questions {
        storage.catalog.upsert_question(question).await?;
    }
    log::info!(
        "upserted {} modules and {} questions",
        modules.len(),
        questions.len()
    );

    let institutions = sample_institutions()?;
    for institution in &institutions {
        storage.institutions.upsert_institution(institution).await?;
    }
    log::info!("upserted {} institutions", institutions.len());

    if let (Some(user), Some(first)) = (args.user, modules.first()) {
        let record = civic_core::model::ProgressRecord::completed(user, first.id(), now);
        storage.progress.upsert_progress(&record).await?;
        log::info!("marked module {} completed for {user}", first.id());
    }

    println!(
        "Seeded {} modules, {} questions and {} institutions into {}",
        modules.len(),
        questions.len(),
        institutions.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
