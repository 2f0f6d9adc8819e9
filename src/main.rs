use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use notion_translator::config::{self, Credentials, DotenvMode};
use notion_translator::mt::language::{SUPPORTED_SOURCE_LANGUAGES, SUPPORTED_TARGET_LANGUAGES};
use notion_translator::mt::{
    DeeplTranslator, LanguagePair, MachineTranslator, MockMode, MockTranslator,
    validate_source_language, validate_target_language,
};
use notion_translator::notion::NotionClient;
use notion_translator::pipeline::{
    DotProgress, LanguageMode, PageTranslator, TableMode, TranslationPolicy,
};
use notion_translator::PipelineError;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DISCLAIMER: &str = "Disclaimer:\nSome parts might not be perfect.\nIf the generated page is missing something, please adjust the details on your own.";

fn cli() -> Command {
    Command::new("notion-translator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CLI to translate a Notion page to a different language")
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .value_name("https://www.notion.so/...")
                .help("URL or id of the page to translate")
                .required(true),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .value_name("LANG")
                .help(format!(
                    "Source language ({})",
                    SUPPORTED_SOURCE_LANGUAGES.join(",").to_lowercase()
                ))
                .required(true),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .value_name("LANG")
                .help(format!(
                    "Target language ({})",
                    SUPPORTED_TARGET_LANGUAGES.join(",").to_lowercase()
                ))
                .required(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .help("Log API requests and responses")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use mock translator instead of DeepL")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .value_name("N")
                .help("Blocks appended per request (0 sends everything at once)")
                .value_parser(value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("table-mode")
                .long("table-mode")
                .help("Keep tables with translated cells, or replace them by a notice")
                .value_parser(["preserve", "notice"])
                .default_value("preserve"),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv(DotenvMode::Override);
    let matches = cli().get_matches();

    let filter = if matches.get_flag("debug") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("\nERROR: {}\n", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<(), String> {
    let arg = |name: &str| {
        matches
            .get_one::<String>(name)
            .cloned()
            .unwrap_or_default()
    };
    let url = arg("url");
    let use_mock = matches.get_flag("mock");

    let source = validate_source_language(&arg("from")).map_err(|e| e.to_string())?;
    let target = validate_target_language(&arg("to")).map_err(|e| e.to_string())?;
    let table_mode: TableMode = arg("table-mode").parse()?;
    let batch_size = matches.get_one::<usize>("batch-size").copied().unwrap_or(10);
    let policy = TranslationPolicy::default()
        .with_batch_size((batch_size > 0).then_some(batch_size))
        .with_table_mode(table_mode);
    debug!(url = %url, source = %source, target = %target, mock = use_mock, ?policy, "Passed options");

    let credentials = Credentials::from_env(!use_mock).map_err(|e| e.to_string())?;
    let store = NotionClient::new(credentials.notion_token.clone()).map_err(|e| e.to_string())?;
    let translator: Arc<dyn MachineTranslator> = match &credentials.deepl_token {
        Some(token) if !use_mock => {
            Arc::new(DeeplTranslator::new(token.clone()).map_err(|e| e.to_string())?)
        }
        _ => Arc::new(MockTranslator::new(MockMode::Suffix)),
    };

    let pipeline = PageTranslator::new(Arc::new(store), translator, policy)
        .with_progress(Arc::new(DotProgress));

    print!(
        "\nWait a minute! Now translating the following Notion page:\n{}\n\n(this may take some time) ...",
        url
    );
    let _ = std::io::stdout().flush();

    let outcome = pipeline
        .translate_page(&url, LanguageMode::Fixed(LanguagePair::new(source, target)))
        .await
        .map_err(|e| describe(&e))?;

    println!("... Done!\n\n{}\n", DISCLAIMER);
    if !outcome.walk.dropped.is_empty() {
        println!("Skipped blocks:");
        for dropped in &outcome.walk.dropped {
            println!("  * {} ({})", dropped.kind, dropped.reason);
        }
        println!();
    }
    println!(
        "Here is the translated Notion page:\n{}\n",
        outcome.url.unwrap_or(outcome.page_id)
    );
    Ok(())
}

/// Operator-facing explanation of a failed run
fn describe(err: &PipelineError) -> String {
    match err {
        PipelineError::NotAPage(_) => {
            "This URL is a database. This tool currently supports only pages.".to_string()
        }
        PipelineError::Unreadable { source, .. } => format!(
            "Failed to read the page content!\n\nError details: {}\n\nPlease make sure the following:\n * The page is shared with your app\n * The API token is the one for this workspace",
            source
        ),
        other => other.to_string(),
    }
}
