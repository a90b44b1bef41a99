use crate::cli::{Command, InputFormat, UpdateCommand};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::{Database, Repository};
use shelf_config::Config;
use shelf_openlibrary::models::{EditionId, Isbn};
use shelf_openlibrary::source::OpenLibrary;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, BufReader};

pub async fn execute(command: Command, config: &Config) -> Result<()> {
    // The only command that never touches the catalog.
    if let Command::Lookup { isbn } = &command {
        return lookup(config, isbn).await;
    }
    let db = open(&config.database).await?;
    let result = dispatch(command, &db, config).await;
    db.close().await;
    result
}

async fn dispatch(command: Command, db: &Database, config: &Config) -> Result<()> {
    match command {
        Command::Migrate => migrate(db).await,
        Command::Import { input, format, exceptions, dry_run } => {
            import(db, config, &input, format, exceptions.as_deref(), dry_run).await
        },
        Command::Lookup { isbn } => lookup(config, &isbn).await,
        Command::Export { output } => export(db, &output).await,
        Command::List => list(db).await,
        Command::Update { target: UpdateCommand::Author { old, new } } => {
            let rows = Repository::from(db).rename_author(&old, &new).await.or_raise(|| ErrorKind::Catalog)?;
            println!("{rows} row(s) affected");
            Ok(())
        },
        Command::Update { target: UpdateCommand::Title { olid, title } } => {
            let olid = edition_key(&olid)?;
            let rows = Repository::from(db).override_title(&olid, &title).await.or_raise(|| ErrorKind::Catalog)?;
            println!("{rows} row(s) affected");
            Ok(())
        },
        Command::Delete { olid } => {
            let olid = edition_key(&olid)?;
            let rows = Repository::from(db).delete_book(&olid).await.or_raise(|| ErrorKind::Catalog)?;
            println!("{rows} row(s) affected");
            Ok(())
        },
    }
}

/// Open the catalog, creating its parent directory on first use.
async fn open(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
    }
    Database::connect(path).await.or_raise(|| ErrorKind::Catalog)
}

fn source(config: &Config) -> Result<OpenLibrary> {
    OpenLibrary::builder()
        .origin(config.openlibrary.origin.as_str())
        .user_agent(config.openlibrary.user_agent.as_str())
        .timeout(config.openlibrary.timeout())
        .build()
        .or_raise(|| ErrorKind::Lookup)
}

/// Accept `OL1M` as well as `/books/OL1M`; books are stored under the latter.
fn edition_key(input: &str) -> Result<String> {
    let id: EditionId = input.parse::<EditionId>().or_raise(|| ErrorKind::Argument)?;
    Ok(id.key())
}

async fn migrate(db: &Database) -> Result<()> {
    // Connecting already migrated; this only reports on it.
    db.migrate().await.or_raise(|| ErrorKind::Catalog)?;
    tracing::info!("Catalog schema is up to date");
    Ok(())
}

async fn import(
    db: &Database,
    config: &Config,
    input: &Path,
    format: InputFormat,
    exceptions: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let source = source(config)?;
    let repo = Repository::new(db.pool().clone(), dry_run);
    let reader = tokio::fs::File::open(input).await.or_raise(|| ErrorKind::Io(input.to_path_buf()))?;
    let mut writer = match exceptions {
        Some(path) => Some(tokio::fs::File::create(path).await.or_raise(|| ErrorKind::Io(path.to_path_buf()))?),
        None => None,
    };
    let summary = shelf_library::import::run(
        &source,
        &repo,
        format.into(),
        BufReader::new(reader),
        writer.as_mut().map(|file| file as &mut (dyn AsyncWrite + Unpin)),
    )
    .await
    .or_raise(|| ErrorKind::Import)?;
    if repo.is_dry_run() {
        tracing::warn!("Dry run; nothing was written to the catalog");
    }
    println!(
        "inserted: {}, already present: {}, failed: {}",
        summary.inserted, summary.present, summary.failed
    );
    Ok(())
}

async fn lookup(config: &Config, isbn: &str) -> Result<()> {
    let isbn: Isbn = isbn.parse::<Isbn>().or_raise(|| ErrorKind::Argument)?;
    let book = shelf_openlibrary::lookup_by_isbn(&source(config)?, &isbn).await.or_raise(|| ErrorKind::Lookup)?;
    println!("{}", book.title);
    println!("  by      {}", book.byline());
    println!("  olid    {}", book.olid);
    println!("  isbn13  {}", book.isbn_13);
    println!("  isbn10  {}", book.isbn_10);
    Ok(())
}

async fn export(db: &Database, output: &Path) -> Result<()> {
    let repo = Repository::from(db);
    let rows = if output == Path::new("-") {
        shelf_library::export::export(&repo, &mut tokio::io::stdout()).await
    } else {
        let mut file = tokio::fs::File::create(output).await.or_raise(|| ErrorKind::Io(output.to_path_buf()))?;
        shelf_library::export::export(&repo, &mut file).await
    }
    .or_raise(|| ErrorKind::Export)?;
    tracing::debug!(rows, output = %output.display(), "Exported catalog");
    Ok(())
}

async fn list(db: &Database) -> Result<()> {
    let entries = Repository::from(db).list_books().await.or_raise(|| ErrorKind::Catalog)?;
    for entry in &entries {
        println!("{}\t{}\t{}", entry.title(), entry.book.byline(), entry.book.olid);
    }
    Ok(())
}

/// Resolve the configuration, letting `--database` win over every other
/// source.
pub fn configure(file: Option<&Path>, database: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load(file).or_raise(|| ErrorKind::Config)?;
    if let Some(database) = database {
        config.database = database;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("OL1M", "/books/OL1M")]
    #[case("/books/OL7353617M", "/books/OL7353617M")]
    fn test_edition_key(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(edition_key(input).unwrap(), expected);
    }

    #[test]
    fn test_edition_key_rejects_other_keys() {
        let err = edition_key("/authors/OL1A").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Argument));
    }

    #[tokio::test]
    async fn test_commands_against_a_file_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let config = configure(None, Some(dir.path().join("nested").join("catalog.sqlite3"))).unwrap();
        execute(Command::Migrate, &config).await.unwrap();
        assert!(config.database.is_file());
        let delete = Command::Delete { olid: "OL404M".to_string() };
        execute(delete, &config).await.unwrap();
        let invalid = Command::Delete { olid: "not-an-olid".to_string() };
        assert!(execute(invalid, &config).await.is_err());
    }
}
