use anyhow::{Context, Result, bail};
use pageflow_config::Config;
use pageflow_engine::{
    CanonicalOffset, EditSurface, EditorSession, FileStore, HistoryManager, HistoryOutcome,
    HistoryStatus, Page, PaginationReport, ReflowOutcome, Selection, SelectionSurface,
    TextMetrics, from_canonical, io, paginate, resolve,
};
use std::{env, path::PathBuf, process};

const USAGE: &str = "\
Usage:
  pageflow paginate <file> [--out <file>]
  pageflow locate <file> <offset>
  pageflow reflow <pages-file>
  pageflow history status
  pageflow history init <file>
  pageflow history push <file>
  pageflow history undo
  pageflow history redo
  pageflow history clear
  pageflow history list";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Config path: {}", Config::config_path().display());
            process::exit(1);
        }
    };

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    match arg_refs.as_slice() {
        ["paginate", file] => paginate_file(&config, file, None),
        ["paginate", file, "--out", out] => paginate_file(&config, file, Some(out)),
        ["locate", file, offset] => locate(&config, file, offset),
        ["reflow", file] => reflow_file(&config, file),
        ["history", rest @ ..] => history(&config, rest),
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
}

fn paginate_file(config: &Config, file: &str, out: Option<&str>) -> Result<()> {
    let document = io::read_document(&PathBuf::from(file))
        .with_context(|| format!("Failed to read {file}"))?;
    let metrics = TextMetrics::for_capacity(&config.page);
    let pages = paginate(&document, &config.page, &metrics);

    let report = PaginationReport::new(&pages, &config.page);
    print!("{report}");
    println!(
        "{} blocks on {} pages",
        report.block_count(),
        report.pages.len()
    );

    if let Some(out) = out {
        io::write_pages(&PathBuf::from(out), &pages)
            .with_context(|| format!("Failed to write {out}"))?;
        log::info!("Wrote {} pages to {}", pages.len(), out);
    }
    Ok(())
}

fn locate(config: &Config, file: &str, offset: &str) -> Result<()> {
    let offset: usize = offset
        .parse()
        .with_context(|| format!("Offset must be a non-negative integer, got '{offset}'"))?;
    let document = io::read_document(&PathBuf::from(file))
        .with_context(|| format!("Failed to read {file}"))?;
    let metrics = TextMetrics::for_capacity(&config.page);
    let pages = paginate(&document, &config.page, &metrics);

    let Some(address) = from_canonical(CanonicalOffset(offset), &pages) else {
        bail!("{file} has no content to locate in");
    };
    println!(
        "page {} offset {}",
        address.page_index + 1,
        address.char_offset
    );
    if let Some(selection) = resolve(&address, &pages) {
        let point = selection.anchor;
        println!("block {} offset {}", point.block + 1, point.offset);
    }
    Ok(())
}

/// A paginated file on disk acting as the edit surface
struct PagesFile {
    pages: Vec<Page>,
}

impl SelectionSurface for PagesFile {
    fn selection(&self) -> Option<Selection> {
        None
    }

    fn set_selection(&mut self, _selection: Selection) {}
}

impl EditSurface for PagesFile {
    fn pages(&self) -> Option<Vec<Page>> {
        (!self.pages.is_empty()).then(|| self.pages.clone())
    }

    fn render(&mut self, pages: &[Page]) {
        self.pages = pages.to_vec();
    }
}

/// Re-split an edited pages file in place and record the edit in history
fn reflow_file(config: &Config, file: &str) -> Result<()> {
    let path = PathBuf::from(file);
    let mut surface = PagesFile {
        pages: io::read_pages(&path).with_context(|| format!("Failed to read {file}"))?,
    };

    let store = FileStore::new(&config.history.store_path);
    let history = HistoryManager::open(store, config.history.to_history_config());
    let mut session = EditorSession::mount(
        None,
        config.page.clone(),
        TextMetrics::for_capacity(&config.page),
        history,
        config.editor.quiet_period(),
    );

    let ReflowOutcome::Reflowed {
        page_count,
        history_saved,
    } = session.reflow_now(&mut surface)
    else {
        bail!("{file} has no pages to reflow");
    };
    io::write_pages(&path, session.pages()).with_context(|| format!("Failed to write {file}"))?;

    println!(
        "{page_count} pages, {}",
        if history_saved { "edit saved to history" } else { "no new history state" }
    );
    print_status(&session.status());
    Ok(())
}

fn history(config: &Config, args: &[&str]) -> Result<()> {
    let store = FileStore::new(&config.history.store_path);
    let mut manager = HistoryManager::open(store, config.history.to_history_config());

    match args {
        ["status"] => print_status(&manager.status()),
        ["init", file] => {
            let markup = read_markup(file)?;
            let Some(status) = manager.initialize_history(&markup) else {
                bail!("Could not write history to {}", config.history.store_path.display());
            };
            print_status(&status);
        }
        ["push", file] => {
            let markup = read_markup(file)?;
            let Some(status) = manager.save_to_history(&markup) else {
                bail!("Could not write history to {}", config.history.store_path.display());
            };
            print_status(&status);
        }
        ["undo"] => print_outcome(manager.undo()),
        ["redo"] => print_outcome(manager.redo()),
        ["clear"] => {
            manager.clear_history();
            print_status(&manager.status());
        }
        ["list"] => {
            let current = manager.meta().current_index;
            for snapshot in manager.snapshots() {
                let marker = if snapshot.slot_index == current { '*' } else { ' ' };
                println!(
                    "{marker} slot {:>2}  {}  {} chars",
                    snapshot.slot_index,
                    snapshot.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    snapshot.content.chars().count()
                );
            }
        }
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
    Ok(())
}

fn read_markup(file: &str) -> Result<String> {
    let document = io::read_document(&PathBuf::from(file))
        .with_context(|| format!("Failed to read {file}"))?;
    Ok(document.to_markup())
}

fn print_status(status: &HistoryStatus) {
    println!(
        "{} states, current slot {}, undo: {}, redo: {}",
        status.total_states,
        status.current_index,
        if status.can_undo { "yes" } else { "no" },
        if status.can_redo { "yes" } else { "no" }
    );
}

fn print_outcome(outcome: HistoryOutcome) {
    if let Some(message) = &outcome.message {
        eprintln!("{message}");
    }
    if let Some(content) = &outcome.content {
        println!("{content}");
    }
    print_status(&outcome.status);
}
