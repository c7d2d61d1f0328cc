//! `csearch shell`: line-oriented interactive search over one catalog.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use custsearch_query::Criteria;

use crate::report::{render_json, render_text};
use crate::search::load_catalog;
use crate::session::SearchSession;
use crate::CliError;

const HELP: &str = "\
commands:
  sources                 list catalog sources (* = active)
  use <source>            select a source
  filters                 list the active source's filters
  find name=value ...     search; quote values with spaces: name=\"Ali Karimi\"
  report                  print the last result again
  json                    print the last result as JSON
  help                    this text
  quit                    leave the shell";

pub fn cmd_shell(catalog_path: PathBuf, source: Option<String>) -> Result<(), CliError> {
    let (catalog, base_dir) = load_catalog(&catalog_path)?;
    let mut session = SearchSession::new(catalog, &base_dir);
    if let Some(name) = source {
        session.select(&name).map_err(CliError::session)?;
    }

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&mut session, stdin.lock(), &mut out, prompt)
        .map_err(|e| CliError::io(e.to_string()))
}

/// Read commands from `input` until EOF or `quit`. Command errors are
/// reported on `out` and do not end the loop.
pub(crate) fn run<R: BufRead, W: Write>(
    session: &mut SearchSession,
    input: R,
    out: &mut W,
    prompt: bool,
) -> io::Result<()> {
    if prompt {
        writeln!(out, "type `help` for commands")?;
    }
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "{}> ", session.active_name().unwrap_or("csearch"))?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words = match crate::util::split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };
        let Some((command, args)) = words.split_first() else {
            continue;
        };

        match command.as_str() {
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "sources" => {
                for (name, config) in &session.catalog().sources {
                    let marker = if session.active_name() == Some(name.as_str()) { "*" } else { " " };
                    writeln!(out, "{marker} {name}  {}", config.display_title(name))?;
                }
            }
            "use" => match args {
                [name] => match session.select(name) {
                    Ok(()) => writeln!(out, "using {name}")?,
                    Err(e) => writeln!(out, "error: {e}")?,
                },
                _ => writeln!(out, "usage: use <source>")?,
            },
            "filters" => match session.active_config() {
                Some(config) => {
                    for f in &config.filters {
                        writeln!(out, "  {:<16} {} ({})", f.name, f.label(), f.columns.join(" | "))?;
                    }
                }
                None => writeln!(out, "error: no source selected")?,
            },
            "find" => {
                let criteria = match args
                    .iter()
                    .map(|a| Criteria::parse_pair(a))
                    .collect::<Result<Criteria, _>>()
                {
                    Ok(c) => c,
                    Err(e) => {
                        writeln!(out, "error: {e}")?;
                        continue;
                    }
                };
                match session.search(&criteria) {
                    Ok(outcome) => {
                        let s = &outcome.consolidation.summary;
                        writeln!(
                            out,
                            "{} row(s) found in {:.2}s; {} after removing duplicates",
                            s.raw_rows,
                            outcome.elapsed.as_secs_f64(),
                            s.resolved_rows
                        )?;
                    }
                    Err(e) => {
                        writeln!(out, "error: {e}")?;
                        continue;
                    }
                }
                print_report(session, out)?;
            }
            "report" => print_report(session, out)?,
            "json" => match session.last_outcome() {
                Some(outcome) => match render_json(outcome) {
                    Ok(json) => writeln!(out, "{json}")?,
                    Err(e) => writeln!(out, "error: {e}")?,
                },
                None => writeln!(out, "error: nothing to show; run `find` first")?,
            },
            other => writeln!(out, "error: unknown command '{other}' (try `help`)")?,
        }
    }
    Ok(())
}

fn print_report<W: Write>(session: &SearchSession, out: &mut W) -> io::Result<()> {
    match (session.last_outcome(), session.active_config()) {
        (Some(outcome), Some(config)) => write!(out, "{}", render_text(outcome, &config.report)),
        _ => writeln!(out, "error: nothing to show; run `find` first"),
    }
}
