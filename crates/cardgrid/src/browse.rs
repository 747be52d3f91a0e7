//! Interactive browsing: commands read from stdin drive a controller.

use colored::Colorize;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

use cardgrid_core::endpoint::{Endpoint, Normalizer};
use cardgrid_core::item::{Item, SortKey, UnknownSortKey};
use cardgrid_core::state::{PageMove, Query};

use crate::adapter::{Adapter, HttpAdapter};
use crate::config::CardgridConfig;
use crate::controller::Controller;
use crate::domain::{parse_sort, print_verbose, settings, BrowseOptions, Domain};
use crate::output::{format_view_text, ListContext};
use crate::prelude::{eprintln, print, println, *};

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<K> {
    Search(String),
    Sort(K),
    Page(i64),
    Reload,
    Help,
    Quit,
}

/// Parse a command line; blank lines yield `None`
pub fn parse_command<K>(line: &str) -> Result<Option<Command<K>>, Error>
where
    K: FromStr<Err = UnknownSortKey>,
{
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(text) = line.strip_prefix('/') {
        return Ok(Some(Command::Search(text.trim().to_string())));
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_lowercase().as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "sort" => Command::Sort(rest.parse()?),
        "next" | "n" => Command::Page(page_count(line, rest)?),
        "prev" | "p" => Command::Page(-page_count(line, rest)?),
        "reload" | "r" => Command::Reload,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(Error::UnknownCommand(line.to_string())),
    };

    Ok(Some(command))
}

fn page_count(line: &str, rest: &str) -> Result<i64, Error> {
    if rest.is_empty() {
        return Ok(1);
    }
    rest.parse::<i64>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| Error::UnknownCommand(line.to_string()))
}

pub fn help_text<I: Item>() -> String {
    let sort_keys = <I::SortKey as SortKey<I>>::ALL
        .iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut result = format!("\n{}\n", "Commands".bright_white().bold());
    for (command, what) in [
        ("/<text>, search <text>", "filter cards (applied after a short pause)".to_string()),
        ("sort <key>", format!("sort by one of: {sort_keys}")),
        ("next [n], prev [n]", "move between pages".to_string()),
        ("reload", "reset search and sort, fetch again".to_string()),
        ("help", "show this help".to_string()),
        ("quit", "leave".to_string()),
    ] {
        result.push_str(&format!("  {:<24} {}\n", command.cyan(), what));
    }
    result
}

fn show<A, N>(controller: &Controller<A, N>, ctx: &ListContext)
where
    A: Adapter,
    N: Normalizer<Raw = A::Raw>,
{
    print!("{}", format_view_text(&controller.view(), ctx));
    println!("{}", "(type 'help' for commands)".bright_black());
}

/// Browse a domain until `quit` or end of input
pub async fn run_browse<E, N>(
    domain: &Domain,
    endpoint: E,
    normalizer: N,
    options: BrowseOptions,
    config: &CardgridConfig,
    global: &crate::Global,
) -> Result<()>
where
    E: Endpoint,
    N: Normalizer<Raw = E::Raw>,
{
    let query = Query {
        sort: parse_sort::<N::Item>(options.sort.as_deref())?,
        ..Query::default()
    };
    let settings = settings::<E, N::Item>(domain, &endpoint, options.page_size, query, config);

    if global.verbose {
        print_verbose(&endpoint, 1, settings.page_size);
    }

    let backend = endpoint.backend();
    let ctx = domain.context(backend);
    let adapter = HttpAdapter::new(endpoint, config.timeout)?;
    let mut controller = Controller::new(adapter, normalizer, settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", help_text::<N::Item>());
    controller.init();
    show(&controller, &ctx);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("Failed to read from stdin")? else {
                    break;
                };

                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => print!("{}", help_text::<N::Item>()),
                    Ok(Some(Command::Search(text))) => controller.on_search_input(text),
                    Ok(Some(Command::Sort(sort))) => {
                        controller.on_sort_change(sort);
                        show(&controller, &ctx);
                    }
                    Ok(Some(Command::Page(delta))) => match controller.on_page_change(delta) {
                        Ok(PageMove::Unchanged) => {
                            eprintln!("{}", "Already at the edge of the list.".yellow());
                        }
                        Ok(_) => show(&controller, &ctx),
                        Err(err) => eprintln!("{}", Error::from(err).to_string().yellow()),
                    },
                    Ok(Some(Command::Reload)) => {
                        controller.on_reload();
                        show(&controller, &ctx);
                    }
                    Err(err) => eprintln!("{}", err.to_string().red()),
                }
            }
            update = controller.next_update() => {
                log::debug!("update: {update:?}");
                show(&controller, &ctx);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardgrid_core::crypto::{Coin, CryptoSort};
    use cardgrid_core::recipes::RecipeSort;

    fn parse(line: &str) -> Option<Command<RecipeSort>> {
        parse_command(line).unwrap()
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(parse("/paella"), Some(Command::Search("paella".to_string())));
        assert_eq!(
            parse("search  tortilla de patatas "),
            Some(Command::Search("tortilla de patatas".to_string()))
        );
        assert_eq!(parse("search"), Some(Command::Search(String::new())));
        assert_eq!(parse("/"), Some(Command::Search(String::new())));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse("sort category"), Some(Command::Sort(RecipeSort::Category)));
        assert_eq!(parse("SORT Name"), Some(Command::Sort(RecipeSort::Name)));

        let err = parse_command::<RecipeSort>("sort calories").unwrap_err();
        assert!(err.to_string().contains("expected one of: name, category"));
    }

    #[test]
    fn test_parse_paging() {
        assert_eq!(parse("next"), Some(Command::Page(1)));
        assert_eq!(parse("n 3"), Some(Command::Page(3)));
        assert_eq!(parse("prev"), Some(Command::Page(-1)));
        assert_eq!(parse("p 2"), Some(Command::Page(-2)));
        assert!(parse_command::<RecipeSort>("next 0").is_err());
        assert!(parse_command::<RecipeSort>("next many").is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse("   "), None);
        assert_eq!(parse("reload"), Some(Command::Reload));
        assert_eq!(parse("?"), Some(Command::Help));
        assert_eq!(parse("q"), Some(Command::Quit));
        assert!(matches!(
            parse_command::<RecipeSort>("dance"),
            Err(Error::UnknownCommand(line)) if line == "dance"
        ));
    }

    #[test]
    fn test_help_lists_sort_keys() {
        colored::control::set_override(false);
        let help = help_text::<Coin>();
        assert!(help.contains("market_cap, price, change"));
        assert_eq!(
            parse_command::<CryptoSort>("sort price").unwrap(),
            Some(Command::Sort(CryptoSort::Price))
        );
    }
}
