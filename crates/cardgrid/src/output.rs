use colored::Colorize;

use cardgrid_core::error::FetchError;
use cardgrid_core::view::{Card, Notice, PageInfo, Tone, View};

use crate::prelude::{print, println, *};

/// What a rendered list belongs to
#[derive(Debug, Clone, Copy)]
pub struct ListContext<'a> {
    /// CLI name of the domain, e.g. `pokemon`
    pub domain: &'a str,
    /// Heading shown above the cards
    pub title: &'a str,
    pub backend: &'a str,
}

/// Convert a view to JSON
pub fn format_view_json(view: &View) -> Result<String> {
    serde_json::to_string_pretty(view).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert a view to formatted text with colors
pub fn format_view_text(view: &View, ctx: &ListContext) -> String {
    let mut result = String::new();

    match view {
        View::Idle => {
            push_header(&mut result, &ctx.title.to_uppercase());
            result.push_str(&format!("\n{}\n", "Nothing loaded yet.".bright_black()));
        }
        View::Loading => {
            push_header(&mut result, &ctx.title.to_uppercase());
            result.push_str(&format!("\n{}\n", "Loading...".bright_blue()));
        }
        View::Error { error, retryable } => {
            push_header(&mut result, &ctx.title.to_uppercase());
            result.push_str(&format_error(error));
            if *retryable {
                result.push_str(&format!(
                    "  {}: {}\n",
                    "Retry".green(),
                    format!("cardgrid {} list --backend {}", ctx.domain, ctx.backend).cyan()
                ));
            }
        }
        View::Empty { search, notice } => {
            push_header(&mut result, &ctx.title.to_uppercase());
            if let Some(notice) = notice {
                result.push_str(&format_notice(notice));
            }
            result.push_str(&format!(
                "\n{}\n",
                format!("No results for \"{search}\".").yellow()
            ));
        }
        View::Grid {
            cards,
            page,
            sort,
            search,
            notice,
        } => {
            let heading = match page.total_pages {
                Some(total) => format!(
                    "{} (Page {} of {})",
                    ctx.title.to_uppercase(),
                    page.page,
                    total
                ),
                None => format!("{} (Page {})", ctx.title.to_uppercase(), page.page),
            };
            push_header(&mut result, &heading);

            if let Some(notice) = notice {
                result.push_str(&format_notice(notice));
            }
            if !search.is_empty() {
                result.push_str(&format!("{}: {}\n", "Search".green(), search.bright_white()));
            }
            result.push_str(&format!("{}: {}\n", "Sort".green(), sort.bright_white()));

            for (idx, card) in cards.iter().enumerate() {
                result.push_str(&format_card(card, page.showing_from + idx));
            }

            result.push_str(&format!("\n{}\n", format_counter(page)));
        }
    }

    result
}

fn push_header(result: &mut String, heading: &str) {
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", heading.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));
}

fn format_error(error: &FetchError) -> String {
    format!(
        "\n{} {}\n",
        "Error:".red().bold(),
        error.to_string().red()
    )
}

fn format_notice(notice: &Notice) -> String {
    match notice {
        Notice::Refreshing => format!("{}\n", "Refreshing...".bright_blue()),
        Notice::Stale { error } => format!(
            "{} {}\n",
            "Showing previous results, reload failed:".yellow(),
            error.to_string().red()
        ),
    }
}

/// One numbered card
pub fn format_card(card: &Card, number: usize) -> String {
    let mut result = format!(
        "\n{} {}",
        format!("[{number}]").yellow().bold(),
        card.title.white().bold()
    );
    if let Some(subtitle) = &card.subtitle {
        result.push_str(&format!("  {}", subtitle.bright_black()));
    }
    if let Some(badge) = &card.badge {
        let text = match badge.tone {
            Tone::Positive => badge.text.green(),
            Tone::Negative => badge.text.red(),
            Tone::Neutral => badge.text.bright_yellow(),
        };
        result.push_str(&format!("  {text}"));
    }
    result.push('\n');

    if !card.fields.is_empty() {
        let fields: Vec<String> = card
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.label.green(), field.value.bright_white()))
            .collect();
        result.push_str(&format!("    {}\n", fields.join(" | ")));
    }

    if let Some(summary) = &card.summary {
        result.push_str(&format!("    {}\n", summary.bright_black()));
    }

    if let Some(url) = &card.detail_url {
        result.push_str(&format!("    {}: {}\n", "Link".green(), url.cyan().underline()));
    }
    if let Some(url) = &card.image_url {
        result.push_str(&format!("    {}: {}\n", "Image".green(), url.cyan()));
    }

    result
}

/// `Showing 21 to 25 of 25`
pub fn format_counter(page: &PageInfo) -> String {
    let counter = format!(
        "{} {} {} {}",
        "Showing".bright_white(),
        page.showing_from.to_string().bright_cyan().bold(),
        "to".bright_white(),
        page.showing_to.to_string().bright_cyan().bold(),
    );

    match page.total_items {
        Some(total) => format!(
            "{counter} {} {}",
            "of".bright_white(),
            total.to_string().bright_cyan().bold()
        ),
        None => counter,
    }
}

/// Commands for moving around a listed page
pub fn format_navigation(page: &PageInfo, ctx: &ListContext) -> String {
    let mut result = String::new();
    let list = format!("cardgrid {} list --backend {}", ctx.domain, ctx.backend);

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
    if page.has_next {
        result.push_str(&format!(
            "  {}: {}\n",
            "Next page".green(),
            format!("{list} --page {}", page.page + 1).cyan()
        ));
    }
    if page.has_prev {
        result.push_str(&format!(
            "  {}: {}\n",
            "Previous page".green(),
            format!("{list} --page {}", page.page - 1).cyan()
        ));
    }
    if !page.has_next && !page.has_prev {
        result.push_str(&format!("  {}\n", "Everything fits on one page.".bright_black()));
    }

    result.push_str(&format!("\n{}:\n", "To change page size".bright_white().bold()));
    result.push_str(&format!("  {}\n", format!("{list} --page-size <number>").cyan()));

    result.push_str(&format!("\n{}:\n", "To browse interactively".bright_white().bold()));
    result.push_str(&format!(
        "  {}\n",
        format!("cardgrid {} browse --backend {}", ctx.domain, ctx.backend).cyan()
    ));

    result.push_str(&format!("\n{}:\n", "To get JSON output".bright_white().bold()));
    result.push_str(&format!("  {}\n", format!("{list} --json").cyan()));

    result.push('\n');
    result
}

pub fn output_view(view: &View, ctx: &ListContext, json: bool) -> Result<()> {
    if json {
        println!("{}", format_view_json(view)?);
        return Ok(());
    }

    print!("{}", format_view_text(view, ctx));
    if let View::Grid { page, .. } = view {
        print!("{}", format_navigation(page, ctx));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardgrid_core::crypto::Coin;
    use cardgrid_core::item::{Item, Pagination};
    use cardgrid_core::pokemon::Pokemon;

    const CTX: ListContext<'static> = ListContext {
        domain: "pokemon",
        title: "Pokémon",
        backend: "pokeapi",
    };

    fn page_info() -> PageInfo {
        PageInfo {
            page: 2,
            total_pages: Some(3),
            page_size: 10,
            showing_from: 11,
            showing_to: 20,
            total_items: Some(25),
            has_prev: true,
            has_next: true,
            pagination: Pagination::Client { batch_size: 1000 },
        }
    }

    fn grid(cards: Vec<Card>) -> View {
        View::Grid {
            cards,
            page: page_info(),
            sort: "id".to_string(),
            search: String::new(),
            notice: None,
        }
    }

    #[test]
    fn test_format_view_json_tags_view() {
        let json = format_view_json(&grid(vec![Pokemon::named(4, "charmander").card()])).unwrap();

        assert!(json.contains("\"view\": \"grid\""));
        assert!(json.contains("\"title\": \"Charmander\""));
        assert!(json.contains("\"showing_from\": 11"));
        assert!(json.contains("\"mode\": \"client\""));
    }

    #[test]
    fn test_format_grid_numbers_cards_from_page_offset() {
        colored::control::set_override(false);
        let cards = vec![
            Pokemon::named(11, "metapod").card(),
            Pokemon::named(12, "butterfree").card(),
        ];

        let text = format_view_text(&grid(cards), &CTX);

        assert!(text.contains("POKÉMON (Page 2 of 3)"));
        assert!(text.contains("[11] Metapod  #011"));
        assert!(text.contains("[12] Butterfree  #012"));
        assert!(text.contains("Showing 11 to 20 of 25"));
    }

    #[test]
    fn test_format_card_badge_and_fields() {
        colored::control::set_override(false);
        let mut coin = Coin::named("bitcoin", "Bitcoin");
        coin.symbol = "btc".to_string();
        coin.market_cap = Some(1_000.0);
        coin.current_price = Some(10.5);
        coin.change_24h = Some(-1.0);

        let text = format_card(&coin.card(), 1);

        assert!(text.contains("[1] Bitcoin (BTC)  -1.00%"));
        assert!(text.contains("Mcap: $1,000.00 | Price: $10.50"));
    }

    #[test]
    fn test_format_error_view_offers_retry() {
        colored::control::set_override(false);
        let view = View::Error {
            error: FetchError::http_status(503, ""),
            retryable: true,
        };

        let text = format_view_text(&view, &CTX);

        assert!(text.contains("Error: HTTP error: status 503"));
        assert!(text.contains("Retry: cardgrid pokemon list --backend pokeapi"));
    }

    #[test]
    fn test_format_empty_view() {
        colored::control::set_override(false);
        let view = View::Empty {
            search: "mewtwo".to_string(),
            notice: None,
        };

        assert!(format_view_text(&view, &CTX).contains("No results for \"mewtwo\"."));
    }

    #[test]
    fn test_server_counter_has_no_total() {
        colored::control::set_override(false);
        let mut page = page_info();
        page.total_pages = None;
        page.total_items = None;
        page.pagination = Pagination::Server;

        assert_eq!(format_counter(&page), "Showing 11 to 20");
    }

    #[test]
    fn test_navigation_commands() {
        colored::control::set_override(false);
        let text = format_navigation(&page_info(), &CTX);

        assert!(text.contains("Next page: cardgrid pokemon list --backend pokeapi --page 3"));
        assert!(text.contains("Previous page: cardgrid pokemon list --backend pokeapi --page 1"));
        assert!(text.contains("cardgrid pokemon browse --backend pokeapi"));
    }
}
