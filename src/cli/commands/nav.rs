use crate::cli::config::session_store;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::client::{default_menu, visible_items, AbilityCache, NavItem};

/// Print the menu as the logged-in user would see it
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let cache = AbilityCache::load(session_store()?);
    let items = visible_items(&cache, &default_menu());

    match output_format {
        OutputFormat::Json => output_json(&items),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No menu items available");
            }
            print_items(&items, 0);
            Ok(())
        }
    }
}

fn print_items(items: &[NavItem], depth: usize) {
    for item in items {
        let indent = "  ".repeat(depth);
        match &item.to {
            Some(to) => println!("{}{:<28} {}", indent, item.title, to),
            None => println!("{}{}", indent, item.title),
        }
        print_items(&item.children, depth + 1);
    }
}
