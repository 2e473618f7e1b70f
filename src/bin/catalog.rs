use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use component_catalog::client::{CatalogClient, DEFAULT_API_URL};
use component_catalog::events::list_version_channel;
use component_catalog::gallery::{Gallery, GalleryState};
use component_catalog::models::{Component, ALL_CATEGORIES};
use component_catalog::submission::{SubmissionForm, SubmitError, ACCEPTED_EXTENSIONS};
use prettytable::{Cell, Row, Table};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Browse and share UI components", long_about = None)]
struct Cli {
    #[arg(long, global = true, env = "CATALOG_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Browse the gallery")]
    List {
        #[arg(short, long, default_value = ALL_CATEGORIES, help = "Category to show")]
        category: String,

        #[arg(short, long, default_value = "", help = "Filter by name, description or tag")]
        search: String,
    },

    #[command(about = "Search the whole catalog on the server")]
    Search {
        #[arg(help = "Text to look for")]
        query: String,
    },

    #[command(about = "Show one component with its code")]
    Show {
        #[arg(help = "Component ID")]
        id: String,
    },

    #[command(about = "List categories with component counts")]
    Categories,

    #[command(about = "Upload a new component")]
    Upload {
        #[arg(short, long, help = "Component name")]
        name: String,

        #[arg(short, long, help = "What the component does")]
        description: String,

        #[arg(short, long, default_value = "", help = "Category (defaults to Other)")]
        category: String,

        #[arg(short, long, default_value = "", help = "Tags (comma-separated)")]
        tags: String,

        #[arg(short, long = "file", required = true, help = "Source file (.kt or .java), repeatable")]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = CatalogClient::new(cli.api_url);

    if let Err(e) = run_command(&client, cli.command).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(client: &CatalogClient, command: Commands) -> Result<()> {
    match command {
        Commands::List { category, search } => list_components(client, category, search).await,
        Commands::Search { query } => search_components(client, query).await,
        Commands::Show { id } => show_component(client, id).await,
        Commands::Categories => list_categories(client).await,
        Commands::Upload {
            name,
            description,
            category,
            tags,
            files,
        } => upload_component(client, name, description, category, tags, files).await,
    }
}

async fn list_components(client: &CatalogClient, category: String, search: String) -> Result<()> {
    let (_invalidator, updates) = list_version_channel();
    let mut gallery = Gallery::new(client.clone(), updates);
    gallery.set_search(search);

    if let GalleryState::Failed(message) = gallery.select_category(category).await {
        bail!("Failed to fetch components: {}", message);
    }

    let visible = gallery.visible();
    if visible.is_empty() {
        println!("📭 No components found.");
        println!("💡 Try adjusting your search or category");
        return Ok(());
    }

    println!("\n🧩 {} ({})\n", gallery.summary(), gallery.category());
    print_table(&visible);

    Ok(())
}

async fn search_components(client: &CatalogClient, query: String) -> Result<()> {
    let components = client.search_components(&query).await?;

    if components.is_empty() {
        println!("📭 Nothing matches '{}'.", query);
        return Ok(());
    }

    println!("\n🔎 {} match(es) for '{}'\n", components.len(), query);
    print_table(&components.iter().collect::<Vec<_>>());

    Ok(())
}

async fn show_component(client: &CatalogClient, id: String) -> Result<()> {
    let Some(component) = client.get_component(&id).await? else {
        bail!("Component not found with ID: {}", id);
    };

    println!("\n🧩 {}", component.name);
    println!("═══════════════════════════════════════");
    println!("🆔 ID: {}", component.id);
    println!("📂 Category: {}", component.category);
    println!("👤 Author: {}", component.author_name);
    println!(
        "⏰ Added: {}",
        component.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z")
    );
    if !component.tags.is_empty() {
        println!("🏷️  Tags: {}", component.tags.join(", "));
    }
    println!("📝 {}", component.description);
    println!("═══════════════════════════════════════\n");
    println!("{}\n", component.code);

    Ok(())
}

async fn list_categories(client: &CatalogClient) -> Result<()> {
    let components = client.list_components(None).await?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for component in &components {
        *counts.entry(component.category.as_str()).or_default() += 1;
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Category"), Cell::new("Components")]));
    table.add_row(Row::new(vec![
        Cell::new(ALL_CATEGORIES),
        Cell::new(&components.len().to_string()),
    ]));
    for (category, count) in counts {
        table.add_row(Row::new(vec![Cell::new(category), Cell::new(&count.to_string())]));
    }

    table.printstd();
    Ok(())
}

async fn upload_component(
    client: &CatalogClient,
    name: String,
    description: String,
    category: String,
    tags: String,
    files: Vec<PathBuf>,
) -> Result<()> {
    let mut form = SubmissionForm::new();
    form.name = name;
    form.description = description;
    form.category = category;
    form.tags = tags;

    let added = form.read_files(&files).await;
    if added < files.len() {
        println!(
            "⚠️  Skipped {} file(s). Only {} files are read.",
            files.len() - added,
            ACCEPTED_EXTENSIONS.join(", ")
        );
    }

    for file in form.files() {
        println!("📄 {} ({:.1} KB)", file.name, file.size as f64 / 1024.0);
    }

    let (invalidator, _updates) = list_version_channel();
    match form.submit(client, &invalidator).await {
        Ok(component) => {
            println!("\n✅ Component uploaded successfully!");
            println!("🧩 Name: {}", component.name);
            println!("📂 Category: {}", component.category);
            println!("🆔 ID: {}", component.id);
            println!("\n💡 Use 'catalog show {}' to view it", component.id);
            Ok(())
        }
        Err(err) => {
            match &err {
                SubmitError::Precondition(missing) => {
                    for field in &missing.fields {
                        eprintln!("   • {}", field.message);
                    }
                }
                SubmitError::Failed(cause) => eprintln!("   {}", cause),
            }
            Err(err.into())
        }
    }
}

fn print_table(components: &[&Component]) {
    component_table(components).printstd();
    println!();
}

/// Full IDs so a row can be fed straight to `catalog show`.
fn component_table(components: &[&Component]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Category"),
        Cell::new("Tags"),
        Cell::new("Author"),
    ]));

    for component in components {
        table.add_row(Row::new(vec![
            Cell::new(&component.id),
            Cell::new(&component.name),
            Cell::new(component.category.as_str()),
            Cell::new(&component.tags.join(", ")),
            Cell::new(&component.author_name),
        ]));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_catalog::models::{Category, NewComponent};

    #[test]
    fn table_rows_carry_the_full_id() {
        let component = Component::new(NewComponent {
            name: "Chip".to_string(),
            description: "Filter chip".to_string(),
            category: Category::new("Chips").unwrap(),
            code: "fun Chip() {}".to_string(),
            tags: vec!["filter".to_string()],
            author_name: None,
            preview_image: None,
        });

        let table = component_table(&[&component]);
        let id_cell = table.get_row(1).and_then(|row| row.get_cell(0)).unwrap();
        assert_eq!(id_cell.get_content(), component.id);
        assert!(component.id.len() > 8);
    }
}
