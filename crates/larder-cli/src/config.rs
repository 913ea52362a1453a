use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(
    author,
    version,
    about = "Inventory store for fruits and vegetables with fuzzy name search"
)]
#[command(after_help = "Examples:
  larder add --category fruit --name Apple --quantity 10 --unit kg
  larder list --category vegetable --unit kg
  larder search app
  larder import items.json")]
pub struct Config {
    /// PostgreSQL database connection URL (not needed for search)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Elasticsearch base URL (overrides the config file)
    #[arg(long, env = "ELASTICSEARCH_URL")]
    pub elasticsearch_url: Option<String>,

    /// Custom path to config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add one item
    #[command(after_help = "Example: larder add --category fruit --name Apple --quantity 10 --unit kg")]
    Add {
        /// Item type: fruit or vegetable
        #[arg(short, long)]
        category: Option<String>,
        /// Item name, unique within its category
        #[arg(short, long)]
        name: String,
        /// Quantity in the given unit
        #[arg(short, long, allow_negative_numbers = true)]
        quantity: f64,
        /// Unit of the quantity: g or kg
        #[arg(short, long, default_value = "g")]
        unit: String,
    },
    /// Remove an item by id
    #[command(after_help = "Example: larder remove --category fruit 3")]
    Remove {
        /// Item type: fruit or vegetable
        #[arg(short, long)]
        category: Option<String>,
        /// Item id
        id: i64,
    },
    /// List items of one category as JSON
    #[command(after_help = "Examples:
  larder list --category fruit
  larder list --category vegetable --unit kg --name car")]
    List {
        /// Item type: fruit or vegetable
        #[arg(short, long)]
        category: String,
        /// Unit for quantities: g or kg
        #[arg(short, long, default_value = "g")]
        unit: String,
        /// Only items whose name contains this text
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Search item names across all categories
    #[command(after_help = "Example: larder search app")]
    Search {
        /// Text contained in the item name
        query: String,
    },
    /// Add every item from a JSON file
    #[command(after_help = "The file holds a JSON array of items:
  [{\"type\": \"fruit\", \"name\": \"Apple\", \"quantity\": 3, \"unit\": \"kg\"}]")]
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

impl Config {
    /// Returns the database URL, or an error naming how to provide it.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set (or pass --database-url)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut full = vec!["larder", "--database-url", "postgresql://localhost/larder"];
        full.extend_from_slice(args);
        Config::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_parse_add() {
        let config = parse(&["add", "-c", "fruit", "-n", "Apple", "-q", "10", "-u", "kg"]);
        match config.command {
            Command::Add {
                category,
                name,
                quantity,
                unit,
            } => {
                assert_eq!(category.as_deref(), Some("fruit"));
                assert_eq!(name, "Apple");
                assert_eq!(quantity, 10.0);
                assert_eq!(unit, "kg");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_defaults() {
        let config = parse(&["list", "--category", "vegetable"]);
        match config.command {
            Command::List { category, unit, name } => {
                assert_eq!(category, "vegetable");
                assert_eq!(unit, "g");
                assert!(name.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_remove_without_category() {
        let config = parse(&["remove", "7"]);
        assert!(matches!(config.command, Command::Remove { category: None, id: 7 }));
    }

    #[test]
    fn test_parse_search_without_database_url() {
        let config = Config::try_parse_from(["larder", "search", "app"]).unwrap();
        assert!(matches!(config.command, Command::Search { ref query } if query == "app"));
    }

    #[test]
    fn test_require_database_url() {
        let config = parse(&["list", "-c", "fruit"]);
        assert_eq!(
            config.require_database_url().unwrap(),
            "postgresql://localhost/larder"
        );

        let missing = Config {
            database_url: None,
            ..parse(&["search", "app"])
        };
        assert!(missing.require_database_url().is_err());
    }

    #[test]
    fn test_parse_import() {
        let config = parse(&["import", "items.json"]);
        assert!(matches!(config.command, Command::Import { ref file } if file == &PathBuf::from("items.json")));
    }
}
