pub mod config;
pub mod format;
pub mod monitor;
pub mod notifier;
pub mod parser;
pub mod scraper;
pub mod types;

pub use config::{Config, ConfigError};
pub use scraper::{ScraperError, WebScraper};
