use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use rebook_finance::{BankingLayout, CategoryMapping, CategoryTable, CreditLayout, LedgerKind, Pipeline};
use rebook_ingest::RangeSpec;

use crate::state::ensure_rebook_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheets: SheetsSection,
    pub banking: BankingSection,
    pub credit: CreditSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    /// Spreadsheet the ledgers are read from (env: SPREADSHEETS_FROM)
    pub source_spreadsheet: String,
    /// Spreadsheet the records are written to (env: SPREADSHEETS_TO)
    pub destination_spreadsheet: String,
    /// Service-account key used when built with the `service-account` feature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_file: Option<PathBuf>,
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            source_spreadsheet: String::new(),
            destination_spreadsheet: String::new(),
            service_account_file: Some(PathBuf::from("creds.json")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BankingSection {
    pub source_sheet: String,
    pub source_range: String,
    pub destination_sheet: String,
    pub destination_range: String,
    pub layout: BankingLayout,
    pub categories: Vec<CategoryMapping>,
}

impl Default for BankingSection {
    fn default() -> Self {
        Self {
            source_sheet: "SCB".to_string(),
            source_range: "A1:K".to_string(),
            destination_sheet: "SCB".to_string(),
            destination_range: "A2:H".to_string(),
            layout: BankingLayout::default(),
            categories: CategoryTable::default().entries().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditSection {
    pub source_sheet: String,
    pub source_range: String,
    pub destination_sheet: String,
    pub destination_range: String,
    pub layout: CreditLayout,
}

impl Default for CreditSection {
    fn default() -> Self {
        Self {
            source_sheet: "CREDIT".to_string(),
            source_range: "A1:K".to_string(),
            destination_sheet: "CREDIT".to_string(),
            destination_range: "A2:H".to_string(),
            layout: CreditLayout::default(),
        }
    }
}

fn ranges(source_sheet: &str, source: &str, destination_sheet: &str, destination: &str) -> Result<(RangeSpec, RangeSpec)> {
    let source = RangeSpec::parse(source).context("source_range")?.on_sheet(source_sheet);
    let destination = RangeSpec::parse(destination)
        .context("destination_range")?
        .on_sheet(destination_sheet);
    Ok((source, destination))
}

impl Config {
    /// Apply SPREADSHEETS_FROM / SPREADSHEETS_TO / REBOOK_SERVICE_ACCOUNT.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("SPREADSHEETS_FROM").filter(|v| !v.is_empty()) {
            self.sheets.source_spreadsheet = v;
        }
        if let Some(v) = var("SPREADSHEETS_TO").filter(|v| !v.is_empty()) {
            self.sheets.destination_spreadsheet = v;
        }
        if let Some(v) = var("REBOOK_SERVICE_ACCOUNT").filter(|v| !v.is_empty()) {
            self.sheets.service_account_file = Some(PathBuf::from(v));
        }
    }

    pub fn banking_pipeline(&self) -> Result<Pipeline> {
        let b = &self.banking;
        let (source, destination) = ranges(&b.source_sheet, &b.source_range, &b.destination_sheet, &b.destination_range)
            .context("[banking]")?;
        let categories = CategoryTable::new(b.categories.clone()).context("[banking] categories")?;
        if b.layout.category_count == 0 {
            bail!("[banking] layout.category_count must be at least 1");
        }

        Ok(Pipeline::new(
            LedgerKind::Banking {
                layout: b.layout.clone(),
                categories,
            },
            source,
            destination,
        ))
    }

    pub fn credit_pipeline(&self) -> Result<Pipeline> {
        let c = &self.credit;
        let (source, destination) = ranges(&c.source_sheet, &c.source_range, &c.destination_sheet, &c.destination_range)
            .context("[credit]")?;

        Ok(Pipeline::new(
            LedgerKind::Credit {
                layout: c.layout.clone(),
            },
            source,
            destination,
        ))
    }
}

impl SheetsSection {
    pub fn source(&self) -> Result<&str> {
        if self.source_spreadsheet.trim().is_empty() {
            bail!("no source spreadsheet: set SPREADSHEETS_FROM or [sheets] source_spreadsheet");
        }
        Ok(&self.source_spreadsheet)
    }

    pub fn destination(&self) -> Result<&str> {
        if self.destination_spreadsheet.trim().is_empty() {
            bail!("no destination spreadsheet: set SPREADSHEETS_TO or [sheets] destination_spreadsheet");
        }
        Ok(&self.destination_spreadsheet)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_rebook_home()?.join("config.toml"))
}

/// Load `path` (or `~/.rebook/config.toml`), falling back to defaults when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    let mut cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        tracing::debug!(path = %p.display(), "no config file, using defaults");
        Config::default()
    };
    cfg.apply_env();
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
