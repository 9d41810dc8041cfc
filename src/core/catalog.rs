//! Column schema catalog
//!
//! Resolves the declared tables, columns and identifier domains of a
//! [`PufConfig`] into typed specs. Type tags are parsed here, so an unknown
//! tag fails the run before any table is touched.

use crate::anonymization::PseudonymAlphabet;
use crate::config::{ColumnConfig, DomainConfig, PufConfig, TableConfig};
use crate::domain::{ColumnRole, PufError, Result, SemanticType};
use std::collections::{HashMap, HashSet};

/// What the orchestrator does with a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Normalize, shuffle and enforce k-anonymity
    Generalizable(SemanticType),
    /// Replace with pseudonyms from the domain's pool
    Identifier { domain: String },
    /// Broadcast one value to every row
    Constant { value: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn role(&self) -> ColumnRole {
        match self.kind {
            ColumnKind::Generalizable(_) => ColumnRole::Generalizable,
            ColumnKind::Identifier { .. } => ColumnRole::Identifier,
            ColumnKind::Constant { .. } => ColumnRole::Constant,
        }
    }

    fn from_config(table: &str, config: &ColumnConfig) -> Result<Self> {
        let kind = match config.role {
            ColumnRole::Generalizable => {
                let tag = config.semantic_type.as_deref().ok_or_else(|| {
                    PufError::Configuration(format!("Column {}.{} needs a type", table, config.name))
                })?;
                ColumnKind::Generalizable(tag.parse()?)
            }
            ColumnRole::Identifier => ColumnKind::Identifier {
                domain: config.domain.clone().ok_or_else(|| {
                    PufError::Configuration(format!(
                        "Identifier column {}.{} needs a domain",
                        table, config.name
                    ))
                })?,
            },
            ColumnRole::Constant => ColumnKind::Constant {
                value: config.value.clone(),
            },
        };

        Ok(Self {
            name: config.name.clone(),
            kind,
        })
    }
}

/// One table's resolved declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Logical name used for artifacts, logs and primary-table checks
    pub name: String,
    /// Table name in the source store
    pub source_table: String,
    /// Table name in the target store
    pub target_table: String,
    /// Declared columns
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Pairs the store's column order with the declarations
    ///
    /// The store decides the output column order. A store column without a
    /// declaration, or a declaration the store lacks, is a configuration
    /// error.
    pub fn check_store_columns(&self, store_columns: &[String]) -> Result<Vec<&ColumnSpec>> {
        let mut ordered = Vec::with_capacity(store_columns.len());
        let mut undeclared = Vec::new();
        for name in store_columns {
            match self.column(name) {
                Some(spec) => ordered.push(spec),
                None => undeclared.push(name.as_str()),
            }
        }
        if !undeclared.is_empty() {
            return Err(PufError::Configuration(format!(
                "Table '{}' has undeclared columns: {}",
                self.name,
                undeclared.join(", ")
            )));
        }

        let present: HashSet<&str> = store_columns.iter().map(String::as_str).collect();
        let absent: Vec<&str> = self
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| !present.contains(name))
            .collect();
        if !absent.is_empty() {
            return Err(PufError::Configuration(format!(
                "Table '{}' ({}) lacks declared columns: {}",
                self.name,
                self.source_table,
                absent.join(", ")
            )));
        }

        Ok(ordered)
    }

    fn from_config(config: &TableConfig, suffix: &str) -> Result<Self> {
        let source_table = config
            .source_table
            .clone()
            .unwrap_or_else(|| config.name.clone());
        let target_table = config
            .target_table
            .clone()
            .unwrap_or_else(|| format!("{source_table}{suffix}"));
        let columns = config
            .columns
            .iter()
            .map(|c| ColumnSpec::from_config(&config.name, c))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: config.name.clone(),
            source_table,
            target_table,
            columns,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainKind {
    /// Owns a pool sized by the distinct values of a source column
    Primary {
        source_table: String,
        source_column: String,
        alphabet: PseudonymAlphabet,
        primary_tables: Vec<String>,
    },
    /// Shares the pool of another domain
    Alias {
        alias_of: String,
        primary_tables: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub name: String,
    pub kind: DomainKind,
}

impl DomainSpec {
    pub fn primary_tables(&self) -> &[String] {
        match &self.kind {
            DomainKind::Primary { primary_tables, .. } | DomainKind::Alias { primary_tables, .. } => {
                primary_tables
            }
        }
    }

    fn from_config(config: &DomainConfig) -> Result<Self> {
        let kind = match (&config.alias_of, &config.source_table, &config.source_column) {
            (Some(alias_of), None, None) => DomainKind::Alias {
                alias_of: alias_of.clone(),
                primary_tables: config.primary_tables.clone(),
            },
            (None, Some(source_table), Some(source_column)) => DomainKind::Primary {
                source_table: source_table.clone(),
                source_column: source_column.clone(),
                alphabet: config.alphabet,
                primary_tables: config.primary_tables.clone(),
            },
            _ => {
                return Err(PufError::Configuration(format!(
                    "Domain '{}' must be either a primary domain or an alias",
                    config.name
                )))
            }
        };
        Ok(Self {
            name: config.name.clone(),
            kind,
        })
    }
}

/// All resolved tables and identifier domains of a run
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: Vec<TableSpec>,
    domains: Vec<DomainSpec>,
}

impl SchemaCatalog {
    /// # Errors
    ///
    /// - [`PufError::UnsupportedType`] for an unknown type tag
    /// - [`PufError::Configuration`] for dangling domain references, alias
    ///   cycles, or primary tables that are not declared
    pub fn from_config(config: &PufConfig) -> Result<Self> {
        let suffix = config
            .target
            .as_ref()
            .map(|t| t.table_suffix.as_str())
            .unwrap_or("_puf");

        let tables = config
            .tables
            .iter()
            .map(|t| TableSpec::from_config(t, suffix))
            .collect::<Result<Vec<_>>>()?;
        let domains = config
            .domains
            .iter()
            .map(DomainSpec::from_config)
            .collect::<Result<Vec<_>>>()?;

        Self::new(tables, domains)
    }

    pub fn new(tables: Vec<TableSpec>, domains: Vec<DomainSpec>) -> Result<Self> {
        let catalog = Self { tables, domains };

        for domain in &catalog.domains {
            catalog.resolve_domain(&domain.name)?;
            for table in domain.primary_tables() {
                if catalog.table(table).is_none() {
                    return Err(PufError::Configuration(format!(
                        "Domain '{}' lists unknown primary table '{}'",
                        domain.name, table
                    )));
                }
            }
        }

        for table in &catalog.tables {
            for column in &table.columns {
                if let ColumnKind::Identifier { domain } = &column.kind {
                    if catalog.domain(domain).is_none() {
                        return Err(PufError::Configuration(format!(
                            "Column {}.{} references unknown domain '{}'",
                            table.name, column.name, domain
                        )));
                    }
                }
            }
        }

        Ok(catalog)
    }

    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    pub fn domains(&self) -> &[DomainSpec] {
        &self.domains
    }

    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn domain(&self, name: &str) -> Option<&DomainSpec> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Follows aliases to the primary domain owning the pool
    pub fn resolve_domain<'a>(&'a self, name: &'a str) -> Result<&'a str> {
        let mut current = name;
        let mut seen = HashSet::new();
        loop {
            let domain = self.domain(current).ok_or_else(|| {
                PufError::Configuration(format!("Unknown identifier domain '{current}'"))
            })?;
            match &domain.kind {
                DomainKind::Primary { .. } => return Ok(&domain.name),
                DomainKind::Alias { alias_of, .. } => {
                    if !seen.insert(current) {
                        return Err(PufError::Configuration(format!(
                            "Domain alias cycle through '{name}'"
                        )));
                    }
                    current = alias_of.as_str();
                }
            }
        }
    }

    /// Restricts the run to `names`, keeping declaration order
    ///
    /// An empty selection means every table.
    pub fn select_tables(&self, names: &[String]) -> Result<Vec<TableSpec>> {
        if names.is_empty() {
            return Ok(self.tables.clone());
        }

        let known: HashMap<&str, &TableSpec> =
            self.tables.iter().map(|t| (t.name.as_str(), t)).collect();
        if let Some(unknown) = names.iter().find(|n| !known.contains_key(n.as_str())) {
            return Err(PufError::Configuration(format!(
                "Unknown table '{unknown}'"
            )));
        }

        Ok(self
            .tables
            .iter()
            .filter(|t| names.iter().any(|n| n == &t.name))
            .cloned()
            .collect())
    }
}
