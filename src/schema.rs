//! Parcel schema: the fixed attribute vocabulary the reshape engine targets.
//!
//! The schema is configuration, never inferred from data. [`ParcelSchema::default`]
//! carries the 14 parcel attributes in canonical output order; a YAML file can
//! override any part of it. Keys left out of the YAML keep their defaults.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    "E_Tab_Kad_Gem",
    "E_SectieLtr",
    "E_SectieNr",
    "E_Tab_Opp",
    "E_Tab_NN",
    "E_Tab_Subs_Onderd",
    "E_Tab_Rijks_Prov_NNB",
    "E_Tab_Rijks_Inv_Opt",
    "E_Tab_Prov_Inv_Opt",
    "E_Tab_PAS_Ben_Perc",
    "E_Tab_Inv_ONNB",
    "E_Tab_Inv_Versn_N2000",
    "E_Tab_Vgst_InTeRi_AT",
    "E_Tab_Afw_Tov_AK_Zkgb",
];

pub const DEFAULT_NUMERIC_ATTRIBUTES: &[&str] = &["E_Tab_Opp", "E_Tab_NN"];

/// Columns starting with one of these belong to the unrelated "plus" extension.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["E_Tab_Plus_"];

pub const DEFAULT_GROUP_COLUMN: &str = "PerceelNummer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcelSchema {
    /// Base attribute names in output order.
    pub attributes: Vec<String>,
    /// Attributes whose values are coerced to numbers.
    pub numeric_attributes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    /// Name of the output column carrying the group index.
    pub group_column: String,
}

impl Default for ParcelSchema {
    fn default() -> Self {
        Self {
            attributes: to_strings(DEFAULT_ATTRIBUTES),
            numeric_attributes: to_strings(DEFAULT_NUMERIC_ATTRIBUTES),
            excluded_prefixes: to_strings(DEFAULT_EXCLUDED_PREFIXES),
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ParcelSchema {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let schema: ParcelSchema = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing schema YAML from {path:?}"))?;
        schema
            .validate()
            .with_context(|| format!("Validating schema from {path:?}"))?;
        Ok(schema)
    }

    /// Loads `path` when given, the default schema otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Writing schema file {path:?}"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.attributes.is_empty(),
            "Schema must declare at least one attribute"
        );
        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            let trimmed = attribute.trim();
            ensure!(!trimmed.is_empty(), "Schema attribute names cannot be empty");
            ensure!(
                trimmed == attribute,
                "Schema attribute '{attribute}' has surrounding whitespace"
            );
            if !seen.insert(attribute.as_str()) {
                bail!("Schema attribute '{attribute}' is declared more than once");
            }
        }
        for numeric in &self.numeric_attributes {
            ensure!(
                seen.contains(numeric.as_str()),
                "Numeric attribute '{numeric}' is not part of the attribute list"
            );
        }
        ensure!(
            !self.group_column.trim().is_empty(),
            "Group column name cannot be empty"
        );
        ensure!(
            !seen.contains(self.group_column.as_str()),
            "Group column '{}' collides with an attribute name",
            self.group_column
        );
        Ok(())
    }

    pub fn is_numeric(&self, attribute: &str) -> bool {
        self.numeric_attributes.iter().any(|n| n == attribute)
    }

    /// True when `column` carries one of the reserved prefixes.
    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .any(|prefix| column.starts_with(prefix.as_str()))
    }

    pub fn attribute_position(&self, attribute: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == attribute)
    }
}
