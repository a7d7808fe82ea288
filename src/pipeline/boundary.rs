//! Department boundary polygons (GeoJSON)

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::error::LoadError;
use super::normalize::normalize_name;

/// Default feature property holding the department name
pub const DEFAULT_NAME_PROPERTY: &str = "NOMBRE_DPT";

/// A GeoJSON FeatureCollection whose region names are normalized
#[derive(Debug, Clone)]
pub struct GeoBoundaries {
    collection: Value,
    name_property: String,
}

impl GeoBoundaries {
    /// Read and normalize a boundary file
    pub fn load(path: &Path, name_property: &str) -> Result<Self> {
        if !path.exists() {
            return Err(LoadError::MissingFile {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read boundary file: {}", path.display()))?;
        let collection: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse boundary file: {}", path.display()))?;

        Self::from_value(collection, name_property).map_err(|reason| {
            anyhow::Error::from(LoadError::InvalidBoundary {
                path: path.to_path_buf(),
                reason,
            })
        })
    }

    /// Normalize the name property of every feature in place.
    ///
    /// Features without the property are kept untouched; they simply never
    /// receive a shade on the map.
    pub fn from_value(mut collection: Value, name_property: &str) -> Result<Self, String> {
        let features = collection
            .get_mut("features")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| "missing 'features' array".to_string())?;

        let mut unnamed = 0usize;
        for feature in features.iter_mut() {
            let name = feature
                .get_mut("properties")
                .and_then(|p| p.get_mut(name_property));
            match name {
                Some(Value::String(s)) => *s = normalize_name(s),
                _ => unnamed += 1,
            }
        }

        if unnamed > 0 {
            tracing::warn!(
                count = unnamed,
                property = name_property,
                "boundary features without a name property"
            );
        }

        Ok(Self {
            collection,
            name_property: name_property.to_string(),
        })
    }

    /// Normalized region names, in file order
    pub fn region_names(&self) -> Vec<String> {
        self.features()
            .iter()
            .filter_map(|f| {
                f.get("properties")
                    .and_then(|p| p.get(&self.name_property))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect()
    }

    pub fn features(&self) -> &[Value] {
        self.collection
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Plotly `featureidkey` for joining locations against the region name
    pub fn feature_id_key(&self) -> String {
        format!("properties.{}", self.name_property)
    }

    pub fn as_value(&self) -> &Value {
        &self.collection
    }
}
