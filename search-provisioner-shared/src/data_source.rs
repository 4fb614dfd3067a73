//! Data source payload: binds the search service to a blob container.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::resource::{ResourceDefinition, ResourceKind};

/// Storage flavour behind the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DataSourceType {
    /// Data Lake Storage Gen2 (hierarchical namespace).
    #[default]
    #[serde(rename = "adlsgen2")]
    AdlsGen2,
    /// Flat blob container.
    #[serde(rename = "azureblob")]
    AzureBlob,
}

impl FromStr for DataSourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adlsgen2" => Ok(DataSourceType::AdlsGen2),
            "azureblob" => Ok(DataSourceType::AzureBlob),
            other => Err(format!("unknown data source type: {}", other)),
        }
    }
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceType::AdlsGen2 => f.write_str("adlsgen2"),
            DataSourceType::AzureBlob => f.write_str("azureblob"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceCredentials {
    pub connection_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataContainer {
    pub name: String,
}

/// A blob container declared as a searchable data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSourceDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    pub credentials: DataSourceCredentials,
    pub container: DataContainer,
}

impl DataSourceDefinition {
    pub fn new(
        name: impl Into<String>,
        connection_string: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            source_type: DataSourceType::default(),
            credentials: DataSourceCredentials {
                connection_string: connection_string.into(),
            },
            container: DataContainer {
                name: container.into(),
            },
        }
    }

    pub fn with_type(mut self, source_type: DataSourceType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ResourceDefinition for DataSourceDefinition {
    const KIND: ResourceKind = ResourceKind::DataSource;

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let definition = DataSourceDefinition::new("ds1", "DefaultEndpointsProtocol=https", "docs")
            .with_description("Demo files");

        let value = serde_json::to_value(&definition).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "ds1",
                "description": "Demo files",
                "type": "adlsgen2",
                "credentials": { "connectionString": "DefaultEndpointsProtocol=https" },
                "container": { "name": "docs" }
            })
        );
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("azureblob".parse::<DataSourceType>(), Ok(DataSourceType::AzureBlob));
        assert_eq!("adlsgen2".parse::<DataSourceType>(), Ok(DataSourceType::AdlsGen2));
        assert!("s3".parse::<DataSourceType>().is_err());
    }
}
