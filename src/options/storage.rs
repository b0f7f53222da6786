use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Object-storage access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Storage", inline)]
#[serde(default)]
pub struct StorageOptions {
    /// HTTPS URL template for `s3://bucket/key`; `{bucket}` and `{key}` are
    /// substituted.
    #[schemars(title = "Endpoint")]
    pub endpoint: String,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://{bucket}.s3.amazonaws.com/{key}".to_owned(),
        }
    }
}
