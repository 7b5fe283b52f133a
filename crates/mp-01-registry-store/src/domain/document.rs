//! # Registry Documents
//!
//! Decoding of the on-disk JSON document into a [`RegistryRecord`].
//!
//! Two layouts are accepted:
//!
//! - **Current**: `network`, optional `sharedInfra` object, `tenants[]`.
//! - **Legacy**: flattened shared addresses (`metaDefenderMarketsRegistry`,
//!   `globalsViewer`, `americanBinaryOptions`, `testERC20`) and `markets[]`.
//!
//! Saves always use the current layout.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use shared_types::{Address, RegistryRecord, SharedInfra, TenantDescriptor};

use super::errors::StoreError;

/// The flattened layout written by earlier deploy tooling.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDocument {
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    meta_defender_markets_registry: Option<Address>,
    #[serde(default)]
    globals_viewer: Option<Address>,
    #[serde(rename = "testERC20", default)]
    test_erc20: Option<Address>,
    #[serde(default)]
    american_binary_options: Option<Address>,
    #[serde(default)]
    markets: Vec<TenantDescriptor>,
}

impl LegacyDocument {
    fn shared_infra(&self, path: &Path) -> Result<Option<SharedInfra>, StoreError> {
        match (
            self.meta_defender_markets_registry,
            self.globals_viewer,
            self.test_erc20,
            self.american_binary_options,
        ) {
            (Some(registry), Some(globals_viewer), Some(payment_token), Some(payoff_model)) => {
                Ok(Some(SharedInfra {
                    registry,
                    globals_viewer,
                    payment_token,
                    payoff_model,
                }))
            }
            (None, None, None, None) => Ok(None),
            (registry, viewer, token, payoff) => {
                let missing = [
                    ("metaDefenderMarketsRegistry", registry.is_none()),
                    ("globalsViewer", viewer.is_none()),
                    ("testERC20", token.is_none()),
                    ("americanBinaryOptions", payoff.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name.to_string())
                .collect();
                Err(StoreError::PartialSharedInfra {
                    path: path.to_path_buf(),
                    missing,
                })
            }
        }
    }
}

fn malformed(path: &Path, message: impl ToString) -> StoreError {
    StoreError::Malformed {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Decode a registry document for `network`.
///
/// The decoded record is validated with `RegistryRecord::validate` and must belong to
/// `network`; a legacy document without a `network` field is adopted.
///
/// # Errors
///
/// - `Malformed` if the text is not a registry document
/// - `PartialSharedInfra` for a legacy document with some shared fields
/// - `Invalid` if the decoded record violates an invariant
pub fn decode_document(
    path: &Path,
    text: &str,
    network: &str,
) -> Result<RegistryRecord, StoreError> {
    let value: Value = serde_json::from_str(text).map_err(|e| malformed(path, e))?;
    if !value.is_object() {
        return Err(malformed(path, "top-level value is not an object"));
    }

    let record = if value.get("tenants").is_some() {
        serde_json::from_value::<RegistryRecord>(value).map_err(|e| malformed(path, e))?
    } else if value.get("markets").is_some() || value.get("metaDefenderMarketsRegistry").is_some()
    {
        let legacy: LegacyDocument =
            serde_json::from_value(value).map_err(|e| malformed(path, e))?;
        let shared_infra = legacy.shared_infra(path)?;
        RegistryRecord {
            network: legacy.network.unwrap_or_else(|| network.to_string()),
            shared_infra,
            tenants: legacy.markets,
        }
    } else {
        return Err(malformed(path, "neither `tenants` nor `markets` present"));
    };

    if record.network != network {
        return Err(StoreError::Invalid {
            network: network.to_string(),
            source: shared_types::RecordError::NetworkMismatch {
                expected: network.to_string(),
                found: record.network,
            },
        });
    }

    record.validate().map_err(|source| StoreError::Invalid {
        network: network.to_string(),
        source,
    })?;

    Ok(record)
}
