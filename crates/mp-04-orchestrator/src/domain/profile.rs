//! # Deployment and Tenant Profiles
//!
//! Operator-supplied configuration of a pass. Numeric values are kept as
//! decimal strings and converted to 18-decimal base units when the pass
//! starts, so a bad value fails the pass before anything is constructed.

use mp_03_wiring_engine::{CoreParams, IssuerTokens};
use serde::{Deserialize, Serialize};
use shared_types::{parse_units, ParseError, TenantMetadata, U256};

/// Parameters shared by every tenant of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentProfile {
    /// Payment token name.
    pub payment_token_name: String,
    /// Payment token symbol.
    pub payment_token_symbol: String,
    /// Tokens minted to the operator when shared infra is created.
    pub initial_mint: String,
    /// Core fee rate.
    pub fee_rate: String,
    /// Core fee floor.
    pub fee_floor: String,
    /// Core coverage multiplier.
    pub coverage_multiplier: String,
    /// Core solvency multiplier.
    pub solvency_multiplier: String,
    /// Core epoch count, passed as a plain integer.
    pub epoch_count: u64,
}

impl Default for DeploymentProfile {
    fn default() -> Self {
        Self {
            payment_token_name: "TQA".to_string(),
            payment_token_symbol: "TQA".to_string(),
            initial_mint: "10000000".to_string(),
            fee_rate: "0.10".to_string(),
            fee_floor: "0.00".to_string(),
            coverage_multiplier: "200".to_string(),
            solvency_multiplier: "1.1".to_string(),
            epoch_count: 3,
        }
    }
}

impl DeploymentProfile {
    /// Core init parameters in base units.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for any value that is not a decimal with at most
    /// 18 fractional digits.
    pub fn core_params(&self) -> Result<CoreParams, ParseError> {
        Ok(CoreParams {
            fee_rate: parse_units(&self.fee_rate)?,
            fee_floor: parse_units(&self.fee_floor)?,
            coverage_multiplier: parse_units(&self.coverage_multiplier)?,
            solvency_multiplier: parse_units(&self.solvency_multiplier)?,
            epoch_count: self.epoch_count,
        })
    }

    /// Initial operator mint in base units.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` if `initial_mint` is not a valid decimal.
    pub fn initial_mint_amount(&self) -> Result<U256, ParseError> {
        parse_units(&self.initial_mint)
    }
}

/// One tenant to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    /// Unique tenant name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Symbol of the token premiums are paid in.
    pub payment_token_symbol: String,
    /// Kind of protection sold.
    pub protection_type: String,
    /// Network label of the insured asset.
    pub network_label: String,
    /// Certificate issuer token name.
    pub certificate_name: String,
    /// Certificate issuer token symbol.
    pub certificate_symbol: String,
    /// Policy issuer token name.
    pub policy_name: String,
    /// Policy issuer token symbol.
    pub policy_symbol: String,
}

impl Default for TenantProfile {
    fn default() -> Self {
        Self {
            name: "Test_StableCoin1_Pool".to_string(),
            description: "Stable_Coin_Pool".to_string(),
            payment_token_symbol: "USDT".to_string(),
            protection_type: "DePeg Safety".to_string(),
            network_label: "Arbitrum".to_string(),
            certificate_name: "L_231007_LC".to_string(),
            certificate_symbol: "L_231007_LC".to_string(),
            policy_name: "L_231007_P".to_string(),
            policy_symbol: "L_231007_P".to_string(),
        }
    }
}

impl TenantProfile {
    /// The default profile under another name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Metadata recorded in the registry and sent to the registry unit.
    #[must_use]
    pub fn metadata(&self) -> TenantMetadata {
        TenantMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            payment_token_symbol: self.payment_token_symbol.clone(),
            protection_type: self.protection_type.clone(),
            network: self.network_label.clone(),
        }
    }

    /// Constructor arguments of the issuer units.
    #[must_use]
    pub fn issuer_tokens(&self) -> IssuerTokens {
        IssuerTokens {
            certificate_name: self.certificate_name.clone(),
            certificate_symbol: self.certificate_symbol.clone(),
            policy_name: self.policy_name.clone(),
            policy_symbol: self.policy_symbol.clone(),
        }
    }
}
