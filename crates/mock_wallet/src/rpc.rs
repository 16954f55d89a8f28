//! Injected-provider style `request({ method, params })` surface.

use crate::error::Error;
use crate::provider::MockWalletProvider;
use crate::types::TransactionRequest;
use ethers_core::types::U256;
use ethers_core::utils::parse_ether;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_json::{json, Value};
use tracing::trace;

pub const SUPPORTED_METHODS: [&str; 8] = [
    "eth_requestAccounts",
    "eth_accounts",
    "eth_chainId",
    "eth_getBalance",
    "eth_sendTransaction",
    "eth_call",
    "personal_sign",
    "wallet_switchEthereumChain",
];

#[derive(Debug, Deserialize)]
struct SwitchChainParams {
    #[serde(rename = "chainId")]
    chain_id: String,
}

fn first_param<T: DeserializeOwned>(params: &[Value]) -> Result<Option<T>, Error> {
    Ok(params
        .first()
        .cloned()
        .map(serde_json::from_value)
        .transpose()?)
}

fn invalid_params(method: &str, reason: impl Into<String>) -> Error {
    Error::InvalidParams {
        method: method.to_string(),
        reason: reason.into(),
    }
}

/// Converts an ETH decimal string into wei.
pub fn balance_in_wei(balance: &str) -> Result<U256, Error> {
    parse_ether(balance).map_err(|_err| Error::InvalidBalance(balance.to_string()))
}

impl MockWalletProvider {
    pub async fn request(&self, method: &str, params: Option<Vec<Value>>) -> Result<Value, Error> {
        let params = params.unwrap_or_default();
        trace!(method, params = params.len(), "Mock wallet request");

        match method {
            "eth_requestAccounts" => {
                let address = self.connect().await;
                Ok(json!([address]))
            }
            "eth_accounts" => Ok(json!(self.address().into_iter().collect::<Vec<_>>())),
            "eth_chainId" => Ok(self
                .chain_id()
                .map_or(Value::Null, |id| json!(format!("0x{id:x}")))),
            "eth_getBalance" => {
                let balance = self.balance().unwrap_or_else(|| "0".to_string());
                let wei = balance_in_wei(&balance)?;
                Ok(json!(format!("0x{wei:x}")))
            }
            "eth_sendTransaction" => {
                let request = first_param::<TransactionRequest>(&params)?.unwrap_or_default();
                Ok(json!(self.send_transaction(request).await?))
            }
            "eth_call" => {
                let request = first_param::<TransactionRequest>(&params)?.unwrap_or_default();
                Ok(json!(self.call(request).await))
            }
            "personal_sign" => {
                let message = params.first().and_then(Value::as_str).unwrap_or_default();
                Ok(json!(self.sign_message(message).await?))
            }
            "wallet_switchEthereumChain" => {
                let SwitchChainParams { chain_id } = first_param(&params)?
                    .ok_or_else(|| invalid_params(method, "missing chainId"))?;
                let digits = chain_id.trim_start_matches("0x");
                let chain_id = u64::from_str_radix(if digits.is_empty() { "0" } else { digits }, 16)
                    .map_err(|err| invalid_params(method, err.to_string()))?;
                self.switch_network(chain_id).await;
                Ok(Value::Null)
            }
            other => Err(Error::UnsupportedMethod(other.to_string())),
        }
    }
}
