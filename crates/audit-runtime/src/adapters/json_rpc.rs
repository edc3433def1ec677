//! Ethereum JSON-RPC implementation of the `EventSource` port.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    Address, BlockNumber, BlockWithdrawals, EventSource, SourceError, TransferEvent, Withdrawal,
    U256,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use super::types::*;

/// Errors that can occur when talking to the RPC endpoint.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON-RPC error: {0}")]
    Rpc(JsonRpcError),
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl RpcError {
    /// Map onto the port's error type. Transport and node errors are
    /// `Unavailable` (retryable); undecodable payloads are `Malformed`.
    pub fn into_source_error(self, method: &str) -> SourceError {
        match self {
            RpcError::Parse(reason) => SourceError::malformed(method, reason),
            other => SourceError::Unavailable(format!("{method}: {other}")),
        }
    }
}

/// JSON-RPC event source for one token contract.
pub struct JsonRpcEventSource {
    client: Client,
    url: String,
    token: Address,
    request_id: AtomicU64,
}

impl JsonRpcEventSource {
    /// Create a client for `url`, reading transfers and balances of `token`.
    pub fn new(url: impl Into<String>, token: Address, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(RpcError::Http)?;

        Ok(Self {
            client,
            url: url.into(),
            token,
            request_id: AtomicU64::new(1),
        })
    }

    /// Token contract queried.
    pub fn token(&self) -> Address {
        self.token
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method. A `null` result is returned as `None`.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, SourceError> {
        self.try_call(method, params)
            .await
            .map_err(|e| e.into_source_error(method))
    }

    async fn try_call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, RpcError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection(format!("Cannot connect to {}", self.url))
                } else {
                    RpcError::Http(e)
                }
            })?
            .error_for_status()?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::Parse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Rpc(error));
        }
        Ok(rpc_response.result)
    }

    async fn call_required<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, SourceError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| SourceError::malformed(method, "missing result"))
    }
}

fn decode_withdrawal(raw: &RpcWithdrawal) -> Result<Withdrawal, SourceError> {
    const WHAT: &str = "eth_getBlockByNumber";
    Ok(Withdrawal {
        address: raw
            .address
            .parse()
            .map_err(|e| SourceError::malformed(WHAT, e))?,
        amount: parse_quantity_u256(WHAT, &raw.amount)?,
        index: parse_quantity_u256(WHAT, &raw.index)?,
    })
}

fn decode_transfer(log: &RpcLog) -> Result<TransferEvent, SourceError> {
    const WHAT: &str = "eth_getLogs";
    if log.topics.len() < 3 {
        return Err(SourceError::malformed(
            WHAT,
            format!("Transfer log with {} topics", log.topics.len()),
        ));
    }
    Ok(TransferEvent {
        block: parse_quantity(WHAT, &log.block_number)?,
        from: parse_topic_address(WHAT, &log.topics[1])?,
        to: parse_topic_address(WHAT, &log.topics[2])?,
        value: parse_quantity_u256(WHAT, &log.data)?,
    })
}

#[async_trait]
impl EventSource for JsonRpcEventSource {
    async fn block_number(&self) -> Result<BlockNumber, SourceError> {
        let raw: String = self.call_required("eth_blockNumber", [(); 0]).await?;
        parse_quantity("eth_blockNumber", &raw)
    }

    async fn get_block(
        &self,
        number: BlockNumber,
    ) -> Result<Option<BlockWithdrawals>, SourceError> {
        let block: Option<RpcBlock> = self
            .call(
                "eth_getBlockByNumber",
                (block_tag(Some(number), "latest"), false),
            )
            .await?;

        let Some(block) = block else {
            return Ok(None);
        };

        let reported = parse_quantity("eth_getBlockByNumber", &block.number)?;
        if reported != number {
            return Err(SourceError::malformed(
                "eth_getBlockByNumber",
                format!("asked for block {number}, got {reported}"),
            ));
        }

        let withdrawals = block
            .withdrawals
            .iter()
            .map(decode_withdrawal)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(BlockWithdrawals::new(number, withdrawals)))
    }

    async fn transfer_events(
        &self,
        from_block: Option<BlockNumber>,
        to_block: Option<BlockNumber>,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        let filter = LogFilter {
            address: self.token.to_string(),
            topics: vec![TRANSFER_TOPIC.to_string()],
            from_block: block_tag(from_block, "earliest"),
            to_block: block_tag(to_block, "latest"),
        };

        let logs: Vec<RpcLog> = self.call_required("eth_getLogs", [filter]).await?;
        let mut events = logs
            .iter()
            .map(decode_transfer)
            .collect::<Result<Vec<_>, _>>()?;
        events.sort_by_key(|e| e.block);

        tracing::debug!("[audit] eth_getLogs returned {} transfers", events.len());
        Ok(events)
    }

    async fn balance_of(&self, holder: &Address) -> Result<U256, SourceError> {
        let call = CallRequest {
            to: self.token.to_string(),
            data: balance_of_calldata(holder),
        };
        let raw: String = self.call_required("eth_call", (call, "latest")).await?;
        parse_quantity_u256("eth_call", &raw)
    }
}
