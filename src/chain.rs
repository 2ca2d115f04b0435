//! Chain client capability set
//!
//! The indexer core depends on this small trait surface rather than on a
//! concrete transport, so a fake client can drive the scan loop
//! deterministically in tests. The production implementations wrap alloy
//! providers: plain HTTP JSON-RPC for queries, WebSocket for head pushes.

use crate::error::ChainError;
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::{Provider, RootProvider};
use alloy::pubsub::PubSubFrontend;
use alloy::rpc::client::ClientBuilder;
use alloy::rpc::types::{BlockNumberOrTag, BlockTransactionsKind, Filter};
use alloy::transports::http::{Client, Http};
use alloy::transports::ws::WsConnect;
use alloy::transports::Transport;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::marker::PhantomData;

/// Minimal view of a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHead {
    pub number: u64,
    pub timestamp: u64,
    pub hash: B256,
}

/// A raw log as returned by `eth_getLogs`, with full provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
    pub block_hash: B256,
    pub tx_hash: B256,
    pub log_index: u64,
}

impl ChainLog {
    /// topic0, when present.
    pub fn selector(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// An `eth_getLogs` query over an inclusive block window.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub from_block: u64,
    pub to_block: u64,
    pub addresses: Vec<Address>,
    pub topic0: Option<Vec<B256>>,
}

impl LogQuery {
    pub fn range(from_block: u64, to_block: u64) -> Self {
        Self {
            from_block,
            to_block,
            ..Default::default()
        }
    }

    pub fn addresses(mut self, addresses: Vec<Address>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn topic0(mut self, selectors: Vec<B256>) -> Self {
        self.topic0 = Some(selectors);
        self
    }
}

/// Request/response capabilities the scanner needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn latest_header(&self) -> Result<ChainHead, ChainError>;

    async fn header_by_hash(&self, hash: B256) -> Result<ChainHead, ChainError>;

    async fn filter_logs(&self, query: &LogQuery) -> Result<Vec<ChainLog>, ChainError>;
}

/// Push capability: a stream of new-head notifications.
#[async_trait]
pub trait HeadSubscriber: Send + Sync {
    async fn subscribe_heads(&self) -> Result<BoxStream<'static, ChainHead>, ChainError>;
}

/// Alloy-backed client, generic over the transport.
pub struct EthereumClient<T, P> {
    provider: P,
    _transport: PhantomData<fn() -> T>,
}

impl<T, P> EthereumClient<T, P>
where
    T: Transport + Clone,
    P: Provider<T>,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _transport: PhantomData,
        }
    }
}

pub type HttpClient = EthereumClient<Http<Client>, RootProvider<Http<Client>>>;
pub type WsClient = EthereumClient<PubSubFrontend, RootProvider<PubSubFrontend>>;

impl HttpClient {
    pub fn connect_http(url: &str) -> Result<Self, ChainError> {
        let url = url
            .parse()
            .map_err(|e| ChainError::Transport(format!("invalid http url: {e}")))?;
        Ok(Self::new(RootProvider::new_http(url)))
    }
}

impl WsClient {
    pub async fn connect_ws(url: &str) -> Result<Self, ChainError> {
        let client = ClientBuilder::default()
            .ws(WsConnect::new(url))
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        Ok(Self::new(RootProvider::new(client)))
    }
}

#[async_trait]
impl<T, P> ChainClient for EthereumClient<T, P>
where
    T: Transport + Clone,
    P: Provider<T> + Send + Sync,
{
    async fn latest_header(&self) -> Result<ChainHead, ChainError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?
            .ok_or_else(|| ChainError::Transport("node returned no latest block".into()))?;
        Ok(ChainHead {
            number: block.header.number,
            timestamp: block.header.timestamp,
            hash: block.header.hash,
        })
    }

    async fn header_by_hash(&self, hash: B256) -> Result<ChainHead, ChainError> {
        let block = self
            .provider
            .get_block_by_hash(hash, BlockTransactionsKind::Hashes)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?
            .ok_or(ChainError::MissingHeader(hash))?;
        Ok(ChainHead {
            number: block.header.number,
            timestamp: block.header.timestamp,
            hash: block.header.hash,
        })
    }

    async fn filter_logs(&self, query: &LogQuery) -> Result<Vec<ChainLog>, ChainError> {
        let mut filter = Filter::new()
            .from_block(query.from_block)
            .to_block(query.to_block);
        if !query.addresses.is_empty() {
            filter = filter.address(query.addresses.clone());
        }
        if let Some(selectors) = &query.topic0 {
            filter = filter.event_signature(selectors.clone());
        }
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        // Pending logs without provenance cannot be keyed and are dropped;
        // confirmed-range queries never produce them.
        Ok(logs.into_iter().filter_map(from_rpc_log).collect())
    }
}

#[async_trait]
impl<P> HeadSubscriber for EthereumClient<PubSubFrontend, P>
where
    P: Provider<PubSubFrontend> + Send + Sync,
{
    async fn subscribe_heads(&self) -> Result<BoxStream<'static, ChainHead>, ChainError> {
        let subscription = self
            .provider
            .subscribe_blocks()
            .await
            .map_err(|e| ChainError::Subscription(e.to_string()))?;
        Ok(subscription
            .into_stream()
            .map(|header| ChainHead {
                number: header.number,
                timestamp: header.timestamp,
                hash: header.hash,
            })
            .boxed())
    }
}

fn from_rpc_log(log: alloy::rpc::types::Log) -> Option<ChainLog> {
    Some(ChainLog {
        address: log.inner.address,
        topics: log.inner.data.topics().to_vec(),
        data: log.inner.data.data.clone(),
        block_number: log.block_number?,
        block_hash: log.block_hash?,
        tx_hash: log.transaction_hash?,
        log_index: log.log_index?,
    })
}
