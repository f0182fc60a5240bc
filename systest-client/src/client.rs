//! NetworkClient - typed reads against the network under test.
//!
//! This module provides [`NetworkClient`], the read side of the harness:
//! graph series, latest totals, and smart contract state from the sharders.
//!
//! # Architecture
//!
//! NetworkClient builds requests from the models in systest-types and sends
//! them through the Transport trait. Responses are checked for a 2xx status
//! and decoded here, so a rejected query surfaces as
//! [`ClientError::Status`] with the body the network returned.
//!
//! ```text
//! Test → NetworkClient → Transport → sharder / miner / aggregate API
//! ```
//!
//! # Example
//!
//! ```ignore
//! use systest_client::{MockTransport, NetworkClient};
//! use systest_types::{GraphMetric, GraphRequest};
//!
//! let client = NetworkClient::new(MockTransport::new());
//! let points = client.graph(GraphMetric::TotalStaked, &GraphRequest::points(1)).await?;
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use systest_types::{
    Allocation, Blobber, BlobberGraphMetric, BlobberId, ChallengePoints, GraphMetric,
    GraphPoints, GraphRequest, MinerStats, NodeSummary, ProviderType, StakePoolStat, TotalMetric,
    UserStakePoolStat, Validator, WalletBalance,
};

use crate::transport::{RawResponse, Service, Transport, TransportError};

/// Request paths of the sharder and miner APIs.
pub mod paths {
    /// Storage smart contract address.
    pub const STORAGE_SC: &str =
        "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d7";
    /// Miner smart contract address.
    pub const MINER_SC: &str = "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d9";

    /// Challenge graph (two series).
    pub const GRAPH_CHALLENGES: &str = "/v2/graph-challenges";
    /// Miner chain stats.
    pub const MINER_STATS: &str = "/v1/miner/get/stats";
    /// Wallet balance.
    pub const BALANCE: &str = "/v1/client/get/balance";

    /// Path of a storage smart contract REST endpoint.
    pub fn storage(endpoint: &str) -> String {
        format!("/v1/screst/{}/{}", STORAGE_SC, endpoint)
    }

    /// Path of a miner smart contract REST endpoint.
    pub fn miner(endpoint: &str) -> String {
        format!("/v1/screst/{}/{}", MINER_SC, endpoint)
    }
}

/// Page size used when listing every blobber.
pub const BLOBBER_PAGE_SIZE: usize = 20;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a non-2xx status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Body could not be decoded.
    #[error("decode error on {path}: {source}")]
    Decode {
        /// Request path.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body if the service answered.
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct Nodes<T> {
    #[serde(rename = "Nodes", default = "Vec::new")]
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct SimpleNode {
    simple_miner: NodeSummary,
}

/// Typed reads against the network.
pub struct NetworkClient<T: Transport> {
    transport: T,
}

impl<T: Transport> NetworkClient<T> {
    /// Create a new NetworkClient.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a GET and return the raw response, whatever its status.
    pub async fn get_raw(
        &self,
        service: Service,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, ClientError> {
        Ok(self.transport.get(service, path, query).await?)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        query: &[(String, String)],
    ) -> Result<R, ClientError> {
        let response = self.get_raw(service, path, query).await?;
        if !response.is_success() {
            debug!("{} {} -> {}", service, path, response.status);
            return Err(ClientError::Status {
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })
    }

    // ===========================================
    // Aggregate API
    // ===========================================

    /// Fetch a network-wide graph series.
    pub async fn graph(
        &self,
        metric: GraphMetric,
        request: &GraphRequest,
    ) -> Result<GraphPoints, ClientError> {
        self.get_json(Service::Zbox, &metric.path(), &request.to_query())
            .await
    }

    /// Fetch the challenge graph.
    pub async fn graph_challenges(
        &self,
        request: &GraphRequest,
    ) -> Result<ChallengePoints, ClientError> {
        self.get_json(Service::Zbox, paths::GRAPH_CHALLENGES, &request.to_query())
            .await
    }

    /// Fetch a per-blobber graph series. An empty id is sent as-is.
    pub async fn blobber_graph(
        &self,
        metric: BlobberGraphMetric,
        blobber_id: &str,
        request: &GraphRequest,
    ) -> Result<GraphPoints, ClientError> {
        let mut query = vec![("id".to_string(), blobber_id.to_string())];
        query.extend(request.to_query());
        self.get_json(Service::Zbox, &metric.path(), &query).await
    }

    /// Fetch the latest value of a total.
    pub async fn total(&self, metric: TotalMetric) -> Result<i64, ClientError> {
        self.get_json(Service::Zbox, &metric.path(), &[]).await
    }

    // ===========================================
    // Sharder API
    // ===========================================

    async fn blobber_page(&self, limit: usize, offset: usize) -> Result<Vec<Blobber>, ClientError> {
        let query = vec![
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        let page: Nodes<Blobber> = self
            .get_json(Service::Sharder, &paths::storage("getblobbers"), &query)
            .await?;
        Ok(page.nodes)
    }

    /// First `limit` blobbers.
    pub async fn blobbers(&self, limit: usize) -> Result<Vec<Blobber>, ClientError> {
        self.blobber_page(limit, 0).await
    }

    /// Every blobber, fetched page by page.
    ///
    /// Stops at a short page, or at a page with no blobber not already seen
    /// (a sharder that ignores `offset` keeps returning the first page).
    pub async fn all_blobbers(&self) -> Result<Vec<Blobber>, ClientError> {
        let mut all = Vec::new();
        let mut seen: HashSet<BlobberId> = HashSet::new();
        loop {
            let page = self.blobber_page(BLOBBER_PAGE_SIZE, all.len()).await?;
            let last = page.len() < BLOBBER_PAGE_SIZE;
            let before = all.len();
            all.extend(page.into_iter().filter(|b| seen.insert(b.id.clone())));
            if all.len() == before {
                if !last {
                    warn!("blobber page at offset {} repeats earlier pages", before);
                }
                break;
            }
            if last {
                break;
            }
        }
        debug!("fetched {} blobbers", all.len());
        Ok(all)
    }

    /// A single blobber.
    pub async fn blobber(&self, blobber_id: &str) -> Result<Blobber, ClientError> {
        let query = vec![("blobber_id".to_string(), blobber_id.to_string())];
        self.get_json(Service::Sharder, &paths::storage("getBlobber"), &query)
            .await
    }

    /// An allocation.
    pub async fn allocation(&self, allocation_id: &str) -> Result<Allocation, ClientError> {
        let query = vec![("allocation".to_string(), allocation_id.to_string())];
        self.get_json(Service::Sharder, &paths::storage("allocation"), &query)
            .await
    }

    /// Stake pool of a provider.
    pub async fn stake_pool_stat(
        &self,
        provider_type: ProviderType,
        provider_id: &str,
    ) -> Result<StakePoolStat, ClientError> {
        let query = vec![
            ("provider_type".to_string(), provider_type.as_u8().to_string()),
            ("provider_id".to_string(), provider_id.to_string()),
        ];
        self.get_json(Service::Sharder, &paths::storage("getStakePoolStat"), &query)
            .await
    }

    /// Stake pools a wallet has delegated to.
    pub async fn user_stake_pool_stat(
        &self,
        client_id: &str,
    ) -> Result<UserStakePoolStat, ClientError> {
        let query = vec![("client_id".to_string(), client_id.to_string())];
        self.get_json(
            Service::Sharder,
            &paths::storage("getUserStakePoolStat"),
            &query,
        )
        .await
    }

    /// Every validator.
    pub async fn validators(&self) -> Result<Vec<Validator>, ClientError> {
        self.get_json(Service::Sharder, &paths::storage("validators"), &[])
            .await
    }

    async fn nodes(&self, endpoint: &str) -> Result<Vec<NodeSummary>, ClientError> {
        let list: Nodes<SimpleNode> = self
            .get_json(Service::Sharder, &paths::miner(endpoint), &[])
            .await?;
        Ok(list.nodes.into_iter().map(|n| n.simple_miner).collect())
    }

    /// Every miner.
    pub async fn miners(&self) -> Result<Vec<NodeSummary>, ClientError> {
        self.nodes("getMinerList").await
    }

    /// Every sharder.
    pub async fn sharders(&self) -> Result<Vec<NodeSummary>, ClientError> {
        self.nodes("getSharderList").await
    }

    /// Balance of a wallet.
    pub async fn wallet_balance(&self, client_id: &str) -> Result<WalletBalance, ClientError> {
        let query = vec![("client_id".to_string(), client_id.to_string())];
        self.get_json(Service::Sharder, paths::BALANCE, &query).await
    }

    // ===========================================
    // Miner API
    // ===========================================

    /// Chain stats of the miner.
    pub async fn miner_stats(&self) -> Result<MinerStats, ClientError> {
        self.get_json(Service::Miner, paths::MINER_STATS, &[]).await
    }

    /// Latest finalized round.
    pub async fn latest_round(&self) -> Result<i64, ClientError> {
        Ok(self.miner_stats().await?.last_finalized_round)
    }
}
