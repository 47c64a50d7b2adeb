use crate::config::NetworkConfig;
use alloy::{
    eips::{BlockId, BlockNumberOrTag},
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
};
use std::{fmt, future::Future, pin::Pin};

pub type BalanceFuture = Pin<Box<dyn Future<Output = Result<U256, QueryError>> + Send>>;
pub type ProbeFuture = Pin<Box<dyn Future<Output = Result<u64, QueryError>> + Send>>;

/// Balance-query collaborator. Implementations carry their own connection
/// configuration; callers hand over a parsed address and get a wei balance.
pub trait BalanceSource: Send + Sync {
    /// Native-token balance of `target` at the latest block.
    fn native_balance(&self, target: Address) -> BalanceFuture;

    /// Cheap connectivity check; returns the latest block number.
    fn probe(&self) -> ProbeFuture;
}

#[derive(Debug)]
pub enum QueryError {
    Connect { url: String, reason: String },
    WrongNetwork { expected: u64, actual: u64 },
    Rpc(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Connect { url, reason } => {
                write!(f, "failed to connect to {url}: {reason}")
            }
            QueryError::WrongNetwork { expected, actual } => {
                write!(f, "endpoint serves chain {actual}, expected chain {expected}")
            }
            QueryError::Rpc(message) => write!(f, "rpc error: {message}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// [`BalanceSource`] backed by an alloy provider over the configured
/// network's RPC endpoint. Connects per query and verifies the endpoint's
/// chain id against the configured one on every call.
#[derive(Debug, Clone)]
pub struct RpcBalanceSource {
    network: NetworkConfig,
}

impl RpcBalanceSource {
    pub fn new(network: NetworkConfig) -> Self {
        Self { network }
    }
}

async fn connect(url: &str) -> Result<impl Provider, QueryError> {
    ProviderBuilder::new()
        .connect(url)
        .await
        .map_err(|err| QueryError::Connect {
            url: url.to_string(),
            reason: err.to_string(),
        })
}

impl BalanceSource for RpcBalanceSource {
    fn native_balance(&self, target: Address) -> BalanceFuture {
        let network = self.network.clone();
        Box::pin(async move {
            let provider = connect(&network.rpc_url).await?;

            let actual = provider
                .get_chain_id()
                .await
                .map_err(|err| QueryError::Rpc(err.to_string()))?;
            if actual != network.chain_id {
                return Err(QueryError::WrongNetwork {
                    expected: network.chain_id,
                    actual,
                });
            }

            provider
                .get_balance(target)
                .block_id(BlockId::Number(BlockNumberOrTag::Latest))
                .await
                .map_err(|err| QueryError::Rpc(err.to_string()))
        })
    }

    fn probe(&self) -> ProbeFuture {
        let network = self.network.clone();
        Box::pin(async move {
            let provider = connect(&network.rpc_url).await?;
            provider
                .get_block_number()
                .await
                .map_err(|err| QueryError::Rpc(err.to_string()))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::{CommandBus, Message};
    use std::sync::mpsc;
    use std::time::Duration;
    use tokio::runtime::Handle;

    /// Test double returning a canned outcome for every query.
    pub(crate) struct StaticBalanceSource {
        pub balance: Result<U256, String>,
    }

    impl BalanceSource for StaticBalanceSource {
        fn native_balance(&self, _target: Address) -> BalanceFuture {
            let outcome = self
                .balance
                .clone()
                .map_err(QueryError::Rpc);
            Box::pin(async move { outcome })
        }

        fn probe(&self) -> ProbeFuture {
            Box::pin(async { Ok(1) })
        }
    }

    #[test]
    fn query_errors_render_for_the_failed_pane() {
        let connect = QueryError::Connect {
            url: "https://testnet-rpc.monad.xyz".into(),
            reason: "timed out".into(),
        };
        assert_eq!(
            connect.to_string(),
            "failed to connect to https://testnet-rpc.monad.xyz: timed out"
        );

        let wrong = QueryError::WrongNetwork {
            expected: 10_143,
            actual: 1,
        };
        assert_eq!(
            wrong.to_string(),
            "endpoint serves chain 1, expected chain 10143"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bus_delivers_one_message_per_spawn() {
        let (tx, rx) = mpsc::channel();
        let bus = CommandBus::new(tx, Handle::current());
        let source = StaticBalanceSource {
            balance: Ok(U256::from(7u64)),
        };
        let address = "0x7fffffffffffffffffffffffffffffffffffffff".to_string();
        let target: Address = address.parse().unwrap();

        let reply_to = address.clone();
        bus.spawn_async(move || async move {
            match source.native_balance(target).await {
                Ok(balance) => Message::BalanceResolved {
                    address: reply_to,
                    balance,
                },
                Err(err) => Message::BalanceFailed {
                    address: reply_to,
                    error: err.to_string(),
                },
            }
        });

        let message = rx.recv_timeout(Duration::from_secs(2)).expect("message");
        match message {
            Message::BalanceResolved {
                address: from,
                balance,
            } => {
                assert_eq!(from, address);
                assert_eq!(balance, U256::from(7u64));
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_query_carries_its_address_back() {
        let (tx, rx) = mpsc::channel();
        let bus = CommandBus::new(tx, Handle::current());
        let source = StaticBalanceSource {
            balance: Err("no data".into()),
        };
        let address = "0x0000000000000000000000000000000000000001".to_string();
        let target: Address = address.parse().unwrap();

        let reply_to = address.clone();
        bus.spawn_async(move || async move {
            match source.native_balance(target).await {
                Ok(balance) => Message::BalanceResolved {
                    address: reply_to,
                    balance,
                },
                Err(err) => Message::BalanceFailed {
                    address: reply_to,
                    error: err.to_string(),
                },
            }
        });

        match rx.recv_timeout(Duration::from_secs(2)).expect("message") {
            Message::BalanceFailed {
                address: from,
                error,
            } => {
                assert_eq!(from, address);
                assert!(error.contains("no data"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
