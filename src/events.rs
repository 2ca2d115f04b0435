//! Event codec catalog for the launchpad contracts
//!
//! Maps the 32-byte selector (topic0) of each known factory, pool, and oracle
//! event to a typed decoder. The catalog is immutable once built; unknown
//! selectors are not an error and decode to `None`.

use crate::chain::ChainLog;
use crate::error::DecodeError;
use alloy::primitives::{Address, B256, LogData, U256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use std::collections::HashMap;

sol! {
    event PoolCreated(address indexed token, address pool, address oracle);

    event PriceUpdate(uint256 priceX18, uint256 floorX18);
    event Sync(uint256 reserveUSDC, uint256 reserveToken);
    event Swap(address indexed sender, uint256 amountIn, uint256 amountOut, bool usdcToToken, address indexed to);
    event AddLiquidity(address indexed provider, uint256 amountUSDC, uint256 amountToken, uint256 lpMinted);
    event RemoveLiquidity(address indexed provider, uint256 lpBurned, uint256 amountUSDC, uint256 amountToken);
    event CollectCreatorFees(uint256 amountUSDC);
    event InitialTokenSeeded(uint256 amountToken);

    event OracleUpdate(uint256 priceCumulative, uint32 timestamp);
}

/// Selector the factory filter keys on.
pub const POOL_CREATED_SELECTOR: B256 = PoolCreated::SIGNATURE_HASH;

/// Which contract kind publishes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Factory,
    Pool,
    Oracle,
}

/// Catalog entry: event name plus the contract kind it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct EventDescriptor {
    pub name: &'static str,
    pub contract: ContractKind,
}

/// Selector-keyed table of every event the indexer understands.
pub struct EventCatalog {
    table: HashMap<B256, EventDescriptor>,
}

impl EventCatalog {
    pub fn new() -> Self {
        let mut table = HashMap::new();
        let mut add = |selector: B256, name, contract| {
            table.insert(selector, EventDescriptor { name, contract });
        };
        add(PoolCreated::SIGNATURE_HASH, "PoolCreated", ContractKind::Factory);
        add(PriceUpdate::SIGNATURE_HASH, "PriceUpdate", ContractKind::Pool);
        add(Sync::SIGNATURE_HASH, "Sync", ContractKind::Pool);
        add(Swap::SIGNATURE_HASH, "Swap", ContractKind::Pool);
        add(AddLiquidity::SIGNATURE_HASH, "AddLiquidity", ContractKind::Pool);
        add(RemoveLiquidity::SIGNATURE_HASH, "RemoveLiquidity", ContractKind::Pool);
        add(CollectCreatorFees::SIGNATURE_HASH, "CollectCreatorFees", ContractKind::Pool);
        add(InitialTokenSeeded::SIGNATURE_HASH, "InitialTokenSeeded", ContractKind::Pool);
        add(OracleUpdate::SIGNATURE_HASH, "OracleUpdate", ContractKind::Oracle);
        Self { table }
    }

    pub fn lookup(&self, selector: &B256) -> Option<&EventDescriptor> {
        self.table.get(selector)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded factory event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryEvent {
    PoolCreated {
        token: Address,
        pool: Address,
        oracle: Address,
    },
}

/// Decoded pool event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolLogEvent {
    PriceUpdate {
        price_x18: U256,
        floor_x18: U256,
    },
    Sync {
        reserve_usdc: U256,
        reserve_token: U256,
    },
    Swap {
        sender: Address,
        recipient: Address,
        amount_in: U256,
        amount_out: U256,
        usdc_to_token: bool,
    },
    AddLiquidity {
        provider: Address,
        amount_usdc: U256,
        amount_token: U256,
        lp_minted: U256,
    },
    RemoveLiquidity {
        provider: Address,
        lp_burned: U256,
        amount_usdc: U256,
        amount_token: U256,
    },
    CollectCreatorFees {
        amount_usdc: U256,
    },
    /// Recognized so the selector does not show up as unknown; nothing is stored.
    InitialTokenSeeded,
}

/// Decoded oracle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleLogEvent {
    OracleUpdate {
        price_cumulative: U256,
        /// Oracle-reported 32-bit timestamp, distinct from the block time.
        timestamp: u32,
    },
}

fn decode_as<E: SolEvent>(log: &ChainLog) -> Result<E, DecodeError> {
    let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
    E::decode_log_data(&data, true).map_err(|e| DecodeError {
        event: E::SIGNATURE,
        selector: log.topics.first().copied().unwrap_or_default(),
        tx_hash: log.tx_hash,
        reason: e.to_string(),
    })
}

/// Decode a log emitted by the factory. Unknown selectors are ignored.
pub fn decode_factory_log(log: &ChainLog) -> Result<Option<FactoryEvent>, DecodeError> {
    match log.topics.first() {
        Some(&selector) if selector == PoolCreated::SIGNATURE_HASH => {
            let ev = decode_as::<PoolCreated>(log)?;
            Ok(Some(FactoryEvent::PoolCreated {
                token: ev.token,
                pool: ev.pool,
                oracle: ev.oracle,
            }))
        }
        _ => Ok(None),
    }
}

/// Decode a log emitted by a pool. Unknown selectors are ignored.
pub fn decode_pool_log(log: &ChainLog) -> Result<Option<PoolLogEvent>, DecodeError> {
    let Some(&selector) = log.topics.first() else {
        return Ok(None);
    };
    let event = if selector == PriceUpdate::SIGNATURE_HASH {
        let ev = decode_as::<PriceUpdate>(log)?;
        PoolLogEvent::PriceUpdate {
            price_x18: ev.priceX18,
            floor_x18: ev.floorX18,
        }
    } else if selector == Sync::SIGNATURE_HASH {
        let ev = decode_as::<Sync>(log)?;
        PoolLogEvent::Sync {
            reserve_usdc: ev.reserveUSDC,
            reserve_token: ev.reserveToken,
        }
    } else if selector == Swap::SIGNATURE_HASH {
        let ev = decode_as::<Swap>(log)?;
        PoolLogEvent::Swap {
            sender: ev.sender,
            recipient: ev.to,
            amount_in: ev.amountIn,
            amount_out: ev.amountOut,
            usdc_to_token: ev.usdcToToken,
        }
    } else if selector == AddLiquidity::SIGNATURE_HASH {
        let ev = decode_as::<AddLiquidity>(log)?;
        PoolLogEvent::AddLiquidity {
            provider: ev.provider,
            amount_usdc: ev.amountUSDC,
            amount_token: ev.amountToken,
            lp_minted: ev.lpMinted,
        }
    } else if selector == RemoveLiquidity::SIGNATURE_HASH {
        let ev = decode_as::<RemoveLiquidity>(log)?;
        PoolLogEvent::RemoveLiquidity {
            provider: ev.provider,
            lp_burned: ev.lpBurned,
            amount_usdc: ev.amountUSDC,
            amount_token: ev.amountToken,
        }
    } else if selector == CollectCreatorFees::SIGNATURE_HASH {
        let ev = decode_as::<CollectCreatorFees>(log)?;
        PoolLogEvent::CollectCreatorFees {
            amount_usdc: ev.amountUSDC,
        }
    } else if selector == InitialTokenSeeded::SIGNATURE_HASH {
        PoolLogEvent::InitialTokenSeeded
    } else {
        return Ok(None);
    };
    Ok(Some(event))
}

/// Decode a log emitted by a pool oracle. Unknown selectors are ignored.
pub fn decode_oracle_log(log: &ChainLog) -> Result<Option<OracleLogEvent>, DecodeError> {
    match log.topics.first() {
        Some(&selector) if selector == OracleUpdate::SIGNATURE_HASH => {
            let ev = decode_as::<OracleUpdate>(log)?;
            Ok(Some(OracleLogEvent::OracleUpdate {
                price_cumulative: ev.priceCumulative,
                timestamp: ev.timestamp,
            }))
        }
        _ => Ok(None),
    }
}
