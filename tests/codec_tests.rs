//! Codec catalog coverage: selector routing and decode fidelity

use alloy::primitives::{address, Address, B256, U256};
use alloy::sol_types::SolEvent;
use launchpad_indexer::chain::ChainLog;
use launchpad_indexer::events::{
    self, AddLiquidity, CollectCreatorFees, EventCatalog, FactoryEvent, InitialTokenSeeded,
    OracleLogEvent, OracleUpdate, PoolCreated, PoolLogEvent, PriceUpdate, RemoveLiquidity, Swap,
    Sync,
};

const FACTORY: Address = address!("00000000000000000000000000000000000000f1");
const TOKEN: Address = address!("00000000000000000000000000000000000000aa");
const POOL: Address = address!("00000000000000000000000000000000000000bb");
const ORACLE: Address = address!("00000000000000000000000000000000000000cc");
const TRADER: Address = address!("00000000000000000000000000000000000000dd");

fn chain_log(address: Address, data: alloy::primitives::LogData) -> ChainLog {
    ChainLog {
        address,
        topics: data.topics().to_vec(),
        data: data.data.clone(),
        block_number: 42,
        block_hash: B256::repeat_byte(0x42),
        tx_hash: B256::repeat_byte(0x11),
        log_index: 0,
    }
}

#[test]
fn pool_created_round_trips_through_the_codec() {
    let event = PoolCreated {
        token: TOKEN,
        pool: POOL,
        oracle: ORACLE,
    };
    let encoded = event.encode_log_data();
    let log = chain_log(FACTORY, encoded.clone());

    let decoded = events::decode_factory_log(&log).unwrap().unwrap();
    assert_eq!(
        decoded,
        FactoryEvent::PoolCreated {
            token: TOKEN,
            pool: POOL,
            oracle: ORACLE,
        }
    );

    // re-encoding reproduces the original topics and data
    let reencoded = PoolCreated {
        token: TOKEN,
        pool: POOL,
        oracle: ORACLE,
    }
    .encode_log_data();
    assert_eq!(reencoded, encoded);
}

#[test]
fn price_update_decodes_the_exact_integers() {
    let event = PriceUpdate {
        priceX18: U256::from(1_000_000_000_000_000_000u64),
        floorX18: U256::from(500_000_000_000_000_000u64),
    };
    let log = chain_log(POOL, event.encode_log_data());

    match events::decode_pool_log(&log).unwrap().unwrap() {
        PoolLogEvent::PriceUpdate {
            price_x18,
            floor_x18,
        } => {
            assert_eq!(price_x18, U256::from(1_000_000_000_000_000_000u64));
            assert_eq!(floor_x18, U256::from(500_000_000_000_000_000u64));
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn sync_decodes_reserves() {
    let event = Sync {
        reserveUSDC: U256::from(12_345u64),
        reserveToken: U256::from(67_890u64),
    };
    let log = chain_log(POOL, event.encode_log_data());
    assert_eq!(
        events::decode_pool_log(&log).unwrap().unwrap(),
        PoolLogEvent::Sync {
            reserve_usdc: U256::from(12_345u64),
            reserve_token: U256::from(67_890u64),
        }
    );
}

#[test]
fn swap_decodes_indexed_participants_and_direction() {
    let event = Swap {
        sender: TRADER,
        amountIn: U256::from(1_000u64),
        amountOut: U256::from(995u64),
        usdcToToken: true,
        to: TOKEN,
    };
    let log = chain_log(POOL, event.encode_log_data());
    // sender and recipient ride in topics, the amounts in the data segment
    assert_eq!(log.topics.len(), 3);

    assert_eq!(
        events::decode_pool_log(&log).unwrap().unwrap(),
        PoolLogEvent::Swap {
            sender: TRADER,
            recipient: TOKEN,
            amount_in: U256::from(1_000u64),
            amount_out: U256::from(995u64),
            usdc_to_token: true,
        }
    );
}

#[test]
fn liquidity_events_decode_both_directions() {
    let add = AddLiquidity {
        provider: TRADER,
        amountUSDC: U256::from(500u64),
        amountToken: U256::from(1_000u64),
        lpMinted: U256::from(700u64),
    };
    let log = chain_log(POOL, add.encode_log_data());
    assert_eq!(
        events::decode_pool_log(&log).unwrap().unwrap(),
        PoolLogEvent::AddLiquidity {
            provider: TRADER,
            amount_usdc: U256::from(500u64),
            amount_token: U256::from(1_000u64),
            lp_minted: U256::from(700u64),
        }
    );

    let remove = RemoveLiquidity {
        provider: TRADER,
        lpBurned: U256::from(700u64),
        amountUSDC: U256::from(480u64),
        amountToken: U256::from(990u64),
    };
    let log = chain_log(POOL, remove.encode_log_data());
    assert_eq!(
        events::decode_pool_log(&log).unwrap().unwrap(),
        PoolLogEvent::RemoveLiquidity {
            provider: TRADER,
            lp_burned: U256::from(700u64),
            amount_usdc: U256::from(480u64),
            amount_token: U256::from(990u64),
        }
    );
}

#[test]
fn creator_fees_and_seed_events_decode() {
    let fees = CollectCreatorFees {
        amountUSDC: U256::from(42u64),
    };
    let log = chain_log(POOL, fees.encode_log_data());
    assert_eq!(
        events::decode_pool_log(&log).unwrap().unwrap(),
        PoolLogEvent::CollectCreatorFees {
            amount_usdc: U256::from(42u64),
        }
    );

    let seeded = InitialTokenSeeded {
        amountToken: U256::from(1u64),
    };
    let log = chain_log(POOL, seeded.encode_log_data());
    assert_eq!(
        events::decode_pool_log(&log).unwrap().unwrap(),
        PoolLogEvent::InitialTokenSeeded
    );
}

#[test]
fn oracle_update_keeps_the_32_bit_timestamp() {
    let event = OracleUpdate {
        priceCumulative: U256::MAX,
        timestamp: 1_700_000_000,
    };
    let log = chain_log(ORACLE, event.encode_log_data());
    assert_eq!(
        events::decode_oracle_log(&log).unwrap().unwrap(),
        OracleLogEvent::OracleUpdate {
            price_cumulative: U256::MAX,
            timestamp: 1_700_000_000,
        }
    );
}

#[test]
fn truncated_data_is_a_decode_error_not_a_panic() {
    let event = PriceUpdate {
        priceX18: U256::from(1u64),
        floorX18: U256::from(2u64),
    };
    let mut log = chain_log(POOL, event.encode_log_data());
    log.data = log.data.slice(..16); // half a word

    let err = events::decode_pool_log(&log).unwrap_err();
    assert!(err.to_string().contains("PriceUpdate"));
}

#[test]
fn missing_indexed_topic_is_a_decode_error() {
    let event = Swap {
        sender: TRADER,
        amountIn: U256::from(1u64),
        amountOut: U256::from(1u64),
        usdcToToken: false,
        to: TOKEN,
    };
    let mut log = chain_log(POOL, event.encode_log_data());
    log.topics.truncate(2); // drop the recipient topic

    assert!(events::decode_pool_log(&log).is_err());
}

#[test]
fn unknown_selectors_are_ignored() {
    let log = ChainLog {
        address: POOL,
        topics: vec![B256::repeat_byte(0xfe)],
        data: Default::default(),
        block_number: 1,
        block_hash: B256::repeat_byte(0x01),
        tx_hash: B256::repeat_byte(0x02),
        log_index: 0,
    };
    assert!(events::decode_pool_log(&log).unwrap().is_none());
    assert!(events::decode_factory_log(&log).unwrap().is_none());
    assert!(events::decode_oracle_log(&log).unwrap().is_none());

    let catalog = EventCatalog::new();
    assert!(catalog.lookup(&B256::repeat_byte(0xfe)).is_none());
}
