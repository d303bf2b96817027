//! # Pipeline Integration Tests
//!
//! Runs the whole migration through its ports:
//!
//! 1. A snapshot directory on disk is migrated end to end into JSON documents
//! 2. Input errors abort before anything is written
//! 3. A failed write leaves no consolidated document behind
//! 4. The worked examples of each stage hold through the pipeline

use std::fs;
use std::path::Path;

use genesis_migration::{
    documents, files, AddressCodec, InMemorySink, InMemorySnapshot, JsonFileSink,
    JsonSnapshotDir, MigrationApi, MigrationPipeline, NodeVoteStatus, PipelineSettings,
    Ss58AddressCodec,
};
use serde_json::{json, Value};
use shared_types::{
    BucketBalances, DepositWeight, GenesisParams, LegacyAccount, LegacyAsset, MigrationError,
    RawKey, Weight,
};

const HEIGHT: u64 = 23_170_000;
const COUNCIL: &str = "0x67df26a755e0c31ac81e2ed530d147d7f2b9a3f5a570619048c562b1ed00dfdd";
const SDOT: &str = "0x985ce3564a5e74bff91a742388cbb392fd98994b22109fef6efe8d0792662d30";
const COUNCIL_ADDRESS: &str = "5RzDbX1ZiQZuAuxMGBn6WzvZiJnGEoainSWj9VWe27K6EcLz";

fn key(byte: u8) -> String {
    format!("0x{}", format!("{byte:02x}").repeat(32))
}

fn address(byte: u8) -> String {
    Ss58AddressCodec::chainx()
        .encode(&RawKey::repeat_byte(byte))
        .to_string()
}

fn intention(account: u8, pot: u8, jackpot: u64, self_vote: u64, total: u64) -> Value {
    json!({
        "account": key(account),
        "name": format!("Validator{account}"),
        "isValidator": true,
        "selfVote": self_vote,
        "jackpot": jackpot,
        "jackpotAccount": key(pot),
        "url": "chainx.org",
        "isActive": true,
        "about": "",
        "sessionKey": key(account),
        "isTrustee": [],
        "totalNomination": total,
        "lastTotalVoteWeight": "0",
        "lastTotalVoteWeightUpdate": 0
    })
}

fn pcx(account: &str, free: u64, staking: u64) -> Value {
    json!({
        "account": account,
        "assets": [
            { "name": "PCX", "details": { "Free": free, "ReservedStaking": staking } }
        ]
    })
}

/// A small chain:
///
/// - validator 0x01 is active, validator 0x02 is dying and self-bonded,
///   validator 0x03 is dead, validator 0x04 is dying with mixed nominators;
/// - accounts 0xaa and 0x02 hold PCX, 0x82 is 0x02's reward pot;
/// - the council and S-DOT accounts hold PCX and BTC.
fn write_snapshot(state_dir: &Path) {
    let dir = state_dir.join(HEIGHT.to_string());
    fs::create_dir_all(&dir).unwrap();
    let write = |file: &str, value: Value| {
        fs::write(dir.join(file), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    };

    write(
        files::ACCOUNTS,
        json!([
            pcx(&key(0xaa), 5, 0),
            pcx(&key(0x02), 1_000, 500),
            pcx(&key(0x82), 50_000_000, 0),
            pcx(&key(0xbb), 0, 0),
            {
                "account": COUNCIL,
                "assets": [
                    { "name": "PCX", "details": { "Free": 700 } },
                    { "name": "BTC", "details": { "Free": 3 } }
                ]
            },
            pcx(SDOT, 300, 0),
            {
                "account": key(0xcc),
                "assets": [{ "name": "BTC", "details": { "Free": 0, "ReservedWithdrawal": 9 } }]
            }
        ]),
    );
    write(
        files::INTENTIONS,
        json!([
            intention(0x01, 0x81, 200_000_000, 10, 30),
            intention(0x02, 0x82, 50_000_000, 100, 100),
            intention(0x03, 0x83, 0, 0, 0),
            intention(0x04, 0x84, 20, 1, 2)
        ]),
    );
    write(
        files::VALIDATOR_WEIGHTS,
        json!([
            { "account": key(0x01), "nomination": 30, "weight": "3000" },
            { "account": key(0x03), "nomination": 0, "weight": "7" }
        ]),
    );
    write(
        files::NOMINATORS,
        json!([
            {
                "account": key(0x10),
                "nodes": [
                    { "account": key(0x01), "nomination": 20, "weight": "2000",
                      "revocations": [{ "blockNumber": 1, "value": 4 }] },
                    { "account": key(0x04), "nomination": 0, "weight": "0", "revocations": [] }
                ]
            },
            {
                "account": key(0x11),
                "nodes": [
                    { "account": key(0x01), "nomination": 10, "weight": "1000",
                      "revocations": [{ "blockNumber": 2, "value": 6 }] }
                ]
            },
            {
                "account": key(0x12),
                "nodes": [{ "account": key(0x04), "nomination": 0, "weight": "0" }]
            }
        ]),
    );
    write(
        files::MINERS,
        json!([
            { "account": key(0x20), "xbtc": { "balance": 1, "weight": "0" } },
            { "account": key(0x21), "xbtc": { "balance": 2, "weight": "10" } },
            { "account": key(0x22), "xbtc": { "balance": 3, "weight": "20" } }
        ]),
    );
    write(
        files::MINING_ASSETS,
        json!({
            "xbtc": { "balance": 6, "weight": "12345" },
            "lbtc": { "balance": 0, "weight": "0" },
            "sdot": { "balance": 0, "weight": "0" }
        }),
    );
    write(
        files::ASSET_TOTALS,
        json!([
            { "name": "PCX", "details": { "Free": 50_002_005u64, "ReservedStaking": 500 } },
            { "name": "BTC", "details": { "Free": 3, "ReservedWithdrawal": 9 } },
            { "name": "L-BTC", "details": {} },
            { "name": "SDOT", "details": {} }
        ]),
    );
}

fn json_pipeline(
    root: &Path,
) -> MigrationPipeline<JsonSnapshotDir, JsonFileSink, Ss58AddressCodec> {
    MigrationPipeline::new(
        JsonSnapshotDir::new(root.join("state_1.0"), HEIGHT),
        JsonFileSink::new(
            root.join("res/aux"),
            root.join("res/2.0/genesis_builder_params.json"),
        ),
        Ss58AddressCodec::chainx(),
        PipelineSettings::default(),
    )
}

fn read(path: impl AsRef<Path>) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_json_migration() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));

    let params = json_pipeline(root.path()).run().unwrap();
    let genesis = read(root.path().join("res/2.0/genesis_builder_params.json"));
    assert_eq!(genesis, serde_json::to_value(&params).unwrap());

    // Balances: 0xaa, validator 0x02 with its pot claimed, treasury last.
    assert_eq!(
        genesis["balances"]["free_balances"],
        json!([
            { "who": address(0xaa), "free": 5 },
            { "who": address(0x02), "free": 50_001_500u64 },
            { "who": COUNCIL_ADDRESS, "free": 1_000 }
        ])
    );
    assert_eq!(genesis["balances"]["wellknown_accounts"]["legacy_council"], json!(COUNCIL_ADDRESS));
    assert_eq!(
        genesis["balances"]["wellknown_accounts"]["legacy_pots"][1],
        json!([address(0x82), address(0x02)])
    );

    // BTC of the council is migrated like any other account.
    assert_eq!(
        genesis["xassets"],
        json!([
            { "who": COUNCIL_ADDRESS, "free": 3 },
            { "who": address(0xcc), "free": 9 }
        ])
    );

    assert_eq!(
        genesis["xstaking"]["validators"],
        json!([{
            "who": address(0x01),
            "referral_id": "Validator1",
            "self_bonded": 10,
            "total_nomination": 30,
            "total_weight": "3000"
        }])
    );
    let nominators = genesis["xstaking"]["nominators"].as_array().unwrap();
    assert_eq!(nominators.len(), 2);
    assert_eq!(nominators[0]["nominations"].as_array().unwrap().len(), 1);

    assert_eq!(genesis["xmining_asset"]["xbtc_info"], json!({ "balance": 6, "weight": "30" }));
    assert_eq!(genesis["xmining_asset"]["xbtc_miners"].as_array().unwrap().len(), 2);

    // Aux documents.
    let aux = root.path().join("res/aux");
    assert_eq!(read(aux.join(documents::XBTC_INFO))["weight"], json!("12345"));
    assert_eq!(read(aux.join(documents::REVOCATIONS)), json!({ key(0x01): 10 }));
    assert_eq!(
        read(aux.join(documents::AUTO_CLAIMED)),
        json!({ address(0x02): 50_000_000 })
    );
    assert_eq!(read(aux.join(documents::INTENTIONS_DEAD))[0]["account"], json!(address(0x03)));
    let dying = read(aux.join(documents::INTENTIONS_DYING));
    assert_eq!(dying.as_array().unwrap().len(), 2);
    assert_eq!(dying[0]["reason"], json!("self_bonded"));
    assert_eq!(dying[1]["reason"], json!("mixed_nominators"));
    assert_eq!(dying[1]["account"], json!(address(0x04)));
    assert_eq!(read(aux.join(documents::INTENTIONS_ACTIVE))[0]["url"], json!("chainx.org"));
    assert_eq!(read(aux.join(documents::AUDIT_FLAGS)), json!([]));

    let pure = read(aux.join(documents::BALANCES_PURE));
    assert_eq!(pure[1], json!({ "who": address(0x02), "free": 1_500 }));
    let in_pubkey = read(aux.join(documents::BALANCES_IN_PUBKEY));
    assert_eq!(in_pubkey[1], json!({ "who": key(0x02), "free": 50_001_500u64 }));
    assert_eq!(in_pubkey[2], json!({ "who": COUNCIL, "free": 1_000 }));

    let ledger = read(aux.join(documents::LEDGER_SUMMARY));
    assert_eq!(ledger["genesis_total"], json!("50002505"));
    assert_eq!(ledger["excluded_pot_total"], json!("50000000"));
    assert_eq!(ledger["treasury_total"], json!("1000"));
}

#[test]
fn test_verification_passes_on_consistent_snapshot() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));
    let pipeline = json_pipeline(root.path());

    let supply = pipeline.verify_asset_supply().unwrap();
    assert!(supply.is_consistent(), "{supply:?}");

    let votes = pipeline.verify_vote_weights().unwrap();
    let statuses: Vec<NodeVoteStatus> = votes.nodes.iter().map(|node| node.status).collect();
    // 0x01 matches its votes; 0x03 has weight but no voters.
    assert_eq!(statuses, vec![NodeVoteStatus::Pass, NodeVoteStatus::MissingFromAccounts]);
    assert_eq!(votes.aggregated_weight, Weight::from_u128(3000));

    let aux = root.path().join("res/aux");
    assert!(aux.join(documents::VERIFY_ASSETS).exists());
    assert!(aux.join(documents::VERIFY_VOTE_WEIGHTS).exists());
}

#[test]
fn test_missing_input_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));
    fs::remove_file(
        root.path()
            .join("state_1.0")
            .join(HEIGHT.to_string())
            .join(files::MINERS),
    )
    .unwrap();

    let err = json_pipeline(root.path()).run().unwrap_err();
    assert!(matches!(err, MigrationError::InputRead { .. }));
    assert!(!root.path().join("res").exists());
}

#[test]
fn test_malformed_input_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));
    fs::write(
        root.path()
            .join("state_1.0")
            .join(HEIGHT.to_string())
            .join(files::NOMINATORS),
        r#"[{ "account": "0x01", "nodes": [] }]"#,
    )
    .unwrap();

    let err = json_pipeline(root.path()).run().unwrap_err();
    assert!(matches!(err, MigrationError::InputParse { .. }));
    assert!(!root.path().join("res").exists());
}

#[test]
fn test_failed_write_leaves_no_genesis_document() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));
    let genesis_path = root.path().join("res/2.0/genesis_builder_params.json");
    fs::create_dir_all(genesis_path.parent().unwrap()).unwrap();
    fs::write(&genesis_path, "{ \"stale\": true }").unwrap();

    // A directory where an aux document should go makes that write fail.
    fs::create_dir_all(root.path().join("res/aux").join(documents::WELLKNOWN)).unwrap();

    let err = json_pipeline(root.path()).run().unwrap_err();
    assert!(matches!(err, MigrationError::OutputWrite { .. }));
    assert!(!genesis_path.exists());
    assert!(root.path().join("res/aux").join(documents::VALIDATORS).exists());
}

#[test]
fn test_in_memory_failure_at_last_aux_document() {
    let snapshot = InMemorySnapshot {
        mining_assets: [(
            "xbtc".to_string(),
            shared_types::DepositWeight {
                balance: 0,
                weight: Weight::ZERO,
            },
        )]
        .into_iter()
        .collect(),
        ..InMemorySnapshot::default()
    };
    let sink = InMemorySink::failing_on(documents::AUDIT_FLAGS);

    let result = MigrationPipeline::new(
        snapshot,
        &sink,
        Ss58AddressCodec::chainx(),
        PipelineSettings::default(),
    )
    .run();

    assert!(result.is_err());
    assert!(sink.aux(documents::LEDGER_SUMMARY).is_some());
    assert!(sink.genesis().is_none());
}

#[test]
fn test_rerun_is_deterministic() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));

    let first: GenesisParams = json_pipeline(root.path()).run().unwrap();
    let first_raw = fs::read(root.path().join("res/2.0/genesis_builder_params.json")).unwrap();
    let second = json_pipeline(root.path()).run().unwrap();
    let second_raw = fs::read(root.path().join("res/2.0/genesis_builder_params.json")).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_raw, second_raw);
}

#[test]
fn test_active_validator_without_weight_is_flagged() {
    let root = tempfile::tempdir().unwrap();
    write_snapshot(&root.path().join("state_1.0"));
    fs::write(
        root.path()
            .join("state_1.0")
            .join(HEIGHT.to_string())
            .join(files::VALIDATOR_WEIGHTS),
        "[]",
    )
    .unwrap();

    let params = json_pipeline(root.path()).run().unwrap();
    assert_eq!(params.xstaking.validators[0].total_weight, None);

    let flags = read(root.path().join("res/aux").join(documents::AUDIT_FLAGS));
    assert_eq!(
        flags,
        json!([{ "kind": "missing_validator_weight", "validator": address(0x01) }])
    );
    let genesis = read(root.path().join("res/2.0/genesis_builder_params.json"));
    assert_eq!(genesis["xstaking"]["validators"][0]["total_weight"], json!(null));
}

fn in_memory_snapshot(accounts: Vec<LegacyAccount>) -> InMemorySnapshot {
    InMemorySnapshot {
        accounts,
        mining_assets: [("xbtc".to_string(), DepositWeight::default())]
            .into_iter()
            .collect(),
        ..InMemorySnapshot::default()
    }
}

fn pcx_account(byte: u8, free: u64) -> LegacyAccount {
    LegacyAccount {
        account: RawKey::repeat_byte(byte),
        assets: vec![LegacyAsset {
            name: "PCX".to_string(),
            details: BucketBalances::from([("Free", free)]),
        }],
    }
}

#[test]
fn test_supply_beyond_u64_is_written() {
    let half = u64::MAX / 2 + 10;
    let sink = InMemorySink::new();
    let params = MigrationPipeline::new(
        in_memory_snapshot(vec![pcx_account(0xaa, half), pcx_account(0xbb, half)]),
        &sink,
        Ss58AddressCodec::chainx(),
        PipelineSettings::default(),
    )
    .run()
    .unwrap();

    assert_eq!(params.balances.free_balances.len(), 3);
    let wide = (u128::from(half) * 2).to_string();
    let ledger = sink.aux(documents::LEDGER_SUMMARY).unwrap();
    assert_eq!(ledger["legacy_user_total"], json!(wide));
    assert_eq!(ledger["genesis_total"], json!(wide));
    assert!(sink.genesis().is_some());
}

#[test]
fn test_duplicate_account_aborts_before_genesis() {
    let sink = InMemorySink::new();
    let err = MigrationPipeline::new(
        in_memory_snapshot(vec![pcx_account(0xaa, 5), pcx_account(0xaa, 7)]),
        &sink,
        Ss58AddressCodec::chainx(),
        PipelineSettings::default(),
    )
    .run()
    .unwrap_err();

    assert!(matches!(err, MigrationError::InvariantViolation(msg) if msg.contains(&key(0xaa))));
    assert!(sink.aux(documents::BALANCES_PURE).is_none());
    assert!(sink.genesis().is_none());
}
