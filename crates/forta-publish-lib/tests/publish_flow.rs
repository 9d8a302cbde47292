mod common;

use common::{test_key, test_network, FakeChain, MemoryStore};
use forta_publish_lib::abi::selector;
use forta_publish_lib::commands::publish::{self, PublishAction};
use forta_publish_lib::registry::{CREATE_AGENT, UPDATE_AGENT};
use forta_publish_lib::{BotId, BotManifest, ContentStore, DeployKey, Error, Manifest};

const IMAGE: &str =
    "disco.forta.network/bot@sha256:5f4c1d7e9a0b3c2d1e8f7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d1e0f9a8b7c6d";

fn bot_manifest() -> BotManifest {
    serde_json::from_str(
        r#"{
            "name": "large-transfer-bot",
            "description": "Flags large ERC-20 transfers",
            "version": "1.2.0",
            "chainIds": [1, 137]
        }"#,
    )
    .expect("manifest json")
}

fn upload_signed_manifest(store: &MemoryStore, key: &DeployKey, bot_id: BotId) -> String {
    let signed = Manifest::build(&bot_manifest(), key.address(), bot_id, IMAGE, "QmDocs")
        .sign(key.signing_key())
        .expect("sign manifest");
    store
        .add("manifest.json", &signed.to_json().expect("serialize"))
        .expect("upload manifest")
}

fn params(cid: &str) -> publish::Params {
    publish::Params {
        environment: "dev".to_string(),
        manifest: cid.to_string(),
        ..Default::default()
    }
}

#[test]
fn unregistered_bot_is_created() {
    let key = test_key(0x11);
    let bot_id = BotId::from_bytes([0xaa; 32]);
    let store = MemoryStore::new();
    let cid = upload_signed_manifest(&store, &key, bot_id);
    let chain = FakeChain::new();

    let output = publish::run_with(&params(&cid), &key, &test_network(), &chain, &store, None)
        .expect("publish succeeds");

    assert_eq!(output.bot_id, bot_id);
    assert_eq!(output.action, PublishAction::Created);
    assert_eq!(chain.sent_count(), 1);
    assert_eq!(chain.last_selector(), Some(selector(CREATE_AGENT)));
    assert_eq!(chain.gas_price_queries.get(), 1);

    let estimate = chain.estimates.borrow().last().cloned().expect("estimate");
    assert_eq!(estimate.to, test_network().registry);
    assert_eq!(estimate.from, Some(key.address()));
    assert!(estimate.data.windows(cid.len()).any(|w| w == cid.as_bytes()));
}

#[test]
fn registered_bot_is_updated_with_explicit_gas_price() {
    let key = test_key(0x11);
    let bot_id = BotId::from_bytes([0xbb; 32]);
    let store = MemoryStore::new();
    let cid = upload_signed_manifest(&store, &key, bot_id);
    let chain = FakeChain::new().with_bot(bot_id, key.address(), true);

    let output = publish::run_with(
        &params(&cid),
        &key,
        &test_network(),
        &chain,
        &store,
        Some(50_000_000_000),
    )
    .expect("publish succeeds");

    assert_eq!(output.action, PublishAction::Updated);
    assert_eq!(chain.last_selector(), Some(selector(UPDATE_AGENT)));
    assert_eq!(chain.gas_price_queries.get(), 0, "explicit gas price skips the node");
}

#[test]
fn manifest_signed_by_another_key_is_rejected() {
    let publisher = test_key(0x11);
    let someone_else = test_key(0x22);
    let bot_id = BotId::from_bytes([0xcc; 32]);
    let store = MemoryStore::new();
    let cid = upload_signed_manifest(&store, &someone_else, bot_id);
    let chain = FakeChain::new();

    let err = publish::run_with(&params(&cid), &publisher, &test_network(), &chain, &store, None)
        .unwrap_err();

    assert!(matches!(err, Error::ManifestSignerMismatch { .. }), "got {err:?}");
    assert_eq!(chain.sent_count(), 0);
}

#[test]
fn bot_owned_by_someone_else_is_not_updated() {
    let key = test_key(0x11);
    let owner = test_key(0x33).address();
    let bot_id = BotId::from_bytes([0xdd; 32]);
    let store = MemoryStore::new();
    let cid = upload_signed_manifest(&store, &key, bot_id);
    let chain = FakeChain::new().with_bot(bot_id, owner, true);

    let err = publish::run_with(&params(&cid), &key, &test_network(), &chain, &store, None)
        .unwrap_err();

    assert!(matches!(err, Error::NotBotOwner { .. }), "got {err:?}");
    assert_eq!(chain.sent_count(), 0);
}

#[test]
fn reverted_transaction_is_an_error() {
    let key = test_key(0x11);
    let bot_id = BotId::from_bytes([0xee; 32]);
    let store = MemoryStore::new();
    let cid = upload_signed_manifest(&store, &key, bot_id);
    let chain = FakeChain::new();
    chain.revert.set(true);

    let err = publish::run_with(&params(&cid), &key, &test_network(), &chain, &store, None)
        .unwrap_err();
    assert!(matches!(err, Error::TransactionReverted { .. }), "got {err:?}");
}

#[test]
fn empty_manifest_reference_is_rejected() {
    let key = test_key(0x11);
    let err = publish::run_with(
        &params("  "),
        &key,
        &test_network(),
        &FakeChain::new(),
        &MemoryStore::new(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidManifest { .. }));
}
