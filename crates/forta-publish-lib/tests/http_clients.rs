//! HttpRpc and IpfsGateway against a local mock server.

use forta_publish_lib::{Address, CallRequest, ContentStore, Error, EthRpc, HttpRpc, IpfsGateway};
use mockito::{Matcher, Server};
use serde_json::json;

fn rpc_result(result: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

#[test]
fn chain_id_is_decoded_from_hex() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "eth_chainId",
        })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!("0x13881")))
        .create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    assert_eq!(rpc.chain_id().expect("chain id"), 80001);
    mock.assert();
}

#[test]
fn nonce_is_requested_for_pending_block() {
    let mut server = Server::new();
    let address = Address::from_bytes([0x11; 20]);
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "eth_getTransactionCount",
            "params": [address.to_checksum(), "pending"],
        })))
        .with_body(rpc_result(json!("0x7")))
        .create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    assert_eq!(rpc.transaction_count(address).expect("nonce"), 7);
    mock.assert();
}

#[test]
fn rpc_error_object_becomes_error() {
    let mut server = Server::new();
    server
        .mock("POST", "/")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "insufficient funds for gas * price + value" }
            })
            .to_string(),
        )
        .create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    let request = CallRequest {
        from: None,
        to: Address::from_bytes([0x22; 20]),
        data: vec![0x01, 0x02, 0x03, 0x04],
    };
    match rpc.estimate_gas(&request).unwrap_err() {
        Error::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert!(message.contains("insufficient funds"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn eth_call_returns_raw_bytes() {
    let mut server = Server::new();
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "eth_call" })))
        .with_body(rpc_result(json!(format!("0x{}", "00".repeat(31) + "01"))))
        .create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    let request = CallRequest {
        from: None,
        to: Address::from_bytes([0x22; 20]),
        data: vec![0xaa; 36],
    };
    let bytes = rpc.call(&request).expect("call");
    assert_eq!(bytes.len(), 32);
    assert_eq!(bytes[31], 1);
}

#[test]
fn pending_receipt_is_none() {
    let mut server = Server::new();
    server
        .mock("POST", "/")
        .with_body(rpc_result(serde_json::Value::Null))
        .create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    assert_eq!(rpc.transaction_receipt("0xabc").expect("receipt"), None);
}

#[test]
fn failed_receipt_status_is_reported() {
    let mut server = Server::new();
    server
        .mock("POST", "/")
        .with_body(rpc_result(json!({
            "status": "0x0",
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
        })))
        .create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    let receipt = rpc
        .transaction_receipt("0xabc")
        .expect("receipt")
        .expect("mined");
    assert!(!receipt.succeeded);
    assert_eq!(receipt.block_number, Some(16));
    assert_eq!(receipt.gas_used, Some(21_000));
}

#[test]
fn http_failure_is_surfaced() {
    let mut server = Server::new();
    server.mock("POST", "/").with_status(502).create();

    let rpc = HttpRpc::new(&server.url()).expect("client");
    assert!(matches!(rpc.gas_price(), Err(Error::Http(_))));
}

#[test]
fn ipfs_add_returns_last_hash() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/v0/add")
        .match_query(Matcher::UrlEncoded("pin".into(), "true".into()))
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .with_body(
            "{\"Name\":\"README.md\",\"Hash\":\"QmInner\",\"Size\":\"12\"}\n\
             {\"Name\":\"\",\"Hash\":\"QmRoot\",\"Size\":\"64\"}\n",
        )
        .create();

    let gateway = IpfsGateway::new(&format!("{}/", server.url())).expect("client");
    let cid = gateway.add("README.md", b"# docs").expect("upload");
    assert_eq!(cid, "QmRoot");
    mock.assert();
}

#[test]
fn ipfs_add_without_hash_is_an_error() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/v0/add")
        .match_query(Matcher::Any)
        .with_body("{\"Name\":\"README.md\"}")
        .create();

    let gateway = IpfsGateway::new(&server.url()).expect("client");
    assert!(matches!(
        gateway.add("README.md", b"# docs"),
        Err(Error::IpfsMissingHash { .. })
    ));
}

#[test]
fn ipfs_cat_fetches_by_cid() {
    let mut server = Server::new();
    server
        .mock("GET", "/ipfs/QmManifest")
        .with_body("{\"manifest\":{}}")
        .create();

    let gateway = IpfsGateway::new(&server.url()).expect("client");
    let bytes = gateway.cat("QmManifest").expect("fetch");
    assert_eq!(bytes, b"{\"manifest\":{}}");
}

#[test]
fn ipfs_add_with_empty_body_is_missing_hash() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/v0/add")
        .match_query(Matcher::Any)
        .with_body("\n  \n")
        .create();

    let gateway = IpfsGateway::new(&server.url()).expect("client");
    assert!(matches!(
        gateway.add("README.md", b"# docs"),
        Err(Error::IpfsMissingHash { .. })
    ));
}
