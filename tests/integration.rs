//! Integration tests for the codec and executor services
//!
//! Executor tests run against an in-process NETCONF server on loopback.

mod common;

use common::{MockServer, PING_TEXT};
use rust_netconf::models::HardwareModule;
use rust_netconf::models::ncs1k_mxp_cfg::{ClientPort, Fec, Node, Slice, SliceValues, TrunkDataRate};
use rust_netconf::models::PingRpc;
use rust_netconf::samples::{config_hardware_module, prepare_ping_rpc, process_ping_rpc};
use rust_netconf::{
    CodecService, CodecServiceProvider, DeviceTarget, EncodingFormat, ExecutorService,
    NetconfError, NetconfServiceProvider,
};

fn populated_module() -> HardwareModule {
    HardwareModule {
        node: vec![Node {
            location: "0/RP0/CPU0".into(),
            slice: vec![Slice {
                slice_id: "1".into(),
                values: Some(SliceValues {
                    trunk_rate: Some(TrunkDataRate::TwoHundredGig),
                    fec: Some(Fec::Sd7),
                    encrypted: Some(true),
                    ..Default::default()
                }),
                client_port: vec![ClientPort {
                    client_port_id: 0,
                    lldp_drop: Some(false),
                }],
            }],
        }],
    }
}

#[test]
fn test_encode_empty_hardware_module() {
    let codec = CodecService::new();
    let mut hardware_module = HardwareModule::default();
    config_hardware_module(&mut hardware_module);

    let xml_provider = CodecServiceProvider::new(EncodingFormat::Xml);
    let xml = codec.encode(&xml_provider, &hardware_module).expect("Failed to encode");
    assert_eq!(
        xml,
        r#"<hardware-module xmlns="http://cisco.com/ns/yang/Cisco-IOS-XR-ncs1k-mxp-cfg"/>"#
    );

    let json_provider = CodecServiceProvider::new(EncodingFormat::Json);
    let json = codec.encode(&json_provider, &hardware_module).expect("Failed to encode");
    assert_eq!(json, r#"{"Cisco-IOS-XR-ncs1k-mxp-cfg:hardware-module":{}}"#);
}

#[test]
fn test_xml_roundtrip() {
    let codec = CodecService::new();
    let provider = CodecServiceProvider::new(EncodingFormat::Xml);
    let original = populated_module();

    let xml = codec.encode(&provider, &original).expect("Failed to encode");
    println!("XML: {}", xml);
    assert!(xml.contains("<node><location>0/RP0/CPU0</location><slice><slice-id>1</slice-id>"));
    assert!(xml.contains("<trunk-rate>two-hundred-gig</trunk-rate><fec>sd7</fec>"));

    let decoded: HardwareModule = codec.decode(&provider, &xml).expect("Failed to decode");
    assert_eq!(decoded, original);
}

#[test]
fn test_json_roundtrip() {
    let codec = CodecService::new();
    let provider = CodecServiceProvider::new(EncodingFormat::Json).pretty(true);
    let original = populated_module();

    let json = codec.encode(&provider, &original).expect("Failed to encode");
    println!("JSON: {}", json);

    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    let node = &document["Cisco-IOS-XR-ncs1k-mxp-cfg:hardware-module"]["node"][0];
    assert_eq!(node["location"], "0/RP0/CPU0");
    assert_eq!(node["slice"][0]["client-port"][0]["client-port-id"], 0);

    let decoded: HardwareModule = codec.decode(&provider, &json).expect("Failed to decode");
    assert_eq!(decoded, original);
}

#[test]
fn test_decode_rejects_other_root() {
    let codec = CodecService::new();
    let provider = CodecServiceProvider::new(EncodingFormat::Xml);
    let result: Result<HardwareModule, _> =
        codec.decode(&provider, r#"<ping xmlns="http://cisco.com/ns/yang/Cisco-IOS-XR-ping-act"/>"#);
    assert!(matches!(result, Err(NetconfError::MissingData(_))));
}

#[test]
fn test_execute_ping_rpc() {
    let server = MockServer::start();
    let device: DeviceTarget = server.url().parse().unwrap();

    let mut provider = NetconfServiceProvider::new(&device).expect("Failed to connect");
    let executor = ExecutorService::new();

    let mut ping = PingRpc::default();
    prepare_ping_rpc(&mut ping);
    ping.output = Some(executor.execute_rpc(&mut provider, &ping).expect("Failed to execute"));

    let output = ping.output.as_ref().unwrap();
    assert_eq!(process_ping_rpc(output).unwrap(), PING_TEXT);

    provider.close().unwrap();
    assert!(provider.is_closed());
    assert!(matches!(
        executor.execute_rpc(&mut provider, &ping),
        Err(NetconfError::SessionClosed)
    ));

    assert_eq!(server.finish(), vec!["ping", "close-session"]);
}

#[test]
fn test_rpc_error_is_reported() {
    let server = MockServer::start();
    let device: DeviceTarget = server.url().parse().unwrap();
    let mut provider = NetconfServiceProvider::new(&device).expect("Failed to connect");

    let session = provider.session_mut().unwrap();
    assert_eq!(session.session_id(), Some(7));
    match session.rpc("<get/>") {
        Err(NetconfError::Rpc { tag, message }) => {
            assert_eq!(tag, "operation-not-supported");
            assert_eq!(message, "get not supported");
        }
        other => panic!("expected rpc error, got {:?}", other),
    }

    provider.close().unwrap();
    assert_eq!(server.finish(), vec!["get", "close-session"]);
}

#[test]
fn test_provider_drop_closes_session() {
    let server = MockServer::start();
    let device: DeviceTarget = server.url().parse().unwrap();

    {
        let mut provider = NetconfServiceProvider::new(&device).expect("Failed to connect");
        let mut ping = PingRpc::default();
        prepare_ping_rpc(&mut ping);
        ExecutorService::new()
            .execute_rpc(&mut provider, &ping)
            .expect("Failed to execute");
    }

    assert_eq!(server.finish(), vec!["ping", "close-session"]);
}
