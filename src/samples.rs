//! Model population and response formatting used by the sample binaries

use crate::error::{NetconfError, Result};
use crate::models::HardwareModule;
use crate::models::ping_act::{Destination, PingOutput, PingRpc};

/// Populate the hardware module configuration
///
/// The sample leaves the object empty, so encoding it yields an empty
/// top-level element.
pub fn config_hardware_module(_hardware_module: &mut HardwareModule) {}

/// Set the ping destination on the RPC input
pub fn prepare_ping_rpc(ping: &mut PingRpc) {
    ping.input
        .destination
        .get_or_insert_with(Destination::default)
        .destination = Some("10.0.0.1".to_string());
}

/// Render a ping result the way IOS XR prints it on the console
pub fn process_ping_rpc(output: &PingOutput) -> Result<String> {
    let response = output
        .ping_response
        .as_ref()
        .ok_or_else(|| NetconfError::MissingData("ping-response".into()))?;
    let ipv4 = response
        .ipv4
        .first()
        .ok_or_else(|| NetconfError::MissingData("ping-response/ipv4".into()))?;

    let mut out = format!(
        "Sending 5, 100-byte ICMP Echos to {}, timeout is 2 seconds:\n",
        ipv4.destination.as_deref().unwrap_or_default()
    );
    if let Some(replies) = &ipv4.replies {
        for reply in &replies.reply {
            out.push_str(reply.result.as_deref().unwrap_or_default());
        }
    }
    out.push_str(&format!(
        "\nSuccess rate is {} percent ({}/{}), round-trip min/avg/max = {}/{}/{} ms",
        leaf(ipv4.success_rate),
        leaf(ipv4.hits),
        leaf(ipv4.total),
        leaf(ipv4.rtt_min),
        leaf(ipv4.rtt_avg),
        leaf(ipv4.rtt_max),
    ));
    Ok(out)
}

fn leaf(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ping_act::{Ipv4Response, PingResponse, Replies, Reply};

    fn sample_output(results: &[&str]) -> PingOutput {
        PingOutput {
            ping_response: Some(PingResponse {
                ipv4: vec![Ipv4Response {
                    destination: Some("10.0.0.1".into()),
                    success_rate: Some(100),
                    hits: Some(5),
                    total: Some(5),
                    rtt_min: Some(1),
                    rtt_avg: Some(2),
                    rtt_max: Some(3),
                    replies: Some(Replies {
                        reply: results
                            .iter()
                            .enumerate()
                            .map(|(i, r)| Reply {
                                reply_index: i as u64 + 1,
                                result: Some(r.to_string()),
                                ..Default::default()
                            })
                            .collect(),
                    }),
                    ..Default::default()
                }],
                ipv6: None,
            }),
        }
    }

    #[test]
    fn test_format_single_reply() {
        let text = process_ping_rpc(&sample_output(&["Success"])).unwrap();
        assert_eq!(
            text,
            "Sending 5, 100-byte ICMP Echos to 10.0.0.1, timeout is 2 seconds:\nSuccess\nSuccess rate is 100 percent (5/5), round-trip min/avg/max = 1/2/3 ms"
        );
    }

    #[test]
    fn test_format_concatenates_results() {
        let text = process_ping_rpc(&sample_output(&["!", "!", "."])).unwrap();
        assert!(text.contains("seconds:\n!!.\nSuccess rate"));
    }

    #[test]
    fn test_format_absent_leaves() {
        let output = PingOutput {
            ping_response: Some(PingResponse {
                ipv4: vec![Ipv4Response::default()],
                ipv6: None,
            }),
        };
        assert_eq!(
            process_ping_rpc(&output).unwrap(),
            "Sending 5, 100-byte ICMP Echos to , timeout is 2 seconds:\n\nSuccess rate is  percent (/), round-trip min/avg/max = // ms"
        );
    }

    #[test]
    fn test_format_missing_response() {
        assert!(matches!(
            process_ping_rpc(&PingOutput::default()),
            Err(NetconfError::MissingData(_))
        ));

        let empty = PingOutput {
            ping_response: Some(PingResponse::default()),
        };
        assert!(matches!(
            process_ping_rpc(&empty),
            Err(NetconfError::MissingData(_))
        ));
    }

    #[test]
    fn test_prepare_ping_rpc() {
        let mut ping = PingRpc::default();
        prepare_ping_rpc(&mut ping);
        let destination = ping.input.destination.unwrap();
        assert_eq!(destination.destination.as_deref(), Some("10.0.0.1"));
        assert!(ping.output.is_none());
    }

    #[test]
    fn test_config_hardware_module_is_noop() {
        let mut hardware_module = HardwareModule::default();
        config_hardware_module(&mut hardware_module);
        assert_eq!(hardware_module, HardwareModule::default());
    }
}
