//! End-to-end call scenarios over both bundled caller types.

use trustgate::call::ENCODING_PACKED;
use trustgate::caller::{CallerError, RpcCaller};
use trustgate::direct::DirectCaller;
use trustgate::error::RpcError;
use trustgate::tlv::{tlv_find, tlv_required_space, TlvWriter};
use trustgate::transport::{MsgCaller, MsgEndpoint, Transport};

use crate::mock_provider::{EchoProvider, OPCODE_ECHO, TAG_REQ, TAG_RESP};

#[test]
fn echo_scenario_over_direct_caller() {
    let mut provider = EchoProvider::new();
    let mut caller = DirectCaller::new(&mut provider, 1, ENCODING_PACKED);

    // Size the request before claiming the buffer.
    let need = tlv_required_space(5);
    assert!(need <= 64);

    let (handle, buf) = caller.begin(64).unwrap();
    let mut writer = TlvWriter::new(buf);
    writer.put(TAG_REQ, b"hello").unwrap();
    let _ = writer.finish();

    let outcome = caller.invoke(handle, OPCODE_ECHO).unwrap();
    assert_eq!(outcome.op_status, Some(0));
    let echoed = tlv_find(outcome.response, TAG_RESP).unwrap().unwrap();
    assert_eq!(echoed, b"hello");

    caller.end(handle);
    assert_eq!(provider.calls, 1);
}

#[test]
fn unknown_opcode_is_surfaced_as_transport_error() {
    let mut provider = EchoProvider::new();
    let mut caller = DirectCaller::new(&mut provider, 1, ENCODING_PACKED);

    let (handle, buf) = caller.begin(16).unwrap();
    let mut writer = TlvWriter::new(buf);
    writer.put(TAG_REQ, b"x").unwrap();
    let _ = writer.finish();

    assert!(matches!(
        caller.invoke(handle, 0x7777),
        Err(CallerError::Transport(RpcError::InvalidOpcode))
    ));
    caller.end(handle);
    assert_eq!(provider.calls, 0);
}

// ── Message transport ─────────────────────────────────────────

/// Test transport: delivers every frame straight into a server-side
/// endpoint adapter, the way an inter-partition mailbox would.
struct PartitionLink {
    endpoint: MsgEndpoint<EchoProvider>,
    caller_id: u32,
}

impl Transport for PartitionLink {
    fn send_and_wait(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, RpcError> {
        let n = self.endpoint.handle(self.caller_id, request, response);
        if n == 0 {
            return Err(RpcError::Internal);
        }
        Ok(n)
    }
}

#[test]
fn echo_scenario_over_message_transport() {
    let link = PartitionLink {
        endpoint: MsgEndpoint::new(EchoProvider::new()),
        caller_id: 5,
    };
    let mut caller = MsgCaller::new(link, ENCODING_PACKED);

    let need = tlv_required_space(5);
    let (handle, buf) = caller.begin(need).unwrap();
    let mut writer = TlvWriter::new(buf);
    writer.put(TAG_REQ, b"hello").unwrap();
    let _ = writer.finish();

    let outcome = caller.invoke(handle, OPCODE_ECHO).unwrap();
    assert_eq!(outcome.op_status, Some(0));
    let echoed = tlv_find(outcome.response, TAG_RESP).unwrap().unwrap();
    assert_eq!(echoed, b"hello");
    caller.end(handle);

    // The session can be reused for a second call.
    let (handle, buf) = caller.begin(need).unwrap();
    let mut writer = TlvWriter::new(buf);
    writer.put(TAG_REQ, b"again").unwrap();
    let _ = writer.finish();
    let outcome = caller.invoke(handle, OPCODE_ECHO).unwrap();
    assert_eq!(
        tlv_find(outcome.response, TAG_RESP).unwrap().unwrap(),
        b"again"
    );
    caller.end(handle);
}

#[test]
fn parse_failure_reaches_the_caller_as_invalid_request_body() {
    let link = PartitionLink {
        endpoint: MsgEndpoint::new(EchoProvider::new()),
        caller_id: 5,
    };
    let mut caller = MsgCaller::new(link, ENCODING_PACKED);

    // No TLV record at all: the provider cannot parse its parameters.
    let (handle, _) = caller.begin(0).unwrap();
    assert!(matches!(
        caller.invoke(handle, OPCODE_ECHO),
        Err(CallerError::Transport(RpcError::InvalidRequestBody))
    ));
    caller.end(handle);
}

/// Chained endpoints stay chained across a message transport: the same
/// frame reaches whichever provider recognises the opcode.
#[test]
fn direct_and_message_callers_agree_on_the_wire_result() {
    let mut direct_provider = EchoProvider::new();
    let mut direct = DirectCaller::new(&mut direct_provider, 1, ENCODING_PACKED);

    let link = PartitionLink {
        endpoint: MsgEndpoint::new(EchoProvider::new()),
        caller_id: 1,
    };
    let mut message = MsgCaller::new(link, ENCODING_PACKED);

    let payload = b"same bytes";
    let mut results = Vec::new();
    let callers: [&mut dyn RpcCaller; 2] = [&mut direct, &mut message];
    for caller in callers {
        let (handle, buf) = caller.begin(tlv_required_space(payload.len())).unwrap();
        let mut writer = TlvWriter::new(buf);
        writer.put(TAG_REQ, payload).unwrap();
        let _ = writer.finish();

        let outcome = caller.invoke(handle, OPCODE_ECHO).unwrap();
        results.push((
            outcome.op_status,
            tlv_find(outcome.response, TAG_RESP).unwrap().unwrap().to_vec(),
        ));
        caller.end(handle);
    }

    assert_eq!(results[0], results[1]);
}
