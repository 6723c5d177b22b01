// Tests for the client/server wire protocol and upstream message parsing.

use anyhow::Result;
use base64::Engine;
use serde_json::json;
use velmo_live::upstream::{parse_rate_from_mime, parse_server_message, UpstreamEvent};
use velmo_live::{ClientEvent, ServerEvent};

#[test]
fn test_client_event_wire_shapes() -> Result<()> {
    let audio = serde_json::to_value(&ClientEvent::RealtimeAudio {
        audio: "AAECAw==".into(),
    })?;
    assert_eq!(audio, json!({ "type": "realtime_audio", "audio": "AAECAw==" }));

    let text = serde_json::to_value(&ClientEvent::ControlText {
        text: "be gentle".into(),
    })?;
    assert_eq!(text, json!({ "type": "control_text", "text": "be gentle" }));

    let end = serde_json::to_value(&ClientEvent::EndStream)?;
    assert_eq!(end, json!({ "type": "end_stream" }));

    Ok(())
}

#[test]
fn test_client_event_parses_from_json() -> Result<()> {
    let event: ClientEvent =
        serde_json::from_str(r#"{"type":"realtime_audio","audio":"QUJD"}"#)?;
    match event {
        ClientEvent::RealtimeAudio { audio } => assert_eq!(audio, "QUJD"),
        other => panic!("Unexpected event: {:?}", other),
    }

    let event: ClientEvent = serde_json::from_str(r#"{"type":"end_stream"}"#)?;
    assert!(matches!(event, ClientEvent::EndStream));

    assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"bogus"}"#).is_err());

    Ok(())
}

#[test]
fn test_server_event_omits_absent_fields() -> Result<()> {
    let with_rate = serde_json::to_value(&ServerEvent::AiAudio {
        audio: "QUJD".into(),
        sample_rate: Some(24_000),
    })?;
    assert_eq!(
        with_rate,
        json!({ "type": "ai_audio", "audio": "QUJD", "sample_rate": 24000 })
    );

    let without_rate = serde_json::to_value(&ServerEvent::AiAudio {
        audio: "QUJD".into(),
        sample_rate: None,
    })?;
    assert_eq!(without_rate, json!({ "type": "ai_audio", "audio": "QUJD" }));

    let closed = serde_json::to_value(&ServerEvent::SessionClosed { reason: None })?;
    assert_eq!(closed, json!({ "type": "session_closed" }));

    Ok(())
}

#[test]
fn test_setup_complete_maps_to_opened() {
    let events = parse_server_message(r#"{"setupComplete":{}}"#);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], UpstreamEvent::Opened));
}

#[test]
fn test_server_content_audio_and_turn_complete() {
    let pcm = [1u8, 2, 3, 4];
    let message = json!({
        "serverContent": {
            "modelTurn": {
                "parts": [{
                    "inlineData": {
                        "mimeType": "audio/pcm;rate=24000",
                        "data": base64::engine::general_purpose::STANDARD.encode(pcm),
                    }
                }]
            },
            "turnComplete": true
        }
    });

    let events = parse_server_message(&message.to_string());
    assert_eq!(events.len(), 2);
    match &events[0] {
        UpstreamEvent::Audio { pcm: got, sample_rate } => {
            assert_eq!(got, &pcm);
            assert_eq!(*sample_rate, Some(24_000));
        }
        other => panic!("Unexpected event: {:?}", other),
    }
    assert!(matches!(events[1], UpstreamEvent::TurnComplete));
}

#[test]
fn test_audio_without_rate_parameter() {
    let message = json!({
        "serverContent": {
            "modelTurn": {
                "parts": [{
                    "inlineData": { "mimeType": "audio/pcm", "data": "QUJD" }
                }]
            }
        }
    });

    let events = parse_server_message(&message.to_string());
    assert_eq!(events.len(), 1);
    match &events[0] {
        UpstreamEvent::Audio { sample_rate, .. } => assert_eq!(*sample_rate, None),
        other => panic!("Unexpected event: {:?}", other),
    }
}

#[test]
fn test_truncated_audio_payload_is_dropped() {
    // "QQ==" decodes to a single byte, half a PCM16 sample.
    let message = json!({
        "serverContent": {
            "modelTurn": {
                "parts": [{
                    "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": "QQ==" }
                }]
            }
        }
    });

    assert!(parse_server_message(&message.to_string()).is_empty());
}

#[test]
fn test_unrelated_messages_produce_no_events() {
    assert!(parse_server_message(r#"{"usageMetadata":{"totalTokenCount":12}}"#).is_empty());
    assert!(parse_server_message("not json at all").is_empty());
}

#[test]
fn test_rate_extraction_from_mime() {
    assert_eq!(parse_rate_from_mime("audio/pcm;rate=24000"), Some(24_000));
    assert_eq!(parse_rate_from_mime("audio/pcm; rate=16000"), Some(16_000));
    assert_eq!(parse_rate_from_mime("audio/pcm"), None);
    assert_eq!(parse_rate_from_mime("audio/pcm;rate=abc"), None);
}
