//! End-to-end container tests: encrypt with the pipeline, decrypt with
//! the reference decryptor, and check the integrity guarantees hold.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use proptest::prelude::*;
use std::io::Cursor;

use logseal::core::CHUNK_OVERHEAD;
use logseal::{Encryptor, DEFAULT_CHUNK_SIZE};
use logseal_testkit::{decrypt_envelope, log_bytes, RecipientKeyPair, TestFixture};

#[test]
fn roundtrip_preserves_file_contents() {
    let fixture = TestFixture::new();
    let input = fixture.make_log_file("app.log", 10000);
    let container = fixture.encrypt(&input);

    let recovered = fixture.decrypt(&container).unwrap();
    assert_eq!(recovered, std::fs::read(&input).unwrap());
}

#[test]
fn roundtrip_empty_file() {
    let fixture = TestFixture::new();
    let input = fixture.make_log_file("empty.log", 0);
    let container = fixture.encrypt(&input);

    let text = std::fs::read_to_string(&container).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["messages"].as_array().unwrap().len(), 1);

    assert_eq!(fixture.decrypt(&container).unwrap(), Vec::<u8>::new());
}

#[test]
fn roundtrip_exact_chunk_multiple() {
    let fixture = TestFixture::new();
    let input = fixture.make_log_file("even.log", 2 * DEFAULT_CHUNK_SIZE);
    let container = fixture.encrypt(&input);

    let text = std::fs::read_to_string(&container).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    // Two full MESSAGE chunks plus the empty FINAL.
    assert_eq!(value["messages"].as_array().unwrap().len(), 3);

    assert_eq!(fixture.decrypt(&container).unwrap(), log_bytes(8192));
}

#[test]
fn message_sizes_for_10000_byte_input() {
    let fixture = TestFixture::new();
    let input = fixture.make_log_file("sized.log", 10000);
    let container = fixture.encrypt(&input);

    let text = std::fs::read_to_string(&container).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    let plaintext_lens: Vec<usize> = value["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| BASE64_STANDARD.decode(m.as_str().unwrap()).unwrap().len() - CHUNK_OVERHEAD)
        .collect();
    assert_eq!(plaintext_lens, vec![4096, 4096, 1808, 0]);
}

#[test]
fn identical_inputs_produce_unrelated_containers() {
    let fixture = TestFixture::new();
    let input = fixture.make_log_file("twice.log", 5000);

    let text1 = std::fs::read_to_string(fixture.encrypt(&input)).unwrap();
    let path2 = fixture.path("twice2.json");
    fixture.encryptor().encrypt_file(&input, &path2).unwrap();
    let text2 = std::fs::read_to_string(&path2).unwrap();

    let v1: serde_json::Value = serde_json::from_str(&text1).unwrap();
    let v2: serde_json::Value = serde_json::from_str(&text2).unwrap();

    assert_ne!(v1["encryptedKey"], v2["encryptedKey"]);
    assert_ne!(v1["header"], v2["header"]);
    assert_ne!(v1["messages"][0], v2["messages"][0]);

    // Both still decrypt to the same plaintext.
    assert_eq!(
        decrypt_envelope(&text1, &fixture.recipient).unwrap(),
        decrypt_envelope(&text2, &fixture.recipient).unwrap()
    );
}

fn container_json(fixture: &TestFixture, len: usize) -> serde_json::Value {
    let input = fixture.make_log_file("victim.log", len);
    let container = fixture.encrypt(&input);
    let text = std::fs::read_to_string(container).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn corrupted_chunk_fails_authentication() {
    let fixture = TestFixture::new();
    let mut value = container_json(&fixture, 10000);

    let encoded = value["messages"][1].as_str().unwrap();
    let mut chunk = BASE64_STANDARD.decode(encoded).unwrap();
    chunk[17] ^= 0x01;
    value["messages"][1] = BASE64_STANDARD.encode(&chunk).into();

    let err = decrypt_envelope(&value.to_string(), &fixture.recipient).unwrap_err();
    assert!(err.to_string().contains("authentication"));
}

#[test]
fn reordered_chunks_fail_authentication() {
    let fixture = TestFixture::new();
    let mut value = container_json(&fixture, 10000);

    let messages = value["messages"].as_array_mut().unwrap();
    messages.swap(0, 1);

    assert!(decrypt_envelope(&value.to_string(), &fixture.recipient).is_err());
}

#[test]
fn truncated_container_is_detected() {
    let fixture = TestFixture::new();
    let mut value = container_json(&fixture, 10000);

    // Drop the FINAL chunk; every remaining chunk still authenticates.
    value["messages"].as_array_mut().unwrap().pop();

    let err = decrypt_envelope(&value.to_string(), &fixture.recipient).unwrap_err();
    assert!(err.to_string().contains("FINAL"));
}

#[test]
fn wrong_recipient_cannot_decrypt() {
    let fixture = TestFixture::new();
    let value = container_json(&fixture, 1000);

    let wrong = RecipientKeyPair::generate();
    assert!(decrypt_envelope(&value.to_string(), &wrong).is_err());
}

#[test]
fn unsupported_version_is_rejected() {
    let fixture = TestFixture::new();
    let mut value = container_json(&fixture, 100);

    value["keyedWith"] = "v2".into();
    let err = decrypt_envelope(&value.to_string(), &fixture.recipient).unwrap_err();
    assert!(err.to_string().contains("version"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn roundtrip_any_size_and_chunking(len in 0usize..20_000, chunk_size in 1usize..8192) {
        let recipient = RecipientKeyPair::generate();
        let data = log_bytes(len);

        let mut out = Vec::new();
        Encryptor::new(recipient.public_key())
            .with_chunk_size(chunk_size)
            .encrypt(Cursor::new(data.clone()), &mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let expected_messages = len.div_ceil(chunk_size) + 1;
        prop_assert_eq!(value["messages"].as_array().unwrap().len(), expected_messages);

        let recovered = decrypt_envelope(&text, &recipient).unwrap();
        prop_assert_eq!(recovered, data);
    }
}
