use anyhow::Result;
use httpmock::prelude::*;
use payload_storage::utils::logger;
use payload_storage::{
    ExternalPayloadStorage, ExternalStorageLocation, LoggingConfig, Operation, PayloadStorage,
    PayloadStorageError, TransferConfig,
};
use std::io::{Cursor, Read};

fn storage() -> PayloadStorage {
    logger::init_logger(&LoggingConfig {
        level: "payload_storage=debug".to_string(),
        ..LoggingConfig::default()
    });
    PayloadStorage::new(&TransferConfig::default()).unwrap()
}

fn storage_with_chunk_size(chunk_size: usize) -> PayloadStorage {
    let mut config = TransferConfig::default();
    config.transport.chunk_size = chunk_size;
    config.transport.pipe_depth = 2;
    PayloadStorage::new(&config).unwrap()
}

#[test]
fn test_upload_streams_payload_to_presigned_url() -> Result<()> {
    let server = MockServer::start();
    let payload = r#"{"orderId":"A-1001","items":[{"sku":"X","qty":2}]}"#;

    let put_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/bucket/workflow/input.json")
            .query_param("X-Amz-Signature", "abc123")
            .header("content-length", payload.len().to_string())
            .body(payload);
        then.status(200);
    });

    let url = server.url("/bucket/workflow/input.json?X-Amz-Signature=abc123");
    storage().upload(&url, &mut Cursor::new(payload.as_bytes()), payload.len() as u64)?;

    put_mock.assert();
    Ok(())
}

#[test]
fn test_upload_large_payload_in_many_chunks() -> Result<()> {
    let server = MockServer::start();
    let payload = "0123456789abcdef".repeat(16 * 1024);

    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/large.json").body(payload.clone());
        then.status(200);
    });

    storage_with_chunk_size(1000).upload(
        &server.url("/large.json"),
        &mut Cursor::new(payload.as_bytes()),
        payload.len() as u64,
    )?;

    put_mock.assert();
    Ok(())
}

#[test]
fn test_upload_empty_payload() -> Result<()> {
    let server = MockServer::start();

    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/empty.json").body("");
        then.status(200);
    });

    storage().upload(&server.url("/empty.json"), &mut std::io::empty(), 0)?;

    put_mock.assert();
    Ok(())
}

#[test]
fn test_upload_tolerates_server_error_status() {
    let server = MockServer::start();

    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/failing.json");
        then.status(500).body("InternalError");
    });

    let result = storage().upload(
        &server.url("/failing.json"),
        &mut Cursor::new(b"{}".as_slice()),
        2,
    );

    assert!(result.is_ok());
    put_mock.assert();
}

#[test]
fn test_upload_rejects_payload_longer_than_declared_size() {
    let server = MockServer::start();

    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/surplus.json").body("abcd");
        then.status(200);
    });

    let result = storage().upload(
        &server.url("/surplus.json"),
        &mut Cursor::new(b"abcdef".as_slice()),
        4,
    );

    match result {
        Err(PayloadStorageError::TransferFailed { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::InvalidInput)
        }
        other => panic!("unexpected upload result: {:?}", other.err()),
    }
    // 截斷的內容不會被存下
    put_mock.assert_hits(0);
}

#[test]
fn test_download_returns_body() -> Result<()> {
    let server = MockServer::start();
    let body = r#"{"result":"done","count":3}"#;

    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/task/output.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(body);
    });

    let mut stream = storage()
        .download(&server.url("/task/output.json"))?
        .expect("payload should be present");

    let mut content = String::new();
    stream.read_to_string(&mut content)?;
    assert_eq!(content, body);

    get_mock.assert();
    Ok(())
}

#[test]
fn test_download_missing_object_is_absent() -> Result<()> {
    let server = MockServer::start();

    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/missing.json");
        then.status(404).body("<Error><Code>NoSuchKey</Code></Error>");
    });

    let result = storage().download(&server.url("/missing.json"))?;

    assert!(result.is_none());
    get_mock.assert();
    Ok(())
}

#[test]
fn test_unreachable_endpoint_fails_both_operations() {
    let url = "http://127.0.0.1:1/payload.json";
    let storage = storage();

    let upload = storage.upload(url, &mut Cursor::new(b"data".as_slice()), 4);
    match upload {
        Err(PayloadStorageError::TransferFailed {
            operation,
            location,
            ..
        }) => {
            assert_eq!(operation, Operation::Write);
            assert_eq!(location, url);
        }
        other => panic!("unexpected upload result: {:?}", other.err()),
    }

    let download = storage.download(url);
    match download {
        Err(PayloadStorageError::TransferFailed { operation, .. }) => {
            assert_eq!(operation, Operation::Read)
        }
        Err(other) => panic!("unexpected download error: {:?}", other),
        Ok(_) => panic!("download from an unreachable endpoint succeeded"),
    }
}

#[test]
fn test_invalid_locations_are_rejected() {
    let storage = storage();

    for location in ["not a url", "s3://bucket/key", ""] {
        assert!(matches!(
            storage.upload(location, &mut Cursor::new(b"x".as_slice()), 1),
            Err(PayloadStorageError::InvalidLocation { .. })
        ));
        assert!(matches!(
            storage.download(location),
            Err(PayloadStorageError::InvalidLocation { .. })
        ));
    }
}

#[test]
fn test_round_trip_through_issued_location() -> Result<()> {
    let server = MockServer::start();
    let payload = r#"{"large":"payload"}"#;

    let issued = format!(
        r#"{{"uri":"{}","path":"workflow/123/output.json"}}"#,
        server.url("/workflow/123/output.json?X-Amz-Expires=900")
    );
    let location = ExternalStorageLocation::from_json(&issued)?;
    assert_eq!(
        location,
        ExternalStorageLocation::new(
            server.url("/workflow/123/output.json?X-Amz-Expires=900"),
            "workflow/123/output.json",
        )
    );

    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/workflow/123/output.json").body(payload);
        then.status(200);
    });
    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/workflow/123/output.json");
        then.status(200).body(payload);
    });

    let storage = storage();
    storage.upload(
        &location.uri,
        &mut Cursor::new(payload.as_bytes()),
        payload.len() as u64,
    )?;

    let mut downloaded = Vec::new();
    storage
        .download(&location.uri)?
        .expect("uploaded payload should be present")
        .read_to_end(&mut downloaded)?;

    assert_eq!(downloaded, payload.as_bytes());
    put_mock.assert();
    get_mock.assert();
    Ok(())
}
