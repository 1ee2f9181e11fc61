//! Corruption handling suite
//!
//! Tampered payloads, damaged digests, and undecodable streams must blank
//! the affected entry while the archive stays usable.

use reliquary::{AbsentReason, Archive, LoadResult};
use rusqlite::{params, Connection};
use tempfile::NamedTempFile;

fn create_fixture() -> (NamedTempFile, Connection) {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    conn.execute(
        "CREATE TABLE entries (
            name TEXT PRIMARY KEY,
            alias TEXT NOT NULL DEFAULT '',
            payload BLOB NOT NULL DEFAULT x'',
            digest BLOB NOT NULL DEFAULT x''
        )",
        [],
    )
    .unwrap();
    (file, conn)
}

fn insert_payload(conn: &Connection, name: &str, data: &[u8]) {
    let compressed = zstd::encode_all(data, 3).unwrap();
    let digest = reliquary::sha256(&compressed);
    conn.execute(
        "INSERT INTO entries (name, payload, digest) VALUES (?1, ?2, ?3)",
        params![name, compressed, digest.as_slice()],
    )
    .unwrap();
}

/// Helper: fetch a row's payload, flip one bit, and write it back
fn flip_payload_bit(conn: &Connection, name: &str) {
    let mut payload: Vec<u8> = conn
        .query_row(
            "SELECT payload FROM entries WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    let middle = payload.len() / 2;
    payload[middle] ^= 0x01;
    conn.execute(
        "UPDATE entries SET payload = ?1 WHERE name = ?2",
        params![payload, name],
    )
    .unwrap();
}

#[test]
fn test_bit_flip_in_payload_detected() {
    let (file, conn) = create_fixture();
    insert_payload(&conn, "asset", &b"compressible content ".repeat(200));
    flip_payload_bit(&conn, "asset");
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("asset").unwrap();

    // The digest no longer covers the stored bytes; rejected before the codec
    assert_eq!(result, LoadResult::Absent(AbsentReason::DigestMismatch));
}

#[test]
fn test_short_digest_rejected() {
    let (file, conn) = create_fixture();
    insert_payload(&conn, "asset", b"data");
    // Truncate the stored digest to 16 bytes
    conn.execute(
        "UPDATE entries SET digest = substr(digest, 1, 16) WHERE name = 'asset'",
        [],
    )
    .unwrap();
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("asset").unwrap();
    assert_eq!(result, LoadResult::Absent(AbsentReason::ShortDigest));
}

#[test]
fn test_missing_digest_rejected() {
    let (file, conn) = create_fixture();
    let compressed = zstd::encode_all(&b"data"[..], 3).unwrap();
    conn.execute(
        "INSERT INTO entries (name, payload) VALUES ('asset', ?1)",
        params![compressed],
    )
    .unwrap();
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("asset").unwrap();
    assert_eq!(result, LoadResult::Absent(AbsentReason::ShortDigest));
}

#[test]
fn test_oversized_digest_uses_leading_bytes() {
    // Digests longer than 32 bytes are accepted when the first 32 match
    let (file, conn) = create_fixture();
    let compressed = zstd::encode_all(&b"data"[..], 3).unwrap();
    let mut digest = reliquary::sha256(&compressed).to_vec();
    digest.extend_from_slice(&[0xEE; 8]);
    conn.execute(
        "INSERT INTO entries (name, payload, digest) VALUES ('asset', ?1, ?2)",
        params![compressed, digest],
    )
    .unwrap();
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("asset").unwrap();
    assert_eq!(result.data(), Some(&b"data"[..]));
}

#[test]
fn test_undecodable_payload_with_valid_digest() {
    // Digest verifies (it covers the garbage), but the codec rejects it
    let (file, conn) = create_fixture();
    let garbage = vec![0xAB; 512];
    let digest = reliquary::sha256(&garbage);
    conn.execute(
        "INSERT INTO entries (name, payload, digest) VALUES ('asset', ?1, ?2)",
        params![garbage, digest.as_slice()],
    )
    .unwrap();
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("asset").unwrap();
    assert_eq!(result, LoadResult::Absent(AbsentReason::DecodeFailed));
}

#[test]
fn test_empty_payload_row() {
    let (file, conn) = create_fixture();
    conn.execute("INSERT INTO entries (name) VALUES ('hollow')", [])
        .unwrap();
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("hollow").unwrap();
    assert_eq!(result, LoadResult::Absent(AbsentReason::EmptyPayload));
}

#[test]
fn test_archive_usable_after_per_entry_failures() {
    let (file, conn) = create_fixture();
    insert_payload(&conn, "good", b"intact");
    insert_payload(&conn, "bad", &b"will be damaged ".repeat(100));
    flip_payload_bit(&conn, "bad");
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();

    let results = archive.load_batch(&["bad", "good"]).unwrap();
    assert!(!results[0].is_loaded());
    assert_eq!(results[1].data(), Some(&b"intact"[..]));

    // The handle survives rejections; a fresh batch still works
    let again = archive.load_one("good").unwrap();
    assert_eq!(again.data(), Some(&b"intact"[..]));
}

#[test]
fn test_alias_to_corrupt_target() {
    // The alias hop succeeds; the target's bad digest blanks the entry
    let (file, conn) = create_fixture();
    insert_payload(&conn, "target", &b"payload ".repeat(100));
    flip_payload_bit(&conn, "target");
    conn.execute(
        "INSERT INTO entries (name, alias) VALUES ('link', 'target')",
        [],
    )
    .unwrap();
    drop(conn);

    let archive = Archive::open(file.path()).unwrap();
    let result = archive.load_one("link").unwrap();
    assert_eq!(result, LoadResult::Absent(AbsentReason::DigestMismatch));
}
