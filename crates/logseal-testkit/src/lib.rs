//! # logseal Testkit
//!
//! Testing utilities for logseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Reference decryptor**: the recipient's side of the sealed-key and
//!   streaming constructions, so tests can verify containers end to end.
//!   The shipped library intentionally has no decryption capability.
//! - **Fixtures**: helper structs for setting up recipients, log files,
//!   and containers in a scratch directory.
//!
//! ## Usage
//!
//! ```rust
//! use logseal_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let input = fixture.make_log_file("app.log", 10000);
//! let container = fixture.encrypt(&input);
//! let recovered = fixture.decrypt(&container).unwrap();
//! assert_eq!(recovered, std::fs::read(&input).unwrap());
//! ```

pub mod decrypt;
pub mod fixtures;

pub use decrypt::{
    decrypt_envelope, decrypt_envelope_file, Envelope, PullStream, RecipientKeyPair,
};
pub use fixtures::{log_bytes, TestFixture};
