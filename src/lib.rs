//! # qrsymbol
//!
//! A Rust library for building fixed-size QR symbols from short text payloads.
//!
//! `qrsymbol` constructs a 21×21 (version 1) module grid following a simplified subset of
//! the QR Code Model 2 specification: byte mode only, error correction level L, mask 0.
//! The finished grid can be rendered as a PNG image, an SVG string, or console art, with
//! an optional centered logo.
//!
//! ## Error correction
//!
//! By default the 7 error-correction codewords are a fixed alternating bit pattern, not
//! real Reed-Solomon output. Symbols built that way are **not** guaranteed to decode on a
//! standards-compliant scanner. Pass [`ecc::ReedSolomon`] to
//! [`QrCode::encode_text_with`] to get real level-L codewords instead.
//!
//! ## Features
//!
//! - Encode up to 17 characters in byte mode.
//! - Inspect each construction stage on its own.
//! - Render to in-memory RGB buffers, PNG bytes or files, SVG, or ASCII art.
//! - Overlay a logo on a rounded white backing.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrsymbol = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Build a symbol and read its modules:
//!
//! ```rust
//! use qrsymbol::QrCode;
//!
//! let qr = QrCode::encode_text("HI").unwrap();
//! assert_eq!(qr.size(), 21);
//! let dark = qr.modules().iter().flatten().filter(|&&m| m).count();
//! assert!(dark > 0);
//! ```
//!
//! Render it with a logo:
//!
//! ```rust
//! use image::{DynamicImage, Rgba, RgbaImage};
//! use qrsymbol::helper::{render_with_logo, RenderOptions};
//! use qrsymbol::QrCode;
//!
//! let qr = QrCode::encode_text("https://a.io").unwrap();
//! let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 165, 0, 255])));
//! let img = render_with_logo(&qr, &RenderOptions::new(420, 420), &logo).unwrap();
//! assert_eq!(img.dimensions(), (420, 420));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Symbol grid construction.
//! - [`segment`]: Byte-mode data encoding.
//! - [`ecc`]: Error-correction codeword strategies.
//! - [`helper`]: Utilities for rendering symbols in various formats.
//! - [`error`]: Error types.

pub mod ecc;
pub mod error;
pub mod helper;
pub mod qrcode;
pub mod segment;

pub use error::{QrError, RenderError};
pub use qrcode::QrCode;
