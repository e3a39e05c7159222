//! # anaf
//!
//! Client library for the Romanian tax authority (ANAF) web services:
//! taxpayer VAT registry lookup, e-Factura OAuth2 and messaging, and
//! CIUS-RO UBL 2.1 invoice generation.
//!
//! All monetary values use [`rust_decimal::Decimal`]. Totals are taken from
//! the caller as-is; nothing in this crate rounds or recomputes them.
//!
//! ## Quick Start
//!
//! ```rust
//! use anaf::core::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("F-2024-001", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .seller(PartyBuilder::new("Furnizor SRL", "RO273663")
//!         .address("Str. Lunga 1", "Bucuresti", "010101", "RO-B", "RO").build())
//!     .buyer(PartyBuilder::new("Client SA", "14399840")
//!         .address("Bd. Unirii 5", "Cluj-Napoca", "400001", "RO-CJ", "RO").build())
//!     .add_line(LineItemBuilder::new("Consultanta", dec!(2), dec!(100), dec!(200)).build())
//!     .totals(dec!(200), dec!(38), dec!(238))
//!     .build()
//!     .unwrap();
//!
//! # #[cfg(feature = "ubl")]
//! let xml = anaf::ubl::to_ubl_xml(&invoice).unwrap();
//! # #[cfg(feature = "ubl")]
//! assert!(xml.contains("<cbc:ID>F-2024-001</cbc:ID>"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice model, builders, validation, configuration |
//! | `ubl` (default) | CIUS-RO UBL 2.1 invoice XML |
//! | `client` (default) | HTTP transport, VAT registry lookup, e-Factura API |
//! | `cli` | The `anaf` command-line tool |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "client")]
pub mod transport;

#[cfg(feature = "client")]
pub mod lookup;

#[cfg(feature = "client")]
pub mod efactura;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
