//! # Kedai Rules
//!
//! The normalisation rule engine for the Kedai CMS.
//!
//! Stored values in this system arrive in historically inconsistent shapes:
//! phone numbers entered as `0812…`, `+62812…` or bare `812…`; payment-proof and
//! certificate references stored as bare filenames, OS paths, data URIs or
//! double-encoded JSON; class descriptions carrying an ad-hoc bullet list. This
//! crate is the single place those shapes are turned into canonical forms.
//!
//! Every function here is a total, pure string transform: no I/O, no shared
//! state, no error paths. Malformed input degrades to a usable fallback rather
//! than failing.
//!
//! **No storage or API concerns**: persistence belongs in `kedai-core`, HTTP in
//! the `kedai-run` binary.

pub mod asset;
pub mod description;
pub mod phone;

pub use asset::{is_pdf_reference, resolve_asset_url, resolve_certificate_url, AssetRef};
pub use description::{split_structured_description, StructuredDescription};
pub use phone::{format_whatsapp_display, normalize_whatsapp, to_local_whatsapp, wa_link};
