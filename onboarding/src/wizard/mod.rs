//! Wizard state & validation controller.
//!
//! Leaf-first: `validation` classifies fields, `gate` serializes submissions per form,
//! `controller` drives one form through local and remote validation, `lists` and
//! `analysis` handle list selection, `panels` moves the filmstrip, `admin` drives the
//! activation switches, and `session` wires the benchmark and signup flows together.

pub mod admin;
pub mod analysis;
pub mod controller;
pub mod gate;
pub mod lists;
pub mod panels;
pub mod session;
pub mod validation;
