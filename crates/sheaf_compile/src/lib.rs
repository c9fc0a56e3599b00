//! The compiler adapter.
//!
//! The stylesheet language itself is handled by an external compiler behind
//! the [`StylesheetCompiler`] trait. This crate reads a bundle's sources,
//! concatenates them, hands the buffer to the compiler and turns whatever
//! goes wrong into a [`CompileError`].

#![warn(missing_docs)]

pub mod adapter;
pub mod error;
pub mod lessc;
pub mod lightning;

pub use adapter::{compile_sources, BoxError, StylesheetCompiler, SOURCE_SEPARATOR};
pub use error::CompileError;
pub use lessc::{LesscCompiler, DEFAULT_LESSC};
pub use lightning::LightningCompiler;
