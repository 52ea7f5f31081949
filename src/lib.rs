//! Core library for the aideon-merge command line application.
//!
//! The library merges sheets from several Excel workbooks into one table,
//! lets the user pick and order its columns, edit cells, and save the result
//! as a new workbook. IO adapters live under [`aideon::merge::io`], data
//! representations inside [`aideon::merge::model`], the individual workflow
//! stages in [`aideon::merge::pipeline`], and the state machine tying them
//! together under [`aideon::merge::session`]. The interactive front end is
//! [`aideon::merge::repl`].

pub mod aideon;

pub use aideon::merge::{
    MergeError, Result, batch, command, error, io, logging, model, pipeline, render, repl, session,
};
