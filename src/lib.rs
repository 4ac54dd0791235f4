//! Aggregates BPY331 payment files: one output record per payee, carrying
//! the sum of that payee's payments.

pub mod aggregator;
pub mod checksum;
pub mod error;
pub mod input;
pub mod models;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod serializer;

use std::io::{Read, Write};

use aggregator::aggregate;
use error::Result;
use parser::parse_batch;
use resolver::IdentityResolver;
use serializer::write_batch;

/// Aggregate a BPY331 file from a reader and write the result to a writer
///
/// Stream-level counterpart of [`pipeline::Pipeline::run_file`], without
/// annotation, report or notification. Nothing is written if any record
/// fails to parse or resolve.
pub fn aggregate_payments<R, W, I>(mut reader: R, writer: W, resolver: &mut I) -> Result<()>
where
    R: Read,
    W: Write,
    I: IdentityResolver + ?Sized,
{
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;

    let mut batch = parse_batch(&contents)?;
    let groups = aggregate(std::mem::take(&mut batch.payments), resolver)?;
    let output = batch.with_payments(groups.into_iter().map(|g| g.payment).collect());

    write_batch(&output, writer)
}
