//! DSV Reader Examples
//!
//! Demonstrates the reading side of the crate:
//! - Pull-style reading with `DsvReader`
//! - Headers and records keyed by column name
//! - Push-style streaming with `parse_stream`
//! - Custom delimiters
//!
//! Run `dsv_write` first to create the input files.

use dsvstream::{parse_stream, row_to_object, DsvReader, ParseOptions};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

fn input(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== DSV Reader Examples ===\n");

    // Example 1: Read plain CSV
    println!("1. Reading plain CSV...");
    {
        let mut reader = DsvReader::open(input("dsvstream_output.csv"))?;

        for (i, row_result) in reader.rows().enumerate() {
            let row = row_result?;
            println!("   Row {}: {:?}", i + 1, row);
        }
        println!("   Total rows read: {}", reader.row_count());
    }

    // Example 2: Read with headers
    println!("\n2. Reading with headers...");
    {
        let mut reader = DsvReader::open(input("dsvstream_typed.csv"))?.has_header(true);

        while let Some(row) = reader.read_row()? {
            println!("   {:?}", row);
        }
        if let Some(headers) = reader.headers() {
            println!("   Headers: {:?}", headers);
        }
    }

    // Example 3: Edge cases
    println!("\n3. Reading edge cases (quotes, commas, newlines)...");
    {
        let mut reader = DsvReader::open(input("dsvstream_edge_cases.csv"))?;

        for (i, row_result) in reader.rows().enumerate() {
            let row = row_result?;
            if i == 0 {
                println!("   Header: {:?}", row);
            } else {
                println!("   Row {}: Field={}, Value={:?}", i, row[0], row[1]);
            }
        }
    }

    // Example 4: Custom delimiter
    println!("\n4. Reading with custom delimiter (semicolon)...");
    {
        let mut reader = DsvReader::open(input("dsvstream_semicolon.csv"))?.delimiter(';');

        for row_result in reader.rows() {
            println!("   {:?}", row_result?);
        }
    }

    // Example 5: Streaming records
    println!("\n5. Streaming a large TSV into records...");
    {
        let mut count = 0u64;
        let mut price_total = 0.0;
        let mut failure = None;

        parse_stream(
            File::open(input("dsvstream_large.tsv"))?,
            &ParseOptions::tsv(),
            row_to_object(|record| {
                count += 1;
                price_total += record["Price"].parse::<f64>().unwrap_or(0.0);
                if count % 20_000 == 0 {
                    println!("   Read {} records...", count);
                }
            }),
            |err| failure = err,
        )?;

        if let Some(err) = failure {
            return Err(err.into());
        }
        println!("   Total records: {}, price total: {:.2}", count, price_total);
    }

    // Example 6: Error handling
    println!("\n6. Error handling example...");
    {
        match DsvReader::open(input("dsvstream_nonexistent.csv")) {
            Ok(_) => println!("   File opened"),
            Err(e) => println!("   Expected error: {}", e),
        }
    }

    println!("\n=== All examples completed successfully! ===");

    Ok(())
}
