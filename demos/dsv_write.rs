//! DSV Writer Examples
//!
//! Demonstrates the writing side of the crate:
//! - Plain CSV writing
//! - Typed values (numbers, booleans, dates, nulls)
//! - Fields that need quoting (delimiters, quotes, newlines)
//! - Custom delimiter and line ending
//! - Batch writing
//!
//! Files are written to the system temp directory; `dsv_read` reads them back.

use chrono::Utc;
use dsvstream::{DsvWriter, Value};
use std::error::Error;
use std::path::PathBuf;

fn out(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== DSV Writer Examples ===\n");

    // Example 1: Plain CSV
    println!("1. Writing plain CSV...");
    {
        let path = out("dsvstream_output.csv");
        let mut writer = DsvWriter::create(&path)?;
        writer.write_row(["Name", "Age", "City"])?;
        writer.write_row(["Alice", "30", "New York"])?;
        writer.write_row(["Bob", "25", "San Francisco"])?;
        writer.write_row(["Charlie", "35", "Los Angeles"])?;
        println!("   Rows written: {}", writer.row_count());
        writer.save()?;
        println!("   ✓ Created {}", path.display());
    }

    // Example 2: Typed values
    println!("\n2. Writing with typed values...");
    {
        let path = out("dsvstream_typed.csv");
        let mut writer = DsvWriter::create(&path)?;
        writer.write_row(["Name", "Score", "Pass", "Checked", "Note"])?;

        writer.write_row_typed(&[
            Value::from("Alice"),
            Value::Float(95.5),
            Value::Bool(true),
            Value::from(Utc::now()),
            Value::Null,
        ])?;
        writer.write_row_typed(&[
            Value::from("Bob"),
            Value::Int(78),
            Value::Bool(false),
            Value::from(Utc::now()),
            Value::from(Some("retake")),
        ])?;

        println!("   Rows written: {}", writer.row_count());
        writer.save()?;
        println!("   ✓ Created {}", path.display());
    }

    // Example 3: Edge cases
    println!("\n3. Writing edge cases...");
    {
        let path = out("dsvstream_edge_cases.csv");
        let mut writer = DsvWriter::create(&path)?;
        writer.write_row(["Field Type", "Value", "Description"])?;
        writer.write_row(["Comma", "a,b,c", "Contains commas"])?;
        writer.write_row(["Quotes", r#"Say "Hello""#, "Contains quotes"])?;
        writer.write_row(["Multiline", "Line 1\nLine 2\nLine 3", "Contains newlines"])?;
        writer.write_row(["Empty", "", "Empty middle field"])?;
        println!("   Rows written: {}", writer.row_count());
        writer.save()?;
        println!("   ✓ Created {}", path.display());
    }

    // Example 4: Semicolons and CRLF
    println!("\n4. Writing with custom delimiter (semicolon) and CRLF...");
    {
        let path = out("dsvstream_semicolon.csv");
        let mut writer = DsvWriter::create(&path)?.delimiter(';').line_ending("\r\n");
        writer.write_row(["Country", "Capital", "Population"])?;
        writer.write_row(["France", "Paris", "67M"])?;
        writer.write_row(["Germany", "Berlin", "83M"])?;
        writer.write_row(["Italy", "Rome; Lazio", "60M"])?;
        println!("   Rows written: {}", writer.row_count());
        writer.save()?;
        println!("   ✓ Created {}", path.display());
    }

    // Example 5: Batch writing
    println!("\n5. Writing 100K rows in one batch...");
    {
        let path = out("dsvstream_large.tsv");
        let mut writer = DsvWriter::create(&path)?.delimiter('\t');
        writer.write_row(["ID", "Product", "Price"])?;

        let rows = (0..100_000).map(|i| {
            vec![
                i.to_string(),
                format!("Product_{}", i % 1000),
                format!("{:.2}", (i as f64 * 0.99) % 100.0),
            ]
        });
        writer.write_rows_batch(rows)?;

        println!("   Rows written: {}", writer.row_count());
        writer.save()?;

        let metadata = std::fs::metadata(&path)?;
        println!(
            "   ✓ Created {} ({:.2} MB)",
            path.display(),
            metadata.len() as f64 / 1024.0 / 1024.0
        );
    }

    println!("\n=== All examples completed successfully! ===");

    Ok(())
}
