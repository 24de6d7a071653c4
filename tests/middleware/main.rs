use std::path::Path;

use anyhow::Context;

datatest_stable::harness! {
    { test = test, root = "tests/middleware/testdata", pattern = r".*/input.yaml" },
}

fn test(path: &Path) -> datatest_stable::Result<()> {
    let dir = path.parent().context("case has no directory")?;
    let intent = quay_middleware::load_intent(dir.join("intent.yaml"))?;
    let input = std::fs::read_to_string(path).context("reading input")?;
    // A `skip-resources` marker file turns on resource trimming for the case.
    let skip_resources = dir.join("skip-resources").exists();

    let mut out = Vec::new();
    match quay_middleware::process_manifests(&intent, &input, skip_resources, &mut out) {
        Ok(()) => {
            let actual = String::from_utf8(out)?;
            snapshot(&dir.join("expected.yaml"), &actual, documents_eq)?;
        }
        Err(err) => {
            eprintln!("Error processing {}: {err:#}", path.display());
            snapshot(&dir.join("expected.stderr"), &format!("{err:#}\n"), |expected, actual| {
                expected == actual
            })?;
        }
    }
    Ok(())
}

fn snapshot(
    path: &Path,
    actual: &str,
    eq: impl Fn(&str, &str) -> bool,
) -> datatest_stable::Result<()> {
    if !path.exists() || std::env::var("UPDATE_SNAPSHOTS").is_ok() {
        std::fs::write(path, actual).context("writing snapshot")?;
        return Ok(());
    }

    let expected = std::fs::read_to_string(path).context("reading snapshot")?;
    if eq(&expected, actual) {
        return Ok(());
    }

    let formatted = format_chunks(dissimilar::diff(&expected, actual));
    eprintln!("Snapshot mismatch for {}:\n{}", path.display(), formatted);

    Err(format!("Snapshot mismatch for {}", path.display()).into())
}

/// Compares two yaml streams document by document, ignoring formatting and key order.
fn documents_eq(expected: &str, actual: &str) -> bool {
    match (documents(expected), documents(actual)) {
        (Ok(expected), Ok(actual)) => expected == actual,
        _ => false,
    }
}

fn documents(stream: &str) -> anyhow::Result<Vec<serde_yaml::Value>> {
    use serde::Deserialize as _;

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(stream) {
        let value = serde_yaml::Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

fn format_chunks(chunks: Vec<dissimilar::Chunk>) -> String {
    let mut buf = String::new();
    for chunk in chunks {
        let formatted = match chunk {
            dissimilar::Chunk::Equal(text) => text.into(),
            dissimilar::Chunk::Delete(text) => format!("\x1b[4m\x1b[31m{}\x1b[0m", text),
            dissimilar::Chunk::Insert(text) => format!("\x1b[4m\x1b[32m{}\x1b[0m", text),
        };
        buf.push_str(&formatted);
    }
    buf
}
