use anyhow::{bail, Context, Result};
use search_core::{DocId, DocumentStatus, SearchConfig, SearchServer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One document of an input corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

/// `.json`/`.jsonl` files under `input`, or `input` itself if it is a file.
fn input_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input path {} does not exist", input.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}

/// Read documents from a JSON array, a single JSON object, JSONL, or a
/// directory of such files.
pub fn load_corpus(input: &Path) -> Result<Vec<InputDoc>> {
    let mut docs = Vec::new();
    for file in input_files(input)? {
        let before = docs.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), docs = docs.len() - before, "read corpus file");
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed document", file.display(), line_no + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (pos, v) in arr.into_iter().enumerate() {
                let doc: InputDoc = serde_json::from_value(v)
                    .with_context(|| format!("{}[{pos}]: malformed document", file.display()))?;
                docs.push(doc);
            }
        }
        serde_json::Value::Object(_) => docs.push(
            serde_json::from_value(json).with_context(|| format!("{}: malformed document", file.display()))?,
        ),
        _ => bail!("{}: expected a document or an array of documents", file.display()),
    }
    Ok(())
}

/// Index `docs`. Documents the server rejects are logged and skipped.
pub fn build_server(docs: &[InputDoc], stop_words: &str, config: SearchConfig) -> Result<SearchServer> {
    let mut server = SearchServer::with_config(config);
    server.set_stop_words(stop_words).context("invalid stop words")?;
    for doc in docs {
        if let Err(err) = server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
            tracing::warn!(document_id = doc.id, %err, "skipping document");
        }
    }
    tracing::info!(documents = server.document_count(), skipped = docs.len() - server.document_count(), "corpus indexed");
    Ok(server)
}
