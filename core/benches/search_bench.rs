use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use search_core::{process_queries, DocId, DocumentStatus, ExecutionPolicy, SearchServer};

fn generate_word(rng: &mut StdRng, max_length: usize) -> String {
    let length = rng.gen_range(1..=max_length);
    (0..length).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

fn generate_dictionary(rng: &mut StdRng, word_count: usize, max_length: usize) -> Vec<String> {
    let mut words: Vec<String> = (0..word_count).map(|_| generate_word(rng, max_length)).collect();
    words.sort_unstable();
    words.dedup();
    words
}

fn generate_query(rng: &mut StdRng, dictionary: &[String], word_count: usize, minus_prob: f64) -> String {
    (0..word_count)
        .map(|_| {
            let word = dictionary.choose(rng).map(String::as_str).unwrap_or("word");
            if rng.gen_bool(minus_prob) {
                format!("-{word}")
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_server(seed: u64) -> (SearchServer, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let dictionary = generate_dictionary(&mut rng, 2_000, 10);
    let mut server = SearchServer::new();
    for id in 0..10_000 {
        let text = generate_query(&mut rng, &dictionary, 70, 0.0);
        server
            .add_document(id as DocId, &text, DocumentStatus::Actual, &[1, 2, 3])
            .expect("generated documents are valid");
    }
    let queries = (0..100).map(|_| generate_query(&mut rng, &dictionary, 70, 0.1)).collect();
    (server, queries)
}

fn bench_find_top_documents(c: &mut Criterion) {
    let (server, queries) = build_server(42);
    for (name, policy) in [("seq", ExecutionPolicy::Sequential), ("par", ExecutionPolicy::Parallel)] {
        c.bench_function(&format!("find_top_documents_{name}"), |b| {
            b.iter(|| {
                let mut total_relevance = 0.0;
                for query in &queries {
                    let found = server
                        .find_top_documents_with(policy, query, |_, status, _| status == DocumentStatus::Actual)
                        .expect("generated queries are valid");
                    total_relevance += found.iter().map(|d| d.relevance).sum::<f64>();
                }
                total_relevance
            })
        });
    }
    c.bench_function("process_queries", |b| b.iter(|| process_queries(&server, &queries)));
}

fn bench_remove_document(c: &mut Criterion) {
    for (name, policy) in [("seq", ExecutionPolicy::Sequential), ("par", ExecutionPolicy::Parallel)] {
        c.bench_function(&format!("remove_document_{name}"), |b| {
            b.iter_batched(
                || build_server(7).0,
                |mut server| {
                    for id in 0..1_000 {
                        server.remove_document_with(policy, id);
                    }
                    server
                },
                BatchSize::LargeInput,
            )
        });
    }
}

criterion_group!(benches, bench_find_top_documents, bench_remove_document);
criterion_main!(benches);
