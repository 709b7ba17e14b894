use criterion::{criterion_group, criterion_main, Criterion};
use fy_safer::{Document, Emitter, Input, Parser};

static VERY_LARGE_YAML: &[u8] = include_bytes!("very_large.yml");

pub fn parser(c: &mut Criterion) {
    c.bench_function("parse large", |b| {
        b.iter(|| {
            let input = Input::from_bytes("bench", VERY_LARGE_YAML.to_vec());
            let mut parser = Parser::new(input);
            Document::load(&mut parser)
        })
    });

    c.bench_function("emit large", |b| {
        let mut buffer = Vec::with_capacity(VERY_LARGE_YAML.len());

        let doc = {
            let input = Input::from_bytes("bench", VERY_LARGE_YAML.to_vec());
            let mut parser = Parser::new(input);
            Document::load(&mut parser).unwrap()
        };

        b.iter_custom(|iters| {
            let mut measurement = std::time::Duration::ZERO;
            for _ in 0..iters {
                let start_time = std::time::Instant::now();
                buffer.clear();
                let mut emitter = Emitter::new().with_output_string(&mut buffer);
                doc.dump(&mut emitter).unwrap();
                measurement += start_time.elapsed();
            }
            measurement
        });
    });
}

criterion_group!(benches, parser);
criterion_main!(benches);
