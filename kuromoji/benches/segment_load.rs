use criterion::{Criterion, criterion_group, criterion_main};
use kuromoji::{Dictionary, LoadPolicy, SystemDictionaryBuilder};

const LEX_CSV: &str = include_str!("../src/tests/resources/lex.csv");
const MATRIX_DEF: &str = include_str!("../src/tests/resources/matrix.def");
const CHAR_DEF: &str = include_str!("../src/tests/resources/char.def");
const UNK_DEF: &str = include_str!("../src/tests/resources/unk.def");

fn bench_segment_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    SystemDictionaryBuilder::from_readers(
        LEX_CSV.as_bytes(),
        MATRIX_DEF.as_bytes(),
        CHAR_DEF.as_bytes(),
        UNK_DEF.as_bytes(),
    )
    .unwrap()
    .write_segments(dir.path())
    .unwrap();

    let mut group = c.benchmark_group("SegmentLoad");
    group.sample_size(30);

    group.bench_function("strict", |b| {
        b.iter(|| {
            std::hint::black_box(Dictionary::load_segments(dir.path(), LoadPolicy::Strict).unwrap());
        })
    });

    group.bench_function("build", |b| {
        b.iter(|| {
            std::hint::black_box(
                SystemDictionaryBuilder::from_readers(
                    LEX_CSV.as_bytes(),
                    MATRIX_DEF.as_bytes(),
                    CHAR_DEF.as_bytes(),
                    UNK_DEF.as_bytes(),
                )
                .unwrap(),
            );
        })
    });

    group.finish();
}

criterion_group!(benches, bench_segment_load);
criterion_main!(benches);
