use criterion::{Criterion, black_box, criterion_group, criterion_main};

use qwerty_learner::dict::Word;
use qwerty_learner::session::input::InputState;
use qwerty_learner::store::wrong_words::WrongWordLedger;
use std::time::Duration;

fn make_words(count: usize) -> Vec<Word> {
    (0..count)
        .map(|i| Word::new(&format!("accommodation{i}"), &format!("住宿{i}")))
        .collect()
}

fn bench_consume(c: &mut Criterion) {
    let words = make_words(200);

    c.bench_function("type 200 words without mistakes", |b| {
        b.iter(|| {
            let mut input = InputState::new(Duration::from_millis(400));
            for word in &words {
                input.start_word(word);
                for ch in word.name.chars() {
                    black_box(input.consume(ch));
                }
            }
            input
        })
    });
}

fn bench_ledger(c: &mut Criterion) {
    let mut ledger = WrongWordLedger::default();
    for (i, word) in make_words(500).iter().enumerate() {
        for _ in 0..(i % 7 + 1) {
            ledger.record(&word.name, &word.translation());
        }
    }
    let text = ledger.serialize();

    c.bench_function("ledger serialize (500 entries)", |b| {
        b.iter(|| black_box(&ledger).serialize())
    });

    c.bench_function("ledger deserialize (500 entries)", |b| {
        b.iter(|| WrongWordLedger::deserialize(black_box(&text)))
    });

    c.bench_function("ledger record into 500 entries", |b| {
        b.iter(|| {
            let mut l = ledger.clone();
            l.record(black_box("accommodation250"), "住宿250")
        })
    });
}

criterion_group!(benches, bench_consume, bench_ledger);
criterion_main!(benches);
