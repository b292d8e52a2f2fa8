use criterion::{black_box, criterion_group, criterion_main, Criterion};

use c0::{Analyser, Tokenizer};

const SAMPLE: &str = r#"
int total;
const int limit = 100;
double scale = 0.5;

int add(int a, int b)
{
    return a + b;
}

double weigh(double value, int times)
{
    return value * times * scale;
}

int main()
{
    int i, sum;
    double acc;
    sum = 0;
    acc = 0.0;
    for (i = 0; i < limit; i = i + 1) {
        if (i == 13)
            continue;
        sum = add(sum, i);
        acc = weigh(acc, i);
        switch (sum) {
            case 0:
                break;
            default:
                total = sum;
        }
    }
    while (sum) {
        sum = sum - 1;
        if (sum < 2)
            break;
    }
    print("total=", total, " acc=", acc);
    return total;
}
"#;

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize", |b| {
        b.iter(|| Tokenizer::new(black_box(SAMPLE)).all())
    });
}

fn bench_analyse(c: &mut Criterion) {
    let tokens = Tokenizer::new(SAMPLE).all();
    c.bench_function("analyse", |b| {
        b.iter(|| {
            let (ast, err) = Analyser::new(black_box(tokens.clone())).analyse();
            assert!(err.is_none());
            ast
        })
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    c.bench_function("tokenize+analyse", |b| {
        b.iter(|| c0::analyse_source_silent(black_box(SAMPLE)).unwrap())
    });
}

criterion_group!(benches, bench_tokenize, bench_analyse, bench_end_to_end);
criterion_main!(benches);
