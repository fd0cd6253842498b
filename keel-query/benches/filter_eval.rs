use criterion::{Criterion, black_box, criterion_group, criterion_main};
use keel_model::Describe;
use keel_model::fixtures::Person;
use keel_query::{FilterNode, Operator, compile};

fn build_people(n: usize) -> Vec<Person> {
    (0..n)
        .map(|i| {
            let p = Person::new(i as i64, &format!("person-{i:05}"), (i % 90) as i64);
            if i % 3 == 0 { p.with_email(&format!("p{i}@example.com")) } else { p }
        })
        .collect()
}

fn sample_filter() -> FilterNode {
    FilterNode::and(vec![
        FilterNode::greater_than("age", 18),
        FilterNode::or(vec![
            FilterNode::compare("name", Operator::EndsWith, "7"),
            FilterNode::negate(FilterNode::equals("email", None::<String>)),
        ]),
        FilterNode::is_in("age", vec![20, 30, 40, 50, 60]),
    ])
}

fn bench_compile(c: &mut Criterion) {
    let filter = sample_filter();
    c.bench_function("filter_compile", |b| {
        b.iter(|| compile(Person::describe(), Some(black_box(&filter))).unwrap())
    });
}

fn bench_matcher_10k(c: &mut Criterion) {
    let people = build_people(10_000);
    let predicate = compile(Person::describe(), Some(&sample_filter())).unwrap();
    let matcher = predicate.matcher();
    c.bench_function("filter_matcher_10k", |b| {
        b.iter(|| people.iter().filter(|p| matcher.test(*p)).count())
    });
}

fn bench_uncached_10k(c: &mut Criterion) {
    let people = build_people(10_000);
    let predicate = compile(Person::describe(), Some(&sample_filter())).unwrap();
    c.bench_function("filter_matches_uncached_10k", |b| {
        b.iter(|| people.iter().filter(|p| predicate.matches(*p)).count())
    });
}

criterion_group!(benches, bench_compile, bench_matcher_10k, bench_uncached_10k);
criterion_main!(benches);
